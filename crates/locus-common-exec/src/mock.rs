// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ExecError;
use crate::runner::CommandRunner;
use crate::spec::{CommandOutput, CommandSpec};

/// Recorded call to the mock runner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCommand {
	pub binary: String,
	pub args: Vec<String>,
	pub cwd: Option<PathBuf>,
}

impl RecordedCommand {
	pub fn display(&self) -> String {
		if self.args.is_empty() {
			self.binary.clone()
		} else {
			format!("{} {}", self.binary, self.args.join(" "))
		}
	}
}

/// Scripted outcome of a mocked command.
#[derive(Clone, Debug)]
pub enum MockResponse {
	Output(CommandOutput),
	NotFound,
	Timeout,
}

impl MockResponse {
	pub fn ok(stdout: impl Into<String>) -> Self {
		Self::Output(CommandOutput::new(stdout, "", 0))
	}

	pub fn exit(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
		Self::Output(CommandOutput::new(stdout, stderr, code))
	}
}

struct Rule {
	binary: String,
	args_prefix: Vec<String>,
	responses: VecDeque<MockResponse>,
}

/// Mock command runner for testing.
///
/// Responses are matched by binary and argument prefix; the rule with the
/// longest matching prefix wins. Several responses registered for the same
/// rule are returned in order, and the last one repeats. Unmatched commands
/// behave like a missing binary.
#[derive(Clone, Default)]
pub struct MockCommandRunner {
	rules: Arc<Mutex<Vec<Rule>>>,
	calls: Arc<Mutex<Vec<RecordedCommand>>>,
}

impl MockCommandRunner {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn on<I, S>(self, binary: &str, args_prefix: I, response: MockResponse) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let args_prefix: Vec<String> = args_prefix.into_iter().map(Into::into).collect();
		{
			let mut rules = self.rules.lock().unwrap();
			if let Some(rule) = rules
				.iter_mut()
				.find(|r| r.binary == binary && r.args_prefix == args_prefix)
			{
				rule.responses.push_back(response);
			} else {
				rules.push(Rule {
					binary: binary.to_string(),
					args_prefix,
					responses: VecDeque::from([response]),
				});
			}
		}
		self
	}

	/// Makes `<binary> --version` succeed.
	pub fn with_available(self, binary: &str) -> Self {
		self.on(binary, ["--version"], MockResponse::ok("1.0.0"))
	}

	/// Returns the recorded calls.
	pub fn calls(&self) -> Vec<RecordedCommand> {
		self.calls.lock().unwrap().clone()
	}

	/// Returns recorded calls for one binary, rendered as command lines.
	pub fn command_lines(&self, binary: &str) -> Vec<String> {
		self.calls()
			.into_iter()
			.filter(|c| c.binary == binary)
			.map(|c| c.display())
			.collect()
	}

	fn next_response(&self, spec: &CommandSpec) -> Option<MockResponse> {
		let mut rules = self.rules.lock().unwrap();
		let rule = rules
			.iter_mut()
			.filter(|r| r.binary == spec.binary && spec.args.starts_with(&r.args_prefix))
			.max_by_key(|r| r.args_prefix.len())?;

		if rule.responses.len() > 1 {
			rule.responses.pop_front()
		} else {
			rule.responses.front().cloned()
		}
	}
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
	async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
		self.calls.lock().unwrap().push(RecordedCommand {
			binary: spec.binary.clone(),
			args: spec.args.clone(),
			cwd: spec.cwd.clone(),
		});

		match self.next_response(spec) {
			Some(MockResponse::Output(output)) => Ok(output),
			Some(MockResponse::Timeout) => Err(ExecError::Timeout {
				binary: spec.binary.clone(),
				timeout_secs: spec.timeout.as_secs(),
			}),
			Some(MockResponse::NotFound) | None => Err(ExecError::NotFound {
				binary: spec.binary.clone(),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[tokio::test]
	async fn unmatched_command_is_not_found() {
		let runner = MockCommandRunner::new();
		let result = runner.run(&CommandSpec::new("npx").arg("eslint")).await;
		assert!(matches!(result, Err(ExecError::NotFound { .. })));
		assert_eq!(runner.calls().len(), 1);
	}

	#[tokio::test]
	async fn longest_prefix_wins() {
		let runner = MockCommandRunner::new()
			.on("npx", ["eslint"], MockResponse::ok("check"))
			.on("npx", ["eslint", ".", "--fix"], MockResponse::ok("fix"));

		let check = runner
			.run(&CommandSpec::new("npx").args(["eslint", "."]))
			.await
			.unwrap();
		let fix = runner
			.run(&CommandSpec::new("npx").args(["eslint", ".", "--fix"]))
			.await
			.unwrap();

		assert_eq!(check.stdout, "check");
		assert_eq!(fix.stdout, "fix");
	}

	#[tokio::test]
	async fn sequential_responses_then_repeat_last() {
		let runner = MockCommandRunner::new()
			.on("npm", ["test"], MockResponse::ok("first"))
			.on("npm", ["test"], MockResponse::Timeout)
			.on("npm", ["test"], MockResponse::ok("last"));
		let spec = CommandSpec::new("npm").arg("test");

		assert_eq!(runner.run(&spec).await.unwrap().stdout, "first");
		assert!(runner.run(&spec).await.unwrap_err().is_timeout());
		assert_eq!(runner.run(&spec).await.unwrap().stdout, "last");
		assert_eq!(runner.run(&spec).await.unwrap().stdout, "last");
	}

	#[tokio::test]
	async fn availability_probe_uses_version_flag() {
		let runner = MockCommandRunner::new().with_available("gh");
		assert!(runner.is_available("gh").await);
		assert!(!runner.is_available("glab").await);
		assert_eq!(runner.command_lines("gh"), vec!["gh --version"]);
	}

	proptest! {
		/// Clones share scripted rules and call history.
		#[test]
		fn clones_share_calls(call_count in 1usize..10) {
			let rt = tokio::runtime::Runtime::new().unwrap();
			rt.block_on(async {
				let runner = MockCommandRunner::new().on("git", ["status"], MockResponse::ok(""));
				let clone = runner.clone();
				for _ in 0..call_count {
					clone.run(&CommandSpec::new("git").arg("status")).await.unwrap();
				}
				prop_assert_eq!(runner.calls().len(), call_count);
				Ok(())
			}).unwrap();
		}
	}
}
