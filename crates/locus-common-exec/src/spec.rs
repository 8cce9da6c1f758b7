// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Default per-call timeout for analyzer tool invocations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout used when probing whether a binary is installed.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// A single external command invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
	pub binary: String,
	pub args: Vec<String>,
	pub cwd: Option<PathBuf>,
	pub timeout: Duration,
	pub env: Vec<(String, String)>,
}

impl CommandSpec {
	pub fn new(binary: impl Into<String>) -> Self {
		Self {
			binary: binary.into(),
			args: Vec::new(),
			cwd: None,
			timeout: DEFAULT_TIMEOUT,
			env: Vec::new(),
		}
	}

	pub fn arg(mut self, arg: impl Into<String>) -> Self {
		self.args.push(arg.into());
		self
	}

	pub fn args<I, S>(mut self, args: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.args.extend(args.into_iter().map(Into::into));
		self
	}

	pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
		self.cwd = Some(cwd.into());
		self
	}

	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.env.push((key.into(), value.into()));
		self
	}

	/// Human-readable form for logs and suggestion text. Not shell-escaped.
	pub fn display(&self) -> String {
		if self.args.is_empty() {
			self.binary.clone()
		} else {
			format!("{} {}", self.binary, self.args.join(" "))
		}
	}
}

/// Captured result of a finished process.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
	pub stdout: String,
	pub stderr: String,
	/// `None` when the process was terminated by a signal.
	pub exit_code: Option<i32>,
	pub duration_ms: u64,
	pub truncated: bool,
}

impl CommandOutput {
	pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
		Self {
			stdout: stdout.into(),
			stderr: stderr.into(),
			exit_code: Some(exit_code),
			duration_ms: 0,
			truncated: false,
		}
	}

	pub fn success(&self) -> bool {
		self.exit_code == Some(0)
	}

	/// Stdout followed by stderr. Many tools split their report across both.
	pub fn combined(&self) -> String {
		match (self.stdout.is_empty(), self.stderr.is_empty()) {
			(true, _) => self.stderr.clone(),
			(_, true) => self.stdout.clone(),
			_ => format!("{}\n{}", self.stdout, self.stderr),
		}
	}
}
