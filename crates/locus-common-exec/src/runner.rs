// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::ExecError;
use crate::spec::{CommandOutput, CommandSpec, PROBE_TIMEOUT};

/// Per-stream cap on captured output. Test runners can emit enormous logs;
/// bytes past the cap are read and dropped so the child never blocks.
pub const MAX_OUTPUT_BYTES: usize = 4 * 1024 * 1024;

/// Trait abstracting external process execution for testability.
#[async_trait]
pub trait CommandRunner: Send + Sync {
	/// Runs the command to completion or until its timeout elapses.
	async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError>;

	/// Returns true if `<binary> --version` runs and exits zero.
	async fn is_available(&self, binary: &str) -> bool {
		let probe = CommandSpec::new(binary)
			.arg("--version")
			.timeout(PROBE_TIMEOUT);
		matches!(self.run(&probe).await, Ok(output) if output.success())
	}
}

/// Runs commands as real child processes.
pub struct SystemCommandRunner {
	max_output_bytes: usize,
}

impl SystemCommandRunner {
	pub fn new() -> Self {
		Self {
			max_output_bytes: MAX_OUTPUT_BYTES,
		}
	}

	pub fn with_max_output_bytes(mut self, bytes: usize) -> Self {
		self.max_output_bytes = bytes;
		self
	}
}

/// Reads a child stream to EOF, keeping at most `max_bytes`. Returns the kept
/// bytes and the full stream length.
async fn read_capped<R>(stream: Option<R>, max_bytes: usize) -> std::io::Result<(Vec<u8>, usize)>
where
	R: AsyncRead + Unpin,
{
	let Some(mut stream) = stream else {
		return Ok((Vec::new(), 0));
	};

	let mut kept = Vec::new();
	let mut total = 0;
	let mut chunk = [0u8; 8192];
	loop {
		let n = stream.read(&mut chunk).await?;
		if n == 0 {
			return Ok((kept, total));
		}
		total += n;
		let room = max_bytes.saturating_sub(kept.len());
		kept.extend_from_slice(&chunk[..n.min(room)]);
	}
}

impl Default for SystemCommandRunner {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
	async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
		let mut cmd = Command::new(&spec.binary);
		cmd.args(&spec.args)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true);
		if let Some(cwd) = &spec.cwd {
			cmd.current_dir(cwd);
		}
		for (key, value) in &spec.env {
			cmd.env(key, value);
		}

		trace!(
			cmd = %spec.display(),
			cwd = ?spec.cwd,
			timeout_secs = spec.timeout.as_secs(),
			"running command"
		);

		let started = Instant::now();
		let mut child = match cmd.spawn() {
			Ok(child) => child,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				warn!(binary = %spec.binary, "binary not found in PATH");
				return Err(ExecError::NotFound {
					binary: spec.binary.clone(),
				});
			}
			Err(e) => {
				warn!(binary = %spec.binary, error = %e, "command failed to start");
				return Err(ExecError::Io {
					binary: spec.binary.clone(),
					source: e,
				});
			}
		};

		let stdout = child.stdout.take();
		let stderr = child.stderr.take();
		let max_bytes = self.max_output_bytes;
		let collect = async {
			tokio::try_join!(
				read_capped(stdout, max_bytes),
				read_capped(stderr, max_bytes),
				child.wait(),
			)
		};

		// Dropping the child on timeout kills it (kill_on_drop).
		let ((stdout, stdout_len), (stderr, stderr_len), status) =
			match timeout(spec.timeout, collect).await {
				Ok(Ok(collected)) => collected,
				Ok(Err(e)) => {
					warn!(binary = %spec.binary, error = %e, "reading command output failed");
					return Err(ExecError::Io {
						binary: spec.binary.clone(),
						source: e,
					});
				}
				Err(_) => {
					warn!(
						cmd = %spec.display(),
						timeout_secs = spec.timeout.as_secs(),
						"command timed out"
					);
					return Err(ExecError::Timeout {
						binary: spec.binary.clone(),
						timeout_secs: spec.timeout.as_secs(),
					});
				}
			};

		let truncated = stdout_len > stdout.len() || stderr_len > stderr.len();
		let duration_ms = started.elapsed().as_millis() as u64;

		debug!(
			binary = %spec.binary,
			exit_code = ?status.code(),
			stdout_len,
			stderr_len,
			duration_ms,
			"command completed"
		);
		if truncated {
			warn!(
				cmd = %spec.display(),
				stdout_len,
				stderr_len,
				max_bytes,
				"command output truncated; structured reports may fall back to text parsing"
			);
		}

		Ok(CommandOutput {
			stdout: String::from_utf8_lossy(&stdout).into_owned(),
			stderr: String::from_utf8_lossy(&stderr).into_owned(),
			exit_code: status.code(),
			duration_ms,
			truncated,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use tempfile::TempDir;

	#[tokio::test]
	async fn captures_stdout_and_exit_code() {
		let runner = SystemCommandRunner::new();
		let output = runner
			.run(&CommandSpec::new("echo").arg("hello"))
			.await
			.unwrap();

		assert!(output.success());
		assert_eq!(output.stdout.trim(), "hello");
	}

	#[tokio::test]
	async fn non_zero_exit_is_data_not_error() {
		let runner = SystemCommandRunner::new();
		let output = runner
			.run(&CommandSpec::new("sh").args(["-c", "echo found >&2; exit 3"]))
			.await
			.unwrap();

		assert_eq!(output.exit_code, Some(3));
		assert_eq!(output.stderr.trim(), "found");
	}

	#[tokio::test]
	async fn arguments_are_not_shell_interpolated() {
		let runner = SystemCommandRunner::new();
		let output = runner
			.run(&CommandSpec::new("echo").arg("$HOME; rm -rf /"))
			.await
			.unwrap();

		assert_eq!(output.stdout.trim(), "$HOME; rm -rf /");
	}

	#[tokio::test]
	async fn respects_working_directory() {
		let temp = TempDir::new().unwrap();
		let runner = SystemCommandRunner::new();
		let output = runner
			.run(&CommandSpec::new("pwd").cwd(temp.path()))
			.await
			.unwrap();

		let canonical = temp.path().canonicalize().unwrap();
		assert_eq!(
			std::path::Path::new(output.stdout.trim()).canonicalize().unwrap(),
			canonical
		);
	}

	#[tokio::test]
	async fn missing_binary_is_not_found() {
		let runner = SystemCommandRunner::new();
		let result = runner
			.run(&CommandSpec::new("definitely-not-a-real-binary-locus"))
			.await;

		assert!(matches!(result, Err(ExecError::NotFound { .. })));
	}

	#[tokio::test]
	async fn times_out_and_reports_timeout() {
		let runner = SystemCommandRunner::new();
		let result = runner
			.run(&CommandSpec::new("sleep").arg("10").timeout(Duration::from_millis(200)))
			.await;

		match result {
			Err(e) => assert!(e.is_timeout(), "expected timeout, got {e:?}"),
			Ok(output) => panic!("expected timeout, got {output:?}"),
		}
	}

	#[tokio::test]
	async fn truncates_large_output() {
		let runner = SystemCommandRunner::new().with_max_output_bytes(1024);
		let output = runner
			.run(&CommandSpec::new("sh").args(["-c", "yes | head -c 5000"]))
			.await
			.unwrap();

		assert!(output.truncated);
		assert!(output.stdout.len() <= 1024);
	}

	#[tokio::test]
	async fn output_past_the_cap_is_drained() {
		let runner = SystemCommandRunner::new().with_max_output_bytes(1024);
		let output = runner
			.run(
				&CommandSpec::new("sh")
					.args(["-c", "head -c 300000 /dev/zero | tr '\\0' a; echo done >&2"])
					.timeout(Duration::from_secs(10)),
			)
			.await
			.unwrap();

		assert!(output.success());
		assert!(output.truncated);
		assert_eq!(output.stdout.len(), 1024);
		assert!(output.stdout.bytes().all(|b| b == b'a'));
		assert_eq!(output.stderr.trim(), "done");
	}

	#[tokio::test]
	async fn is_available_detects_installed_binary() {
		let runner = SystemCommandRunner::new();
		assert!(runner.is_available("git").await);
		assert!(!runner.is_available("definitely-not-a-real-binary-locus").await);
	}
}
