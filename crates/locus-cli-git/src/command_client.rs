// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::client::GitClient;
use crate::error::GitError;

/// Upper bound for a single git invocation. Pushes over slow links dominate.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Git client implementation using the git CLI.
pub struct CommandGitClient {
	timeout: Duration,
}

impl CommandGitClient {
	pub fn new() -> Self {
		Self {
			timeout: DEFAULT_GIT_TIMEOUT,
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	async fn git(&self, path: &Path, args: &[&str]) -> Result<String, GitError> {
		run_git(path, args, self.timeout).await
	}
}

impl Default for CommandGitClient {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl GitClient for CommandGitClient {
	async fn is_repository(&self, path: &Path) -> bool {
		self.git(path, &["rev-parse", "--show-toplevel"]).await.is_ok()
	}

	async fn current_branch(&self, path: &Path) -> Result<Option<String>, GitError> {
		let branch = self.git(path, &["rev-parse", "--abbrev-ref", "HEAD"]).await?;
		if branch == "HEAD" || branch.is_empty() {
			debug!(path = %path.display(), "detached HEAD state");
			return Ok(None);
		}
		Ok(Some(branch))
	}

	async fn create_branch(&self, path: &Path, name: &str) -> Result<(), GitError> {
		self.git(path, &["checkout", "-b", name]).await?;
		debug!(path = %path.display(), branch = %name, "created branch");
		Ok(())
	}

	async fn stage_files(&self, path: &Path, files: &[String]) -> Result<(), GitError> {
		let mut args = vec!["add", "--"];
		args.extend(files.iter().map(String::as_str));
		self.git(path, &args).await?;
		debug!(path = %path.display(), files_count = files.len(), "staged files");
		Ok(())
	}

	async fn commit(&self, path: &Path, message: &str) -> Result<String, GitError> {
		self.git(path, &["commit", "-m", message]).await?;

		let sha = self.git(path, &["rev-parse", "HEAD"]).await?;

		debug!(path = %path.display(), sha = %sha, "created commit");
		Ok(sha)
	}

	async fn push(&self, path: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
		self.git(path, &["push", "-u", remote, branch]).await?;
		debug!(path = %path.display(), remote = %remote, branch = %branch, "pushed branch");
		Ok(())
	}

	async fn checkout(&self, path: &Path, branch: &str) -> Result<(), GitError> {
		self.git(path, &["checkout", branch]).await?;
		debug!(path = %path.display(), branch = %branch, "checked out branch");
		Ok(())
	}

	async fn restore_files(&self, path: &Path, files: &[String]) -> Result<(), GitError> {
		if files.is_empty() {
			return Ok(());
		}

		let mut ls_args = vec!["ls-tree", "-r", "--name-only", "HEAD", "--"];
		ls_args.extend(files.iter().map(String::as_str));
		let listed = self.git(path, &ls_args).await?;
		let (tracked, untracked): (Vec<&str>, Vec<&str>) = files
			.iter()
			.map(String::as_str)
			.partition(|file| listed.lines().any(|line| line.trim() == *file));

		if !untracked.is_empty() {
			// New files only get unstaged; their content stays on disk.
			let mut args = vec!["rm", "--cached", "-q", "--ignore-unmatch", "--"];
			args.extend(untracked.iter().copied());
			self.git(path, &args).await?;
			debug!(path = %path.display(), files = ?untracked, "unstaged untracked files");
		}

		if !tracked.is_empty() {
			let mut args = vec!["checkout", "HEAD", "--"];
			args.extend(tracked.iter().copied());
			self.git(path, &args).await?;
		}
		debug!(path = %path.display(), files_count = tracked.len(), "restored files");
		Ok(())
	}

	async fn delete_branch(&self, path: &Path, name: &str) -> Result<(), GitError> {
		self.git(path, &["branch", "-D", name]).await?;
		debug!(path = %path.display(), branch = %name, "deleted branch");
		Ok(())
	}

	async fn changed_files(&self, path: &Path) -> Result<Vec<String>, GitError> {
		let modified = self.git(path, &["diff", "--name-only", "--relative"]).await?;
		let untracked = self
			.git(path, &["ls-files", "--others", "--exclude-standard"])
			.await
			.unwrap_or_default();

		let mut files: Vec<String> = Vec::new();
		for line in modified.lines().chain(untracked.lines()) {
			let line = line.trim();
			if !line.is_empty() && !files.iter().any(|f| f == line) {
				files.push(line.to_string());
			}
		}

		debug!(
			path = %path.display(),
			files_count = files.len(),
			"listed changed files"
		);

		Ok(files)
	}

	async fn remote_url(&self, path: &Path, remote: &str) -> Result<Option<String>, GitError> {
		match self.git(path, &["remote", "get-url", remote]).await {
			Ok(url) if !url.is_empty() => Ok(Some(url)),
			Ok(_) | Err(GitError::CommandFailed { .. }) => Ok(None),
			Err(e) => Err(e),
		}
	}
}

/// Runs a git command and returns the trimmed stdout on success.
async fn run_git(path: &Path, args: &[&str], limit: Duration) -> Result<String, GitError> {
	let mut cmd = Command::new("git");
	cmd.arg("-C").arg(path).args(args).kill_on_drop(true);

	trace!(
		cmd = %format!("git -C {} {}", path.display(), args.join(" ")),
		"running git command"
	);

	let output = match timeout(limit, cmd.output()).await {
		Ok(Ok(output)) => output,
		Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
			warn!("git not found in PATH");
			return Err(GitError::GitNotInstalled);
		}
		Ok(Err(e)) => return Err(GitError::Io(e)),
		Err(_) => {
			warn!(args = ?args, timeout_secs = limit.as_secs(), "git command timed out");
			return Err(GitError::Timeout {
				args: args.iter().map(|s| s.to_string()).collect(),
				timeout_secs: limit.as_secs(),
			});
		}
	};

	if output.status.success() {
		Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
	} else {
		let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
		Err(GitError::CommandFailed {
			cmd: "git",
			args: args.iter().map(|s| s.to_string()).collect(),
			stderr,
		})
	}
}
