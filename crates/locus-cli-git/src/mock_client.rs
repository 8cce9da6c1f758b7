// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::GitClient;
use crate::error::GitError;

/// Recorded call to the mock git client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockCall {
	IsRepository,
	CurrentBranch,
	CreateBranch(String),
	StageFiles(Vec<String>),
	Commit(String),
	Push { remote: String, branch: String },
	Checkout(String),
	RestoreFiles(Vec<String>),
	DeleteBranch(String),
	ChangedFiles,
	RemoteUrl(String),
}

/// Mock git client for testing.
#[derive(Clone)]
pub struct MockGitClient {
	/// Whether is_repository returns true.
	pub is_repo: bool,
	/// Branch returned from current_branch.
	pub branch: Option<String>,
	/// Files already dirty; every changed_files call returns them.
	pub preexisting_changes: Vec<String>,
	/// Files changed_files adds from the second call onwards, standing in
	/// for what a tool modified after the first listing.
	pub changed_files_list: Vec<String>,
	/// URL returned from remote_url.
	pub remote: Option<String>,
	/// SHA to return from commit.
	pub commit_sha: String,
	/// If set, create_branch returns this error.
	pub branch_error: Option<String>,
	/// If set, stage_files returns this error.
	pub stage_error: Option<String>,
	/// If set, commit returns this error.
	pub commit_error: Option<String>,
	/// If set, push returns this error.
	pub push_error: Option<String>,
	/// If set, checkout returns this error.
	pub checkout_error: Option<String>,
	/// Track calls for verification.
	pub calls: Arc<Mutex<Vec<MockCall>>>,
}

impl Default for MockGitClient {
	fn default() -> Self {
		Self::new()
	}
}

impl MockGitClient {
	pub fn new() -> Self {
		Self {
			is_repo: true,
			branch: Some("main".to_string()),
			preexisting_changes: Vec::new(),
			changed_files_list: Vec::new(),
			remote: Some("git@github.com:acme/widgets.git".to_string()),
			commit_sha: "abc123def456789012345678901234567890abcd".to_string(),
			branch_error: None,
			stage_error: None,
			commit_error: None,
			push_error: None,
			checkout_error: None,
			calls: Arc::new(Mutex::new(Vec::new())),
		}
	}

	pub fn with_changed_files(mut self, files: Vec<String>) -> Self {
		self.changed_files_list = files;
		self
	}

	pub fn with_preexisting_changes(mut self, files: Vec<String>) -> Self {
		self.preexisting_changes = files;
		self
	}

	pub fn with_branch(mut self, branch: Option<String>) -> Self {
		self.branch = branch;
		self
	}

	pub fn with_remote(mut self, url: Option<String>) -> Self {
		self.remote = url;
		self
	}

	pub fn not_a_repo(mut self) -> Self {
		self.is_repo = false;
		self
	}

	pub fn with_branch_error(mut self, error: impl Into<String>) -> Self {
		self.branch_error = Some(error.into());
		self
	}

	pub fn with_stage_error(mut self, error: impl Into<String>) -> Self {
		self.stage_error = Some(error.into());
		self
	}

	pub fn with_commit_error(mut self, error: impl Into<String>) -> Self {
		self.commit_error = Some(error.into());
		self
	}

	pub fn with_push_error(mut self, error: impl Into<String>) -> Self {
		self.push_error = Some(error.into());
		self
	}

	pub fn with_checkout_error(mut self, error: impl Into<String>) -> Self {
		self.checkout_error = Some(error.into());
		self
	}

	pub fn with_commit_sha(mut self, sha: impl Into<String>) -> Self {
		self.commit_sha = sha.into();
		self
	}

	/// Returns the recorded calls.
	pub fn get_calls(&self) -> Vec<MockCall> {
		self.calls.lock().unwrap().clone()
	}

	/// Clears recorded calls.
	pub fn clear_calls(&self) {
		self.calls.lock().unwrap().clear();
	}

	fn record(&self, call: MockCall) {
		self.calls.lock().unwrap().push(call);
	}

	fn fail(error: &Option<String>, args: &[&str]) -> Result<(), GitError> {
		match error {
			Some(stderr) => Err(GitError::CommandFailed {
				cmd: "git",
				args: args.iter().map(|s| s.to_string()).collect(),
				stderr: stderr.clone(),
			}),
			None => Ok(()),
		}
	}
}

#[async_trait]
impl GitClient for MockGitClient {
	async fn is_repository(&self, _path: &Path) -> bool {
		self.record(MockCall::IsRepository);
		self.is_repo
	}

	async fn current_branch(&self, _path: &Path) -> Result<Option<String>, GitError> {
		self.record(MockCall::CurrentBranch);
		Ok(self.branch.clone())
	}

	async fn create_branch(&self, _path: &Path, name: &str) -> Result<(), GitError> {
		self.record(MockCall::CreateBranch(name.to_string()));
		Self::fail(&self.branch_error, &["checkout", "-b", name])
	}

	async fn stage_files(&self, _path: &Path, files: &[String]) -> Result<(), GitError> {
		self.record(MockCall::StageFiles(files.to_vec()));
		Self::fail(&self.stage_error, &["add"])
	}

	async fn commit(&self, _path: &Path, message: &str) -> Result<String, GitError> {
		self.record(MockCall::Commit(message.to_string()));
		Self::fail(&self.commit_error, &["commit", "-m", message])?;
		Ok(self.commit_sha.clone())
	}

	async fn push(&self, _path: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
		self.record(MockCall::Push {
			remote: remote.to_string(),
			branch: branch.to_string(),
		});
		Self::fail(&self.push_error, &["push", "-u", remote, branch])
	}

	async fn checkout(&self, _path: &Path, branch: &str) -> Result<(), GitError> {
		self.record(MockCall::Checkout(branch.to_string()));
		Self::fail(&self.checkout_error, &["checkout", branch])
	}

	async fn restore_files(&self, _path: &Path, files: &[String]) -> Result<(), GitError> {
		self.record(MockCall::RestoreFiles(files.to_vec()));
		Ok(())
	}

	async fn delete_branch(&self, _path: &Path, name: &str) -> Result<(), GitError> {
		self.record(MockCall::DeleteBranch(name.to_string()));
		Ok(())
	}

	async fn changed_files(&self, _path: &Path) -> Result<Vec<String>, GitError> {
		let listed_before = self
			.get_calls()
			.iter()
			.any(|c| matches!(c, MockCall::ChangedFiles));
		self.record(MockCall::ChangedFiles);

		let mut files = self.preexisting_changes.clone();
		if listed_before {
			files.extend(
				self.changed_files_list
					.iter()
					.filter(|f| !self.preexisting_changes.contains(f))
					.cloned(),
			);
		}
		Ok(files)
	}

	async fn remote_url(&self, _path: &Path, remote: &str) -> Result<Option<String>, GitError> {
		self.record(MockCall::RemoteUrl(remote.to_string()));
		Ok(self.remote.clone())
	}
}
