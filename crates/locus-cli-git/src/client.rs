// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::Path;

use async_trait::async_trait;

use crate::error::GitError;

/// Trait abstracting the git operations remediation jobs perform.
///
/// Every method takes the working tree root explicitly; implementations keep
/// no per-repository state.
#[async_trait]
pub trait GitClient: Send + Sync {
	/// Check if the path is inside a git repository.
	async fn is_repository(&self, path: &Path) -> bool;

	/// Current branch name, or `None` in detached HEAD state.
	async fn current_branch(&self, path: &Path) -> Result<Option<String>, GitError>;

	/// Create a branch off HEAD and switch to it.
	async fn create_branch(&self, path: &Path, name: &str) -> Result<(), GitError>;

	/// Stage exactly the given paths.
	async fn stage_files(&self, path: &Path, files: &[String]) -> Result<(), GitError>;

	/// Create a commit with the given message and return its SHA.
	async fn commit(&self, path: &Path, message: &str) -> Result<String, GitError>;

	/// Push a branch to a remote, setting upstream.
	async fn push(&self, path: &Path, remote: &str, branch: &str) -> Result<(), GitError>;

	/// Switch to an existing branch.
	async fn checkout(&self, path: &Path, branch: &str) -> Result<(), GitError>;

	/// Reset the given paths in index and working tree to HEAD. Paths HEAD
	/// does not know are only unstaged.
	async fn restore_files(&self, path: &Path, files: &[String]) -> Result<(), GitError>;

	/// Force-delete a local branch.
	async fn delete_branch(&self, path: &Path, name: &str) -> Result<(), GitError>;

	/// Modified tracked files plus untracked, non-ignored files, relative
	/// to `path`.
	async fn changed_files(&self, path: &Path) -> Result<Vec<String>, GitError>;

	/// URL of the named remote, or `None` if it is not configured.
	async fn remote_url(&self, path: &Path, remote: &str) -> Result<Option<String>, GitError>;
}
