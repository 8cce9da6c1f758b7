// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use locus_cli_git::{parse_remote_url, GitClient};
use tracing::{debug, error, info, warn};

use crate::branch::branch_name;
use crate::config::AutoPrConfig;
use crate::generator::MessageGenerator;
use crate::pull_request::{PullRequestClient, PullRequestDraft};

/// What an analyzer hands to the automation pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoPrRequest {
	/// Branch name component, e.g. `lint-fix`.
	pub kind: String,
	/// Job label used in commit and PR text.
	pub job_type: String,
	/// Conventional-commit subject, reused as the PR title.
	pub title: String,
	pub summary: String,
	/// Exactly the files to stage.
	pub files: Vec<String>,
	/// `(level, count)` pairs shown in the PR body.
	pub risk_counts: Vec<(String, usize)>,
}

/// How far the pipeline got.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AutomationOutcome {
	/// Nothing was created.
	Aborted { reason: String },
	/// A branch was created but committing failed. The work was discarded.
	BranchOnly { branch: String, reason: String },
	/// A commit exists locally. Pushing or opening the PR failed or was skipped.
	Committed {
		branch: String,
		commit_sha: String,
		files: usize,
		pushed: bool,
		reason: String,
	},
	PullRequestOpened {
		branch: String,
		commit_sha: String,
		files: usize,
		url: String,
	},
}

impl AutomationOutcome {
	pub fn files_committed(&self) -> usize {
		match self {
			Self::Committed { files, .. } | Self::PullRequestOpened { files, .. } => *files,
			Self::Aborted { .. } | Self::BranchOnly { .. } => 0,
		}
	}

	pub fn pr_url(&self) -> Option<&str> {
		match self {
			Self::PullRequestOpened { url, .. } => Some(url.as_str()),
			_ => None,
		}
	}

	pub fn branch(&self) -> Option<&str> {
		match self {
			Self::Aborted { .. } => None,
			Self::BranchOnly { branch, .. }
			| Self::Committed { branch, .. }
			| Self::PullRequestOpened { branch, .. } => Some(branch.as_str()),
		}
	}

	pub fn is_committed(&self) -> bool {
		self.files_committed() > 0
	}

	/// One-line description for summaries and logs.
	pub fn describe(&self) -> String {
		match self {
			Self::Aborted { reason } => format!("automation aborted: {reason}"),
			Self::BranchOnly { branch, reason } => {
				format!("changes discarded on {branch}: {reason}")
			}
			Self::Committed {
				branch,
				pushed,
				reason,
				..
			} if *pushed => format!("committed and pushed {branch} ({reason})"),
			Self::Committed { branch, reason, .. } => {
				format!("committed on {branch}, not pushed ({reason})")
			}
			Self::PullRequestOpened { url, .. } => format!("opened {url}"),
		}
	}
}

/// Branch, stage, commit, push, and open a pull request for analyzer fixes.
///
/// Every step is fallible and none of them raise. A failure before the
/// commit discards the work and leaves the repository on the original branch.
/// A failure after the commit keeps the branch and commit.
pub struct AutoPrService {
	git: Arc<dyn GitClient>,
	pull_requests: Arc<dyn PullRequestClient>,
	generator: MessageGenerator,
	config: AutoPrConfig,
}

impl AutoPrService {
	pub fn new(
		git: Arc<dyn GitClient>,
		pull_requests: Arc<dyn PullRequestClient>,
		config: AutoPrConfig,
	) -> Self {
		Self {
			git,
			pull_requests,
			generator: MessageGenerator::new(config.clone()),
			config,
		}
	}

	pub fn config(&self) -> &AutoPrConfig {
		&self.config
	}

	pub async fn run(&self, repo_root: &Path, request: &AutoPrRequest) -> AutomationOutcome {
		if request.files.is_empty() {
			debug!("no files to commit");
			return AutomationOutcome::Aborted {
				reason: "no changed files".to_string(),
			};
		}

		if !self.git.is_repository(repo_root).await {
			debug!(path = %repo_root.display(), "not a git repository");
			return AutomationOutcome::Aborted {
				reason: "not a git repository".to_string(),
			};
		}

		let original = match self.git.current_branch(repo_root).await {
			Ok(branch) => branch,
			Err(e) => {
				warn!(error = %e, "could not determine current branch");
				None
			}
		};
		let return_to = original.unwrap_or_else(|| self.config.default_branch.clone());

		let branch = branch_name(&self.config.branch_prefix, &request.kind, Utc::now());
		if let Err(e) = self.git.create_branch(repo_root, &branch).await {
			error!(error = %e, branch = %branch, "failed to create branch");
			self.restore(repo_root, &request.files).await;
			return AutomationOutcome::Aborted {
				reason: format!("git checkout -b failed: {e}"),
			};
		}

		if let Err(e) = self.git.stage_files(repo_root, &request.files).await {
			error!(error = %e, "failed to stage changes");
			self.discard(repo_root, &branch, &return_to, &request.files)
				.await;
			return AutomationOutcome::BranchOnly {
				branch,
				reason: format!("git add failed: {e}"),
			};
		}

		let message = self.generator.commit_message(request);
		let commit_sha = match self.git.commit(repo_root, &message).await {
			Ok(sha) => sha,
			Err(e) => {
				error!(error = %e, "failed to create commit");
				self.discard(repo_root, &branch, &return_to, &request.files)
					.await;
				return AutomationOutcome::BranchOnly {
					branch,
					reason: format!("git commit failed: {e}"),
				};
			}
		};
		info!(
			branch = %branch,
			commit_sha = %commit_sha,
			files_changed = request.files.len(),
			"committed automated changes"
		);

		let outcome = self
			.publish(repo_root, request, branch, commit_sha, &return_to)
			.await;
		self.return_to(repo_root, &return_to).await;
		outcome
	}

	async fn publish(
		&self,
		repo_root: &Path,
		request: &AutoPrRequest,
		branch: String,
		commit_sha: String,
		base: &str,
	) -> AutomationOutcome {
		let files = request.files.len();
		let committed = |pushed: bool, reason: String| AutomationOutcome::Committed {
			branch: branch.clone(),
			commit_sha: commit_sha.clone(),
			files,
			pushed,
			reason,
		};

		if let Err(e) = self.git.push(repo_root, &self.config.remote, &branch).await {
			warn!(error = %e, remote = %self.config.remote, "push failed, keeping local commit");
			return committed(false, format!("git push failed: {e}"));
		}

		if !self.config.create_pull_requests {
			return committed(true, "pull requests disabled".to_string());
		}

		let remote = match self.git.remote_url(repo_root, &self.config.remote).await {
			Ok(Some(url)) => parse_remote_url(&url),
			Ok(None) => None,
			Err(e) => {
				warn!(error = %e, "could not read remote URL");
				None
			}
		};
		let Some(remote) = remote.filter(|r| r.is_github()) else {
			debug!("remote is not a recognised provider, skipping pull request");
			return committed(true, "remote provider not supported".to_string());
		};

		if !self.pull_requests.is_available().await {
			debug!("pull request CLI unavailable");
			return committed(true, "gh CLI unavailable".to_string());
		}

		let draft = PullRequestDraft {
			title: self.generator.pull_request_title(request),
			body: self.generator.pull_request_body(request),
			base: base.to_string(),
			head: branch.clone(),
		};
		match self.pull_requests.create(repo_root, &draft).await {
			Ok(url) => {
				info!(url = %url, repo = %remote.slug(), "opened pull request");
				AutomationOutcome::PullRequestOpened {
					branch,
					commit_sha,
					files,
					url,
				}
			}
			Err(e) => {
				warn!(error = %e, "pull request creation failed");
				committed(true, e.to_string())
			}
		}
	}

	async fn discard(&self, repo_root: &Path, branch: &str, return_to: &str, files: &[String]) {
		self.restore(repo_root, files).await;
		self.return_to(repo_root, return_to).await;
		if let Err(e) = self.git.delete_branch(repo_root, branch).await {
			warn!(error = %e, branch = %branch, "failed to delete temporary branch");
		}
	}

	async fn restore(&self, repo_root: &Path, files: &[String]) {
		if let Err(e) = self.git.restore_files(repo_root, files).await {
			warn!(error = %e, "failed to restore modified files");
		}
	}

	async fn return_to(&self, repo_root: &Path, branch: &str) {
		if let Err(e) = self.git.checkout(repo_root, branch).await {
			warn!(error = %e, branch = %branch, "could not return to original branch");
		}
	}
}
