// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use locus_common_exec::{CommandRunner, CommandSpec};
use tracing::{debug, warn};

use crate::error::AutoPrError;

/// Pull request to open for a pushed branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullRequestDraft {
	pub title: String,
	pub body: String,
	pub base: String,
	pub head: String,
}

/// Opens pull requests on the hosting provider.
#[async_trait]
pub trait PullRequestClient: Send + Sync {
	async fn is_available(&self) -> bool;

	/// Returns the URL of the new pull request.
	async fn create(&self, repo_root: &Path, draft: &PullRequestDraft) -> Result<String, AutoPrError>;
}

/// GitHub pull requests through the `gh` CLI.
pub struct GhCliPullRequests {
	runner: Arc<dyn CommandRunner>,
}

impl GhCliPullRequests {
	pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
		Self { runner }
	}
}

#[async_trait]
impl PullRequestClient for GhCliPullRequests {
	async fn is_available(&self) -> bool {
		self.runner.is_available("gh").await
	}

	async fn create(&self, repo_root: &Path, draft: &PullRequestDraft) -> Result<String, AutoPrError> {
		let spec = CommandSpec::new("gh")
			.args(["pr", "create", "--title"])
			.arg(draft.title.as_str())
			.arg("--body")
			.arg(draft.body.as_str())
			.arg("--base")
			.arg(draft.base.as_str())
			.arg("--head")
			.arg(draft.head.as_str())
			.cwd(repo_root);

		let output = self.runner.run(&spec).await?;
		if !output.success() {
			warn!(exit_code = ?output.exit_code, stderr = %output.stderr.trim(), "gh pr create failed");
			return Err(AutoPrError::PullRequest(output.stderr.trim().to_string()));
		}

		let url = parse_pull_request_url(&output.stdout).ok_or_else(|| {
			AutoPrError::PullRequest("gh pr create printed no pull request URL".to_string())
		})?;
		debug!(url = %url, "opened pull request");
		Ok(url)
	}
}

/// Last `https://` token in the output. `gh` prints progress lines before it.
pub fn parse_pull_request_url(stdout: &str) -> Option<String> {
	stdout
		.split_whitespace()
		.filter(|token| token.starts_with("https://"))
		.last()
		.map(str::to_string)
}
