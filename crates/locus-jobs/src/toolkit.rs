// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use locus_cli_auto_pr::{
	AutoPrConfig, AutoPrService, CommandGitClient, GhCliPullRequests, GitClient,
	PullRequestClient,
};
use locus_common_exec::{CommandRunner, SystemCommandRunner};
use locus_jobs_config::GitConfig;

/// External collaborators shared by every analyzer: the process runner, git,
/// and the branch/commit/PR pipeline.
#[derive(Clone)]
pub struct JobToolkit {
	pub commands: Arc<dyn CommandRunner>,
	pub git: Arc<dyn GitClient>,
	pub auto_pr: Arc<AutoPrService>,
}

impl JobToolkit {
	pub fn new(
		commands: Arc<dyn CommandRunner>,
		git: Arc<dyn GitClient>,
		pull_requests: Arc<dyn PullRequestClient>,
		config: AutoPrConfig,
	) -> Self {
		let auto_pr = Arc::new(AutoPrService::new(Arc::clone(&git), pull_requests, config));
		Self {
			commands,
			git,
			auto_pr,
		}
	}

	/// Real processes, the git CLI and the GitHub CLI.
	pub fn system(config: AutoPrConfig) -> Self {
		let commands: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new());
		let git: Arc<dyn GitClient> = Arc::new(CommandGitClient::new());
		let pull_requests = Arc::new(GhCliPullRequests::new(Arc::clone(&commands)));
		Self::new(commands, git, pull_requests, config)
	}
}

/// Git automation settings from the `[git]` config section.
pub fn auto_pr_config(git: &GitConfig) -> AutoPrConfig {
	AutoPrConfig::default()
		.with_remote(git.remote.clone())
		.with_branch_prefix(git.branch_prefix.clone())
		.with_agent(git.agent_name.clone(), git.agent_email.clone())
		.with_default_branch(git.default_branch.clone())
		.with_pull_requests(git.create_pull_requests)
}
