// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

/// Configuration for branch/commit/pull-request automation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoPrConfig {
	/// Remote the branch is pushed to.
	pub remote: String,
	/// First path segment of generated branch names.
	pub branch_prefix: String,
	/// Whether to open a pull request after a successful push.
	pub create_pull_requests: bool,
	/// Identity named in the commit body and co-author trailer.
	pub agent_name: String,
	pub agent_email: String,
	/// Pull request base when the original branch cannot be determined.
	pub default_branch: String,
}

impl Default for AutoPrConfig {
	fn default() -> Self {
		Self {
			remote: "origin".to_string(),
			branch_prefix: "locus".to_string(),
			create_pull_requests: true,
			agent_name: "LocusAgent".to_string(),
			agent_email: "agent@locusai.dev".to_string(),
			default_branch: "main".to_string(),
		}
	}
}

impl AutoPrConfig {
	/// Commit and push, never open pull requests.
	pub fn without_pull_requests() -> Self {
		Self {
			create_pull_requests: false,
			..Default::default()
		}
	}

	pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
		self.remote = remote.into();
		self
	}

	pub fn with_branch_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.branch_prefix = prefix.into();
		self
	}

	pub fn with_agent(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
		self.agent_name = name.into();
		self.agent_email = email.into();
		self
	}

	pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
		self.default_branch = branch.into();
		self
	}

	pub fn with_pull_requests(mut self, enabled: bool) -> Self {
		self.create_pull_requests = enabled;
		self
	}
}
