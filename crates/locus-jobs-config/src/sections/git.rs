// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Git automation settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GitConfigLayer {
	pub remote: Option<String>,
	pub branch_prefix: Option<String>,
	pub create_pull_requests: Option<bool>,
	pub agent_name: Option<String>,
	pub agent_email: Option<String>,
	pub default_branch: Option<String>,
}

impl GitConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.remote.is_some() {
			self.remote = other.remote;
		}
		if other.branch_prefix.is_some() {
			self.branch_prefix = other.branch_prefix;
		}
		if other.create_pull_requests.is_some() {
			self.create_pull_requests = other.create_pull_requests;
		}
		if other.agent_name.is_some() {
			self.agent_name = other.agent_name;
		}
		if other.agent_email.is_some() {
			self.agent_email = other.agent_email;
		}
		if other.default_branch.is_some() {
			self.default_branch = other.default_branch;
		}
	}

	pub fn finalize(self) -> GitConfig {
		GitConfig {
			remote: self.remote.unwrap_or_else(|| "origin".to_string()),
			branch_prefix: self.branch_prefix.unwrap_or_else(|| "locus".to_string()),
			create_pull_requests: self.create_pull_requests.unwrap_or(true),
			agent_name: self.agent_name.unwrap_or_else(|| "LocusAgent".to_string()),
			agent_email: self
				.agent_email
				.unwrap_or_else(|| "agent@locusai.dev".to_string()),
			default_branch: self.default_branch.unwrap_or_else(|| "main".to_string()),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitConfig {
	pub remote: String,
	pub branch_prefix: String,
	pub create_pull_requests: bool,
	pub agent_name: String,
	pub agent_email: String,
	pub default_branch: String,
}

impl Default for GitConfig {
	fn default() -> Self {
		GitConfigLayer::default().finalize()
	}
}
