// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

mod branch;
mod config;
mod error;
mod generator;
mod mock;
mod pull_request;
mod service;

pub use branch::{branch_name, to_base36};
pub use config::AutoPrConfig;
pub use error::AutoPrError;
pub use generator::{MessageGenerator, MAX_LISTED_FILES};
pub use mock::MockPullRequestClient;
pub use pull_request::{parse_pull_request_url, GhCliPullRequests, PullRequestClient, PullRequestDraft};
pub use service::{AutoPrRequest, AutoPrService, AutomationOutcome};
// Re-export git types for convenience
pub use locus_cli_git::{CommandGitClient, GitClient, GitError, MockGitClient};
