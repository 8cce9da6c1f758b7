// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::AutoPrError;
use crate::pull_request::{PullRequestClient, PullRequestDraft};

/// Mock pull request client for testing.
#[derive(Clone)]
pub struct MockPullRequestClient {
	/// Whether is_available returns true.
	pub available: bool,
	/// URL returned from create.
	pub url: String,
	/// If set, create returns this error.
	pub create_error: Option<String>,
	/// Drafts passed to create.
	pub drafts: Arc<Mutex<Vec<PullRequestDraft>>>,
}

impl Default for MockPullRequestClient {
	fn default() -> Self {
		Self::new()
	}
}

impl MockPullRequestClient {
	pub fn new() -> Self {
		Self {
			available: true,
			url: "https://github.com/acme/widgets/pull/1".to_string(),
			create_error: None,
			drafts: Arc::new(Mutex::new(Vec::new())),
		}
	}

	pub fn unavailable() -> Self {
		Self {
			available: false,
			..Self::new()
		}
	}

	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = url.into();
		self
	}

	pub fn with_create_error(mut self, error: impl Into<String>) -> Self {
		self.create_error = Some(error.into());
		self
	}

	pub fn get_drafts(&self) -> Vec<PullRequestDraft> {
		self.drafts.lock().unwrap().clone()
	}
}

#[async_trait]
impl PullRequestClient for MockPullRequestClient {
	async fn is_available(&self) -> bool {
		self.available
	}

	async fn create(&self, _repo_root: &Path, draft: &PullRequestDraft) -> Result<String, AutoPrError> {
		self.drafts.lock().unwrap().push(draft.clone());
		match &self.create_error {
			Some(error) => Err(AutoPrError::PullRequest(error.clone())),
			None => Ok(self.url.clone()),
		}
	}
}
