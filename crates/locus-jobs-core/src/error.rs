// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::types::JobType;

/// Errors from the persistence/event collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("Store unavailable: {0}")]
	Unavailable(String),

	#[error("Job run not found: {0}")]
	NotFound(String),
}

/// Unexpected failures that escape an analyzer.
///
/// Recoverable conditions (missing tool, tool-reported issues, timeouts,
/// parse failures, git automation failures) never use this type; they end up
/// in [`crate::JobResult`] instead.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
	#[error("Job failed: {0}")]
	Failed(String),

	#[error("Job type not registered: {0}")]
	NotRegistered(JobType),

	#[error("Store error: {0}")]
	Store(#[from] StoreError),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

impl JobError {
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed(message.into())
	}
}

pub type Result<T> = std::result::Result<T, JobError>;
