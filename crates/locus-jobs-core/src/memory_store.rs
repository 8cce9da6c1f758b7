// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use crate::error::StoreError;
use crate::store::{JobRunRecord, JobRunUpdate, JobStore, NewJobRun, NewSuggestion};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSuggestion {
	pub workspace_id: String,
	pub suggestion: NewSuggestion,
}

#[derive(Default)]
struct Inner {
	runs: Vec<(String, JobRunRecord)>,
	suggestions: Vec<StoredSuggestion>,
}

/// In-process [`JobStore`], used by the CLI when no API is attached and by
/// tests.
#[derive(Clone, Default)]
pub struct MemoryJobStore {
	inner: Arc<Mutex<Inner>>,
	fail_creates: bool,
	fail_updates: bool,
}

impl MemoryJobStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Every `create_job_run` fails.
	pub fn with_failing_creates(mut self) -> Self {
		self.fail_creates = true;
		self
	}

	/// Every `update_job_run` fails.
	pub fn with_failing_updates(mut self) -> Self {
		self.fail_updates = true;
		self
	}

	pub fn runs(&self) -> Vec<JobRunRecord> {
		self.lock().runs.iter().map(|(_, r)| r.clone()).collect()
	}

	pub fn run(&self, id: &str) -> Option<JobRunRecord> {
		self.lock()
			.runs
			.iter()
			.find(|(_, r)| r.id == id)
			.map(|(_, r)| r.clone())
	}

	pub fn suggestions(&self) -> Vec<StoredSuggestion> {
		self.lock().suggestions.clone()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(|e| e.into_inner())
	}
}

#[async_trait]
impl JobStore for MemoryJobStore {
	async fn create_job_run(
		&self,
		workspace_id: &str,
		run: NewJobRun,
	) -> Result<JobRunRecord, StoreError> {
		if self.fail_creates {
			return Err(StoreError::Unavailable("create rejected".to_string()));
		}

		let record = JobRunRecord {
			id: uuid::Uuid::new_v4().to_string(),
			job_type: run.job_type,
			status: run.status,
			started_at: run.started_at,
			completed_at: None,
			result: None,
			error: None,
		};
		debug!(workspace_id, job_run_id = %record.id, job_type = %run.job_type, "stored job run");
		self.lock()
			.runs
			.push((workspace_id.to_string(), record.clone()));
		Ok(record)
	}

	async fn update_job_run(
		&self,
		_workspace_id: &str,
		job_run_id: &str,
		update: JobRunUpdate,
	) -> Result<(), StoreError> {
		if self.fail_updates {
			return Err(StoreError::Unavailable("update rejected".to_string()));
		}

		let mut inner = self.lock();
		let (_, record) = inner
			.runs
			.iter_mut()
			.find(|(_, r)| r.id == job_run_id)
			.ok_or_else(|| StoreError::NotFound(job_run_id.to_string()))?;

		record.status = update.status;
		record.completed_at = Some(update.completed_at);
		record.result = update.result;
		record.error = update.error;
		Ok(())
	}

	async fn create_suggestion(
		&self,
		workspace_id: &str,
		suggestion: NewSuggestion,
	) -> Result<(), StoreError> {
		self.lock().suggestions.push(StoredSuggestion {
			workspace_id: workspace_id.to_string(),
			suggestion,
		});
		Ok(())
	}
}
