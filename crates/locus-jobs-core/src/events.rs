// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::types::JobType;

pub const JOB_STARTED: &str = "job.started";
pub const JOB_COMPLETED: &str = "job.completed";
pub const JOB_FAILED: &str = "job.failed";

/// Lifecycle event emitted by the runner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum JobEvent {
	#[serde(rename = "job.started", rename_all = "camelCase")]
	Started {
		job_type: JobType,
		job_run_id: String,
	},
	#[serde(rename = "job.completed", rename_all = "camelCase")]
	Completed {
		job_type: JobType,
		job_run_id: String,
		summary: String,
		suggestion_count: usize,
		files_changed: usize,
		pr_url: Option<String>,
	},
	#[serde(rename = "job.failed", rename_all = "camelCase")]
	Failed {
		job_type: JobType,
		/// `None` when the run record itself could not be created.
		job_run_id: Option<String>,
		error: String,
	},
}

impl JobEvent {
	pub fn name(&self) -> &'static str {
		match self {
			JobEvent::Started { .. } => JOB_STARTED,
			JobEvent::Completed { .. } => JOB_COMPLETED,
			JobEvent::Failed { .. } => JOB_FAILED,
		}
	}

	pub fn job_type(&self) -> JobType {
		match self {
			JobEvent::Started { job_type, .. }
			| JobEvent::Completed { job_type, .. }
			| JobEvent::Failed { job_type, .. } => *job_type,
		}
	}
}

/// Broadcast emitter for [`JobEvent`]s. Emitting with no subscribers is a
/// no-op.
#[derive(Clone)]
pub struct JobEvents {
	tx: broadcast::Sender<JobEvent>,
}

impl JobEvents {
	pub fn new(capacity: usize) -> Self {
		let (tx, _) = broadcast::channel(capacity.max(1));
		Self { tx }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
		self.tx.subscribe()
	}

	pub fn emit(&self, event: JobEvent) {
		trace!(event = event.name(), job_type = %event.job_type(), "emitting job event");
		let _ = self.tx.send(event);
	}
}

impl Default for JobEvents {
	fn default() -> Self {
		Self::new(64)
	}
}
