// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::sync::Arc;

use locus_jobs_core::{Job, JobType};
use tracing::debug;

use crate::analyzers::{DependencyCheckJob, FlakyTestJob, LintScanJob, TodoCleanupJob};
use crate::toolkit::JobToolkit;

/// Job type to analyzer lookup. Fixed once the process has started.
#[derive(Default)]
pub struct JobRegistry {
	jobs: BTreeMap<JobType, Arc<dyn Job>>,
}

impl JobRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding the four built-in analyzers.
	pub fn with_default_jobs(toolkit: JobToolkit) -> Self {
		let mut registry = Self::new();
		registry.register(Arc::new(LintScanJob::new(toolkit.clone())));
		registry.register(Arc::new(TodoCleanupJob::new(toolkit.clone())));
		registry.register(Arc::new(FlakyTestJob::new(toolkit.clone())));
		registry.register(Arc::new(DependencyCheckJob::new(toolkit)));
		registry
	}

	/// Registers `job` under its own type, returning the one it replaced.
	pub fn register(&mut self, job: Arc<dyn Job>) -> Option<Arc<dyn Job>> {
		let job_type = job.job_type();
		debug!(job_type = %job_type, name = job.name(), "registering job");
		self.jobs.insert(job_type, job)
	}

	pub fn get(&self, job_type: JobType) -> Option<Arc<dyn Job>> {
		self.jobs.get(&job_type).cloned()
	}

	pub fn has(&self, job_type: JobType) -> bool {
		self.jobs.contains_key(&job_type)
	}

	/// All registered jobs, ordered by job type.
	pub fn get_all(&self) -> Vec<Arc<dyn Job>> {
		self.jobs.values().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.jobs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.jobs.is_empty()
	}
}
