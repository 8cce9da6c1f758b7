// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use chrono::Utc;
use locus_jobs_core::{
	JobConfig, JobContext, JobError, JobEvent, JobEvents, JobResult, JobRunUpdate, JobStatus,
	JobStore, JobType, NewJobRun, NewSuggestion,
};
use tracing::{debug, info, instrument, warn};

use crate::registry::JobRegistry;

/// One entry of a batch run.
#[derive(Debug)]
pub struct BatchEntry {
	pub job_type: JobType,
	/// The job's result, or the message of the error that failed it.
	pub outcome: Result<JobResult, String>,
}

/// Per-job outcomes of [`JobRunner::run_all_enabled`], in run order.
#[derive(Debug, Default)]
pub struct BatchReport {
	pub entries: Vec<BatchEntry>,
}

impl BatchReport {
	pub fn succeeded(&self) -> impl Iterator<Item = (JobType, &JobResult)> {
		self.entries
			.iter()
			.filter_map(|e| e.outcome.as_ref().ok().map(|r| (e.job_type, r)))
	}

	pub fn failed(&self) -> impl Iterator<Item = (JobType, &str)> {
		self.entries
			.iter()
			.filter_map(|e| e.outcome.as_ref().err().map(|m| (e.job_type, m.as_str())))
	}

	pub fn failure_count(&self) -> usize {
		self.failed().count()
	}

	pub fn job_types(&self) -> Vec<JobType> {
		self.entries.iter().map(|e| e.job_type).collect()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Drives job runs: persists the run record and suggestions and emits
/// lifecycle events. Jobs never run concurrently.
pub struct JobRunner {
	registry: Arc<JobRegistry>,
	store: Arc<dyn JobStore>,
	events: JobEvents,
}

impl JobRunner {
	pub fn new(registry: Arc<JobRegistry>, store: Arc<dyn JobStore>, events: JobEvents) -> Self {
		Self {
			registry,
			store,
			events,
		}
	}

	pub fn registry(&self) -> &JobRegistry {
		&self.registry
	}

	pub fn events(&self) -> &JobEvents {
		&self.events
	}

	/// Runs one job. Errors escaping the analyzer are recorded as a FAILED
	/// run and returned.
	#[instrument(skip(self, ctx), fields(job_type = %job_type, workspace_id = %ctx.workspace_id))]
	pub async fn run_job(&self, job_type: JobType, ctx: &JobContext) -> Result<JobResult, JobError> {
		let job = self
			.registry
			.get(job_type)
			.ok_or(JobError::NotRegistered(job_type))?;

		let run = match self
			.store
			.create_job_run(
				&ctx.workspace_id,
				NewJobRun {
					job_type,
					status: JobStatus::Running,
					started_at: Utc::now(),
				},
			)
			.await
		{
			Ok(run) => run,
			Err(e) => {
				warn!(error = %e, "could not create job run");
				self.events.emit(JobEvent::Failed {
					job_type,
					job_run_id: None,
					error: e.to_string(),
				});
				return Err(e.into());
			}
		};

		let job_run_id = run.id;
		info!(job_run_id = %job_run_id, name = job.name(), "job started");
		self.events.emit(JobEvent::Started {
			job_type,
			job_run_id: job_run_id.clone(),
		});

		let outcome = async {
			let result = job.run(ctx).await?;
			self.store
				.update_job_run(
					&ctx.workspace_id,
					&job_run_id,
					JobRunUpdate::completed(serde_json::to_value(&result)?),
				)
				.await?;
			for suggestion in &result.suggestions {
				self.store
					.create_suggestion(
						&ctx.workspace_id,
						NewSuggestion {
							suggestion_type: suggestion.suggestion_type,
							title: suggestion.title.clone(),
							description: suggestion.description.clone(),
							job_run_id: job_run_id.clone(),
							metadata: suggestion.metadata.clone(),
						},
					)
					.await?;
			}
			Ok::<_, JobError>(result)
		}
		.await;

		match outcome {
			Ok(result) => {
				info!(
					job_run_id = %job_run_id,
					suggestions = result.suggestions.len(),
					files_changed = result.files_changed,
					pr_url = ?result.pr_url,
					"job completed"
				);
				self.events.emit(JobEvent::Completed {
					job_type,
					job_run_id,
					summary: result.summary.clone(),
					suggestion_count: result.suggestions.len(),
					files_changed: result.files_changed,
					pr_url: result.pr_url.clone(),
				});
				Ok(result)
			}
			Err(e) => {
				let error = e.to_string();
				warn!(job_run_id = %job_run_id, error = %error, "job failed");
				if let Err(store_error) = self
					.store
					.update_job_run(&ctx.workspace_id, &job_run_id, JobRunUpdate::failed(&error))
					.await
				{
					warn!(job_run_id = %job_run_id, error = %store_error, "could not record job failure");
				}
				self.events.emit(JobEvent::Failed {
					job_type,
					job_run_id: Some(job_run_id),
					error,
				});
				Err(e)
			}
		}
	}

	/// Runs every enabled, registered job in `configs` order, one at a time.
	/// A failing job is recorded and the batch moves on.
	#[instrument(skip(self, configs, base), fields(workspace_id = %base.workspace_id))]
	pub async fn run_all_enabled(&self, configs: &[JobConfig], base: &JobContext) -> BatchReport {
		let mut report = BatchReport::default();

		for config in configs {
			if !config.enabled {
				debug!(job_type = %config.job_type, "skipping disabled job");
				continue;
			}
			if !self.registry.has(config.job_type) {
				warn!(job_type = %config.job_type, "skipping unregistered job");
				continue;
			}

			let ctx = base.clone().with_options(config.options.clone());
			let outcome = self
				.run_job(config.job_type, &ctx)
				.await
				.map_err(|e| e.to_string());
			report.entries.push(BatchEntry {
				job_type: config.job_type,
				outcome,
			});
		}

		info!(
			jobs = report.len(),
			failed = report.failure_count(),
			"batch finished"
		);
		report
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{context, failing_job, fixed_job, job_returning};
	use locus_jobs_core::{JobSuggestion, MemoryJobStore, SuggestionType};
	use serde_json::json;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;

	fn runner(jobs: Vec<Arc<dyn locus_jobs_core::Job>>, store: MemoryJobStore) -> JobRunner {
		let mut registry = JobRegistry::new();
		for job in jobs {
			registry.register(job);
		}
		JobRunner::new(Arc::new(registry), Arc::new(store), JobEvents::default())
	}

	fn two_suggestions() -> JobResult {
		JobResult::clean("found two").suggestions(vec![
			JobSuggestion::new(SuggestionType::TechDebt, "TODO in a.ts:1", "first"),
			JobSuggestion::new(SuggestionType::TechDebt, "FIXME in b.ts:2", "second")
				.with_meta("line", 2),
		])
	}

	fn drain(rx: &mut tokio::sync::broadcast::Receiver<JobEvent>) -> Vec<JobEvent> {
		let mut events = Vec::new();
		while let Ok(event) = rx.try_recv() {
			events.push(event);
		}
		events
	}

	#[tokio::test]
	async fn successful_run_persists_result_and_suggestions() {
		let dir = tempfile::tempdir().unwrap();
		let store = MemoryJobStore::new();
		let runner = runner(
			vec![job_returning(JobType::TodoCleanup, two_suggestions())],
			store.clone(),
		);
		let mut rx = runner.events().subscribe();

		let result = runner
			.run_job(JobType::TodoCleanup, &context(dir.path()))
			.await
			.unwrap();
		assert_eq!(result.suggestions.len(), 2);

		let runs = store.runs();
		assert_eq!(runs.len(), 1);
		assert_eq!(runs[0].status, JobStatus::Completed);
		assert_eq!(runs[0].result.as_ref().unwrap()["summary"], json!("found two"));

		let stored = store.suggestions();
		assert_eq!(stored.len(), 2);
		assert!(stored.iter().all(|s| s.suggestion.job_run_id == runs[0].id));
		assert_eq!(stored[1].suggestion.metadata["line"], json!(2));

		let events = drain(&mut rx);
		assert_eq!(events.len(), 2);
		assert_eq!(
			events[0],
			JobEvent::Started {
				job_type: JobType::TodoCleanup,
				job_run_id: runs[0].id.clone(),
			}
		);
		match &events[1] {
			JobEvent::Completed {
				suggestion_count,
				summary,
				..
			} => {
				assert_eq!(*suggestion_count, 2);
				assert_eq!(summary, "found two");
			}
			other => panic!("unexpected event {other:?}"),
		}
	}

	#[tokio::test]
	async fn failing_job_is_recorded_and_reraised() {
		let dir = tempfile::tempdir().unwrap();
		let store = MemoryJobStore::new();
		let runner = runner(vec![failing_job(JobType::LintScan, "boom")], store.clone());
		let mut rx = runner.events().subscribe();

		let err = runner
			.run_job(JobType::LintScan, &context(dir.path()))
			.await
			.unwrap_err();
		assert!(matches!(err, JobError::Failed(ref m) if m == "boom"));

		let run = &store.runs()[0];
		assert_eq!(run.status, JobStatus::Failed);
		assert_eq!(run.error.as_deref(), Some("Job failed: boom"));
		assert!(store.suggestions().is_empty());

		let events = drain(&mut rx);
		assert!(matches!(
			&events[1],
			JobEvent::Failed { job_run_id: Some(id), error, .. } if *id == run.id && error.contains("boom")
		));
	}

	#[tokio::test]
	async fn failure_to_record_failure_is_tolerated() {
		let dir = tempfile::tempdir().unwrap();
		let store = MemoryJobStore::new().with_failing_updates();
		let runner = runner(vec![failing_job(JobType::LintScan, "boom")], store.clone());
		let mut rx = runner.events().subscribe();

		let err = runner
			.run_job(JobType::LintScan, &context(dir.path()))
			.await
			.unwrap_err();
		assert!(matches!(err, JobError::Failed(_)));
		assert_eq!(store.runs()[0].status, JobStatus::Running);
		assert_eq!(drain(&mut rx).last().unwrap().name(), locus_jobs_core::events::JOB_FAILED);
	}

	#[tokio::test]
	async fn unpersistable_completion_fails_the_run() {
		let dir = tempfile::tempdir().unwrap();
		let store = MemoryJobStore::new().with_failing_updates();
		let runner = runner(vec![fixed_job(JobType::TodoCleanup, "todo")], store);

		let err = runner
			.run_job(JobType::TodoCleanup, &context(dir.path()))
			.await
			.unwrap_err();
		assert!(matches!(err, JobError::Store(_)));
	}

	#[tokio::test]
	async fn run_record_creation_failure_emits_failed_without_id() {
		let dir = tempfile::tempdir().unwrap();
		let store = MemoryJobStore::new().with_failing_creates();
		let runner = runner(vec![fixed_job(JobType::TodoCleanup, "todo")], store);
		let mut rx = runner.events().subscribe();

		let err = runner
			.run_job(JobType::TodoCleanup, &context(dir.path()))
			.await
			.unwrap_err();
		assert!(matches!(err, JobError::Store(_)));
		assert!(matches!(
			drain(&mut rx).as_slice(),
			[JobEvent::Failed { job_run_id: None, .. }]
		));
	}

	#[tokio::test]
	async fn unregistered_job_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let store = MemoryJobStore::new();
		let runner = runner(Vec::new(), store.clone());

		let err = runner
			.run_job(JobType::FlakyTestDetection, &context(dir.path()))
			.await
			.unwrap_err();
		assert!(matches!(err, JobError::NotRegistered(JobType::FlakyTestDetection)));
		assert!(store.runs().is_empty());
	}

	#[tokio::test]
	async fn batch_isolates_failures_and_keeps_order() {
		let dir = tempfile::tempdir().unwrap();
		let store = MemoryJobStore::new();
		let runner = runner(
			vec![
				fixed_job(JobType::LintScan, "lint"),
				failing_job(JobType::TodoCleanup, "grep exploded"),
				fixed_job(JobType::DependencyCheck, "deps"),
			],
			store.clone(),
		);

		let configs = vec![
			JobConfig::enabled(JobType::DependencyCheck),
			JobConfig::enabled(JobType::TodoCleanup),
			JobConfig::disabled(JobType::LintScan),
			// Not registered in this runner.
			JobConfig::enabled(JobType::FlakyTestDetection),
			JobConfig::enabled(JobType::LintScan),
		];
		let report = runner.run_all_enabled(&configs, &context(dir.path())).await;

		assert_eq!(
			report.job_types(),
			vec![JobType::DependencyCheck, JobType::TodoCleanup, JobType::LintScan]
		);
		assert_eq!(report.failure_count(), 1);
		let failed: Vec<_> = report.failed().collect();
		assert_eq!(failed[0].0, JobType::TodoCleanup);
		assert!(failed[0].1.contains("grep exploded"));
		assert_eq!(report.succeeded().count(), 2);

		let statuses: Vec<_> = store.runs().iter().map(|r| r.status).collect();
		assert_eq!(
			statuses,
			vec![JobStatus::Completed, JobStatus::Failed, JobStatus::Completed]
		);
	}

	/// Records the options each run saw and checks no two runs overlap.
	struct OptionEchoJob {
		job_type: JobType,
		active: Arc<AtomicUsize>,
		seen: Arc<Mutex<Vec<(JobType, Option<u64>)>>>,
	}

	#[async_trait::async_trait]
	impl locus_jobs_core::Job for OptionEchoJob {
		fn job_type(&self) -> JobType {
			self.job_type
		}

		fn name(&self) -> &str {
			"option echo"
		}

		fn description(&self) -> &str {
			"option echo"
		}

		async fn run(&self, ctx: &JobContext) -> Result<JobResult, JobError> {
			assert_eq!(self.active.fetch_add(1, Ordering::SeqCst), 0);
			tokio::task::yield_now().await;
			self.seen
				.lock()
				.unwrap()
				.push((self.job_type, ctx.option_u64("timeoutSecs")));
			self.active.fetch_sub(1, Ordering::SeqCst);
			Ok(JobResult::clean("echoed"))
		}
	}

	#[tokio::test]
	async fn batch_runs_sequentially_with_per_job_options() {
		let dir = tempfile::tempdir().unwrap();
		let active = Arc::new(AtomicUsize::new(0));
		let seen = Arc::new(Mutex::new(Vec::new()));
		let jobs: Vec<Arc<dyn locus_jobs_core::Job>> = [JobType::LintScan, JobType::TodoCleanup]
			.into_iter()
			.map(|job_type| {
				Arc::new(OptionEchoJob {
					job_type,
					active: active.clone(),
					seen: seen.clone(),
				}) as Arc<dyn locus_jobs_core::Job>
			})
			.collect();
		let runner = runner(jobs, MemoryJobStore::new());

		let configs = vec![
			JobConfig::enabled(JobType::LintScan).with_option("timeoutSecs", 30),
			JobConfig::enabled(JobType::TodoCleanup),
		];
		let report = runner.run_all_enabled(&configs, &context(dir.path())).await;

		assert_eq!(report.failure_count(), 0);
		assert_eq!(
			*seen.lock().unwrap(),
			vec![(JobType::LintScan, Some(30)), (JobType::TodoCleanup, None)]
		);
	}

	#[test]
	fn empty_report() {
		let report = BatchReport::default();
		assert!(report.is_empty());
		assert_eq!(report.failure_count(), 0);
	}

	#[test]
	fn batch_runs_under_block_on() {
		tokio_test::block_on(async {
			let dir = tempfile::tempdir().unwrap();
			let runner = runner(vec![fixed_job(JobType::TodoCleanup, "todo")], MemoryJobStore::new());
			let report = runner
				.run_all_enabled(&[JobConfig::enabled(JobType::TodoCleanup)], &context(dir.path()))
				.await;
			assert_eq!(report.len(), 1);
		});
	}
}
