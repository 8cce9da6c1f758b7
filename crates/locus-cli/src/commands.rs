// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::bail;
use locus_jobs::{BatchReport, JobRegistry, JobRunner};
use locus_jobs_config::LocusConfig;
use locus_jobs_core::{JobContext, JobResult, JobType, MemoryJobStore};
use serde_json::{json, Value};
use tracing::instrument;

/// Context shared by every job in this invocation.
pub fn base_context(workspace_id: &str, root: &Path, config: &LocusConfig) -> JobContext {
	JobContext::new(workspace_id, root, Arc::new(MemoryJobStore::new()))
		.with_autonomy(config.autonomy.clone())
}

#[instrument(skip_all, fields(job_type = %job_type))]
pub async fn run(
	runner: &JobRunner,
	config: &LocusConfig,
	base: JobContext,
	job_type: JobType,
	overrides: Vec<(String, Value)>,
	json: bool,
	out: &mut impl Write,
) -> anyhow::Result<()> {
	let mut options = config.job_config(job_type).options;
	options.extend(overrides);
	let ctx = base.with_options(options);

	let result = runner.run_job(job_type, &ctx).await?;
	if json {
		writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
	} else {
		write!(out, "{}", render_result(job_type, &result))?;
	}
	Ok(())
}

#[instrument(skip_all)]
pub async fn run_all(
	runner: &JobRunner,
	config: &LocusConfig,
	base: JobContext,
	json: bool,
	out: &mut impl Write,
) -> anyhow::Result<()> {
	let report = runner.run_all_enabled(&config.resolved_jobs(), &base).await;
	if json {
		writeln!(out, "{}", serde_json::to_string_pretty(&report_json(&report))?)?;
	} else {
		for entry in &report.entries {
			match &entry.outcome {
				Ok(result) => write!(out, "{}", render_result(entry.job_type, result))?,
				Err(error) => writeln!(out, "{}: FAILED: {error}", entry.job_type)?,
			}
		}
	}

	let failures = report.failure_count();
	if failures > 0 {
		bail!("{failures} of {} jobs failed", report.len());
	}
	Ok(())
}

pub fn list(
	registry: &JobRegistry,
	config: &LocusConfig,
	json: bool,
	out: &mut impl Write,
) -> anyhow::Result<()> {
	let jobs = registry.get_all();
	let rows: Vec<(JobType, &str, &str, bool)> = jobs
		.iter()
		.map(|job| {
			let enabled = config
				.jobs
				.iter()
				.any(|c| c.job_type == job.job_type() && c.enabled);
			(job.job_type(), job.name(), job.description(), enabled)
		})
		.collect();

	if json {
		let jobs: Vec<Value> = rows
			.iter()
			.map(|(job_type, name, description, enabled)| {
				json!({
					"jobType": job_type,
					"name": name,
					"description": description,
					"enabled": enabled,
				})
			})
			.collect();
		writeln!(out, "{}", serde_json::to_string_pretty(&jobs)?)?;
	} else {
		for (job_type, name, description, enabled) in rows {
			let marker = if enabled { "enabled" } else { "disabled" };
			writeln!(
				out,
				"{:<22} {name:<20} [{marker}] {description}",
				job_type.as_str()
			)?;
		}
	}
	Ok(())
}

pub fn render_result(job_type: JobType, result: &JobResult) -> String {
	let mut text = format!("{job_type}: {}\n", result.summary);
	if result.files_changed > 0 {
		text.push_str(&format!("  files changed: {}\n", result.files_changed));
	}
	if let Some(url) = &result.pr_url {
		text.push_str(&format!("  pull request: {url}\n"));
	}
	if !result.suggestions.is_empty() {
		text.push_str(&format!("  suggestions ({}):\n", result.suggestions.len()));
		for suggestion in &result.suggestions {
			text.push_str(&format!(
				"    - [{}] {}\n",
				suggestion.suggestion_type.as_str(),
				suggestion.title
			));
		}
	}
	if let Some(errors) = result.errors.as_ref().filter(|e| !e.is_empty()) {
		text.push_str("  errors:\n");
		for error in errors {
			text.push_str(&format!("    - {error}\n"));
		}
	}
	text
}

pub fn report_json(report: &BatchReport) -> Value {
	Value::Array(
		report
			.entries
			.iter()
			.map(|entry| match &entry.outcome {
				Ok(result) => json!({ "jobType": entry.job_type, "result": result }),
				Err(error) => json!({ "jobType": entry.job_type, "error": error }),
			})
			.collect(),
	)
}
