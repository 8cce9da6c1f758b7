// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeSet;

use async_trait::async_trait;
use locus_common_exec::{CommandSpec, DEFAULT_TIMEOUT};
use locus_jobs_config::option_keys;
use locus_jobs_core::{Job, JobContext, JobError, JobResult, JobSuggestion, JobType, SuggestionType};
use locus_jobs_parsers::todo::parse_grep_output;
use locus_jobs_parsers::{MarkerKind, TodoMarker};
use tracing::{debug, info, instrument, warn};

use super::{plural, timeout_option};
use crate::toolkit::JobToolkit;

/// Option holding the marker total from the previous scan.
pub const PREVIOUS_COUNT_OPTION: &str = "previousCount";

const MARKER_PATTERN: &str = r"\b(TODO|FIXME|HACK|XXX)\b";

const SOURCE_EXTENSIONS: &[&str] = &[
	"ts", "tsx", "js", "jsx", "mjs", "cjs", "vue", "svelte", "py", "rb", "go", "rs", "java",
	"kt", "swift", "php", "cs", "c", "h", "cpp", "hpp", "css", "scss", "sh",
];

const EXCLUDED_DIRS: &[&str] = &[
	"node_modules",
	".git",
	"dist",
	"build",
	"coverage",
	".next",
	"out",
	"target",
	"vendor",
];

/// Scans source files for TODO/FIXME/HACK/XXX markers. Never fixes anything.
pub struct TodoCleanupJob {
	toolkit: JobToolkit,
}

impl TodoCleanupJob {
	pub fn new(toolkit: JobToolkit) -> Self {
		Self { toolkit }
	}

	fn grep(&self, ctx: &JobContext) -> CommandSpec {
		let mut args = vec!["-rnIE".to_string(), MARKER_PATTERN.to_string()];
		args.extend(SOURCE_EXTENSIONS.iter().map(|ext| format!("--include=*.{ext}")));
		args.extend(EXCLUDED_DIRS.iter().map(|dir| format!("--exclude-dir={dir}")));
		args.push(".".to_string());

		CommandSpec::new("grep")
			.args(args)
			.cwd(&ctx.project_path)
			.timeout(timeout_option(ctx, option_keys::TIMEOUT_SECS, DEFAULT_TIMEOUT))
	}
}

/// "2 TODOs, 1 FIXME across 2 file(s)", kinds in fixed order, zero counts omitted.
fn summarize(markers: &[TodoMarker]) -> String {
	let counts: Vec<String> = MarkerKind::ALL
		.into_iter()
		.filter_map(|kind| {
			let count = markers.iter().filter(|m| m.kind == kind).count();
			(count > 0).then(|| plural(count, kind.as_str()))
		})
		.collect();
	let files: BTreeSet<&str> = markers.iter().map(|m| m.file.as_str()).collect();
	format!("{} across {} file(s)", counts.join(", "), files.len())
}

fn delta(previous: u64, current: u64) -> String {
	match current.cmp(&previous) {
		std::cmp::Ordering::Less => format!("{} resolved since last scan", previous - current),
		std::cmp::Ordering::Greater => format!("{} new since last scan", current - previous),
		std::cmp::Ordering::Equal => "no change since last scan".to_string(),
	}
}

fn suggestion(marker: &TodoMarker) -> JobSuggestion {
	let location = format!("{}:{}", marker.file, marker.line);
	let text = if marker.text.is_empty() {
		"(no description)"
	} else {
		marker.text.as_str()
	};
	JobSuggestion::new(
		SuggestionType::TechDebt,
		format!("{} in {location}", marker.kind.as_str()),
		format!("`{location}`: {text}"),
	)
	.with_meta("file", marker.file.clone())
	.with_meta("line", marker.line)
	.with_meta("marker", marker.kind.as_str())
	.with_meta("text", marker.text.clone())
}

#[async_trait]
impl Job for TodoCleanupJob {
	fn job_type(&self) -> JobType {
		JobType::TodoCleanup
	}

	fn name(&self) -> &str {
		"TODO Cleanup"
	}

	fn description(&self) -> &str {
		"Find TODO, FIXME, HACK and XXX markers in source files"
	}

	#[instrument(skip(self, ctx), fields(job_type = "TODO_CLEANUP", path = %ctx.project_path.display()))]
	async fn run(&self, ctx: &JobContext) -> Result<JobResult, JobError> {
		let output = match self.toolkit.commands.run(&self.grep(ctx)).await {
			Ok(output) => output,
			Err(e) => {
				warn!(error = %e, "marker scan could not run");
				return Ok(JobResult::with_error("TODO scan could not run", e.to_string()));
			}
		};

		// grep: 0 = matches, 1 = no matches, 2 = trouble (possibly with matches).
		let mut scan_error = None;
		match output.exit_code {
			Some(0) | Some(1) => {}
			code => {
				warn!(exit_code = ?code, stderr = %output.stderr.trim(), "grep reported an error");
				if output.stdout.trim().is_empty() {
					return Ok(JobResult::with_error(
						"TODO scan failed",
						format!("grep exited with {code:?}: {}", output.stderr.trim()),
					));
				}
				scan_error = Some(format!("grep exited with {code:?}; results may be partial"));
			}
		}

		let markers = parse_grep_output(&output.stdout);
		debug!(markers = markers.len(), "parsed marker scan");

		let mut summary = if markers.is_empty() {
			"No TODO markers found".to_string()
		} else {
			summarize(&markers)
		};
		if let Some(previous) = ctx.option_u64(PREVIOUS_COUNT_OPTION) {
			summary = format!("{summary} ({})", delta(previous, markers.len() as u64));
		}
		info!(markers = markers.len(), "marker scan complete");

		let mut result =
			JobResult::clean(summary).suggestions(markers.iter().map(suggestion).collect());
		if let Some(error) = scan_error {
			result.push_error(error);
		}
		Ok(result)
	}
}
