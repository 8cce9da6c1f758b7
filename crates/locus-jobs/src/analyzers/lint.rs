// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::Path;

use async_trait::async_trait;
use locus_cli_auto_pr::AutoPrRequest;
use locus_common_exec::{CommandSpec, DEFAULT_TIMEOUT};
use locus_jobs_config::option_keys;
use locus_jobs_core::{
	ChangeCategory, Job, JobContext, JobError, JobResult, JobSuggestion, JobType, SuggestionType,
};
use locus_jobs_parsers::{lint, LintCounts};
use tracing::{debug, info, instrument, warn};

use super::{changed_since, dirty_snapshot, plural, record_outcome, relative_to, timeout_option};
use crate::toolkit::JobToolkit;

/// Supported linters, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linter {
	Biome,
	Eslint,
	Oxlint,
}

impl Linter {
	pub const ALL: [Linter; 3] = [Linter::Biome, Linter::Eslint, Linter::Oxlint];

	pub fn config_files(&self) -> &'static [&'static str] {
		match self {
			Linter::Biome => &["biome.json", "biome.jsonc"],
			Linter::Eslint => &[
				"eslint.config.js",
				"eslint.config.mjs",
				"eslint.config.cjs",
				"eslint.config.ts",
				".eslintrc",
				".eslintrc.js",
				".eslintrc.cjs",
				".eslintrc.json",
				".eslintrc.yml",
				".eslintrc.yaml",
			],
			Linter::Oxlint => &[".oxlintrc.json", "oxlint.json"],
		}
	}

	/// First linter whose config file exists in `root`.
	pub fn detect(root: &Path) -> Option<Linter> {
		Self::ALL.into_iter().find(|linter| {
			linter
				.config_files()
				.iter()
				.any(|file| root.join(file).is_file())
		})
	}

	pub fn display_name(&self) -> &'static str {
		match self {
			Linter::Biome => "Biome",
			Linter::Eslint => "ESLint",
			Linter::Oxlint => "Oxlint",
		}
	}

	/// Arguments to `npx` for a check-only run.
	pub fn check_args(&self) -> &'static [&'static str] {
		match self {
			Linter::Biome => &["biome", "check", "."],
			Linter::Eslint => &["eslint", ".", "--format", "json"],
			Linter::Oxlint => &["oxlint", "."],
		}
	}

	/// Arguments to `npx` for a fixing run.
	pub fn fix_args(&self) -> &'static [&'static str] {
		match self {
			Linter::Biome => &["biome", "check", "--write", "."],
			Linter::Eslint => &["eslint", ".", "--fix"],
			Linter::Oxlint => &["oxlint", "--fix", "."],
		}
	}

	pub fn fix_command(&self) -> String {
		format!("npx {}", self.fix_args().join(" "))
	}

	pub fn parse(&self, output: &str) -> LintCounts {
		match self {
			Linter::Biome => lint::parse_biome(output),
			Linter::Eslint => lint::parse_eslint(output),
			Linter::Oxlint => lint::parse_oxlint(output),
		}
	}
}

pub struct LintScanJob {
	toolkit: JobToolkit,
}

impl LintScanJob {
	pub fn new(toolkit: JobToolkit) -> Self {
		Self { toolkit }
	}

	fn npx(&self, ctx: &JobContext, args: &[&str]) -> CommandSpec {
		CommandSpec::new("npx")
			.args(args.iter().copied())
			.cwd(&ctx.project_path)
			.timeout(timeout_option(ctx, option_keys::TIMEOUT_SECS, DEFAULT_TIMEOUT))
			.env("CI", "true")
	}

	/// Runs the fixer and commits what it changed. `None` means nothing was
	/// committed and the caller should fall back to suggestions.
	async fn auto_fix(
		&self,
		ctx: &JobContext,
		linter: Linter,
		counts: &LintCounts,
		errors: &mut Vec<String>,
	) -> Option<JobResult> {
		let root = ctx.project_path.as_path();
		let before = dirty_snapshot(&self.toolkit, root).await?;
		let fix = match self.toolkit.commands.run(&self.npx(ctx, linter.fix_args())).await {
			Ok(output) => output,
			Err(e) => {
				warn!(error = %e, linter = linter.display_name(), "lint fixer failed to run");
				errors.push(format!("{} fix failed: {e}", linter.display_name()));
				return None;
			}
		};
		debug!(exit_code = ?fix.exit_code, "lint fixer finished");

		let files = changed_since(&self.toolkit, root, &before).await?;
		if files.is_empty() {
			info!(linter = linter.display_name(), "fixer made no changes; suggesting instead");
			return None;
		}

		let summary = format!(
			"Fixed {} with {} across {}",
			plural(counts.total() as usize, "lint issue"),
			linter.display_name(),
			plural(files.len(), "file"),
		);
		let request = AutoPrRequest {
			kind: "lint-fix".to_string(),
			job_type: JobType::LintScan.as_str().to_string(),
			title: format!("style: apply {} fixes", linter.display_name()),
			summary: summary.clone(),
			files,
			risk_counts: Vec::new(),
		};

		let outcome = self.toolkit.auto_pr.run(root, &request).await;
		let mut result = JobResult::clean(summary);
		if record_outcome(&mut result, &outcome) {
			info!(
				files_changed = result.files_changed,
				pr_url = ?result.pr_url,
				"lint fixes committed"
			);
			return Some(result);
		}

		errors.extend(result.errors.unwrap_or_default());
		None
	}
}

fn lint_suggestions(linter: Linter, counts: &LintCounts, root: &Path) -> Vec<JobSuggestion> {
	let fix_command = linter.fix_command();
	let mut suggestions = Vec::new();

	for (count, severity, title) in [
		(counts.errors, "error", "Fix lint errors"),
		(counts.warnings, "warning", "Address lint warnings"),
	] {
		if count == 0 {
			continue;
		}
		let description = format!(
			"{} reported {}. Run `{fix_command}` to apply automatic fixes, then resolve the rest by hand.",
			linter.display_name(),
			plural(count as usize, severity),
		);
		let mut suggestion = JobSuggestion::new(
			SuggestionType::CodeFix,
			format!("{title} ({count})"),
			description,
		)
		.with_meta("tool", linter.display_name())
		.with_meta("severity", severity)
		.with_meta("count", count)
		.with_meta("fixCommand", fix_command.clone());
		if !counts.files.is_empty() {
			let files: Vec<String> = counts.files.iter().map(|f| relative_to(root, f)).collect();
			suggestion = suggestion.with_meta("files", files);
		}
		suggestions.push(suggestion);
	}

	suggestions
}

#[async_trait]
impl Job for LintScanJob {
	fn job_type(&self) -> JobType {
		JobType::LintScan
	}

	fn name(&self) -> &str {
		"Lint Scan"
	}

	fn description(&self) -> &str {
		"Run the project's linter and fix or report style issues"
	}

	#[instrument(skip(self, ctx), fields(job_type = "LINT_SCAN", path = %ctx.project_path.display()))]
	async fn run(&self, ctx: &JobContext) -> Result<JobResult, JobError> {
		let Some(linter) = Linter::detect(&ctx.project_path) else {
			info!("no linter configuration found");
			return Ok(JobResult::clean("No linter configured; lint scan skipped"));
		};
		debug!(linter = linter.display_name(), "detected linter");

		let output = match self
			.toolkit
			.commands
			.run(&self.npx(ctx, linter.check_args()))
			.await
		{
			Ok(output) => output,
			Err(e) => {
				warn!(error = %e, "lint check could not run");
				return Ok(JobResult::with_error(
					format!("{} could not run", linter.display_name()),
					e.to_string(),
				));
			}
		};

		let counts = linter.parse(&output.combined());
		debug!(
			errors = counts.errors,
			warnings = counts.warnings,
			source = ?counts.source,
			exit_code = ?output.exit_code,
			"parsed lint output"
		);
		if counts.is_clean() {
			if !output.success() {
				warn!(exit_code = ?output.exit_code, "linter failed without reporting issues");
			}
			return Ok(JobResult::clean(format!(
				"{}: no lint issues found",
				linter.display_name()
			)));
		}

		let mut errors = Vec::new();
		if ctx.can_auto_execute(ChangeCategory::Style) {
			if let Some(result) = self.auto_fix(ctx, linter, &counts, &mut errors).await {
				return Ok(result);
			}
		}

		let mut result = JobResult::clean(format!(
			"{} found {} and {}",
			linter.display_name(),
			plural(counts.errors as usize, "error"),
			plural(counts.warnings as usize, "warning"),
		))
		.suggestions(lint_suggestions(linter, &counts, &ctx.project_path));
		for error in errors {
			result.push_error(error);
		}
		Ok(result)
	}
}
