// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The built-in analyzers.
//!
//! Each one follows the same shape: detect the tool, execute it, parse the
//! output, then either hand a fix to the git automation pipeline or build
//! suggestions. Recoverable problems end up in [`JobResult::errors`] and
//! never become a [`locus_jobs_core::JobError`].

mod deps;
mod flaky;
mod lint;
mod todo;

pub use deps::{DependencyCheckJob, PackageManager};
pub use flaky::{classify_runs, FlakyTestJob, TestClassification, TestRunner, Verdict};
pub use lint::{LintScanJob, Linter};
pub use todo::TodoCleanupJob;

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use locus_cli_auto_pr::AutomationOutcome;
use locus_jobs_core::{JobContext, JobResult};
use tracing::{debug, warn};

/// Timeout from a seconds-valued job option, or `default`.
fn timeout_option(ctx: &JobContext, key: &str, default: Duration) -> Duration {
	match ctx.option_u64(key) {
		Some(0) | None => default,
		Some(secs) => Duration::from_secs(secs),
	}
}

/// Path relative to the project root when it lies inside it.
fn relative_to(root: &Path, file: &str) -> String {
	let path = Path::new(file);
	match path.strip_prefix(root) {
		Ok(rel) => rel.to_string_lossy().into_owned(),
		Err(_) => file.trim_start_matches("./").to_string(),
	}
}

/// Files changed in the working tree, or `None` when git could not tell.
async fn changed_files(toolkit: &crate::JobToolkit, root: &Path) -> Option<Vec<String>> {
	match toolkit.git.changed_files(root).await {
		Ok(files) => Some(files),
		Err(e) => {
			warn!(error = %e, path = %root.display(), "could not list changed files");
			None
		}
	}
}

/// Paths already dirty before a tool runs. Automation never stages or
/// restores them, so uncommitted user work stays where it is.
async fn dirty_snapshot(toolkit: &crate::JobToolkit, root: &Path) -> Option<BTreeSet<String>> {
	changed_files(toolkit, root)
		.await
		.map(|files| files.into_iter().collect())
}

/// Files that became dirty after `before` was taken.
async fn changed_since(
	toolkit: &crate::JobToolkit,
	root: &Path,
	before: &BTreeSet<String>,
) -> Option<Vec<String>> {
	let (preexisting, fresh): (Vec<String>, Vec<String>) = changed_files(toolkit, root)
		.await?
		.into_iter()
		.partition(|file| before.contains(file));
	if !preexisting.is_empty() {
		debug!(files = ?preexisting, "leaving files with uncommitted edits out of automation");
	}
	Some(fresh)
}

/// Copies the automation result onto `result`. Returns whether a commit exists.
fn record_outcome(result: &mut JobResult, outcome: &AutomationOutcome) -> bool {
	result.files_changed = outcome.files_committed();
	result.pr_url = outcome.pr_url().map(str::to_string);
	match outcome {
		AutomationOutcome::PullRequestOpened { .. } => {}
		// Pushed without a PR (disabled, non-GitHub remote, no gh) is not an error.
		AutomationOutcome::Committed { pushed: true, .. } => {
			debug!(outcome = %outcome.describe(), "automation stopped after push");
		}
		_ => result.push_error(outcome.describe()),
	}
	outcome.is_committed()
}

fn plural(count: usize, word: &str) -> String {
	if count == 1 {
		return format!("{count} {word}");
	}
	match word.strip_suffix('y') {
		Some(stem) if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) => format!("{count} {stem}ies"),
		_ => format!("{count} {word}s"),
	}
}
