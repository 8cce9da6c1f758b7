// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error/warning counts for ESLint, Biome and Oxlint.
//!
//! Every parser tries the tool's JSON report first, then the tool's
//! human-readable summary line, then falls back to counting `error` and
//! `warning` tokens. Each tool keeps its own patterns.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::json_block::{extract_json_object_where, extract_json_where};
use crate::SignalSource;

static ESLINT_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(\d+) problems? \((\d+) errors?, (\d+) warnings?\)").unwrap()
});
static BIOME_ERRORS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"Found (\d+) errors?").unwrap());
static BIOME_WARNINGS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"Found (\d+) warnings?").unwrap());
static OXLINT_SUMMARY: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"Found (\d+) warnings? and (\d+) errors?").unwrap());
static ERROR_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\berror\b").unwrap());
static WARNING_TOKEN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)\bwarning\b").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintCounts {
	pub errors: u64,
	pub warnings: u64,
	/// Files with at least one issue, when the report names them.
	pub files: Vec<String>,
	pub source: SignalSource,
}

impl LintCounts {
	pub fn total(&self) -> u64 {
		self.errors + self.warnings
	}

	pub fn is_clean(&self) -> bool {
		self.total() == 0
	}

	fn counted(errors: u64, warnings: u64, source: SignalSource) -> Self {
		Self {
			errors,
			warnings,
			files: Vec::new(),
			source,
		}
	}
}

/// ESLint with `--format json` (an array of per-file results) or the
/// stylish formatter's `✖ N problems (E errors, W warnings)` line.
pub fn parse_eslint(output: &str) -> LintCounts {
	if let Some(Value::Array(files)) = extract_json_where(output, Value::is_array) {
		let mut counts = LintCounts::counted(0, 0, SignalSource::Structured);
		for file in &files {
			let errors = file.get("errorCount").and_then(Value::as_u64).unwrap_or(0);
			let warnings = file.get("warningCount").and_then(Value::as_u64).unwrap_or(0);
			counts.errors += errors;
			counts.warnings += warnings;
			if errors + warnings > 0 {
				if let Some(path) = file.get("filePath").and_then(Value::as_str) {
					counts.files.push(path.to_string());
				}
			}
		}
		return counts;
	}

	if let Some(caps) = ESLINT_SUMMARY.captures(output) {
		return LintCounts::counted(
			capture_u64(&caps, 2),
			capture_u64(&caps, 3),
			SignalSource::Summary,
		);
	}

	heuristic(output)
}

/// Biome `check`: the JSON reporter's `summary` object, or the
/// `Found N errors.` / `Found N warnings.` lines.
pub fn parse_biome(output: &str) -> LintCounts {
	if let Some(summary) = extract_json_object_where(output, |v| v.get("summary").is_some())
		.as_ref()
		.and_then(|v| v.get("summary"))
	{
		let errors = summary.get("errors").and_then(Value::as_u64);
		let warnings = summary.get("warnings").and_then(Value::as_u64);
		if errors.is_some() || warnings.is_some() {
			return LintCounts::counted(
				errors.unwrap_or(0),
				warnings.unwrap_or(0),
				SignalSource::Structured,
			);
		}
	}

	let errors = BIOME_ERRORS.captures(output).map(|c| capture_u64(&c, 1));
	let warnings = BIOME_WARNINGS.captures(output).map(|c| capture_u64(&c, 1));
	if errors.is_some() || warnings.is_some() {
		return LintCounts::counted(
			errors.unwrap_or(0),
			warnings.unwrap_or(0),
			SignalSource::Summary,
		);
	}

	heuristic(output)
}

/// Oxlint: `Found W warnings and E errors.` Note the warnings-first order.
pub fn parse_oxlint(output: &str) -> LintCounts {
	if let Some(caps) = OXLINT_SUMMARY.captures(output) {
		return LintCounts::counted(
			capture_u64(&caps, 2),
			capture_u64(&caps, 1),
			SignalSource::Summary,
		);
	}

	heuristic(output)
}

fn heuristic(output: &str) -> LintCounts {
	let mut counts = LintCounts::default();
	for line in output.lines() {
		if ERROR_TOKEN.is_match(line) {
			counts.errors += 1;
		} else if WARNING_TOKEN.is_match(line) {
			counts.warnings += 1;
		}
	}
	if !counts.is_clean() {
		counts.source = SignalSource::Heuristic;
	}
	counts
}

fn capture_u64(caps: &regex::Captures<'_>, index: usize) -> u64 {
	caps.get(index)
		.and_then(|m| m.as_str().parse().ok())
		.unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn eslint_json_sums_per_file_counts() {
		let output = r#"[
			{"filePath": "/p/src/a.ts", "messages": [], "errorCount": 2, "warningCount": 1},
			{"filePath": "/p/src/b.ts", "messages": [], "errorCount": 0, "warningCount": 0},
			{"filePath": "/p/src/c.ts", "messages": [], "errorCount": 1, "warningCount": 0}
		]"#;
		let counts = parse_eslint(output);
		assert_eq!(counts.errors, 3);
		assert_eq!(counts.warnings, 1);
		assert_eq!(counts.files, vec!["/p/src/a.ts", "/p/src/c.ts"]);
		assert_eq!(counts.source, SignalSource::Structured);
	}

	#[test]
	fn eslint_json_after_structured_log_line() {
		let output = "{\"level\":\"warn\",\"msg\":\"flat config preferred\"}\n[{\"filePath\": \"/p/a.ts\", \"errorCount\": 2, \"warningCount\": 0}]";
		let counts = parse_eslint(output);
		assert_eq!(counts.source, SignalSource::Structured);
		assert_eq!(counts.errors, 2);
		assert_eq!(counts.files, vec!["/p/a.ts"]);
	}

	#[test]
	fn eslint_stylish_summary() {
		let output = "/p/src/a.ts\n  1:1  error  no-unused-vars\n\n✖ 4 problems (3 errors, 1 warning)\n";
		let counts = parse_eslint(output);
		assert_eq!((counts.errors, counts.warnings), (3, 1));
		assert_eq!(counts.source, SignalSource::Summary);
	}

	#[test]
	fn eslint_clean_run_is_clean() {
		assert!(parse_eslint("[]").is_clean());
		assert!(parse_eslint("").is_clean());
		assert_eq!(parse_eslint("").source, SignalSource::None);
	}

	#[test]
	fn biome_json_summary() {
		let output = r#"{"summary": {"changed": 0, "unchanged": 12, "errors": 5, "warnings": 2}, "diagnostics": []}"#;
		let counts = parse_biome(output);
		assert_eq!((counts.errors, counts.warnings), (5, 2));
		assert_eq!(counts.source, SignalSource::Structured);
	}

	#[test]
	fn biome_text_summary() {
		let output = "Checked 12 files in 4ms. No fixes applied.\nFound 2 errors.\nFound 1 warning.\n";
		let counts = parse_biome(output);
		assert_eq!((counts.errors, counts.warnings), (2, 1));
		assert_eq!(counts.source, SignalSource::Summary);
	}

	#[test]
	fn oxlint_summary_is_warnings_first() {
		let output = "  ! eslint(no-debugger): `debugger` statement is not allowed\nFound 4 warnings and 1 error.\nFinished in 3ms on 10 files with 90 rules using 8 threads.\n";
		let counts = parse_oxlint(output);
		assert_eq!((counts.errors, counts.warnings), (1, 4));
	}

	#[test]
	fn heuristic_counts_tokens_per_line() {
		let output = "src/a.ts: Error: bad\nsrc/b.ts: warning: meh\nsrc/c.ts: error again\nerrors are fine\n";
		let counts = parse_oxlint(output);
		assert_eq!((counts.errors, counts.warnings), (2, 1));
		assert_eq!(counts.source, SignalSource::Heuristic);
	}

	proptest! {
		/// Parsers degrade instead of panicking on arbitrary output.
		#[test]
		fn prop_parsers_never_panic(output in ".{0,400}") {
			let _ = parse_eslint(&output);
			let _ = parse_biome(&output);
			let _ = parse_oxlint(&output);
		}

		/// The ESLint summary line round-trips any counts.
		#[test]
		fn prop_eslint_summary_counts(errors in 0u64..10_000, warnings in 0u64..10_000) {
			let output = format!("✖ {} problems ({} errors, {} warnings)", errors + warnings, errors, warnings);
			let counts = parse_eslint(&output);
			prop_assert_eq!((counts.errors, counts.warnings), (errors, warnings));
		}
	}
}
