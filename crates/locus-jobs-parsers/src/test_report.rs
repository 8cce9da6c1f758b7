// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test runner reports converged into a single [`TestRunSummary`].
//!
//! Jest and Vitest share a JSON reporter shape. Mocha has its own. Anything
//! else goes through the text parser, which understands the common summary
//! lines and the per-test tick/cross markers.

use std::sync::LazyLock;

use locus_jobs_core::TestOutcome;
use regex::Regex;
use serde_json::Value;

use crate::json_block::extract_json_object_where;
use crate::SignalSource;

/// Separator between suite ancestry and test title in a test key.
pub const NAME_SEPARATOR: &str = " > ";

static SUMMARY_LINE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?m)^\s*Tests:?\s+(.+)$").unwrap());
static SUMMARY_PART: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(\d+) (failed|passed|skipped|pending|todo|total)").unwrap()
});
static VITEST_TOTAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d+)\)").unwrap());
static MOCHA_COUNT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?m)^\s*(\d+) (passing|failing|pending)\b").unwrap());
static TICK_LINE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\s*([✓✔√]|[✕✗×✖])\s+(.+?)\s*(?:\(\d+(?:\.\d+)?\s*m?s\))?$").unwrap());
static PASS_TOKEN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)\b(pass|passed|passing)\b").unwrap());
static FAIL_TOKEN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)\b(fail|failed|failing)\b").unwrap());

/// Reporter shape requested from the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
	/// Jest `--json` and Vitest `--reporter=json`.
	JestJson,
	/// Mocha `--reporter json`.
	MochaJson,
	Text,
}

/// One test case in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
	pub file: String,
	/// Suite ancestry and title joined by [`NAME_SEPARATOR`].
	pub name: String,
	pub outcome: TestOutcome,
	pub failure_messages: Vec<String>,
}

impl TestCase {
	pub fn key(&self) -> (String, String) {
		(self.file.clone(), self.name.clone())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestRunSummary {
	pub total: u64,
	pub passed: u64,
	pub failed: u64,
	pub skipped: u64,
	pub tests: Vec<TestCase>,
	pub source: SignalSource,
}

impl TestRunSummary {
	pub fn is_empty(&self) -> bool {
		self.total == 0 && self.tests.is_empty()
	}

	pub fn all_passed(&self) -> bool {
		self.failed == 0 && self.tests.iter().all(|t| t.outcome != TestOutcome::Failed)
	}

	fn from_cases(tests: Vec<TestCase>, source: SignalSource) -> Self {
		let mut summary = Self {
			source,
			..Default::default()
		};
		for test in &tests {
			match test.outcome {
				TestOutcome::Passed => summary.passed += 1,
				TestOutcome::Failed => summary.failed += 1,
				TestOutcome::Skipped => summary.skipped += 1,
			}
		}
		summary.total = tests.len() as u64;
		summary.tests = tests;
		summary
	}
}

pub fn parse_test_output(format: ReportFormat, output: &str) -> TestRunSummary {
	let structured = match format {
		ReportFormat::JestJson => parse_jest_json(output),
		ReportFormat::MochaJson => parse_mocha_json(output),
		ReportFormat::Text => None,
	};
	structured.unwrap_or_else(|| parse_text(output))
}

/// Jest/Vitest JSON reporter.
pub fn parse_jest_json(output: &str) -> Option<TestRunSummary> {
	let report = extract_json_object_where(output, |v| {
		v.get("testResults").is_some_and(Value::is_array)
	})?;
	let files = report.get("testResults")?.as_array()?;

	let mut tests = Vec::new();
	for file in files {
		let path = file
			.get("name")
			.or_else(|| file.get("testFilePath"))
			.and_then(Value::as_str)
			.unwrap_or_default();

		for assertion in file
			.get("assertionResults")
			.and_then(Value::as_array)
			.into_iter()
			.flatten()
		{
			let title = assertion.get("title").and_then(Value::as_str).unwrap_or_default();
			let mut parts: Vec<&str> = assertion
				.get("ancestorTitles")
				.and_then(Value::as_array)
				.into_iter()
				.flatten()
				.filter_map(Value::as_str)
				.filter(|s| !s.is_empty())
				.collect();
			parts.push(title);

			let name = if title.is_empty() {
				assertion
					.get("fullName")
					.and_then(Value::as_str)
					.unwrap_or_default()
					.to_string()
			} else {
				parts.join(NAME_SEPARATOR)
			};

			tests.push(TestCase {
				file: path.to_string(),
				name,
				outcome: jest_outcome(assertion.get("status").and_then(Value::as_str)),
				failure_messages: string_list(assertion.get("failureMessages")),
			});
		}
	}

	let mut summary = TestRunSummary::from_cases(tests, SignalSource::Structured);
	if let Some(total) = report.get("numTotalTests").and_then(Value::as_u64) {
		summary.total = total;
		summary.passed = count(&report, "numPassedTests").unwrap_or(summary.passed);
		summary.failed = count(&report, "numFailedTests").unwrap_or(summary.failed);
		summary.skipped = count(&report, "numPendingTests").unwrap_or(0)
			+ count(&report, "numTodoTests").unwrap_or(0);
	}
	Some(summary)
}

/// Mocha JSON reporter.
pub fn parse_mocha_json(output: &str) -> Option<TestRunSummary> {
	let report = extract_json_object_where(output, |v| v.get("stats").is_some_and(Value::is_object))?;
	let stats = report.get("stats")?;

	let mut tests = Vec::new();
	for (key, outcome) in [
		("passes", TestOutcome::Passed),
		("failures", TestOutcome::Failed),
		("pending", TestOutcome::Skipped),
	] {
		for test in report.get(key).and_then(Value::as_array).into_iter().flatten() {
			let name = test
				.get("fullTitle")
				.or_else(|| test.get("title"))
				.and_then(Value::as_str)
				.unwrap_or_default();
			let failure_messages = test
				.get("err")
				.and_then(|err| err.get("stack").or_else(|| err.get("message")))
				.and_then(Value::as_str)
				.map(|m| vec![m.to_string()])
				.unwrap_or_default();

			tests.push(TestCase {
				file: test
					.get("file")
					.and_then(Value::as_str)
					.unwrap_or_default()
					.to_string(),
				name: name.to_string(),
				outcome,
				failure_messages,
			});
		}
	}

	let mut summary = TestRunSummary::from_cases(tests, SignalSource::Structured);
	if let Some(total) = count(stats, "tests") {
		summary.total = total;
		summary.passed = count(stats, "passes").unwrap_or(summary.passed);
		summary.failed = count(stats, "failures").unwrap_or(summary.failed);
		summary.skipped = count(stats, "pending").unwrap_or(summary.skipped);
	}
	Some(summary)
}

/// Human-readable runner output.
pub fn parse_text(output: &str) -> TestRunSummary {
	let cases = tick_lines(output);

	if let Some(mut summary) = jest_or_vitest_summary(output).or_else(|| mocha_summary(output)) {
		summary.tests = cases;
		return summary;
	}

	if !cases.is_empty() {
		return TestRunSummary::from_cases(cases, SignalSource::Heuristic);
	}

	let passed = output.lines().filter(|l| PASS_TOKEN.is_match(l)).count() as u64;
	let failed = output.lines().filter(|l| FAIL_TOKEN.is_match(l)).count() as u64;
	if passed + failed == 0 {
		return TestRunSummary::default();
	}
	TestRunSummary {
		total: passed + failed,
		passed,
		failed,
		source: SignalSource::Heuristic,
		..Default::default()
	}
}

fn jest_or_vitest_summary(output: &str) -> Option<TestRunSummary> {
	let line = SUMMARY_LINE.captures_iter(output).last()?.get(1)?.as_str();

	let mut summary = TestRunSummary {
		source: SignalSource::Summary,
		..Default::default()
	};
	let mut total = None;
	for caps in SUMMARY_PART.captures_iter(line) {
		let n: u64 = caps[1].parse().unwrap_or(0);
		match &caps[2] {
			"failed" => summary.failed = n,
			"passed" => summary.passed = n,
			"skipped" | "pending" | "todo" => summary.skipped += n,
			"total" => total = Some(n),
			_ => {}
		}
	}
	let total = total.or_else(|| {
		VITEST_TOTAL
			.captures(line)
			.and_then(|c| c[1].parse().ok())
	});

	if total.is_none() && summary.passed + summary.failed + summary.skipped == 0 {
		return None;
	}
	summary.total = total.unwrap_or(summary.passed + summary.failed + summary.skipped);
	Some(summary)
}

fn mocha_summary(output: &str) -> Option<TestRunSummary> {
	let mut summary = TestRunSummary {
		source: SignalSource::Summary,
		..Default::default()
	};
	let mut matched = false;
	for caps in MOCHA_COUNT.captures_iter(output) {
		matched = true;
		let n: u64 = caps[1].parse().unwrap_or(0);
		match &caps[2] {
			"passing" => summary.passed = n,
			"failing" => summary.failed = n,
			_ => summary.skipped = n,
		}
	}
	if !matched {
		return None;
	}
	summary.total = summary.passed + summary.failed + summary.skipped;
	Some(summary)
}

fn tick_lines(output: &str) -> Vec<TestCase> {
	output
		.lines()
		.filter_map(|line| {
			let caps = TICK_LINE.captures(line)?;
			let outcome = match &caps[1] {
				"✓" | "✔" | "√" => TestOutcome::Passed,
				_ => TestOutcome::Failed,
			};
			Some(TestCase {
				file: String::new(),
				name: caps[2].to_string(),
				outcome,
				failure_messages: Vec::new(),
			})
		})
		.collect()
}

fn jest_outcome(status: Option<&str>) -> TestOutcome {
	match status {
		Some("passed") => TestOutcome::Passed,
		Some("failed") => TestOutcome::Failed,
		_ => TestOutcome::Skipped,
	}
}

fn string_list(value: Option<&Value>) -> Vec<String> {
	value
		.and_then(Value::as_array)
		.into_iter()
		.flatten()
		.filter_map(Value::as_str)
		.map(str::to_string)
		.collect()
}

fn count(value: &Value, key: &str) -> Option<u64> {
	value.get(key).and_then(Value::as_u64)
}
