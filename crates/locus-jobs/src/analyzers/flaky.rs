// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use locus_common_exec::{CommandSpec, ExecError};
use locus_jobs_config::option_keys;
use locus_jobs_core::{
	Job, JobContext, JobError, JobResult, JobSuggestion, JobType, SuggestionType, TestOutcome,
};
use locus_jobs_parsers::test_report::parse_test_output;
use locus_jobs_parsers::{ReportFormat, TestRunSummary};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{relative_to, timeout_option};
use crate::toolkit::JobToolkit;

pub const DEFAULT_RETRY_COUNT: u64 = 2;
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 500;
const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Test runners, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestRunner {
	Vitest,
	Jest,
	Mocha,
	/// `npm test` with whatever the `test` script runs.
	NpmScript,
}

impl TestRunner {
	const CONFIGURED: [TestRunner; 3] = [TestRunner::Vitest, TestRunner::Jest, TestRunner::Mocha];

	pub fn config_files(&self) -> &'static [&'static str] {
		match self {
			TestRunner::Vitest => &[
				"vitest.config.ts",
				"vitest.config.mts",
				"vitest.config.js",
				"vitest.config.mjs",
				"vitest.config.cjs",
			],
			TestRunner::Jest => &[
				"jest.config.js",
				"jest.config.ts",
				"jest.config.mjs",
				"jest.config.cjs",
				"jest.config.json",
			],
			TestRunner::Mocha => &[
				".mocharc.js",
				".mocharc.cjs",
				".mocharc.json",
				".mocharc.jsonc",
				".mocharc.yml",
				".mocharc.yaml",
			],
			TestRunner::NpmScript => &[],
		}
	}

	fn package_name(&self) -> &'static str {
		match self {
			TestRunner::Vitest => "vitest",
			TestRunner::Jest => "jest",
			TestRunner::Mocha => "mocha",
			TestRunner::NpmScript => "npm",
		}
	}

	/// Config files first, then `package.json` dependencies, then the text
	/// of `scripts.test`, then `npm test` if there is a `package.json` at all.
	pub fn detect(root: &Path) -> Option<TestRunner> {
		if let Some(runner) = Self::CONFIGURED.into_iter().find(|runner| {
			runner
				.config_files()
				.iter()
				.any(|file| root.join(file).is_file())
		}) {
			return Some(runner);
		}

		let content = std::fs::read_to_string(root.join("package.json")).ok()?;
		let package: Value = match serde_json::from_str(&content) {
			Ok(package) => package,
			Err(e) => {
				warn!(error = %e, "package.json is not valid JSON; falling back to npm test");
				return Some(TestRunner::NpmScript);
			}
		};

		for section in ["devDependencies", "dependencies"] {
			if let Some(deps) = package.get(section).and_then(Value::as_object) {
				if let Some(runner) = Self::CONFIGURED
					.into_iter()
					.find(|runner| deps.contains_key(runner.package_name()))
				{
					return Some(runner);
				}
			}
		}

		let script = package
			.pointer("/scripts/test")
			.and_then(Value::as_str)
			.unwrap_or_default();
		Some(
			Self::CONFIGURED
				.into_iter()
				.find(|runner| script.contains(runner.package_name()))
				.unwrap_or(TestRunner::NpmScript),
		)
	}

	pub fn display_name(&self) -> &'static str {
		match self {
			TestRunner::Vitest => "Vitest",
			TestRunner::Jest => "Jest",
			TestRunner::Mocha => "Mocha",
			TestRunner::NpmScript => "npm test",
		}
	}

	pub fn command(&self) -> (&'static str, &'static [&'static str]) {
		match self {
			TestRunner::Vitest => ("npx", &["vitest", "run", "--reporter=json"]),
			TestRunner::Jest => ("npx", &["jest", "--json"]),
			TestRunner::Mocha => ("npx", &["mocha", "--reporter", "json"]),
			TestRunner::NpmScript => ("npm", &["test"]),
		}
	}

	/// Vitest's JSON reporter is Jest-compatible.
	pub fn report_format(&self) -> ReportFormat {
		match self {
			TestRunner::Vitest | TestRunner::Jest => ReportFormat::JestJson,
			TestRunner::Mocha => ReportFormat::MochaJson,
			TestRunner::NpmScript => ReportFormat::Text,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
	/// Passed and failed across runs of the same code.
	Flaky,
	/// Failed in every run it appeared in.
	Broken,
}

impl Verdict {
	pub fn as_str(&self) -> &'static str {
		match self {
			Verdict::Flaky => "flaky",
			Verdict::Broken => "broken",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestClassification {
	pub file: String,
	pub name: String,
	pub verdict: Verdict,
	pub passes: usize,
	pub failures: usize,
	/// Unique failure messages, truncated.
	pub failure_messages: Vec<String>,
}

impl TestClassification {
	/// Runs in which this test produced a pass or a fail.
	pub fn observed_runs(&self) -> usize {
		self.passes + self.failures
	}

	pub fn pass_rate(&self) -> String {
		format!("{}/{}", self.passes, self.observed_runs())
	}
}

#[derive(Default)]
struct Tally {
	passes: usize,
	failures: usize,
	messages: Vec<String>,
}

/// Classifies every test that failed at least once across `runs`.
///
/// Only captured runs count. A test missing from a run contributes nothing
/// for that run. Flaky tests come first, then broken ones, each ordered by
/// file and name.
pub fn classify_runs(runs: &[TestRunSummary], max_message_chars: usize) -> Vec<TestClassification> {
	let mut tallies: BTreeMap<(String, String), Tally> = BTreeMap::new();

	for run in runs {
		for test in &run.tests {
			let tally = tallies.entry(test.key()).or_default();
			match test.outcome {
				TestOutcome::Passed => tally.passes += 1,
				TestOutcome::Failed => {
					tally.failures += 1;
					for message in &test.failure_messages {
						if !tally.messages.contains(message) {
							tally.messages.push(message.clone());
						}
					}
				}
				TestOutcome::Skipped => {}
			}
		}
	}

	let mut classified: Vec<TestClassification> = tallies
		.into_iter()
		.filter(|(_, tally)| tally.failures > 0)
		.map(|((file, name), tally)| {
			let mut failure_messages: Vec<String> = Vec::new();
			for message in tally.messages {
				let message = truncate(&message, max_message_chars);
				if !failure_messages.contains(&message) {
					failure_messages.push(message);
				}
			}
			TestClassification {
				file,
				name,
				verdict: if tally.passes > 0 {
					Verdict::Flaky
				} else {
					Verdict::Broken
				},
				passes: tally.passes,
				failures: tally.failures,
				failure_messages,
			}
		})
		.collect();

	// Stable sort keeps the map's file/name order within each verdict.
	classified.sort_by_key(|c| c.verdict);
	classified
}

fn truncate(message: &str, max_chars: usize) -> String {
	match message.char_indices().nth(max_chars) {
		Some((end, _)) => message[..end].to_string(),
		None => message.to_string(),
	}
}

fn suggestion(runner: TestRunner, test: &TestClassification) -> JobSuggestion {
	let (title, mut description) = match test.verdict {
		Verdict::Flaky => (
			format!("Flaky test: {}", test.name),
			format!(
				"`{}` in `{}` passed {} runs of unchanged code. \
				 Look for timing or shared-state dependencies.",
				test.name,
				test.file,
				test.pass_rate()
			),
		),
		Verdict::Broken => (
			format!("Broken test: {}", test.name),
			format!(
				"`{}` in `{}` failed in all {} runs.",
				test.name,
				test.file,
				test.observed_runs()
			),
		),
	};
	if !test.failure_messages.is_empty() {
		description.push_str("\n\nFailure output:\n```\n");
		description.push_str(&test.failure_messages.join("\n---\n"));
		description.push_str("\n```");
	}

	JobSuggestion::new(SuggestionType::TestFix, title, description)
		.with_meta("file", test.file.clone())
		.with_meta("testName", test.name.clone())
		.with_meta("classification", test.verdict.as_str())
		.with_meta("passRate", test.pass_rate())
		.with_meta("passCount", test.passes)
		.with_meta("failCount", test.failures)
		.with_meta("totalRuns", test.observed_runs())
		.with_meta("failureMessages", test.failure_messages.clone())
		.with_meta("runner", runner.display_name())
}

/// Runs the suite repeatedly and separates flaky tests from broken ones.
/// Test code is never changed automatically.
pub struct FlakyTestJob {
	toolkit: JobToolkit,
}

impl FlakyTestJob {
	pub fn new(toolkit: JobToolkit) -> Self {
		Self { toolkit }
	}

	async fn execute(
		&self,
		ctx: &JobContext,
		runner: TestRunner,
	) -> Result<TestRunSummary, ExecError> {
		let (binary, args) = runner.command();
		let spec = CommandSpec::new(binary)
			.args(args.iter().copied())
			.cwd(&ctx.project_path)
			.timeout(timeout_option(
				ctx,
				option_keys::TEST_TIMEOUT_SECS,
				DEFAULT_TEST_TIMEOUT,
			))
			.env("CI", "true");

		let output = self.toolkit.commands.run(&spec).await?;
		let mut summary = parse_test_output(runner.report_format(), &output.combined());
		for test in &mut summary.tests {
			test.file = relative_to(&ctx.project_path, &test.file);
		}
		debug!(
			exit_code = ?output.exit_code,
			total = summary.total,
			failed = summary.failed,
			source = ?summary.source,
			"parsed test run"
		);
		Ok(summary)
	}
}

#[async_trait]
impl Job for FlakyTestJob {
	fn job_type(&self) -> JobType {
		JobType::FlakyTestDetection
	}

	fn name(&self) -> &str {
		"Flaky Test Detection"
	}

	fn description(&self) -> &str {
		"Re-run failing test suites to tell flaky tests from broken ones"
	}

	#[instrument(skip(self, ctx), fields(job_type = "FLAKY_TEST_DETECTION", path = %ctx.project_path.display()))]
	async fn run(&self, ctx: &JobContext) -> Result<JobResult, JobError> {
		let Some(runner) = TestRunner::detect(&ctx.project_path) else {
			info!("no test runner detected");
			return Ok(JobResult::clean(
				"No test runner detected; flaky test detection skipped",
			));
		};
		let retries = ctx
			.option_u64(option_keys::RETRY_COUNT)
			.unwrap_or(DEFAULT_RETRY_COUNT);
		let max_chars = ctx
			.option_u64(option_keys::MAX_MESSAGE_CHARS)
			.map(|v| v as usize)
			.unwrap_or(DEFAULT_MAX_MESSAGE_CHARS);
		debug!(runner = runner.display_name(), retries, "detected test runner");

		let first = match self.execute(ctx, runner).await {
			Ok(summary) => summary,
			Err(e) => {
				warn!(error = %e, "test suite could not run");
				return Ok(JobResult::with_error(
					format!("{} could not run", runner.display_name()),
					e.to_string(),
				));
			}
		};

		if first.is_empty() {
			return Ok(JobResult::clean(format!(
				"No tests discovered by {}",
				runner.display_name()
			)));
		}
		if first.all_passed() {
			return Ok(JobResult::clean(format!(
				"All {} tests passed; no flaky tests detected",
				first.total
			)));
		}
		if first.tests.is_empty() {
			// Counts without per-test detail: re-running cannot tell tests apart.
			return Ok(JobResult::clean(format!(
				"{} failing test(s) reported by {} without per-test results",
				first.failed,
				runner.display_name()
			)));
		}

		let mut runs = vec![first];
		let mut lost_runs = 0;
		for attempt in 1..=retries {
			match self.execute(ctx, runner).await {
				Ok(summary) if !summary.tests.is_empty() => runs.push(summary),
				Ok(_) => {
					warn!(attempt, "re-run produced no per-test results; ignoring it");
					lost_runs += 1;
				}
				Err(e) => {
					warn!(attempt, error = %e, "re-run failed to execute; ignoring it");
					lost_runs += 1;
				}
			}
		}

		let classified = classify_runs(&runs, max_chars);
		let flaky = classified
			.iter()
			.filter(|c| c.verdict == Verdict::Flaky)
			.count();
		let broken = classified.len() - flaky;
		info!(flaky, broken, runs = runs.len(), "classified test failures");

		let mut summary = format!(
			"Detected {flaky} flaky and {broken} broken test(s) across {} run(s)",
			runs.len()
		);
		if lost_runs > 0 {
			summary.push_str(&format!("; {lost_runs} re-run(s) produced no data"));
		}

		Ok(JobResult::clean(summary).suggestions(
			classified
				.iter()
				.map(|test| suggestion(runner, test))
				.collect(),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{context, mock_toolkit, write};
	use locus_common_exec::{MockCommandRunner, MockResponse};
	use locus_jobs_parsers::TestCase;
	use proptest::prelude::*;
	use serde_json::json;

	fn case(name: &str, outcome: TestOutcome, message: &str) -> TestCase {
		TestCase {
			file: "src/math.test.ts".to_string(),
			name: name.to_string(),
			outcome,
			failure_messages: if message.is_empty() {
				Vec::new()
			} else {
				vec![message.to_string()]
			},
		}
	}

	fn run(tests: Vec<TestCase>) -> TestRunSummary {
		TestRunSummary {
			total: tests.len() as u64,
			tests,
			..Default::default()
		}
	}

	/// Jest-style report for `(name, passed, message)` triples in one file.
	fn jest_report(root: &Path, results: &[(&str, bool, &str)]) -> String {
		let assertions: Vec<Value> = results
			.iter()
			.map(|(name, passed, message)| {
				json!({
					"ancestorTitles": ["math"],
					"title": name,
					"status": if *passed { "passed" } else { "failed" },
					"failureMessages": if message.is_empty() { vec![] } else { vec![*message] },
				})
			})
			.collect();
		let failed = results.iter().filter(|(_, passed, _)| !passed).count();
		json!({
			"numTotalTests": results.len(),
			"numPassedTests": results.len() - failed,
			"numFailedTests": failed,
			"testResults": [{
				"name": root.join("src/math.test.ts").to_string_lossy(),
				"assertionResults": assertions,
			}],
		})
		.to_string()
	}

	#[test]
	fn two_passes_one_fail_is_flaky() {
		let runs = vec![
			run(vec![case("adds", TestOutcome::Failed, "expected 3")]),
			run(vec![case("adds", TestOutcome::Passed, "")]),
			run(vec![case("adds", TestOutcome::Passed, "")]),
		];
		let classified = classify_runs(&runs, 500);
		assert_eq!(classified.len(), 1);
		assert_eq!(classified[0].verdict, Verdict::Flaky);
		assert_eq!(classified[0].pass_rate(), "2/3");
	}

	#[test]
	fn always_failing_is_broken() {
		let runs: Vec<_> = (0..3)
			.map(|_| run(vec![case("divides", TestOutcome::Failed, "boom")]))
			.collect();
		let classified = classify_runs(&runs, 500);
		assert_eq!(classified[0].verdict, Verdict::Broken);
		assert_eq!(classified[0].failures, 3);
		assert_eq!(classified[0].failure_messages, vec!["boom".to_string()]);
	}

	#[test]
	fn absent_runs_do_not_count() {
		let runs = vec![
			run(vec![
				case("adds", TestOutcome::Failed, "x"),
				case("subtracts", TestOutcome::Passed, ""),
			]),
			run(vec![case("subtracts", TestOutcome::Passed, "")]),
		];
		let classified = classify_runs(&runs, 500);
		assert_eq!(classified.len(), 1);
		assert_eq!(classified[0].name, "adds");
		assert_eq!(classified[0].verdict, Verdict::Broken);
		assert_eq!(classified[0].observed_runs(), 1);
	}

	#[test]
	fn never_failing_tests_are_not_reported() {
		let runs = vec![run(vec![case("adds", TestOutcome::Passed, "")])];
		assert!(classify_runs(&runs, 500).is_empty());
	}

	#[test]
	fn messages_are_deduplicated_and_truncated() {
		let long = "é".repeat(600);
		let runs = vec![
			run(vec![case("adds", TestOutcome::Failed, &long)]),
			run(vec![case("adds", TestOutcome::Failed, &long)]),
			run(vec![case("adds", TestOutcome::Failed, "short")]),
		];
		let classified = classify_runs(&runs, 500);
		let messages = &classified[0].failure_messages;
		assert_eq!(messages.len(), 2);
		assert_eq!(messages[0].chars().count(), 500);
		assert_eq!(messages[1], "short");
	}

	#[test]
	fn flaky_sorted_before_broken() {
		let runs = vec![
			run(vec![
				case("a broken", TestOutcome::Failed, ""),
				case("z flaky", TestOutcome::Failed, ""),
			]),
			run(vec![
				case("a broken", TestOutcome::Failed, ""),
				case("z flaky", TestOutcome::Passed, ""),
			]),
		];
		let verdicts: Vec<_> = classify_runs(&runs, 500)
			.into_iter()
			.map(|c| c.verdict)
			.collect();
		assert_eq!(verdicts, vec![Verdict::Flaky, Verdict::Broken]);
	}

	#[test]
	fn detection_prefers_config_then_dependencies_then_script() {
		let dir = tempfile::tempdir().unwrap();
		assert_eq!(TestRunner::detect(dir.path()), None);

		write(dir.path(), "package.json", r#"{"scripts": {"test": "node test.js"}}"#);
		assert_eq!(TestRunner::detect(dir.path()), Some(TestRunner::NpmScript));

		write(dir.path(), "package.json", r#"{"scripts": {"test": "mocha --recursive"}}"#);
		assert_eq!(TestRunner::detect(dir.path()), Some(TestRunner::Mocha));

		write(
			dir.path(),
			"package.json",
			r#"{"devDependencies": {"jest": "^29.0.0"}, "scripts": {"test": "mocha"}}"#,
		);
		assert_eq!(TestRunner::detect(dir.path()), Some(TestRunner::Jest));

		write(dir.path(), "vitest.config.ts", "export default {}");
		assert_eq!(TestRunner::detect(dir.path()), Some(TestRunner::Vitest));
	}

	#[tokio::test]
	async fn all_passing_first_run_short_circuits() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "vitest.config.ts", "");
		let runner = MockCommandRunner::new().on(
			"npx",
			["vitest", "run"],
			MockResponse::ok(jest_report(dir.path(), &[("adds", true, ""), ("subtracts", true, "")])),
		);
		let (toolkit, _, _) = mock_toolkit(runner.clone());

		let result = FlakyTestJob::new(toolkit).run(&context(dir.path())).await.unwrap();
		assert_eq!(result.summary, "All 2 tests passed; no flaky tests detected");
		assert!(result.suggestions.is_empty());
		assert_eq!(runner.calls().len(), 1);
	}

	#[tokio::test]
	async fn no_tests_discovered_is_clean() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "package.json", r#"{"scripts": {"test": "echo none"}}"#);
		let runner = MockCommandRunner::new().on("npm", ["test"], MockResponse::ok("none\n"));
		let (toolkit, _, _) = mock_toolkit(runner.clone());

		let result = FlakyTestJob::new(toolkit).run(&context(dir.path())).await.unwrap();
		assert!(result.summary.starts_with("No tests discovered"));
		assert_eq!(runner.calls().len(), 1);
	}

	#[tokio::test]
	async fn reruns_classify_flaky_and_broken() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "jest.config.js", "");
		let root = dir.path();
		let runner = MockCommandRunner::new()
			.on(
				"npx",
				["jest", "--json"],
				MockResponse::exit(1, jest_report(root, &[("adds", false, "expected 3"), ("divides", false, "NaN")]), ""),
			)
			.on(
				"npx",
				["jest", "--json"],
				MockResponse::exit(1, jest_report(root, &[("adds", true, ""), ("divides", false, "NaN")]), ""),
			)
			.on(
				"npx",
				["jest", "--json"],
				MockResponse::exit(1, jest_report(root, &[("adds", true, ""), ("divides", false, "NaN")]), ""),
			);
		let (toolkit, _, _) = mock_toolkit(runner.clone());

		let result = FlakyTestJob::new(toolkit).run(&context(root)).await.unwrap();

		assert_eq!(runner.calls().len(), 3);
		assert_eq!(result.summary, "Detected 1 flaky and 1 broken test(s) across 3 run(s)");
		assert_eq!(result.files_changed, 0);
		assert_eq!(result.suggestions.len(), 2);

		let flaky = &result.suggestions[0];
		assert_eq!(flaky.suggestion_type, SuggestionType::TestFix);
		assert_eq!(flaky.meta_str("classification"), Some("flaky"));
		assert_eq!(flaky.meta_str("passRate"), Some("2/3"));
		assert_eq!(flaky.meta_str("file"), Some("src/math.test.ts"));
		assert_eq!(flaky.meta_str("testName"), Some("math > adds"));

		let broken = &result.suggestions[1];
		assert_eq!(broken.meta_str("classification"), Some("broken"));
		assert_eq!(broken.metadata["failureMessages"], json!(["NaN"]));
	}

	#[tokio::test]
	async fn failed_rerun_is_omitted_not_counted() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "jest.config.js", "");
		let root = dir.path();
		let runner = MockCommandRunner::new()
			.on(
				"npx",
				["jest", "--json"],
				MockResponse::exit(1, jest_report(root, &[("adds", false, "boom")]), ""),
			)
			.on("npx", ["jest", "--json"], MockResponse::Timeout)
			.on(
				"npx",
				["jest", "--json"],
				MockResponse::exit(1, jest_report(root, &[("adds", false, "boom")]), ""),
			);
		let (toolkit, _, _) = mock_toolkit(runner);

		let result = FlakyTestJob::new(toolkit).run(&context(root)).await.unwrap();
		assert_eq!(result.suggestions.len(), 1);
		assert_eq!(result.suggestions[0].metadata["totalRuns"], 2);
		assert!(result.summary.contains("1 re-run(s) produced no data"));
	}

	#[tokio::test]
	async fn retry_count_option_controls_reruns() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "jest.config.js", "");
		let runner = MockCommandRunner::new().on(
			"npx",
			["jest", "--json"],
			MockResponse::exit(1, jest_report(dir.path(), &[("adds", false, "boom")]), ""),
		);
		let (toolkit, _, _) = mock_toolkit(runner.clone());

		let ctx = context(dir.path()).with_option(option_keys::RETRY_COUNT, 4);
		FlakyTestJob::new(toolkit).run(&ctx).await.unwrap();
		assert_eq!(runner.calls().len(), 5);
	}

	#[tokio::test]
	async fn first_run_failure_is_recorded_as_error() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), ".mocharc.json", "{}");
		let runner = MockCommandRunner::new().on("npx", ["mocha"], MockResponse::Timeout);
		let (toolkit, _, _) = mock_toolkit(runner);

		let result = FlakyTestJob::new(toolkit).run(&context(dir.path())).await.unwrap();
		assert!(result.has_errors());
		assert!(result.suggestions.is_empty());
	}

	#[tokio::test]
	async fn summary_without_detail_skips_reruns() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "package.json", r#"{"scripts": {"test": "node run.js"}}"#);
		let runner = MockCommandRunner::new().on(
			"npm",
			["test"],
			MockResponse::exit(1, "Tests: 2 failed, 5 passed, 7 total", ""),
		);
		let (toolkit, _, _) = mock_toolkit(runner.clone());

		let result = FlakyTestJob::new(toolkit).run(&context(dir.path())).await.unwrap();
		assert!(result.summary.contains("without per-test results"));
		assert_eq!(runner.calls().len(), 1);
	}

	proptest! {
		#[test]
		fn verdict_matches_pass_and_fail_counts(outcomes in prop::collection::vec(any::<Option<bool>>(), 1..8)) {
			// None = test absent from that run.
			let runs: Vec<TestRunSummary> = outcomes
				.iter()
				.map(|o| match o {
					Some(true) => run(vec![case("t", TestOutcome::Passed, "")]),
					Some(false) => run(vec![case("t", TestOutcome::Failed, "f")]),
					None => run(vec![]),
				})
				.collect();
			let passes = outcomes.iter().filter(|o| **o == Some(true)).count();
			let failures = outcomes.iter().filter(|o| **o == Some(false)).count();

			let classified = classify_runs(&runs, 500);
			if failures == 0 {
				prop_assert!(classified.is_empty());
			} else {
				prop_assert_eq!(classified.len(), 1);
				let expected = if passes > 0 { Verdict::Flaky } else { Verdict::Broken };
				prop_assert_eq!(classified[0].verdict, expected);
				prop_assert_eq!(classified[0].observed_runs(), passes + failures);
			}
		}

		#[test]
		fn truncation_never_exceeds_limit(message in ".{0,700}", limit in 1usize..600) {
			let truncated = truncate(&message, limit);
			prop_assert!(truncated.chars().count() <= limit);
			prop_assert!(message.starts_with(&truncated));
		}
	}
}
