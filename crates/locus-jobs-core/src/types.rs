// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies an analyzer. The serialized form is what job-run records store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
	LintScan,
	TodoCleanup,
	FlakyTestDetection,
	DependencyCheck,
}

impl JobType {
	pub const ALL: [JobType; 4] = [
		JobType::LintScan,
		JobType::TodoCleanup,
		JobType::FlakyTestDetection,
		JobType::DependencyCheck,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			JobType::LintScan => "LINT_SCAN",
			JobType::TodoCleanup => "TODO_CLEANUP",
			JobType::FlakyTestDetection => "FLAKY_TEST_DETECTION",
			JobType::DependencyCheck => "DEPENDENCY_CHECK",
		}
	}
}

impl fmt::Display for JobType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for JobType {
	type Err = String;

	/// Accepts the stored form (`LINT_SCAN`) as well as `lint-scan` / `lint_scan`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
		JobType::ALL
			.into_iter()
			.find(|t| t.as_str() == normalized)
			.ok_or_else(|| format!("unknown job type: {s}"))
	}
}

/// Kind of change an analyzer wants to make; only used to query autonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCategory {
	Style,
	Dependency,
	TestFix,
	Refactor,
	Docs,
	Security,
	Feature,
}

/// Persisted job-run state machine: Running -> Completed | Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
	Running,
	Completed,
	Failed,
}

impl JobStatus {
	pub fn is_terminal(&self) -> bool {
		matches!(self, JobStatus::Completed | JobStatus::Failed)
	}
}

/// Tag carried by every suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionType {
	CodeFix,
	TechDebt,
	TestFix,
	DependencyUpdate,
	Security,
}

impl SuggestionType {
	pub fn as_str(&self) -> &'static str {
		match self {
			SuggestionType::CodeFix => "CODE_FIX",
			SuggestionType::TechDebt => "TECH_DEBT",
			SuggestionType::TestFix => "TEST_FIX",
			SuggestionType::DependencyUpdate => "DEPENDENCY_UPDATE",
			SuggestionType::Security => "SECURITY",
		}
	}
}

/// Semver-derived risk of moving a dependency to its latest version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
	Patch,
	Minor,
	Major,
}

impl RiskLevel {
	pub const ALL: [RiskLevel; 3] = [RiskLevel::Patch, RiskLevel::Minor, RiskLevel::Major];

	pub fn as_str(&self) -> &'static str {
		match self {
			RiskLevel::Patch => "patch",
			RiskLevel::Minor => "minor",
			RiskLevel::Major => "major",
		}
	}
}

impl fmt::Display for RiskLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Outcome of one test case in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
	Passed,
	Failed,
	Skipped,
}
