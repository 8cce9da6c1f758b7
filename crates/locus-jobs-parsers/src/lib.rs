// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pure parsers for third-party tool output.
//!
//! Tool output formats drift between versions, so every parser degrades in
//! tiers: a structured JSON block if one can be found, then the tool's
//! human-readable summary lines, then generic token counting. A parser never
//! fails; at worst it reports zero counts with [`SignalSource::None`].

pub mod deps;
pub mod json_block;
pub mod lint;
pub mod risk;
pub mod test_report;
pub mod todo;

pub use deps::{OutdatedPackage, Severity, Vulnerability};
pub use json_block::extract_json;
pub use lint::LintCounts;
pub use risk::classify_risk;
pub use test_report::{ReportFormat, TestCase, TestRunSummary};
pub use todo::{MarkerKind, TodoMarker};

/// Which tier produced a parse result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignalSource {
	/// Machine-readable report.
	Structured,
	/// Human-readable summary line.
	Summary,
	/// Token or marker counting.
	Heuristic,
	/// Nothing recognisable.
	#[default]
	None,
}
