// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Code-health jobs for Locus.
//!
//! The four built-in analyzers (lint scan, TODO cleanup, flaky test
//! detection, dependency check), the [`JobRegistry`] mapping job types to
//! them, and the [`JobRunner`] that persists runs and emits lifecycle events.

pub mod analyzers;
pub mod registry;
pub mod runner;
pub mod toolkit;

#[cfg(test)]
mod testing;

pub use analyzers::{
	classify_runs, DependencyCheckJob, FlakyTestJob, LintScanJob, Linter, PackageManager,
	TestClassification, TestRunner, TodoCleanupJob, Verdict,
};
pub use registry::JobRegistry;
pub use runner::{BatchEntry, BatchReport, JobRunner};
pub use toolkit::{auto_pr_config, JobToolkit};
