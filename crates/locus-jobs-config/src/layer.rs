// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use locus_jobs_core::JobConfig;
use serde::{Deserialize, Serialize};

use crate::sections::{
	AutonomyConfigLayer, ExecConfigLayer, FlakyConfigLayer, GitConfigLayer, LoggingConfigLayer,
};

/// One source's partial view of the configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocusConfigLayer {
	pub exec: Option<ExecConfigLayer>,
	pub flaky: Option<FlakyConfigLayer>,
	pub git: Option<GitConfigLayer>,
	pub autonomy: Option<AutonomyConfigLayer>,
	/// Batch order is list order. A later layer's list replaces the earlier one.
	pub jobs: Option<Vec<JobConfig>>,
	pub logging: Option<LoggingConfigLayer>,
}

impl LocusConfigLayer {
	pub fn merge(&mut self, other: Self) {
		merge_section(&mut self.exec, other.exec, ExecConfigLayer::merge);
		merge_section(&mut self.flaky, other.flaky, FlakyConfigLayer::merge);
		merge_section(&mut self.git, other.git, GitConfigLayer::merge);
		merge_section(&mut self.autonomy, other.autonomy, AutonomyConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		if other.jobs.is_some() {
			self.jobs = other.jobs;
		}
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	let Some(other) = other else {
		return;
	};
	match base {
		Some(base) => merge(base, other),
		None => *base = Some(other),
	}
}
