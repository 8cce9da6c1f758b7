// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Autonomy rules.
//!
//! ```toml
//! [[autonomy.rules]]
//! category = "style"
//! auto_execute = true
//! ```

use locus_jobs_core::{AutonomyPolicy, AutonomyRule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AutonomyConfigLayer {
	pub rules: Option<Vec<AutonomyRule>>,
}

impl AutonomyConfigLayer {
	/// A later layer's rule list replaces the earlier one wholesale.
	pub fn merge(&mut self, other: Self) {
		if other.rules.is_some() {
			self.rules = other.rules;
		}
	}

	pub fn finalize(self) -> AutonomyPolicy {
		AutonomyPolicy::new(self.rules.unwrap_or_default())
	}
}
