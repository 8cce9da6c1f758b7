// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! External process timeouts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecConfigLayer {
	pub analyzer_timeout_secs: Option<u64>,
	pub test_timeout_secs: Option<u64>,
	pub install_timeout_secs: Option<u64>,
}

impl ExecConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.analyzer_timeout_secs.is_some() {
			self.analyzer_timeout_secs = other.analyzer_timeout_secs;
		}
		if other.test_timeout_secs.is_some() {
			self.test_timeout_secs = other.test_timeout_secs;
		}
		if other.install_timeout_secs.is_some() {
			self.install_timeout_secs = other.install_timeout_secs;
		}
	}

	pub fn finalize(self) -> ExecConfig {
		let defaults = ExecConfig::default();
		ExecConfig {
			analyzer_timeout_secs: self
				.analyzer_timeout_secs
				.unwrap_or(defaults.analyzer_timeout_secs),
			test_timeout_secs: self.test_timeout_secs.unwrap_or(defaults.test_timeout_secs),
			install_timeout_secs: self
				.install_timeout_secs
				.unwrap_or(defaults.install_timeout_secs),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecConfig {
	pub analyzer_timeout_secs: u64,
	/// Test suites are slower than linters.
	pub test_timeout_secs: u64,
	pub install_timeout_secs: u64,
}

impl Default for ExecConfig {
	fn default() -> Self {
		Self {
			analyzer_timeout_secs: 120,
			test_timeout_secs: 300,
			install_timeout_secs: 300,
		}
	}
}

impl ExecConfig {
	pub fn analyzer_timeout(&self) -> Duration {
		Duration::from_secs(self.analyzer_timeout_secs)
	}

	pub fn test_timeout(&self) -> Duration {
		Duration::from_secs(self.test_timeout_secs)
	}

	pub fn install_timeout(&self) -> Duration {
		Duration::from_secs(self.install_timeout_secs)
	}
}
