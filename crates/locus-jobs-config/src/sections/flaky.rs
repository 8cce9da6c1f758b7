// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flaky-test sampling.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlakyConfigLayer {
	pub retry_count: Option<u32>,
	pub max_message_chars: Option<usize>,
}

impl FlakyConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.retry_count.is_some() {
			self.retry_count = other.retry_count;
		}
		if other.max_message_chars.is_some() {
			self.max_message_chars = other.max_message_chars;
		}
	}

	pub fn finalize(self) -> FlakyConfig {
		FlakyConfig {
			retry_count: self.retry_count.unwrap_or(2),
			max_message_chars: self.max_message_chars.unwrap_or(500),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlakyConfig {
	/// Extra suite runs after a failing first run. A tunable, not a
	/// guarantee that rare flakes are caught.
	pub retry_count: u32,
	/// Failure messages are truncated to this many characters.
	pub max_message_chars: usize,
}

impl Default for FlakyConfig {
	fn default() -> Self {
		FlakyConfigLayer::default().finalize()
	}
}
