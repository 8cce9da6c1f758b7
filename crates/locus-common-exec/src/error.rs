// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
	#[error("{binary} is not installed or not in PATH")]
	NotFound { binary: String },

	#[error("{binary} timed out after {timeout_secs}s")]
	Timeout { binary: String, timeout_secs: u64 },

	#[error("failed to run {binary}: {source}")]
	Io {
		binary: String,
		#[source]
		source: io::Error,
	},
}

impl ExecError {
	pub fn binary(&self) -> &str {
		match self {
			ExecError::NotFound { binary }
			| ExecError::Timeout { binary, .. }
			| ExecError::Io { binary, .. } => binary,
		}
	}

	pub fn is_timeout(&self) -> bool {
		matches!(self, ExecError::Timeout { .. })
	}
}
