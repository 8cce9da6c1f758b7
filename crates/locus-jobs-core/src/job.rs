// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::JobContext;
use crate::error::JobError;
use crate::result::JobResult;
use crate::types::JobType;

/// One pluggable code-health analyzer.
#[async_trait]
pub trait Job: Send + Sync {
	fn job_type(&self) -> JobType;
	fn name(&self) -> &str;
	fn description(&self) -> &str;
	async fn run(&self, ctx: &JobContext) -> Result<JobResult, JobError>;
}

/// Batch entry: which job to run, whether it is enabled, and its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
	pub job_type: JobType,
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	#[serde(default)]
	pub options: Map<String, Value>,
}

fn default_enabled() -> bool {
	true
}

impl JobConfig {
	pub fn enabled(job_type: JobType) -> Self {
		Self {
			job_type,
			enabled: true,
			options: Map::new(),
		}
	}

	pub fn disabled(job_type: JobType) -> Self {
		Self {
			enabled: false,
			..Self::enabled(job_type)
		}
	}

	pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
		self.options.insert(key.to_string(), value.into());
		self
	}
}
