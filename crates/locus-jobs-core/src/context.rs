// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::autonomy::AutonomyPolicy;
use crate::store::JobStore;
use crate::types::ChangeCategory;

/// Per-invocation bundle handed to an analyzer. Built fresh for every run.
#[derive(Clone)]
pub struct JobContext {
	pub workspace_id: String,
	/// Absolute path to the project's working tree.
	pub project_path: PathBuf,
	/// Free-form job options.
	pub options: Map<String, Value>,
	pub autonomy: AutonomyPolicy,
	pub store: Arc<dyn JobStore>,
}

impl JobContext {
	pub fn new(
		workspace_id: impl Into<String>,
		project_path: impl Into<PathBuf>,
		store: Arc<dyn JobStore>,
	) -> Self {
		Self {
			workspace_id: workspace_id.into(),
			project_path: project_path.into(),
			options: Map::new(),
			autonomy: AutonomyPolicy::default(),
			store,
		}
	}

	pub fn with_options(mut self, options: Map<String, Value>) -> Self {
		self.options = options;
		self
	}

	pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
		self.options.insert(key.to_string(), value.into());
		self
	}

	pub fn with_autonomy(mut self, autonomy: AutonomyPolicy) -> Self {
		self.autonomy = autonomy;
		self
	}

	pub fn can_auto_execute(&self, category: ChangeCategory) -> bool {
		self.autonomy.allows(category)
	}

	/// Integer option; numeric strings are accepted too.
	pub fn option_u64(&self, key: &str) -> Option<u64> {
		match self.options.get(key)? {
			Value::Number(n) => n.as_u64(),
			Value::String(s) => s.trim().parse().ok(),
			_ => None,
		}
	}

	pub fn option_bool(&self, key: &str) -> Option<bool> {
		match self.options.get(key)? {
			Value::Bool(b) => Some(*b),
			Value::String(s) => s.trim().parse().ok(),
			_ => None,
		}
	}

	pub fn option_str(&self, key: &str) -> Option<&str> {
		self.options.get(key).and_then(Value::as_str)
	}
}

impl fmt::Debug for JobContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("JobContext")
			.field("workspace_id", &self.workspace_id)
			.field("project_path", &self.project_path)
			.field("options", &self.options)
			.field("autonomy", &self.autonomy)
			.finish_non_exhaustive()
	}
}
