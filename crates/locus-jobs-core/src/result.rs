// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::SuggestionType;

/// A single proposed or informational finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSuggestion {
	#[serde(rename = "type")]
	pub suggestion_type: SuggestionType,
	pub title: String,
	pub description: String,
	#[serde(default)]
	pub metadata: Map<String, Value>,
}

impl JobSuggestion {
	pub fn new(
		suggestion_type: SuggestionType,
		title: impl Into<String>,
		description: impl Into<String>,
	) -> Self {
		Self {
			suggestion_type,
			title: title.into(),
			description: description.into(),
			metadata: Map::new(),
		}
	}

	pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
		self.metadata.insert(key.to_string(), value.into());
		self
	}

	pub fn meta_str(&self, key: &str) -> Option<&str> {
		self.metadata.get(key).and_then(Value::as_str)
	}
}

/// Output of one analyzer run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
	pub summary: String,
	#[serde(default)]
	pub suggestions: Vec<JobSuggestion>,
	#[serde(default)]
	pub files_changed: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pr_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub errors: Option<Vec<String>>,
}

impl JobResult {
	/// Result with nothing to report.
	pub fn clean(summary: impl Into<String>) -> Self {
		Self {
			summary: summary.into(),
			..Default::default()
		}
	}

	/// Result for a step that could not execute (missing binary, timeout).
	pub fn with_error(summary: impl Into<String>, error: impl Into<String>) -> Self {
		Self {
			summary: summary.into(),
			errors: Some(vec![error.into()]),
			..Default::default()
		}
	}

	pub fn suggestions(mut self, suggestions: Vec<JobSuggestion>) -> Self {
		self.suggestions = suggestions;
		self
	}

	pub fn push_error(&mut self, error: impl Into<String>) {
		self.errors.get_or_insert_with(Vec::new).push(error.into());
	}

	pub fn has_errors(&self) -> bool {
		self.errors.as_ref().is_some_and(|e| !e.is_empty())
	}
}
