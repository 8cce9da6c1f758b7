// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persistence interface consumed by the job runner.
//!
//! The job-run records belong to the external API. The engine only asks for
//! status transitions and never reads a run back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::types::{JobStatus, JobType, SuggestionType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJobRun {
	pub job_type: JobType,
	pub status: JobStatus,
	pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRunRecord {
	pub id: String,
	pub job_type: JobType,
	pub status: JobStatus,
	pub started_at: DateTime<Utc>,
	pub completed_at: Option<DateTime<Utc>>,
	pub result: Option<Value>,
	pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRunUpdate {
	pub status: JobStatus,
	pub completed_at: DateTime<Utc>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl JobRunUpdate {
	pub fn completed(result: Value) -> Self {
		Self {
			status: JobStatus::Completed,
			completed_at: Utc::now(),
			result: Some(result),
			error: None,
		}
	}

	pub fn failed(error: impl Into<String>) -> Self {
		Self {
			status: JobStatus::Failed,
			completed_at: Utc::now(),
			result: None,
			error: Some(error.into()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSuggestion {
	#[serde(rename = "type")]
	pub suggestion_type: SuggestionType,
	pub title: String,
	pub description: String,
	pub job_run_id: String,
	pub metadata: Map<String, Value>,
}

/// Opaque persistence client for job runs and suggestions.
#[async_trait]
pub trait JobStore: Send + Sync {
	async fn create_job_run(
		&self,
		workspace_id: &str,
		run: NewJobRun,
	) -> Result<JobRunRecord, StoreError>;

	async fn update_job_run(
		&self,
		workspace_id: &str,
		job_run_id: &str,
		update: JobRunUpdate,
	) -> Result<(), StoreError>;

	async fn create_suggestion(
		&self,
		workspace_id: &str,
		suggestion: NewSuggestion,
	) -> Result<(), StoreError>;
}
