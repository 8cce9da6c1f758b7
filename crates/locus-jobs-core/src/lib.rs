// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared model for Locus code-health jobs.
//!
//! This crate holds the value types every analyzer produces ([`JobResult`],
//! [`JobSuggestion`]), the categorisation enums, the autonomy policy that
//! decides between auto-remediation and suggestions, the [`Job`] trait, and
//! the narrow persistence/event interface the runner reports through.

pub mod autonomy;
pub mod context;
pub mod error;
pub mod events;
pub mod job;
pub mod memory_store;
pub mod result;
pub mod store;
pub mod types;

pub use autonomy::{AutonomyPolicy, AutonomyRule};
pub use context::JobContext;
pub use error::{JobError, Result, StoreError};
pub use events::{JobEvent, JobEvents};
pub use job::{Job, JobConfig};
pub use memory_store::{MemoryJobStore, StoredSuggestion};
pub use result::{JobResult, JobSuggestion};
pub use store::{JobRunRecord, JobRunUpdate, JobStore, NewJobRun, NewSuggestion};
pub use types::{ChangeCategory, JobStatus, JobType, RiskLevel, SuggestionType, TestOutcome};
