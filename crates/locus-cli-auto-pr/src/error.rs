// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use locus_cli_git::GitError;
use locus_common_exec::ExecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutoPrError {
	#[error("git error: {0}")]
	Git(#[from] GitError),

	#[error("exec error: {0}")]
	Exec(#[from] ExecError),

	#[error("pull request creation failed: {0}")]
	PullRequest(String),

	#[error("no changed files to commit")]
	NoChanges,

	#[error("not a git repository")]
	NotARepository,
}
