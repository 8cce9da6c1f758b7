// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fixtures shared by the analyzer, registry and runner tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use locus_cli_auto_pr::{AutoPrConfig, MockGitClient, MockPullRequestClient};
use locus_common_exec::MockCommandRunner;
use locus_jobs_core::{
	AutonomyPolicy, AutonomyRule, ChangeCategory, Job, JobContext, JobError, JobResult, JobType,
	MemoryJobStore,
};

pub fn toolkit_with(
	commands: MockCommandRunner,
	git: MockGitClient,
	pull_requests: MockPullRequestClient,
) -> crate::JobToolkit {
	crate::JobToolkit::new(
		Arc::new(commands),
		Arc::new(git),
		Arc::new(pull_requests),
		AutoPrConfig::default(),
	)
}

pub fn mock_toolkit(
	commands: MockCommandRunner,
) -> (crate::JobToolkit, MockGitClient, MockPullRequestClient) {
	let git = MockGitClient::new();
	let pull_requests = MockPullRequestClient::new();
	let toolkit = toolkit_with(commands, git.clone(), pull_requests.clone());
	(toolkit, git, pull_requests)
}

pub fn context(root: &Path) -> JobContext {
	JobContext::new("ws-1", root, Arc::new(MemoryJobStore::new()))
}

pub fn allowing(root: &Path, category: ChangeCategory) -> JobContext {
	context(root).with_autonomy(AutonomyPolicy::new(vec![AutonomyRule::allow(category)]))
}

pub fn write(root: &Path, name: &str, content: &str) {
	let path = root.join(name);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap();
	}
	std::fs::write(path, content).unwrap();
}

/// Runs git in `dir` and returns trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
	let output = std::process::Command::new("git")
		.args(args)
		.current_dir(dir)
		.output()
		.unwrap();
	String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

/// Fresh repository on `main` with `files` committed.
pub fn git_repo(files: &[(&str, &str)]) -> tempfile::TempDir {
	let dir = tempfile::tempdir().unwrap();
	git(dir.path(), &["init", "-b", "main"]);
	git(dir.path(), &["config", "user.email", "test@test.com"]);
	git(dir.path(), &["config", "user.name", "Test"]);
	git(dir.path(), &["config", "commit.gpgsign", "false"]);
	for (name, content) in files {
		write(dir.path(), name, content);
	}
	git(dir.path(), &["add", "."]);
	git(dir.path(), &["commit", "-m", "Initial commit"]);
	dir
}

/// Job returning a canned result or error.
pub struct FixedJob {
	job_type: JobType,
	name: String,
	outcome: Result<JobResult, String>,
}

#[async_trait]
impl Job for FixedJob {
	fn job_type(&self) -> JobType {
		self.job_type
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn description(&self) -> &str {
		"fixture"
	}

	async fn run(&self, _ctx: &JobContext) -> Result<JobResult, JobError> {
		self.outcome.clone().map_err(JobError::Failed)
	}
}

pub fn fixed_job(job_type: JobType, name: &str) -> Arc<dyn Job> {
	Arc::new(FixedJob {
		job_type,
		name: name.to_string(),
		outcome: Ok(JobResult::clean(format!("{name} done"))),
	})
}

pub fn job_returning(job_type: JobType, result: JobResult) -> Arc<dyn Job> {
	Arc::new(FixedJob {
		job_type,
		name: job_type.as_str().to_lowercase(),
		outcome: Ok(result),
	})
}

pub fn failing_job(job_type: JobType, message: &str) -> Arc<dyn Job> {
	Arc::new(FixedJob {
		job_type,
		name: job_type.as_str().to_lowercase(),
		outcome: Err(message.to_string()),
	})
}
