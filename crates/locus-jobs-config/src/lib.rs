// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for Locus jobs.
//!
//! This crate provides:
//! - Layered configuration from defaults, `locus.toml` and the environment
//! - Type-safe sections with validation
//! - Consistent environment variable naming (`LOCUS_*`)
//!
//! # Usage
//!
//! ```ignore
//! use locus_jobs_config::load_config;
//!
//! let config = load_config(project_root, None)?;
//! for job in config.resolved_jobs() {
//!     println!("{} enabled={}", job.job_type, job.enabled);
//! }
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::LocusConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, PROJECT_CONFIG_FILE,
};

use std::path::Path;

use locus_jobs_core::{AutonomyPolicy, JobConfig, JobType};
use serde_json::Value;
use tracing::{debug, info};

/// Job option keys filled in from config sections when a job does not set them.
pub mod option_keys {
	pub const TIMEOUT_SECS: &str = "timeoutSecs";
	pub const TEST_TIMEOUT_SECS: &str = "testTimeoutSecs";
	pub const INSTALL_TIMEOUT_SECS: &str = "installTimeoutSecs";
	pub const RETRY_COUNT: &str = "retryCount";
	pub const MAX_MESSAGE_CHARS: &str = "maxMessageChars";
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LocusConfig {
	pub exec: ExecConfig,
	pub flaky: FlakyConfig,
	pub git: GitConfig,
	pub autonomy: AutonomyPolicy,
	/// Batch order.
	pub jobs: Vec<JobConfig>,
	pub logging: LoggingConfig,
}

impl Default for LocusConfig {
	fn default() -> Self {
		Self {
			exec: ExecConfig::default(),
			flaky: FlakyConfig::default(),
			git: GitConfig::default(),
			autonomy: AutonomyPolicy::suggest_only(),
			jobs: default_jobs(),
			logging: LoggingConfig::default(),
		}
	}
}

impl LocusConfig {
	/// Job list with section defaults merged under each job's own options.
	pub fn resolved_jobs(&self) -> Vec<JobConfig> {
		self.jobs
			.iter()
			.map(|job| self.resolve_job(job.clone()))
			.collect()
	}

	/// Options for one job type, whether or not it appears in the job list.
	pub fn job_config(&self, job_type: JobType) -> JobConfig {
		let job = self
			.jobs
			.iter()
			.find(|j| j.job_type == job_type)
			.cloned()
			.unwrap_or_else(|| JobConfig::enabled(job_type));
		self.resolve_job(job)
	}

	fn resolve_job(&self, mut job: JobConfig) -> JobConfig {
		let mut defaults: Vec<(&str, Value)> = vec![(
			option_keys::TIMEOUT_SECS,
			self.exec.analyzer_timeout_secs.into(),
		)];
		match job.job_type {
			JobType::FlakyTestDetection => {
				defaults.push((
					option_keys::TEST_TIMEOUT_SECS,
					self.exec.test_timeout_secs.into(),
				));
				defaults.push((option_keys::RETRY_COUNT, self.flaky.retry_count.into()));
				defaults.push((
					option_keys::MAX_MESSAGE_CHARS,
					(self.flaky.max_message_chars as u64).into(),
				));
			}
			JobType::DependencyCheck => {
				defaults.push((
					option_keys::INSTALL_TIMEOUT_SECS,
					self.exec.install_timeout_secs.into(),
				));
			}
			JobType::LintScan | JobType::TodoCleanup => {}
		}

		for (key, value) in defaults {
			job.options.entry(key.to_string()).or_insert(value);
		}
		job
	}
}

fn default_jobs() -> Vec<JobConfig> {
	JobType::ALL.into_iter().map(JobConfig::enabled).collect()
}

/// Load configuration with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`LOCUS_*`)
/// 2. `explicit_path`, or `locus.toml` in the project root
/// 3. Built-in defaults
pub fn load_config(
	project_root: &Path,
	explicit_path: Option<&Path>,
) -> Result<LocusConfig, ConfigError> {
	let toml = match explicit_path {
		Some(path) => {
			if !path.exists() {
				return Err(ConfigError::FileRead {
					path: path.to_path_buf(),
					source: std::io::Error::new(
						std::io::ErrorKind::NotFound,
						"config file does not exist",
					),
				});
			}
			TomlSource::new(path)
		}
		None => TomlSource::project(project_root),
	};

	load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(toml),
		Box::new(EnvSource::new()),
	])
}

/// Load configuration from an explicit set of sources.
pub fn load_config_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<LocusConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = LocusConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: LocusConfigLayer) -> Result<LocusConfig, ConfigError> {
	let exec = layer.exec.unwrap_or_default().finalize();
	let flaky = layer.flaky.unwrap_or_default().finalize();
	let git = layer.git.unwrap_or_default().finalize();
	let autonomy = layer.autonomy.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let jobs = layer.jobs.unwrap_or_else(default_jobs);

	validate_config(&exec, &git, &jobs)?;

	info!(
		jobs = jobs.len(),
		enabled = jobs.iter().filter(|j| j.enabled).count(),
		autonomy_rules = autonomy.rules().len(),
		retry_count = flaky.retry_count,
		create_pull_requests = git.create_pull_requests,
		"Locus configuration loaded"
	);

	Ok(LocusConfig {
		exec,
		flaky,
		git,
		autonomy,
		jobs,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(exec: &ExecConfig, git: &GitConfig, jobs: &[JobConfig]) -> Result<(), ConfigError> {
	for (key, value) in [
		("exec.analyzer_timeout_secs", exec.analyzer_timeout_secs),
		("exec.test_timeout_secs", exec.test_timeout_secs),
		("exec.install_timeout_secs", exec.install_timeout_secs),
	] {
		if value == 0 {
			return Err(ConfigError::Validation(format!("{key} must be greater than 0")));
		}
	}

	if git.remote.trim().is_empty() {
		return Err(ConfigError::Validation(
			"git.remote must not be empty".to_string(),
		));
	}
	if git.branch_prefix.is_empty() || git.branch_prefix.chars().any(char::is_whitespace) {
		return Err(ConfigError::Validation(format!(
			"git.branch_prefix '{}' must be non-empty and contain no whitespace",
			git.branch_prefix
		)));
	}

	for (i, job) in jobs.iter().enumerate() {
		if jobs[..i].iter().any(|j| j.job_type == job.job_type) {
			return Err(ConfigError::Validation(format!(
				"job {} is listed more than once",
				job.job_type
			)));
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use locus_jobs_core::ChangeCategory;
	use proptest::prelude::*;

	fn from_file_and_env(
		dir: &Path,
		vars: Vec<(&'static str, &'static str)>,
	) -> Result<LocusConfig, ConfigError> {
		load_config_from_sources(vec![
			Box::new(EnvSource::from_vars(vars)),
			Box::new(TomlSource::project(dir)),
			Box::new(DefaultsSource),
		])
	}

	#[test]
	fn test_defaults_enable_every_job() {
		let dir = tempfile::tempdir().unwrap();
		let config = from_file_and_env(dir.path(), vec![]).unwrap();
		let types: Vec<_> = config.jobs.iter().map(|j| j.job_type).collect();
		assert_eq!(types, JobType::ALL.to_vec());
		assert!(config.jobs.iter().all(|j| j.enabled));
		assert!(!config.autonomy.allows(ChangeCategory::Style));
	}

	#[test]
	fn test_env_overrides_file() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(
			dir.path().join(PROJECT_CONFIG_FILE),
			"[flaky]\nretry_count = 4\nmax_message_chars = 100\n",
		)
		.unwrap();

		let config = from_file_and_env(dir.path(), vec![("LOCUS_FLAKY_RETRY_COUNT", "7")]).unwrap();
		assert_eq!(config.flaky.retry_count, 7);
		assert_eq!(config.flaky.max_message_chars, 100);
	}

	#[test]
	fn test_job_list_keeps_file_order() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(
			dir.path().join(PROJECT_CONFIG_FILE),
			r#"
[[jobs]]
job_type = "DEPENDENCY_CHECK"

[[jobs]]
job_type = "LINT_SCAN"
enabled = false
"#,
		)
		.unwrap();

		let config = from_file_and_env(dir.path(), vec![]).unwrap();
		let types: Vec<_> = config.jobs.iter().map(|j| j.job_type).collect();
		assert_eq!(types, vec![JobType::DependencyCheck, JobType::LintScan]);
		assert!(!config.jobs[1].enabled);
	}

	#[test]
	fn test_resolved_jobs_keep_per_job_options() {
		let config = LocusConfig {
			jobs: vec![JobConfig::enabled(JobType::FlakyTestDetection)
				.with_option(option_keys::RETRY_COUNT, 5)],
			..Default::default()
		};

		let job = &config.resolved_jobs()[0];
		assert_eq!(job.options[option_keys::RETRY_COUNT], 5);
		assert_eq!(job.options[option_keys::TEST_TIMEOUT_SECS], 300);
		assert_eq!(job.options[option_keys::MAX_MESSAGE_CHARS], 500);
		assert_eq!(job.options[option_keys::TIMEOUT_SECS], 120);
		assert!(!job.options.contains_key(option_keys::INSTALL_TIMEOUT_SECS));
	}

	#[test]
	fn test_job_config_for_unlisted_type() {
		let config = LocusConfig {
			jobs: vec![],
			..Default::default()
		};
		let job = config.job_config(JobType::DependencyCheck);
		assert!(job.enabled);
		assert_eq!(job.options[option_keys::INSTALL_TIMEOUT_SECS], 300);
	}

	#[test]
	fn test_zero_timeout_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let result = from_file_and_env(dir.path(), vec![("LOCUS_EXEC_TEST_TIMEOUT_SECS", "0")]);
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_branch_prefix_with_space_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let result = from_file_and_env(dir.path(), vec![("LOCUS_GIT_BRANCH_PREFIX", "my bot")]);
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_duplicate_jobs_rejected() {
		let jobs = vec![
			JobConfig::enabled(JobType::TodoCleanup),
			JobConfig::disabled(JobType::TodoCleanup),
		];
		let result = validate_config(&ExecConfig::default(), &GitConfig::default(), &jobs);
		assert!(result.is_err());
	}

	#[test]
	fn test_missing_explicit_path_is_error() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("nope.toml");
		let result = load_config(dir.path(), Some(&missing));
		assert!(matches!(result, Err(ConfigError::FileRead { .. })));
	}

	proptest! {
		#[test]
		fn per_job_retry_count_always_wins(per_job in 0u64..50, configured in 0u32..50) {
			let config = LocusConfig {
				flaky: FlakyConfig { retry_count: configured, ..Default::default() },
				jobs: vec![JobConfig::enabled(JobType::FlakyTestDetection)
					.with_option(option_keys::RETRY_COUNT, per_job)],
				..Default::default()
			};
			let job = &config.resolved_jobs()[0];
			prop_assert_eq!(job.options[option_keys::RETRY_COUNT].as_u64(), Some(per_job));
		}
	}
}
