// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment
//! variables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use locus_jobs_core::{AutonomyRule, ChangeCategory};
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::LocusConfigLayer;
use crate::sections::{
	AutonomyConfigLayer, ExecConfigLayer, FlakyConfigLayer, GitConfigLayer, LoggingConfigLayer,
};

/// File looked up in the project root when no explicit path is given.
pub const PROJECT_CONFIG_FILE: &str = "locus.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<LocusConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<LocusConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(LocusConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `locus.toml` in the project root.
	pub fn project(root: &Path) -> Self {
		Self::new(root.join(PROJECT_CONFIG_FILE))
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<LocusConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(LocusConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: LocusConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: LOCUS_<SECTION>_<FIELD>. Autonomy rules are a comma list,
/// `LOCUS_AUTONOMY_RULES=style=true,dependency=false`.
#[derive(Default)]
pub struct EnvSource {
	vars: Option<HashMap<String, String>>,
}

impl EnvSource {
	/// Reads the process environment.
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads a fixed set of variables instead of the process environment.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		let value = match &self.vars {
			Some(vars) => vars.get(name).cloned(),
			None => std::env::var(name).ok(),
		};
		value.filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn parsed<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, ConfigError> {
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid numeric value '{v}'"),
			}),
			None => Ok(None),
		}
	}

	fn autonomy_rules(&self) -> Result<Option<Vec<AutonomyRule>>, ConfigError> {
		let Some(raw) = self.var("LOCUS_AUTONOMY_RULES") else {
			return Ok(None);
		};

		let mut rules = Vec::new();
		for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
			let (category, allowed) = entry.split_once('=').unwrap_or((entry, "true"));
			let category = parse_category(category.trim()).ok_or_else(|| ConfigError::InvalidValue {
				key: "LOCUS_AUTONOMY_RULES".to_string(),
				message: format!("unknown change category '{category}'"),
			})?;
			let auto_execute = allowed.trim().eq_ignore_ascii_case("true") || allowed.trim() == "1";
			rules.push(AutonomyRule {
				category,
				auto_execute,
			});
		}
		Ok(Some(rules))
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<LocusConfigLayer, ConfigError> {
		debug!("loading environment variables");
		let format = match self.var("LOCUS_LOG_FORMAT") {
			Some(v) => Some(v.parse().map_err(|message| ConfigError::InvalidValue {
				key: "LOCUS_LOG_FORMAT".to_string(),
				message,
			})?),
			None => None,
		};

		Ok(LocusConfigLayer {
			exec: Some(ExecConfigLayer {
				analyzer_timeout_secs: self.parsed("LOCUS_EXEC_ANALYZER_TIMEOUT_SECS")?,
				test_timeout_secs: self.parsed("LOCUS_EXEC_TEST_TIMEOUT_SECS")?,
				install_timeout_secs: self.parsed("LOCUS_EXEC_INSTALL_TIMEOUT_SECS")?,
			}),
			flaky: Some(FlakyConfigLayer {
				retry_count: self.parsed("LOCUS_FLAKY_RETRY_COUNT")?,
				max_message_chars: self.parsed("LOCUS_FLAKY_MAX_MESSAGE_CHARS")?,
			}),
			git: Some(GitConfigLayer {
				remote: self.var("LOCUS_GIT_REMOTE"),
				branch_prefix: self.var("LOCUS_GIT_BRANCH_PREFIX"),
				create_pull_requests: self.bool("LOCUS_GIT_CREATE_PULL_REQUESTS"),
				agent_name: self.var("LOCUS_GIT_AGENT_NAME"),
				agent_email: self.var("LOCUS_GIT_AGENT_EMAIL"),
				default_branch: self.var("LOCUS_GIT_DEFAULT_BRANCH"),
			}),
			autonomy: Some(AutonomyConfigLayer {
				rules: self.autonomy_rules()?,
			}),
			jobs: None,
			logging: Some(LoggingConfigLayer {
				level: self.var("LOCUS_LOG_LEVEL"),
				format,
			}),
		})
	}
}

fn parse_category(raw: &str) -> Option<ChangeCategory> {
	match raw.to_ascii_lowercase().replace('-', "_").as_str() {
		"style" => Some(ChangeCategory::Style),
		"dependency" => Some(ChangeCategory::Dependency),
		"test_fix" => Some(ChangeCategory::TestFix),
		"refactor" => Some(ChangeCategory::Refactor),
		"docs" => Some(ChangeCategory::Docs),
		"security" => Some(ChangeCategory::Security),
		"feature" => Some(ChangeCategory::Feature),
		_ => None,
	}
}
