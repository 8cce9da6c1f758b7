// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! `locus`: runs code-health jobs against a working tree.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use locus_jobs::{auto_pr_config, JobRegistry, JobRunner, JobToolkit};
use locus_jobs_config::{load_config, LogFormat, LoggingConfig};
use locus_jobs_core::{JobEvents, JobType, MemoryJobStore};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

/// Locus - autonomous code-health jobs for JavaScript and TypeScript projects.
#[derive(Parser, Debug)]
#[command(name = "locus", about = "Run Locus code-health jobs", version)]
struct Cli {
	/// Config file to use instead of `locus.toml` in the project
	#[arg(long, global = true, env = "LOCUS_CONFIG")]
	config: Option<PathBuf>,

	/// Log filter, e.g. `debug` or `locus_jobs=trace`
	#[arg(long, global = true)]
	log_level: Option<String>,

	/// Workspace the job runs are recorded under
	#[arg(long, global = true, env = "LOCUS_WORKSPACE_ID", default_value = "local")]
	workspace_id: String,

	/// Print results as JSON
	#[arg(long, global = true)]
	json: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run a single job
	Run(RunArgs),
	/// Run every enabled job in configured order
	RunAll(ProjectArgs),
	/// List the available jobs
	List(ProjectArgs),
}

#[derive(Args, Debug)]
struct ProjectArgs {
	/// Project root
	#[arg(long, default_value = ".")]
	path: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
	/// Job type, e.g. `lint-scan` or `DEPENDENCY_CHECK`
	#[arg(value_parser = parse_job_type)]
	job: JobType,

	#[command(flatten)]
	project: ProjectArgs,

	/// Job option as `key=value`; repeatable
	#[arg(long = "option", value_parser = parse_option)]
	options: Vec<(String, Value)>,
}

fn parse_job_type(raw: &str) -> Result<JobType, String> {
	raw.parse()
}

/// `key=value`, where the value is read as JSON when it parses (numbers,
/// booleans) and as a plain string otherwise.
fn parse_option(raw: &str) -> Result<(String, Value), String> {
	let (key, value) = raw
		.split_once('=')
		.ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
	let key = key.trim();
	if key.is_empty() {
		return Err(format!("missing option name in '{raw}'"));
	}
	let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
	Ok((key.to_string(), value))
}

/// `--log-level` wins over `RUST_LOG`, which wins over the config file.
fn init_logging(cli_level: Option<&str>, logging: &LoggingConfig) {
	let filter = match cli_level {
		Some(level) => EnvFilter::new(level),
		None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level)),
	};
	let registry = tracing_subscriber::registry().with(filter);
	match logging.format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init(),
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init(),
	}
}

fn project_root(args: &ProjectArgs) -> anyhow::Result<PathBuf> {
	args.path
		.canonicalize()
		.with_context(|| format!("project path {} does not exist", args.path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let root = match &cli.command {
		Command::Run(args) => project_root(&args.project)?,
		Command::RunAll(args) | Command::List(args) => project_root(args)?,
	};
	let config = load_config(&root, cli.config.as_deref()).context("failed to load configuration")?;
	init_logging(cli.log_level.as_deref(), &config.logging);

	tracing::info!(
		path = %root.display(),
		workspace_id = %cli.workspace_id,
		jobs = config.jobs.len(),
		"starting locus"
	);

	let toolkit = JobToolkit::system(auto_pr_config(&config.git));
	let registry = Arc::new(JobRegistry::with_default_jobs(toolkit));
	let runner = JobRunner::new(
		Arc::clone(&registry),
		Arc::new(MemoryJobStore::new()),
		JobEvents::default(),
	);
	let ctx = commands::base_context(&cli.workspace_id, &root, &config);
	let mut out = std::io::stdout().lock();

	match cli.command {
		Command::Run(args) => {
			commands::run(&runner, &config, ctx, args.job, args.options, cli.json, &mut out).await
		}
		Command::RunAll(_) => commands::run_all(&runner, &config, ctx, cli.json, &mut out).await,
		Command::List(_) => commands::list(&registry, &config, cli.json, &mut out),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn parses_run_with_options() {
		let cli = Cli::try_parse_from([
			"locus",
			"--json",
			"run",
			"flaky-test-detection",
			"--path",
			"/tmp/app",
			"--option",
			"retryCount=4",
			"--option",
			"label=nightly run",
		])
		.unwrap();

		assert!(cli.json);
		assert_eq!(cli.workspace_id, "local");
		let Command::Run(args) = cli.command else {
			panic!("expected run");
		};
		assert_eq!(args.job, JobType::FlakyTestDetection);
		assert_eq!(args.project.path, PathBuf::from("/tmp/app"));
		assert_eq!(
			args.options,
			vec![
				("retryCount".to_string(), json!(4)),
				("label".to_string(), json!("nightly run")),
			]
		);
	}

	#[test]
	fn global_flags_after_subcommand() {
		let cli = Cli::try_parse_from(["locus", "run-all", "--log-level", "debug", "--workspace-id", "ws-9"])
			.unwrap();
		assert_eq!(cli.log_level.as_deref(), Some("debug"));
		assert_eq!(cli.workspace_id, "ws-9");
		assert!(matches!(cli.command, Command::RunAll(ProjectArgs { ref path }) if path == &PathBuf::from(".")));
	}

	#[test]
	fn rejects_unknown_job_type() {
		assert!(Cli::try_parse_from(["locus", "run", "deploy"]).is_err());
	}

	#[test]
	fn option_values() {
		assert_eq!(parse_option("previousCount=12").unwrap(), ("previousCount".to_string(), json!(12)));
		assert_eq!(parse_option("dryRun=true").unwrap().1, json!(true));
		assert_eq!(parse_option("name=a=b").unwrap().1, json!("a=b"));
		assert_eq!(parse_option("empty=").unwrap().1, json!(""));
		assert!(parse_option("novalue").is_err());
		assert!(parse_option("=1").is_err());
	}

	proptest! {
		#[test]
		fn option_keys_survive(key in "[a-zA-Z][a-zA-Z0-9]{0,15}", value in "[a-z ]{0,20}") {
			let (parsed_key, parsed_value) = parse_option(&format!("{key}={value}")).unwrap();
			prop_assert_eq!(parsed_key, key);
			prop_assert!(parsed_value.is_string() || parsed_value.is_number() || parsed_value.is_boolean() || parsed_value.is_null());
		}
	}
}
