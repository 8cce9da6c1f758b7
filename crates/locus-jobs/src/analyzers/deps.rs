// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use locus_cli_auto_pr::AutoPrRequest;
use locus_common_exec::{CommandSpec, DEFAULT_TIMEOUT};
use locus_jobs_config::option_keys;
use locus_jobs_core::{
	ChangeCategory, Job, JobContext, JobError, JobResult, JobSuggestion, JobType, RiskLevel,
	SuggestionType,
};
use locus_jobs_parsers::deps::{
	parse_audit_json, parse_bun_outdated, parse_outdated_json, parse_yarn_audit,
	parse_yarn_outdated,
};
use locus_jobs_parsers::risk::parse_version;
use locus_jobs_parsers::{OutdatedPackage, Severity, Vulnerability};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{changed_since, dirty_snapshot, plural, record_outcome, timeout_option};
use crate::toolkit::JobToolkit;

const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(300);

const MANIFEST: &str = "package.json";

const MANIFEST_SECTIONS: [&str; 3] = ["dependencies", "devDependencies", "optionalDependencies"];

/// Lock files in detection priority order.
const LOCK_FILES: [(&str, PackageManager); 5] = [
	("bun.lock", PackageManager::Bun),
	("bun.lockb", PackageManager::Bun),
	("pnpm-lock.yaml", PackageManager::Pnpm),
	("yarn.lock", PackageManager::Yarn),
	("package-lock.json", PackageManager::Npm),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
	Bun,
	Pnpm,
	Yarn,
	Npm,
}

impl PackageManager {
	/// The first lock file by priority decides. Several lock files should
	/// never coexist; when they do the choice is logged, not changed.
	pub fn detect(root: &Path) -> Option<(PackageManager, &'static str)> {
		let found: Vec<(&'static str, PackageManager)> = LOCK_FILES
			.into_iter()
			.filter(|(file, _)| root.join(file).is_file())
			.collect();
		let (lock_file, manager) = *found.first()?;
		if found.len() > 1 {
			let files: Vec<&str> = found.iter().map(|(file, _)| *file).collect();
			warn!(
				lock_files = ?files,
				chosen = lock_file,
				"multiple lock files found; using the highest-priority one"
			);
		}
		Some((manager, lock_file))
	}

	pub fn binary(&self) -> &'static str {
		match self {
			PackageManager::Bun => "bun",
			PackageManager::Pnpm => "pnpm",
			PackageManager::Yarn => "yarn",
			PackageManager::Npm => "npm",
		}
	}

	pub fn outdated_args(&self) -> &'static [&'static str] {
		match self {
			PackageManager::Bun => &["outdated"],
			PackageManager::Pnpm => &["outdated", "--format", "json"],
			PackageManager::Yarn | PackageManager::Npm => &["outdated", "--json"],
		}
	}

	pub fn audit_args(&self) -> &'static [&'static str] {
		&["audit", "--json"]
	}

	pub fn parse_outdated(&self, output: &str) -> Vec<OutdatedPackage> {
		match self {
			PackageManager::Bun => parse_bun_outdated(output),
			PackageManager::Yarn => parse_yarn_outdated(output),
			PackageManager::Pnpm | PackageManager::Npm => parse_outdated_json(output),
		}
	}

	pub fn parse_audit(&self, output: &str) -> Vec<Vulnerability> {
		match self {
			PackageManager::Yarn => parse_yarn_audit(output),
			PackageManager::Bun | PackageManager::Pnpm | PackageManager::Npm => {
				parse_audit_json(output)
			}
		}
	}

	/// Literal command a user can run to move `package` to `version`.
	pub fn update_command(&self, package: &str, version: &str) -> String {
		let add = match self {
			PackageManager::Npm => "npm install",
			PackageManager::Pnpm => "pnpm add",
			PackageManager::Yarn => "yarn add",
			PackageManager::Bun => "bun add",
		};
		format!("{add} {package}@{version}")
	}

	pub fn audit_fix_command(&self) -> &'static str {
		match self {
			PackageManager::Npm => "npm audit fix",
			PackageManager::Pnpm => "pnpm audit --fix",
			PackageManager::Yarn => "yarn upgrade",
			PackageManager::Bun => "bun update",
		}
	}
}

/// Rewrites the manifest's version specifiers for `updates` (name, version),
/// keeping `^`/`~` prefixes. Specifiers that are not plain versions (ranges,
/// tags, `workspace:` or `file:` links) are left alone. Returns the new
/// manifest text and the number of specifiers changed.
pub(crate) fn bump_manifest(
	content: &str,
	updates: &[(&str, &str)],
) -> Result<(String, usize), serde_json::Error> {
	let mut manifest: Value = serde_json::from_str(content)?;
	let mut changed = 0;

	for section in MANIFEST_SECTIONS {
		let Some(deps) = manifest.get_mut(section).and_then(Value::as_object_mut) else {
			continue;
		};
		for (name, version) in updates {
			let Some(Value::String(spec)) = deps.get_mut(*name) else {
				continue;
			};
			let prefix = match spec.chars().next() {
				Some(c @ ('^' | '~')) => c.to_string(),
				_ => String::new(),
			};
			if parse_version(&spec[prefix.len()..]).is_none() {
				debug!(package = %name, spec = %spec, "leaving non-version specifier alone");
				continue;
			}
			let updated = format!("{prefix}{version}");
			if *spec != updated {
				*spec = updated;
				changed += 1;
			}
		}
	}

	let mut text = serde_json::to_string_pretty(&manifest)?;
	text.push('\n');
	Ok((text, changed))
}

fn risk_counts(packages: &[OutdatedPackage]) -> [(RiskLevel, usize); 3] {
	RiskLevel::ALL.map(|risk| (risk, packages.iter().filter(|p| p.risk == risk).count()))
}

fn describe_counts(packages: &[OutdatedPackage]) -> String {
	risk_counts(packages)
		.iter()
		.map(|(risk, count)| format!("{count} {risk}"))
		.collect::<Vec<_>>()
		.join(", ")
}

fn package_suggestion(manager: PackageManager, package: &OutdatedPackage) -> JobSuggestion {
	let command = manager.update_command(&package.name, &package.latest);
	let mut description = format!(
		"`{}` is at {} (wanted {}), latest is {}. Run `{command}` to update.",
		package.name, package.current, package.wanted, package.latest
	);
	if package.risk == RiskLevel::Major {
		description.push_str(" This is a major version bump; review the changelog for breaking changes.");
	}

	JobSuggestion::new(
		SuggestionType::DependencyUpdate,
		format!(
			"Update {} from {} to {} ({})",
			package.name, package.current, package.latest, package.risk
		),
		description,
	)
	.with_meta("package", package.name.clone())
	.with_meta("current", package.current.clone())
	.with_meta("wanted", package.wanted.clone())
	.with_meta("latest", package.latest.clone())
	.with_meta("riskLevel", package.risk.as_str())
	.with_meta("updateCommand", command)
}

/// One suggestion per severity tier present, most severe first.
fn security_suggestions(manager: PackageManager, vulnerabilities: &[Vulnerability]) -> Vec<JobSuggestion> {
	Severity::ALL
		.into_iter()
		.filter_map(|severity| {
			let tier: Vec<&Vulnerability> = vulnerabilities
				.iter()
				.filter(|v| v.severity == severity)
				.collect();
			if tier.is_empty() {
				return None;
			}

			let mut description = String::new();
			for vulnerability in &tier {
				description.push_str(&format!("- `{}`: {}", vulnerability.package, vulnerability.title));
				if let Some(url) = &vulnerability.url {
					description.push_str(&format!(" ({url})"));
				}
				description.push('\n');
			}
			description.push_str(&format!(
				"\nRun `{}` to apply compatible fixes.",
				manager.audit_fix_command()
			));

			let packages: Vec<String> = tier.iter().map(|v| v.package.clone()).collect();
			let title = if tier.len() == 1 {
				format!("1 {} severity vulnerability", severity.as_str())
			} else {
				format!("{} {} severity vulnerabilities", tier.len(), severity.as_str())
			};
			Some(
				JobSuggestion::new(SuggestionType::Security, title, description)
					.with_meta("severity", severity.as_str())
					.with_meta("count", tier.len())
					.with_meta("packages", packages)
					.with_meta("auditFixCommand", manager.audit_fix_command()),
			)
		})
		.collect()
}

/// Reports outdated and vulnerable dependencies. Patch and minor updates are
/// applied automatically when allowed and no major bump is pending.
pub struct DependencyCheckJob {
	toolkit: JobToolkit,
}

impl DependencyCheckJob {
	pub fn new(toolkit: JobToolkit) -> Self {
		Self { toolkit }
	}

	fn command(&self, ctx: &JobContext, manager: PackageManager, args: &[&str]) -> CommandSpec {
		CommandSpec::new(manager.binary())
			.args(args.iter().copied())
			.cwd(&ctx.project_path)
			.timeout(timeout_option(ctx, option_keys::TIMEOUT_SECS, DEFAULT_TIMEOUT))
	}

	async fn audit(&self, ctx: &JobContext, manager: PackageManager) -> Vec<Vulnerability> {
		match self
			.toolkit
			.commands
			.run(&self.command(ctx, manager, manager.audit_args()))
			.await
		{
			Ok(output) => manager.parse_audit(&output.combined()),
			Err(e) => {
				warn!(error = %e, "audit failed; continuing without vulnerability data");
				Vec::new()
			}
		}
	}

	/// Bumps the manifest, reinstalls and commits. `None` means nothing was
	/// committed and the caller should fall back to suggestions.
	async fn auto_update(
		&self,
		ctx: &JobContext,
		manager: PackageManager,
		lock_file: &str,
		packages: &[OutdatedPackage],
		errors: &mut Vec<String>,
	) -> Option<JobResult> {
		let root = ctx.project_path.as_path();
		let before = dirty_snapshot(&self.toolkit, root).await?;
		if let Some(dirty) = [MANIFEST, lock_file].into_iter().find(|f| before.contains(*f)) {
			info!(file = dirty, "uncommitted edits present; skipping auto-update");
			errors.push(format!("{dirty} has uncommitted changes; auto-update skipped"));
			return None;
		}

		let manifest_path = root.join(MANIFEST);
		let original = match std::fs::read_to_string(&manifest_path) {
			Ok(content) => content,
			Err(e) => {
				errors.push(format!("could not read {MANIFEST}: {e}"));
				return None;
			}
		};

		let updates: Vec<(&str, &str)> = packages
			.iter()
			.map(|p| (p.name.as_str(), p.latest.as_str()))
			.collect();
		let (bumped, changed) = match bump_manifest(&original, &updates) {
			Ok(bumped) => bumped,
			Err(e) => {
				errors.push(format!("could not update {MANIFEST}: {e}"));
				return None;
			}
		};
		if changed == 0 {
			info!("no manifest specifiers to bump");
			return None;
		}
		if let Err(e) = std::fs::write(&manifest_path, bumped) {
			errors.push(format!("could not write {MANIFEST}: {e}"));
			return None;
		}

		let install = CommandSpec::new(manager.binary())
			.arg("install")
			.cwd(root)
			.timeout(timeout_option(
				ctx,
				option_keys::INSTALL_TIMEOUT_SECS,
				DEFAULT_INSTALL_TIMEOUT,
			));
		let install_error = match self.toolkit.commands.run(&install).await {
			Ok(output) if output.success() => None,
			Ok(output) => Some(format!(
				"{} install exited with {:?}: {}",
				manager.binary(),
				output.exit_code,
				output.stderr.trim()
			)),
			Err(e) => Some(e.to_string()),
		};
		if let Some(error) = install_error {
			warn!(error = %error, "install failed; reverting manifest");
			self.revert(root, &manifest_path, &original, lock_file).await;
			errors.push(error);
			return None;
		}

		let files = changed_since(&self.toolkit, root, &before).await?;
		if files.is_empty() {
			return None;
		}

		let summary = format!(
			"Updated {} ({}) across {}",
			plural(packages.len(), "dependency"),
			describe_counts(packages),
			plural(files.len(), "file"),
		);
		let request = AutoPrRequest {
			kind: "deps-update".to_string(),
			job_type: JobType::DependencyCheck.as_str().to_string(),
			title: format!("chore(deps): update {}", plural(packages.len(), "dependency")),
			summary: summary.clone(),
			files,
			risk_counts: risk_counts(packages)
				.iter()
				.filter(|(_, count)| *count > 0)
				.map(|(risk, count)| (risk.as_str().to_string(), *count))
				.collect(),
		};

		let outcome = self.toolkit.auto_pr.run(root, &request).await;
		let mut result = JobResult::clean(summary);
		if record_outcome(&mut result, &outcome) {
			info!(
				files_changed = result.files_changed,
				pr_url = ?result.pr_url,
				"dependency updates committed"
			);
			return Some(result);
		}

		errors.extend(result.errors.unwrap_or_default());
		None
	}

	async fn revert(&self, root: &Path, manifest_path: &Path, original: &str, lock_file: &str) {
		if let Err(e) = std::fs::write(manifest_path, original) {
			warn!(error = %e, "could not restore manifest");
		}
		if let Err(e) = self
			.toolkit
			.git
			.restore_files(root, &[lock_file.to_string()])
			.await
		{
			warn!(error = %e, lock_file, "could not restore lock file");
		}
	}
}

#[async_trait]
impl Job for DependencyCheckJob {
	fn job_type(&self) -> JobType {
		JobType::DependencyCheck
	}

	fn name(&self) -> &str {
		"Dependency Check"
	}

	fn description(&self) -> &str {
		"Find outdated and vulnerable dependencies and apply safe updates"
	}

	#[instrument(skip(self, ctx), fields(job_type = "DEPENDENCY_CHECK", path = %ctx.project_path.display()))]
	async fn run(&self, ctx: &JobContext) -> Result<JobResult, JobError> {
		let Some((manager, lock_file)) = PackageManager::detect(&ctx.project_path) else {
			info!("no lock file found");
			return Ok(JobResult::clean("No lock file found; dependency check skipped"));
		};
		debug!(manager = manager.binary(), lock_file, "detected package manager");

		let outdated = match self
			.toolkit
			.commands
			.run(&self.command(ctx, manager, manager.outdated_args()))
			.await
		{
			// npm and yarn exit non-zero when something is outdated.
			Ok(output) => manager.parse_outdated(&output.combined()),
			Err(e) => {
				warn!(error = %e, "outdated query could not run");
				return Ok(JobResult::with_error(
					"Dependency check could not run",
					e.to_string(),
				));
			}
		};
		let vulnerabilities = self.audit(ctx, manager).await;

		let mut packages = outdated;
		packages.sort_by(|a, b| a.risk.cmp(&b.risk).then_with(|| a.name.cmp(&b.name)));
		info!(
			outdated = packages.len(),
			vulnerabilities = vulnerabilities.len(),
			"dependency scan complete"
		);

		if packages.is_empty() && vulnerabilities.is_empty() {
			return Ok(JobResult::clean(
				"All dependencies are up to date with no known vulnerabilities",
			));
		}

		let has_major = packages.iter().any(|p| p.risk == RiskLevel::Major);
		let allowed = ctx.can_auto_execute(ChangeCategory::Dependency);
		let mut errors = Vec::new();

		if allowed && !has_major && !packages.is_empty() {
			if let Some(mut result) = self
				.auto_update(ctx, manager, lock_file, &packages, &mut errors)
				.await
			{
				result.suggestions = security_suggestions(manager, &vulnerabilities);
				return Ok(result);
			}
		}

		let mut summary = format!(
			"Found {} ({}) and {}",
			plural(packages.len(), "outdated dependency"),
			describe_counts(&packages),
			plural(vulnerabilities.len(), "vulnerability"),
		);
		if allowed && has_major {
			summary.push_str("; auto-update skipped because major version bumps need review");
		}

		let mut suggestions: Vec<JobSuggestion> = packages
			.iter()
			.map(|p| package_suggestion(manager, p))
			.collect();
		suggestions.extend(security_suggestions(manager, &vulnerabilities));

		let mut result = JobResult::clean(summary).suggestions(suggestions);
		for error in errors {
			result.push_error(error);
		}
		Ok(result)
	}
}
