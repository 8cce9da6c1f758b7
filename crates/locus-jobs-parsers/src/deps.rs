// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Outdated-package and audit reports from bun, npm, pnpm and yarn.

use std::collections::HashSet;
use std::fmt;

use locus_jobs_core::RiskLevel;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::json_block::{extract_json_object_where, json_lines};
use crate::risk::classify_risk;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutdatedPackage {
	pub name: String,
	pub current: String,
	pub wanted: String,
	pub latest: String,
	pub risk: RiskLevel,
}

impl OutdatedPackage {
	pub fn new(
		name: impl Into<String>,
		current: impl Into<String>,
		wanted: impl Into<String>,
		latest: impl Into<String>,
	) -> Self {
		let current = current.into();
		let latest = latest.into();
		Self {
			name: name.into(),
			risk: classify_risk(&current, &latest),
			current,
			wanted: wanted.into(),
			latest,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Critical,
	High,
	Moderate,
	Low,
	Info,
}

impl Severity {
	/// Most severe first.
	pub const ALL: [Severity; 5] = [
		Severity::Critical,
		Severity::High,
		Severity::Moderate,
		Severity::Low,
		Severity::Info,
	];

	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"critical" => Severity::Critical,
			"high" => Severity::High,
			"moderate" | "medium" => Severity::Moderate,
			"low" => Severity::Low,
			_ => Severity::Info,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Severity::Critical => "critical",
			Severity::High => "high",
			Severity::Moderate => "moderate",
			Severity::Low => "low",
			Severity::Info => "info",
		}
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vulnerability {
	pub package: String,
	pub severity: Severity,
	pub title: String,
	pub url: Option<String>,
}

/// `npm outdated --json` and `pnpm outdated --format json`: an object keyed
/// by package name.
pub fn parse_outdated_json(output: &str) -> Vec<OutdatedPackage> {
	let Some(Value::Object(packages)) = extract_json_object_where(output, |v| {
		v.as_object()
			.is_some_and(|m| m.values().all(|info| info.get("latest").is_some()))
	}) else {
		return Vec::new();
	};

	packages
		.iter()
		.filter_map(|(name, info)| {
			let info = info.as_object()?;
			let latest = field(info, "latest")?;
			let wanted = field(info, "wanted").unwrap_or_else(|| latest.clone());
			// Not installed yet; classify against the wanted range.
			let current = field(info, "current").unwrap_or_else(|| wanted.clone());
			Some(OutdatedPackage::new(name.clone(), current, wanted, latest))
		})
		.collect()
}

/// `yarn outdated --json` (v1): NDJSON with a `table` event.
pub fn parse_yarn_outdated(output: &str) -> Vec<OutdatedPackage> {
	let mut packages = Vec::new();

	for event in json_lines(output) {
		if event.get("type").and_then(Value::as_str) != Some("table") {
			continue;
		}
		let Some(data) = event.get("data") else {
			continue;
		};
		let head: Vec<String> = data
			.get("head")
			.and_then(Value::as_array)
			.into_iter()
			.flatten()
			.filter_map(Value::as_str)
			.map(str::to_ascii_lowercase)
			.collect();
		let column = |name: &str| head.iter().position(|h| h == name);
		let (Some(name_col), Some(current_col), Some(latest_col)) =
			(column("package"), column("current"), column("latest"))
		else {
			continue;
		};
		let wanted_col = column("wanted");

		for row in data.get("body").and_then(Value::as_array).into_iter().flatten() {
			let Some(cells) = row.as_array() else {
				continue;
			};
			let cell = |i: usize| cells.get(i).and_then(Value::as_str).map(str::to_string);
			let (Some(name), Some(current), Some(latest)) =
				(cell(name_col), cell(current_col), cell(latest_col))
			else {
				continue;
			};
			let wanted = wanted_col.and_then(cell).unwrap_or_else(|| latest.clone());
			packages.push(OutdatedPackage::new(name, current, wanted, latest));
		}
	}

	packages
}

/// `bun outdated`: a box-drawn (or ASCII) table.
pub fn parse_bun_outdated(output: &str) -> Vec<OutdatedPackage> {
	let mut header: Option<Vec<String>> = None;
	let mut packages = Vec::new();

	for line in output.lines() {
		let cells = table_cells(line);
		if cells.len() < 3 {
			continue;
		}

		if header.is_none() {
			if cells.iter().any(|c| c.eq_ignore_ascii_case("package")) {
				header = Some(cells.iter().map(|c| c.to_ascii_lowercase()).collect());
			}
			continue;
		}
		let Some(head) = header.as_ref() else {
			continue;
		};

		let column = |name: &str| head.iter().position(|h| h == name);
		let (Some(name_col), Some(current_col), Some(latest_col)) =
			(column("package"), column("current"), column("latest"))
		else {
			break;
		};
		let wanted_col = column("update").or_else(|| column("wanted"));

		let (Some(name), Some(current), Some(latest)) = (
			cells.get(name_col),
			cells.get(current_col),
			cells.get(latest_col),
		) else {
			continue;
		};
		let name = name
			.trim_end_matches(" (dev)")
			.trim_end_matches(" (peer)")
			.trim_end_matches(" (optional)");
		let wanted = wanted_col
			.and_then(|i| cells.get(i))
			.unwrap_or(latest);
		packages.push(OutdatedPackage::new(name, current.as_str(), wanted.as_str(), latest.as_str()));
	}

	packages
}

fn is_audit_report(value: &Value) -> bool {
	value.get("vulnerabilities").is_some()
		|| value.get("advisories").is_some()
		|| value
			.as_object()
			.is_some_and(|m| m.values().all(Value::is_array))
}

/// Audit JSON from npm (`vulnerabilities` map), npm v6 / pnpm (`advisories`
/// map) or bun (package name to advisory list).
pub fn parse_audit_json(output: &str) -> Vec<Vulnerability> {
	let Some(Value::Object(report)) = extract_json_object_where(output, is_audit_report) else {
		return Vec::new();
	};

	let mut found = Vec::new();
	if let Some(Value::Object(vulns)) = report.get("vulnerabilities") {
		for (name, vuln) in vulns {
			let severity = vuln.get("severity").and_then(Value::as_str).unwrap_or("info");
			let advisory = vuln
				.get("via")
				.and_then(Value::as_array)
				.into_iter()
				.flatten()
				.find(|v| v.is_object());
			let title = advisory
				.and_then(|a| a.get("title"))
				.and_then(Value::as_str)
				.map(str::to_string)
				.unwrap_or_else(|| format!("Vulnerable dependency {name}"));
			found.push(Vulnerability {
				package: name.clone(),
				severity: Severity::parse(severity),
				title,
				url: advisory
					.and_then(|a| a.get("url"))
					.and_then(Value::as_str)
					.map(str::to_string),
			});
		}
	} else if let Some(Value::Object(advisories)) = report.get("advisories") {
		found.extend(advisories.values().filter_map(advisory));
	} else {
		for (name, entries) in &report {
			for entry in entries.as_array().into_iter().flatten() {
				let Some(title) = entry.get("title").and_then(Value::as_str) else {
					continue;
				};
				found.push(Vulnerability {
					package: name.clone(),
					severity: Severity::parse(
						entry.get("severity").and_then(Value::as_str).unwrap_or("info"),
					),
					title: title.to_string(),
					url: entry.get("url").and_then(Value::as_str).map(str::to_string),
				});
			}
		}
	}

	dedupe(found)
}

/// `yarn audit --json` (v1): NDJSON `auditAdvisory` events.
pub fn parse_yarn_audit(output: &str) -> Vec<Vulnerability> {
	let found = json_lines(output)
		.iter()
		.filter(|e| e.get("type").and_then(Value::as_str) == Some("auditAdvisory"))
		.filter_map(|e| e.get("data")?.get("advisory"))
		.filter_map(advisory)
		.collect();
	dedupe(found)
}

fn advisory(value: &Value) -> Option<Vulnerability> {
	Some(Vulnerability {
		package: value.get("module_name")?.as_str()?.to_string(),
		severity: Severity::parse(value.get("severity").and_then(Value::as_str).unwrap_or("info")),
		title: value
			.get("title")
			.and_then(Value::as_str)
			.unwrap_or("Security advisory")
			.to_string(),
		url: value.get("url").and_then(Value::as_str).map(str::to_string),
	})
}

fn dedupe(found: Vec<Vulnerability>) -> Vec<Vulnerability> {
	let mut seen = HashSet::new();
	found
		.into_iter()
		.filter(|v| seen.insert((v.package.clone(), v.title.clone())))
		.collect()
}

fn field(info: &Map<String, Value>, key: &str) -> Option<String> {
	info.get(key).and_then(Value::as_str).map(str::to_string)
}

fn table_cells(line: &str) -> Vec<String> {
	let line = line.trim();
	if !(line.starts_with('│') || line.starts_with('|')) {
		return Vec::new();
	}
	line.split(['│', '|'])
		.map(str::trim)
		.filter(|c| !c.is_empty())
		.map(str::to_string)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn npm_outdated_json() {
		let output = r#"{
			"lodash": {"current": "4.17.20", "wanted": "4.17.21", "latest": "4.17.21", "dependent": "app"},
			"react": {"current": "18.2.0", "wanted": "18.2.0", "latest": "19.0.0", "dependent": "app"},
			"zod": {"wanted": "3.23.8", "latest": "3.24.1"}
		}"#;
		let packages = parse_outdated_json(output);
		assert_eq!(packages.len(), 3);
		assert_eq!(packages[0].risk, RiskLevel::Patch);
		assert_eq!(packages[1].risk, RiskLevel::Major);
		assert_eq!(packages[2].current, "3.23.8");
		assert_eq!(packages[2].risk, RiskLevel::Minor);
	}

	#[test]
	fn outdated_and_audit_skip_structured_log_lines() {
		let outdated = "{\"level\":\"info\",\"msg\":\"checking registry\"}\n{\"lodash\": {\"current\": \"4.17.20\", \"wanted\": \"4.17.21\", \"latest\": \"4.17.21\"}}";
		let packages = parse_outdated_json(outdated);
		assert_eq!(packages.len(), 1);
		assert_eq!(packages[0].name, "lodash");

		let audit = "{\"level\":\"info\",\"msg\":\"auditing\"}\n{\"vulnerabilities\": {\"minimist\": {\"severity\": \"high\", \"via\": []}}}";
		let vulns = parse_audit_json(audit);
		assert_eq!(vulns.len(), 1);
		assert_eq!(vulns[0].severity, Severity::High);
	}

	#[test]
	fn empty_outdated_output() {
		assert!(parse_outdated_json("").is_empty());
		assert!(parse_outdated_json("{}").is_empty());
	}

	#[test]
	fn yarn_outdated_table_event() {
		let output = concat!(
			r#"{"type":"info","data":"Color legend"}"#,
			"\n",
			r#"{"type":"table","data":{"head":["Package","Current","Wanted","Latest","Package Type","URL"],"body":[["chalk","4.1.0","4.1.2","5.3.0","dependencies","https://x"]]}}"#,
			"\n"
		);
		let packages = parse_yarn_outdated(output);
		assert_eq!(packages.len(), 1);
		assert_eq!(packages[0].name, "chalk");
		assert_eq!(packages[0].wanted, "4.1.2");
		assert_eq!(packages[0].risk, RiskLevel::Major);
	}

	#[test]
	fn bun_outdated_box_table() {
		let output = "bun outdated v1.1.0\n\
┌──────────────────┬─────────┬────────┬────────┐\n\
│ Package          │ Current │ Update │ Latest │\n\
├──────────────────┼─────────┼────────┼────────┤\n\
│ typescript (dev) │ 5.4.2   │ 5.4.5  │ 5.6.3  │\n\
│ hono             │ 4.0.1   │ 4.0.9  │ 4.0.9  │\n\
└──────────────────┴─────────┴────────┴────────┘\n";
		let packages = parse_bun_outdated(output);
		assert_eq!(packages.len(), 2);
		assert_eq!(packages[0].name, "typescript");
		assert_eq!(packages[0].wanted, "5.4.5");
		assert_eq!(packages[0].risk, RiskLevel::Minor);
		assert_eq!(packages[1].risk, RiskLevel::Patch);
	}

	#[test]
	fn npm_audit_vulnerabilities_map() {
		let output = r#"{
			"auditReportVersion": 2,
			"vulnerabilities": {
				"minimist": {"name": "minimist", "severity": "critical", "via": [{"title": "Prototype Pollution", "url": "https://github.com/advisories/GHSA-1"}]},
				"mkdirp": {"name": "mkdirp", "severity": "moderate", "via": ["minimist"]}
			}
		}"#;
		let vulns = parse_audit_json(output);
		assert_eq!(vulns.len(), 2);
		assert_eq!(vulns[0].severity, Severity::Critical);
		assert_eq!(vulns[0].title, "Prototype Pollution");
		assert_eq!(vulns[1].title, "Vulnerable dependency mkdirp");
		assert_eq!(vulns[1].url, None);
	}

	#[test]
	fn pnpm_audit_advisories_map() {
		let output = r#"{"advisories": {"1096": {"module_name": "semver", "severity": "high", "title": "ReDoS", "url": "https://x/1096"}}, "metadata": {}}"#;
		let vulns = parse_audit_json(output);
		assert_eq!(vulns.len(), 1);
		assert_eq!(vulns[0].package, "semver");
		assert_eq!(vulns[0].severity, Severity::High);
	}

	#[test]
	fn bun_audit_package_lists() {
		let output = r#"{"braces": [{"id": 1, "title": "Uncontrolled resource consumption", "severity": "medium", "url": "https://x"}]}"#;
		let vulns = parse_audit_json(output);
		assert_eq!(vulns.len(), 1);
		assert_eq!(vulns[0].severity, Severity::Moderate);
	}

	#[test]
	fn yarn_audit_ndjson_dedupes() {
		let line = r#"{"type":"auditAdvisory","data":{"resolution":{},"advisory":{"module_name":"axios","severity":"low","title":"SSRF","url":"https://x"}}}"#;
		let output = format!("{line}\n{line}\n{{\"type\":\"auditSummary\",\"data\":{{}}}}\n");
		let vulns = parse_yarn_audit(&output);
		assert_eq!(vulns.len(), 1);
		assert_eq!(vulns[0].severity, Severity::Low);
	}

	#[test]
	fn severity_tiers_sort_most_severe_first() {
		let mut tiers = vec![Severity::Low, Severity::Critical, Severity::Moderate];
		tiers.sort();
		assert_eq!(tiers, vec![Severity::Critical, Severity::Moderate, Severity::Low]);
	}

	proptest! {
		/// Package-manager parsers tolerate arbitrary output.
		#[test]
		fn prop_never_panics(output in ".{0,300}") {
			let _ = parse_outdated_json(&output);
			let _ = parse_yarn_outdated(&output);
			let _ = parse_bun_outdated(&output);
			let _ = parse_audit_json(&output);
			let _ = parse_yarn_audit(&output);
		}
	}
}
