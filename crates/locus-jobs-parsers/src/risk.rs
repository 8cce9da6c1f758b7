// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use locus_jobs_core::RiskLevel;
use semver::Version;

/// Buckets an upgrade from `current` to `latest` by semver distance.
///
/// Range operators (`^`, `~`, `=`, `v`) are stripped first. Anything that
/// still fails to parse is treated as [`RiskLevel::Major`].
pub fn classify_risk(current: &str, latest: &str) -> RiskLevel {
	let (Some(current), Some(latest)) = (parse_version(current), parse_version(latest)) else {
		return RiskLevel::Major;
	};

	if current.major != latest.major {
		RiskLevel::Major
	} else if current.minor != latest.minor {
		RiskLevel::Minor
	} else {
		RiskLevel::Patch
	}
}

pub fn parse_version(raw: &str) -> Option<Version> {
	let trimmed = raw
		.trim()
		.trim_start_matches(['^', '~', '=', 'v', ' ']);
	Version::parse(trimmed).ok()
}
