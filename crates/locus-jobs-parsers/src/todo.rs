// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static MARKER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\b(TODO|FIXME|HACK|XXX)\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarkerKind {
	Todo,
	Fixme,
	Hack,
	Xxx,
}

impl MarkerKind {
	pub const ALL: [MarkerKind; 4] = [
		MarkerKind::Todo,
		MarkerKind::Fixme,
		MarkerKind::Hack,
		MarkerKind::Xxx,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			MarkerKind::Todo => "TODO",
			MarkerKind::Fixme => "FIXME",
			MarkerKind::Hack => "HACK",
			MarkerKind::Xxx => "XXX",
		}
	}

	fn parse(raw: &str) -> Option<Self> {
		match raw {
			"TODO" => Some(MarkerKind::Todo),
			"FIXME" => Some(MarkerKind::Fixme),
			"HACK" => Some(MarkerKind::Hack),
			"XXX" => Some(MarkerKind::Xxx),
			_ => None,
		}
	}
}

impl fmt::Display for MarkerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoMarker {
	pub file: String,
	pub line: u64,
	pub kind: MarkerKind,
	/// The matched source line, trimmed.
	pub text: String,
}

/// Parses `grep -rn` output (`file:line:content`).
///
/// The first marker on a line decides its kind. Lines without a parsable
/// line number or marker are skipped.
pub fn parse_grep_output(output: &str) -> Vec<TodoMarker> {
	output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<TodoMarker> {
	let (file, rest) = line.split_once(':')?;
	let (line_no, content) = rest.split_once(':')?;
	let line_no: u64 = line_no.parse().ok()?;
	let kind = MarkerKind::parse(MARKER.captures(content)?.get(1)?.as_str())?;

	Some(TodoMarker {
		file: file.strip_prefix("./").unwrap_or(file).to_string(),
		line: line_no,
		kind,
		text: content.trim().to_string(),
	})
}
