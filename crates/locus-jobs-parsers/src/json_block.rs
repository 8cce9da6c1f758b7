// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locates machine-readable JSON inside noisy tool output.
//!
//! Tools routinely print banners, progress lines or deprecation warnings
//! before (or after) their JSON report, so the whole stream is rarely valid
//! JSON on its own.

use serde_json::Value;

/// Returns the first balanced `{...}` or `[...]` block that parses as JSON.
///
/// Brackets inside string literals are ignored. Candidates that balance but
/// fail to parse are skipped and scanning resumes after their opening
/// bracket.
pub fn extract_json(text: &str) -> Option<Value> {
	extract_json_where(text, |_| true)
}

/// Like [`extract_json`] but only accepts an object.
pub fn extract_json_object(text: &str) -> Option<Value> {
	extract_json_object_where(text, |_| true)
}

/// First JSON block accepted by `accept`. Parsed blocks it rejects, such as
/// structured log lines, are skipped whole.
pub fn extract_json_where(text: &str, accept: impl Fn(&Value) -> bool) -> Option<Value> {
	scan(text, &[b'{', b'['], accept)
}

/// First JSON object accepted by `accept`.
pub fn extract_json_object_where(text: &str, accept: impl Fn(&Value) -> bool) -> Option<Value> {
	scan(text, &[b'{'], |value| value.is_object() && accept(value))
}

fn scan(text: &str, openers: &[u8], accept: impl Fn(&Value) -> bool) -> Option<Value> {
	let bytes = text.as_bytes();
	let mut start = 0;

	while let Some(offset) = bytes[start..].iter().position(|b| openers.contains(b)) {
		let open = start + offset;
		start = open + 1;
		let Some(close) = balanced_end(bytes, open) else {
			continue;
		};
		if let Ok(value) = serde_json::from_str::<Value>(&text[open..=close]) {
			if accept(&value) {
				return Some(value);
			}
			start = close + 1;
		}
	}

	None
}

/// Parses every line that is a standalone JSON value (NDJSON streams such as
/// `yarn --json`). Non-JSON lines are ignored.
pub fn json_lines(text: &str) -> Vec<Value> {
	text.lines()
		.map(str::trim)
		.filter(|line| line.starts_with('{') || line.starts_with('['))
		.filter_map(|line| serde_json::from_str(line).ok())
		.collect()
}

fn balanced_end(bytes: &[u8], open: usize) -> Option<usize> {
	let mut depth = 0usize;
	let mut in_string = false;
	let mut escaped = false;

	for (i, b) in bytes.iter().enumerate().skip(open) {
		if in_string {
			match (escaped, *b) {
				(true, _) => escaped = false,
				(false, b'\\') => escaped = true,
				(false, b'"') => in_string = false,
				_ => {}
			}
			continue;
		}

		match *b {
			b'"' => in_string = true,
			b'{' | b'[' => depth += 1,
			b'}' | b']' => {
				depth = depth.checked_sub(1)?;
				if depth == 0 {
					return Some(i);
				}
			}
			_ => {}
		}
	}

	None
}
