// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `<prefix>/<kind>-<base36 millis>`, e.g. `locus/lint-fix-m1x2y3z4`.
pub fn branch_name(prefix: &str, kind: &str, now: DateTime<Utc>) -> String {
	let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
	format!("{prefix}/{kind}-{}", to_base36(millis))
}

pub fn to_base36(mut n: u64) -> String {
	if n == 0 {
		return "0".to_string();
	}
	let mut digits = Vec::new();
	while n > 0 {
		digits.push(BASE36[(n % 36) as usize]);
		n /= 36;
	}
	digits.reverse();
	String::from_utf8_lossy(&digits).into_owned()
}
