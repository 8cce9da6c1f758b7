// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::types::ChangeCategory;

/// Maps a change category to "may auto-execute" or "suggest only".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutonomyRule {
	pub category: ChangeCategory,
	#[serde(alias = "auto_execute")]
	pub auto_execute: bool,
}

impl AutonomyRule {
	pub fn allow(category: ChangeCategory) -> Self {
		Self {
			category,
			auto_execute: true,
		}
	}

	pub fn suggest_only(category: ChangeCategory) -> Self {
		Self {
			category,
			auto_execute: false,
		}
	}
}

/// Read-only autonomy rules resolved for one run.
///
/// The first rule naming a category decides it. Categories without a rule
/// are suggest-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutonomyPolicy {
	rules: Vec<AutonomyRule>,
}

impl AutonomyPolicy {
	pub fn new(rules: Vec<AutonomyRule>) -> Self {
		Self { rules }
	}

	/// Policy that never auto-executes.
	pub fn suggest_only() -> Self {
		Self::default()
	}

	pub fn allows(&self, category: ChangeCategory) -> bool {
		self.rules
			.iter()
			.find(|r| r.category == category)
			.map(|r| r.auto_execute)
			.unwrap_or(false)
	}

	pub fn rules(&self) -> &[AutonomyRule] {
		&self.rules
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn category() -> impl Strategy<Value = ChangeCategory> {
		prop_oneof![
			Just(ChangeCategory::Style),
			Just(ChangeCategory::Dependency),
			Just(ChangeCategory::TestFix),
			Just(ChangeCategory::Refactor),
			Just(ChangeCategory::Docs),
			Just(ChangeCategory::Security),
			Just(ChangeCategory::Feature),
		]
	}

	#[test]
	fn unknown_category_is_suggest_only() {
		let policy = AutonomyPolicy::new(vec![AutonomyRule::allow(ChangeCategory::Style)]);
		assert!(policy.allows(ChangeCategory::Style));
		assert!(!policy.allows(ChangeCategory::Dependency));
	}

	#[test]
	fn first_rule_wins() {
		let policy = AutonomyPolicy::new(vec![
			AutonomyRule::suggest_only(ChangeCategory::Style),
			AutonomyRule::allow(ChangeCategory::Style),
		]);
		assert!(!policy.allows(ChangeCategory::Style));
	}

	#[test]
	fn deserializes_from_rule_list() {
		let policy: AutonomyPolicy = serde_json::from_str(
			r#"[{"category":"dependency","autoExecute":true},{"category":"style","autoExecute":false}]"#,
		)
		.unwrap();
		assert!(policy.allows(ChangeCategory::Dependency));
		assert!(!policy.allows(ChangeCategory::Style));
	}

	proptest! {
		/// An empty policy never grants auto-execution.
		#[test]
		fn prop_empty_policy_denies_everything(c in category()) {
			prop_assert!(!AutonomyPolicy::suggest_only().allows(c));
		}

		/// A single rule decides exactly its own category.
		#[test]
		fn prop_single_rule_decides_own_category(c in category(), allow in any::<bool>()) {
			let policy = AutonomyPolicy::new(vec![AutonomyRule { category: c, auto_execute: allow }]);
			prop_assert_eq!(policy.allows(c), allow);
		}
	}
}
