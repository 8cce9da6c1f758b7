// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt::Write;

use crate::config::AutoPrConfig;
use crate::service::AutoPrRequest;

/// Changed files listed in a pull request body before eliding the rest.
pub const MAX_LISTED_FILES: usize = 50;

/// Commit message and pull request text for automated changes.
pub struct MessageGenerator {
	config: AutoPrConfig,
}

impl MessageGenerator {
	pub fn new(config: AutoPrConfig) -> Self {
		Self { config }
	}

	/// Conventional subject, a body naming the agent and job, and a
	/// co-author trailer.
	pub fn commit_message(&self, request: &AutoPrRequest) -> String {
		let mut message = format!(
			"{}\n\nAutomated change by {} ({} job).",
			request.title.trim(),
			self.config.agent_name,
			request.job_type
		);
		if !request.summary.trim().is_empty() {
			let _ = write!(message, "\n\n{}", request.summary.trim());
		}
		let _ = write!(
			message,
			"\n\nCo-Authored-By: {} <{}>",
			self.config.agent_name, self.config.agent_email
		);
		message
	}

	pub fn pull_request_title(&self, request: &AutoPrRequest) -> String {
		request.title.trim().to_string()
	}

	pub fn pull_request_body(&self, request: &AutoPrRequest) -> String {
		let mut body = String::from("## Summary\n\n");
		body.push_str(request.summary.trim());

		let _ = write!(body, "\n\n## Changed files ({})\n\n", request.files.len());
		for file in request.files.iter().take(MAX_LISTED_FILES) {
			let _ = writeln!(body, "- `{file}`");
		}
		if request.files.len() > MAX_LISTED_FILES {
			let _ = writeln!(
				body,
				"- ...and {} more",
				request.files.len() - MAX_LISTED_FILES
			);
		}

		let risks: Vec<_> = request.risk_counts.iter().filter(|(_, n)| *n > 0).collect();
		if !risks.is_empty() {
			body.push_str("\n## Risk\n\n");
			for (level, count) in risks {
				let _ = writeln!(body, "- {level}: {count}");
			}
		}

		let _ = write!(
			body,
			"\n---\nOpened automatically by {} ({} job).\n",
			self.config.agent_name, request.job_type
		);
		body
	}
}
