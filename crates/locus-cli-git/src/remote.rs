// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

/// A hosted repository identified from a git remote URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteRepo {
	/// Lowercased host without port, e.g. `github.com`.
	pub host: String,
	/// Repository path without `.git`, e.g. `owner/repo` or `group/sub/repo`.
	pub path: String,
}

impl RemoteRepo {
	pub fn is_github(&self) -> bool {
		self.host == "github.com"
	}

	/// `host/path` slug.
	pub fn slug(&self) -> String {
		format!("{}/{}", self.host, self.path)
	}
}

/// Parses a remote URL into host and repository path.
///
/// Accepts SCP-style SSH (`git@github.com:owner/repo.git`) and URL-style
/// remotes (`https://`, `http://`, `ssh://`, `git://`). Returns `None` for
/// local paths and anything unparseable.
pub fn parse_remote_url(raw: &str) -> Option<RemoteRepo> {
	let raw = raw.trim();

	if raw.is_empty() || raw.starts_with('/') || raw.starts_with('.') {
		tracing::debug!(url = raw, "remote is a local path or empty");
		return None;
	}

	let (host, path) = if raw.contains("://") {
		split_url_style(raw)?
	} else {
		split_scp_style(raw)?
	};

	let path = path.trim_matches('/');
	let path = path.strip_suffix(".git").unwrap_or(path);
	if host.is_empty() || path.is_empty() {
		return None;
	}

	let repo = RemoteRepo {
		host: host.to_lowercase(),
		path: path.to_string(),
	};
	tracing::trace!(original = raw, slug = %repo.slug(), "parsed remote URL");
	Some(repo)
}

fn split_scp_style(raw: &str) -> Option<(&str, &str)> {
	let (user_host, path) = raw.split_once(':')?;
	let host = user_host.rsplit('@').next()?;
	Some((host, path))
}

fn split_url_style(raw: &str) -> Option<(&str, &str)> {
	let (scheme, rest) = raw.split_once("://")?;
	if !matches!(scheme, "https" | "http" | "ssh" | "git") {
		return None;
	}

	let (authority, path) = rest.split_once('/')?;
	let host_port = authority.rsplit('@').next()?;
	let host = host_port.split(':').next()?;
	Some((host, path))
}
