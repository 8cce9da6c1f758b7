// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

mod client;
mod command_client;
mod error;
mod mock_client;
mod remote;

pub use client::GitClient;
pub use command_client::{CommandGitClient, DEFAULT_GIT_TIMEOUT};
pub use error::GitError;
pub use mock_client::{MockCall, MockGitClient};
pub use remote::{parse_remote_url, RemoteRepo};
