// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod autonomy;
mod exec;
mod flaky;
mod git;
mod logging;

pub use autonomy::AutonomyConfigLayer;
pub use exec::{ExecConfig, ExecConfigLayer};
pub use flaky::{FlakyConfig, FlakyConfigLayer};
pub use git::{GitConfig, GitConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
