// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! External process execution for Locus analyzers.
//!
//! Every tool invocation goes through a [`CommandRunner`]. Arguments are
//! passed straight to the binary, never through a shell. A non-zero exit code
//! is returned as data in [`CommandOutput`]; only an unresolvable binary, an
//! I/O failure or a timeout becomes an [`ExecError`].

mod error;
mod mock;
mod runner;
mod spec;

pub use error::ExecError;
pub use mock::{MockCommandRunner, MockResponse, RecordedCommand};
pub use runner::{CommandRunner, SystemCommandRunner, MAX_OUTPUT_BYTES};
pub use spec::{CommandOutput, CommandSpec, DEFAULT_TIMEOUT, PROBE_TIMEOUT};
