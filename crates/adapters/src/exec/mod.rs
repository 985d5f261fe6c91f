// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote-exec adapter (C1): runs a shell command, locally or over
//! SSH/SCP, and never raises — every failure folds into `(exit != 0,
//! stderr)` instead.

mod process;

pub use process::ProcessExecAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ExecCall, FakeExecAdapter};

use async_trait::async_trait;
use std::collections::HashMap;

/// Result of running a command. There is deliberately no `Err` variant:
/// spawn failures and nonzero exits both land here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit == 0
    }

    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Adapter over shell execution, local and over SSH/SCP.
#[async_trait]
pub trait ExecAdapter: Clone + Send + Sync + 'static {
    /// Runs a shell-interpreted command line, optionally with extra
    /// environment variables. `log_output` gates stdout/stderr logging —
    /// callers like `ping` and the key-check path stay quiet by design.
    async fn run(
        &self,
        cmd: &str,
        env: Option<&HashMap<String, String>>,
        log_output: bool,
    ) -> ExecOutput;

    /// ICMP reachability check with a built-in bounded retry.
    async fn ping(&self, host: &str) -> bool;

    /// Runs `remote_cmd` on `host` as `user`, authenticating with `key`.
    /// Always passes `StrictHostKeyChecking=no` and
    /// `UserKnownHostsFile=/dev/null`.
    async fn ssh_exec(&self, key: &str, user: &str, host: &str, remote_cmd: &str) -> ExecOutput;

    /// Copies the local file `src` to `dst` on `host` as `user`, with the
    /// same SSH options as [`ExecAdapter::ssh_exec`].
    async fn scp_put(&self, key: &str, user: &str, host: &str, src: &str, dst: &str)
        -> ExecOutput;
}
