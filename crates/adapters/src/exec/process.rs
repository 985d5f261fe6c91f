// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real exec adapter: shells out to `sh`, `ping`, `ssh`, and `scp`.
//!
//! SSH/SCP argv assembly is centralized here rather than left to each
//! stage, so the `StrictHostKeyChecking`/`UserKnownHostsFile` options
//! (and any future hardening) only need to be set in one place.

use super::{ExecAdapter, ExecOutput};
use crate::env;
use crate::subprocess::run_with_timeout;
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

const PING_RETRIES: u32 = 3;
const PING_RETRY_WAIT: Duration = Duration::from_secs(5);

/// Executes commands against the real OS process table and network.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecAdapter;

impl ProcessExecAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn to_exec_output(result: Result<Output, String>) -> ExecOutput {
    match result {
        Ok(output) => ExecOutput {
            exit: output.status.code().unwrap_or(1),
            stdout: output.stdout,
            stderr: output.stderr,
        },
        Err(err) => ExecOutput {
            exit: 1,
            stdout: Vec::new(),
            stderr: err.into_bytes(),
        },
    }
}

fn ssh_options() -> [&'static str; 6] {
    [
        "-o",
        "StrictHostKeyChecking=no",
        "-o",
        "UserKnownHostsFile=/dev/null",
        "-o",
        "BatchMode=Yes",
    ]
}

#[async_trait]
impl ExecAdapter for ProcessExecAdapter {
    async fn run(
        &self,
        cmd: &str,
        vars: Option<&HashMap<String, String>>,
        log_output: bool,
    ) -> ExecOutput {
        info!(cmd, "running command");
        let mut command = Command::new("sh");
        command.arg("-c").arg(cmd);
        if let Some(vars) = vars {
            command.envs(vars);
        }
        let output = to_exec_output(run_with_timeout(command, env::external_script_timeout(), cmd).await);
        if log_output {
            debug!(
                exit = output.exit,
                stdout = %output.stdout_str(),
                stderr = %output.stderr_str(),
                "command output"
            );
        }
        output
    }

    async fn ping(&self, host: &str) -> bool {
        for attempt in 0..=PING_RETRIES {
            let mut command = Command::new("ping");
            command.args(["-c", "1", host]);
            let output = to_exec_output(run_with_timeout(command, env::ping_timeout(), "ping").await);
            if output.success() {
                return true;
            }
            if attempt < PING_RETRIES {
                tokio::time::sleep(PING_RETRY_WAIT).await;
            }
        }
        false
    }

    async fn ssh_exec(&self, key: &str, user: &str, host: &str, remote_cmd: &str) -> ExecOutput {
        info!(host, remote_cmd, "ssh exec");
        let mut command = Command::new("ssh");
        command.arg("-i").arg(key);
        command.args(ssh_options());
        command.arg(format!("{user}@{host}"));
        command.arg(remote_cmd);
        to_exec_output(run_with_timeout(command, env::ssh_timeout(), "ssh").await)
    }

    async fn scp_put(
        &self,
        key: &str,
        user: &str,
        host: &str,
        src: &str,
        dst: &str,
    ) -> ExecOutput {
        info!(host, src, dst, "scp put");
        let mut command = Command::new("scp");
        command.arg("-i").arg(key);
        command.args(ssh_options());
        command.arg(src);
        command.arg(format!("{user}@{host}:{dst}"));
        to_exec_output(run_with_timeout(command, env::ssh_timeout(), "scp").await)
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
