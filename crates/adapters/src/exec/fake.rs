// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake exec adapter for testing.

use super::{ExecAdapter, ExecOutput};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// One recorded invocation against a [`FakeExecAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecCall {
    Run { cmd: String },
    Ping { host: String },
    SshExec { host: String, remote_cmd: String },
    ScpPut { host: String, src: String, dst: String },
}

struct FakeExecState {
    calls: Vec<ExecCall>,
    run_responses: HashMap<String, ExecOutput>,
    ssh_responses: HashMap<String, ExecOutput>,
    scp_responses: HashMap<String, ExecOutput>,
    ping_responses: HashMap<String, bool>,
    default_response: ExecOutput,
    default_ping: bool,
}

/// Scriptable stand-in for [`ExecAdapter`]. Responses are looked up by
/// substring match against the command/key/host passed in, falling back to
/// a configurable default.
#[derive(Clone)]
pub struct FakeExecAdapter {
    inner: Arc<Mutex<FakeExecState>>,
}

impl Default for FakeExecAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeExecState {
                calls: Vec::new(),
                run_responses: HashMap::new(),
                ssh_responses: HashMap::new(),
                scp_responses: HashMap::new(),
                ping_responses: HashMap::new(),
                default_response: ExecOutput {
                    exit: 0,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                },
                default_ping: true,
            })),
        }
    }
}

impl FakeExecAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_run_response(&self, cmd_substring: &str, output: ExecOutput) {
        self.inner
            .lock()
            .run_responses
            .insert(cmd_substring.to_string(), output);
    }

    pub fn set_ssh_response(&self, key_substring: &str, output: ExecOutput) {
        self.inner
            .lock()
            .ssh_responses
            .insert(key_substring.to_string(), output);
    }

    pub fn set_scp_response(&self, key_substring: &str, output: ExecOutput) {
        self.inner
            .lock()
            .scp_responses
            .insert(key_substring.to_string(), output);
    }

    pub fn set_ping(&self, host: &str, reachable: bool) {
        self.inner.lock().ping_responses.insert(host.to_string(), reachable);
    }

    pub fn set_default_response(&self, output: ExecOutput) {
        self.inner.lock().default_response = output;
    }

    pub fn set_default_ping(&self, reachable: bool) {
        self.inner.lock().default_ping = reachable;
    }
}

fn lookup(responses: &HashMap<String, ExecOutput>, needle: &str, default: &ExecOutput) -> ExecOutput {
    responses
        .iter()
        .find(|(k, _)| needle.contains(k.as_str()))
        .map(|(_, v)| v.clone())
        .unwrap_or_else(|| default.clone())
}

#[async_trait]
impl ExecAdapter for FakeExecAdapter {
    async fn run(&self, cmd: &str, _env: Option<&HashMap<String, String>>, _log_output: bool) -> ExecOutput {
        let mut state = self.inner.lock();
        state.calls.push(ExecCall::Run { cmd: cmd.to_string() });
        lookup(&state.run_responses, cmd, &state.default_response)
    }

    async fn ping(&self, host: &str) -> bool {
        let mut state = self.inner.lock();
        state.calls.push(ExecCall::Ping { host: host.to_string() });
        state.ping_responses.get(host).copied().unwrap_or(state.default_ping)
    }

    async fn ssh_exec(&self, key: &str, _user: &str, host: &str, remote_cmd: &str) -> ExecOutput {
        let mut state = self.inner.lock();
        state.calls.push(ExecCall::SshExec {
            host: host.to_string(),
            remote_cmd: remote_cmd.to_string(),
        });
        lookup(&state.ssh_responses, key, &state.default_response)
    }

    async fn scp_put(&self, key: &str, _user: &str, host: &str, src: &str, dst: &str) -> ExecOutput {
        let mut state = self.inner.lock();
        state.calls.push(ExecCall::ScpPut {
            host: host.to_string(),
            src: src.to_string(),
            dst: dst.to_string(),
        });
        lookup(&state.scp_responses, key, &state.default_response)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
