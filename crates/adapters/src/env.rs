// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.
//!
//! Letting an operator shorten these in a degraded environment (or
//! lengthen them against a slow cloud API) beats hardcoding the spec's
//! defaults everywhere a timeout is constructed.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for a single `ssh`/`scp` invocation (default: see
/// [`crate::subprocess::SSH_TIMEOUT`]).
pub fn ssh_timeout() -> Duration {
    parse_duration_ms("BUR_SSH_TIMEOUT_MS").unwrap_or(crate::subprocess::SSH_TIMEOUT)
}

/// Timeout for one `ping` attempt.
pub fn ping_timeout() -> Duration {
    parse_duration_ms("BUR_PING_TIMEOUT_MS").unwrap_or(crate::subprocess::PING_TIMEOUT)
}

/// Timeout for `openstack` CLI invocations.
pub fn openstack_timeout() -> Duration {
    parse_duration_ms("BUR_OPENSTACK_TIMEOUT_MS").unwrap_or(crate::subprocess::OPENSTACK_TIMEOUT)
}

/// Timeout for the external backup/metadata scripts.
pub fn external_script_timeout() -> Duration {
    parse_duration_ms("BUR_EXTERNAL_SCRIPT_TIMEOUT_MS")
        .unwrap_or(crate::subprocess::EXTERNAL_SCRIPT_TIMEOUT)
}

/// Timeout applied to every outbound HTTP request (workflow service and
/// mail transport alike). A network call that never completes shouldn't
/// hang a stage forever, so 30s is the default ceiling.
pub fn http_timeout() -> Duration {
    parse_duration_ms("BUR_HTTP_TIMEOUT_MS").unwrap_or(Duration::from_secs(30))
}
