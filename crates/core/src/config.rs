// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration value types shared by the engine and CLI.
//!
//! Reading the actual `.ini` file is an external collaborator's job
//! (`bur-cli::config_file`); this module only owns the parsed shapes and
//! the handful of parsing rules (duration strings, blocking-rule lists)
//! that are part of the core contract.

use crate::blocking::BlockingRule;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("duration '{0}' has no unit suffix")]
    EmptyDuration(String),
    #[error("duration unit '{0}' invalid (must be 's', 'm' or 'h')")]
    InvalidUnit(char),
    #[error("duration value '{0}' is not numeric")]
    InvalidValue(String),
    #[error("blocking rule '{0}' is malformed, expected 'N:type|type'")]
    InvalidBlockingRule(String),
    #[error("unknown workflow type '{0}' in blocking rule")]
    UnknownWorkflowType(String),
}

/// Parses a duration string of the form `<num>{s|m|h}`, e.g. `"30m"`, `"3h"`.
pub fn to_seconds(duration: &str) -> Result<u64, ConfigError> {
    if duration.is_empty() {
        return Err(ConfigError::EmptyDuration(duration.to_string()));
    }
    let mut chars = duration.chars();
    let unit = chars.next_back().ok_or_else(|| ConfigError::EmptyDuration(duration.to_string()))?;
    let value_part = chars.as_str();
    let multiplier: f64 = match unit {
        's' => 1.0,
        'm' => 60.0,
        'h' => 3600.0,
        other => return Err(ConfigError::InvalidUnit(other)),
    };
    let value: f64 = value_part
        .parse()
        .map_err(|_| ConfigError::InvalidValue(duration.to_string()))?;
    Ok((value * multiplier) as u64)
}

/// Parses the same duration string into a [`Duration`].
pub fn to_duration(duration: &str) -> Result<Duration, ConfigError> {
    to_seconds(duration).map(Duration::from_secs)
}

/// Immutable per-invocation tenancy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenancyConfig {
    pub deployment_id: String,
    pub lcm_host: String,
    pub enm_key_path: String,
    pub keystone_rc_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfsConfig {
    pub host: String,
    pub user: String,
    pub key_path: String,
    pub root_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub url: String,
    pub recipient: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    pub max_start_delay: Duration,
    pub max_duration: Duration,
    pub max_validation_time: Duration,
}

/// Immutable per-invocation global configuration, shared by every stage.
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    pub backup_cmd: String,
    pub metadata_cmd: String,
    pub nfs: NfsConfig,
    pub retention_value: u32,
    pub blocking_wf_rules: Vec<BlockingRule>,
    pub skip_all_check: bool,
    pub fail_long_backup: bool,
    pub timers: Timers,
    pub mail: MailConfig,
    /// Every known tenancy, name -> lcm host, used by the storage-wide check.
    pub tenancies: BTreeMap<String, String>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
