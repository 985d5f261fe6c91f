// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads the `.ini` configuration file into the core config value types,
//! mirroring `backup_utils.Cfg`'s dotted `section.option` lookups and
//! fail-fast error behaviour.

use bur_core::blocking::BlockingRule;
use bur_core::config::{to_duration, ConfigError, GlobalConfig, MailConfig, NfsConfig, TenancyConfig, Timers};
use ini::Ini;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, #[source] source: ini::Error },
    #[error("missing [{section}] section")]
    MissingSection { section: String },
    #[error("missing '{key}' in [{section}]")]
    MissingKey { section: String, key: String },
    #[error("invalid value for '{section}.{key}': {source}")]
    InvalidDuration {
        section: String,
        key: String,
        #[source]
        source: ConfigError,
    },
    #[error("invalid value for '{section}.{key}': {source}")]
    InvalidBlockingRule {
        section: String,
        key: String,
        #[source]
        source: ConfigError,
    },
    #[error("invalid boolean for '{section}.{key}': '{value}'")]
    InvalidBool { section: String, key: String, value: String },
    #[error("invalid integer for '{section}.{key}': '{value}'")]
    InvalidInt { section: String, key: String, value: String },
    #[error("customer '{0}' is not listed in general.customers")]
    UnknownCustomer(String),
}

/// The `[logging]` section; read separately from [`GlobalConfig`] since
/// logging has to stand up before anything else can usefully run.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: String,
    pub datefmt: String,
    pub log_file: String,
    pub level: String,
}

fn section<'a>(ini: &'a Ini, section: &str) -> Result<&'a ini::Properties, ConfigFileError> {
    ini.section(Some(section)).ok_or_else(|| ConfigFileError::MissingSection {
        section: section.to_string(),
    })
}

fn get<'a>(ini: &'a Ini, section_name: &str, key: &str) -> Result<&'a str, ConfigFileError> {
    section(ini, section_name)?.get(key).ok_or_else(|| ConfigFileError::MissingKey {
        section: section_name.to_string(),
        key: key.to_string(),
    })
}

fn get_duration(ini: &Ini, section_name: &str, key: &str) -> Result<std::time::Duration, ConfigFileError> {
    let raw = get(ini, section_name, key)?;
    to_duration(raw).map_err(|source| ConfigFileError::InvalidDuration {
        section: section_name.to_string(),
        key: key.to_string(),
        source,
    })
}

fn get_bool(ini: &Ini, section_name: &str, key: &str) -> Result<bool, ConfigFileError> {
    let raw = get(ini, section_name, key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigFileError::InvalidBool {
            section: section_name.to_string(),
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn get_int(ini: &Ini, section_name: &str, key: &str) -> Result<u32, ConfigFileError> {
    let raw = get(ini, section_name, key)?;
    raw.trim().parse().map_err(|_| ConfigFileError::InvalidInt {
        section: section_name.to_string(),
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Parses the ini file at `path`. Kept separate from the typed readers
/// below so callers can load once and ask it for both [`GlobalConfig`]
/// and per-customer [`TenancyConfig`]s.
pub fn parse_file(path: &Path) -> Result<Ini, ConfigFileError> {
    Ini::load_from_file(path).map_err(|source| ConfigFileError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn customer_list(ini: &Ini) -> Result<Vec<String>, ConfigFileError> {
    Ok(get(ini, "general", "customers")?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

/// Reads everything shared across every tenancy: `[general]`, `[timers]`,
/// `[nfs]`, `[mail]`, plus every customer's `lcm` host (needed by the
/// storage-wide blocking check).
pub fn load_global(ini: &Ini) -> Result<GlobalConfig, ConfigFileError> {
    let customers = customer_list(ini)?;

    let blocking_raw = get(ini, "general", "blocking_wfs")?;
    let blocking_wf_rules = BlockingRule::parse_rules(blocking_raw).map_err(|source| ConfigFileError::InvalidBlockingRule {
        section: "general".to_string(),
        key: "blocking_wfs".to_string(),
        source,
    })?;

    let mut tenancies = BTreeMap::new();
    for customer in &customers {
        let lcm = get(ini, customer, "lcm")?;
        tenancies.insert(customer.clone(), lcm.to_string());
    }

    Ok(GlobalConfig {
        backup_cmd: get(ini, "general", "backup_script")?.to_string(),
        metadata_cmd: get(ini, "general", "metadata_script")?.to_string(),
        nfs: NfsConfig {
            host: get(ini, "nfs", "ip")?.to_string(),
            user: get(ini, "nfs", "user")?.to_string(),
            key_path: get(ini, "nfs", "key")?.to_string(),
            root_path: get(ini, "nfs", "path")?.to_string(),
        },
        retention_value: get_int(ini, "general", "retention")?,
        blocking_wf_rules,
        skip_all_check: get_bool(ini, "general", "skip_check_all")?,
        fail_long_backup: get_bool(ini, "general", "fail_long_backup")?,
        timers: Timers {
            max_start_delay: get_duration(ini, "timers", "max_start_delay")?,
            max_duration: get_duration(ini, "timers", "max_duration")?,
            max_validation_time: get_duration(ini, "timers", "max_validation_time")?,
        },
        mail: MailConfig {
            url: get(ini, "mail", "url")?.to_string(),
            recipient: get(ini, "mail", "dest")?.to_string(),
        },
        tenancies,
    })
}

/// Reads the `[logging]` section.
pub fn load_logging(ini: &Ini) -> Result<LoggingConfig, ConfigFileError> {
    Ok(LoggingConfig {
        format: get(ini, "logging", "format")?.to_string(),
        datefmt: get(ini, "logging", "datefmt")?.to_string(),
        log_file: get(ini, "logging", "log_file")?.to_string(),
        level: get(ini, "logging", "level")?.to_string(),
    })
}

/// Reads the selected customer's `[<name>]` section, failing with
/// [`ConfigFileError::UnknownCustomer`] if it isn't in `general.customers`.
pub fn load_tenancy(ini: &Ini, customer: &str) -> Result<TenancyConfig, ConfigFileError> {
    if !customer_list(ini)?.iter().any(|c| c == customer) {
        return Err(ConfigFileError::UnknownCustomer(customer.to_string()));
    }

    Ok(TenancyConfig {
        deployment_id: get(ini, customer, "deployment_id")?.to_string(),
        lcm_host: get(ini, customer, "lcm")?.to_string(),
        enm_key_path: get(ini, customer, "enm_key")?.to_string(),
        keystone_rc_path: get(ini, customer, "keystone_rc")?.to_string(),
    })
}

#[cfg(test)]
#[path = "config_file_tests.rs"]
mod tests;
