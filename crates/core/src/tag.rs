// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup tag generation.
//!
//! The tag names the remote backup directory and is later used to look the
//! backup back up, so generation must be total: there is no stdout from the
//! remote `consul kv get` that is allowed to make this throw.

use chrono::{DateTime, Local};

/// Builds the tag string from a deployment id, the raw `consul kv get`
/// stdout, and the wall-clock moment the tag was minted.
///
/// Never fails: a stdout that doesn't look like a version banner degrades to
/// the `unknown_enm_version` form rather than returning an error.
pub fn generate(deployment_id: &str, remote_stdout: &str, now: DateTime<Local>) -> String {
    let timestamp = now.format("%Y%m%d_%H%M");
    match parse_versions(remote_stdout) {
        Some((enm, iso)) => format!(
            "{deployment_id}_{}_iso_{}__{timestamp}",
            sanitize(&enm),
            sanitize(&iso)
        ),
        None => format!("{deployment_id}_unknown_enm_version__{timestamp}"),
    }
}

/// Extracts `(enm_version, iso_version)` from a `consul kv get` banner such
/// as `"ENM 18.15 (ISO Version: 1.64.121) AOM 901 151 R1CC"`. The 2nd
/// whitespace-separated token is the ENM version; the 5th, with its
/// trailing character dropped, is the ISO version.
fn parse_versions(stdout: &str) -> Option<(String, String)> {
    let tokens: Vec<&str> = stdout.split_whitespace().collect();
    let enm = tokens.get(1)?;
    let iso_raw = tokens.get(4)?;
    let iso = iso_raw.strip_suffix(iso_raw.chars().last()?)?;
    if enm.is_empty() || iso.is_empty() {
        return None;
    }
    Some((enm.to_string(), iso.to_string()))
}

fn sanitize(version: &str) -> String {
    version.replace('.', "_")
}

#[cfg(test)]
#[path = "tag_tests.rs"]
mod tests;
