// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The KEY stage (C2): makes sure a working SSH private key for the
//! deployment's `cloud-user` account exists at `enm_key_path`, pulling a
//! fresh one from OpenStack keypair stacks via the keystone credentials
//! if the current one doesn't work.

use crate::invocation::Invocation;
use crate::notifier::Notifier;
use bur_adapters::{ExecAdapter, MailTransport};
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

const SSH_USER: &str = "cloud-user";

/// Parses a keystone RC file's contents into an environment map.
///
/// Mirrors the original's line-by-line approach exactly, including its
/// quirk of stripping *all* occurrences of `\n`, `'`, `"`, and space from
/// a line before splitting on `=` — not just surrounding whitespace, so
/// a quoted value with internal spaces loses them too. Lines containing
/// `#` or missing the `export` keyword are skipped.
pub fn parse_keystone_rc(contents: &str) -> HashMap<String, String> {
    let mut env = HashMap::new();
    for line in contents.lines() {
        if line.contains('#') || !line.contains("export") {
            continue;
        }
        let stripped: String = line
            .replacen("export ", "", usize::MAX)
            .chars()
            .filter(|c| !matches!(c, '\n' | '\'' | '"' | ' '))
            .collect();
        if let Some((key, value)) = stripped.split_once('=') {
            env.insert(key.to_string(), value.to_string());
        }
    }
    env
}

async fn read_keystone_env(path: &str) -> HashMap<String, String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => parse_keystone_rc(&contents),
        Err(err) => {
            error!(path, %err, "failed to read keystone rc file");
            HashMap::new()
        }
    }
}

/// Validates a private key by SSH-ing to `host` and running `hostname`.
async fn check_private_key(exec: &impl ExecAdapter, key_file: &str, host: &str) -> bool {
    if !tokio::fs::try_exists(key_file).await.unwrap_or(false) {
        warn!(key_file, "key file does not exist");
        return false;
    }

    let out = exec.ssh_exec(key_file, SSH_USER, host, "hostname").await;
    if out.success() {
        return true;
    }
    warn!(host, key_file, stderr = %out.stderr_str(), "ssh failed using key");
    false
}

/// Candidate key stack names from `openstack stack list`, filtered to
/// ones whose name contains `cu_key`.
async fn key_names_from_stack(exec: &impl ExecAdapter, env: &HashMap<String, String>) -> Vec<String> {
    let out = exec
        .run("openstack --insecure stack list -c 'Stack Name' -f value", Some(env), false)
        .await;
    if !out.success() {
        error!(stderr = %out.stderr_str(), "openstack stack list failed");
        return Vec::new();
    }

    let candidates: Vec<String> = out
        .stdout_str()
        .lines()
        .filter(|line| line.contains("cu_key"))
        .map(str::to_string)
        .collect();
    if candidates.is_empty() {
        error!("no keys found in stack listing");
    }
    candidates
}

/// Fetches `cloud_user_private_key` from an OpenStack keypair stack's
/// JSON output.
async fn private_key_from_stack(
    exec: &impl ExecAdapter,
    key_name: &str,
    env: &HashMap<String, String>,
) -> Option<String> {
    let cmd = format!("openstack --insecure stack show {key_name} -f json");
    let out = exec.run(&cmd, Some(env), false).await;
    if !out.success() {
        error!(key_name, stderr = %out.stderr_str(), "openstack stack show failed");
        return None;
    }

    let parsed: serde_json::Value = match serde_json::from_str(&out.stdout_str()) {
        Ok(value) => value,
        Err(err) => {
            error!(%err, "failed to parse openstack stack show JSON");
            return None;
        }
    };

    let outputs = parsed.get("outputs")?.as_array()?;
    let key = outputs.iter().find_map(|item| {
        if item.get("output_key")?.as_str()? == "cloud_user_private_key" {
            item.get("output_value")?.as_str().map(str::to_string)
        } else {
            None
        }
    });
    if key.is_none() {
        error!(key_name, "failed to get private key from openstack output");
    }
    key
}

/// Writes `key` to a mode-0600 temp file.
fn create_temp_key_file(key: &str) -> Option<NamedTempFile> {
    let file = NamedTempFile::new().ok()?;
    std::fs::write(file.path(), key).ok()?;
    std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o600)).ok()?;
    Some(file)
}

/// Ensures a working private key exists at `inv.tenancy.enm_key_path`,
/// retrieving one from OpenStack if the current key is missing or dead.
/// Never panics; every failure path logs and, at the two points the
/// original sends mail from, notifies.
pub async fn ensure_key<E: ExecAdapter, M: MailTransport>(
    exec: &E,
    notifier: &Notifier<M>,
    inv: &Invocation,
) -> bool {
    let lcm = inv.tenancy.lcm_host.as_str();

    if !exec.ping(lcm).await {
        let msg = "cannot contact the VNF-LCM, backup cannot start";
        error!("{msg}");
        notifier.notify(inv, false, msg).await;
        return false;
    }

    if check_private_key(exec, &inv.tenancy.enm_key_path, lcm).await {
        info!(key = %inv.tenancy.enm_key_path, "current key is good");
        return true;
    }

    info!("need to retrieve key from openstack");

    let keystone_env = read_keystone_env(&inv.tenancy.keystone_rc_path).await;
    if keystone_env.is_empty() {
        error!("unable to get keystone rc information");
        return false;
    }

    let key_names = key_names_from_stack(exec, &keystone_env).await;

    for key_name in &key_names {
        let Some(key_contents) = private_key_from_stack(exec, key_name, &keystone_env).await else {
            warn!(key_name, "could not get private key from stack");
            continue;
        };

        info!(key_name, "trying key");
        let Some(temp_key) = create_temp_key_file(&key_contents) else {
            error!("failed to create temporary key file");
            continue;
        };
        let temp_path = temp_key.path().to_string_lossy().into_owned();

        if !check_private_key(exec, &temp_path, lcm).await {
            warn!(key_name, "key does not work");
            continue;
        }

        info!(key_name, "key is good");

        let cp_cmd = format!("cp -f {} {}", temp_path, inv.tenancy.enm_key_path);
        let cp_out = exec.run(&cp_cmd, None, true).await;
        if !cp_out.success() {
            warn!(target = %inv.tenancy.enm_key_path, "failed to copy key");
            continue;
        }

        info!("key created successfully");
        return true;
    }

    let msg = "Failed to get valid private key, backup cannot start";
    error!("{msg}");
    notifier.notify(inv, false, msg).await;
    false
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
