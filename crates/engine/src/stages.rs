// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stage engine (C6): the ten individually invocable stages, plus the
//! classifier (C4) and blocking-rule (C5) glue STORAGE_WF needs.

use crate::credential;
use crate::invocation::Invocation;
use crate::notifier::Notifier;
use crate::workflow_client::{log_workflow, WorkflowClient};
use bur_adapters::{ExecAdapter, MailTransport, WorkflowTransport};
use bur_core::blocking::{evaluate, WorkflowTypeCounts};
use bur_core::clock::Clock;
use bur_core::config::GlobalConfig;
use bur_core::stage::StageOutcome;
use bur_core::tag;
use tracing::{error, info, warn};

/// Holds everything a stage needs: the adapters, the workflow client, the
/// notifier, a clock for wall-clock-sensitive output, and the resolved
/// configuration. Generic over every I/O boundary so it runs unchanged
/// against real or fake adapters.
pub struct StageEngine<E, W, M, C>
where
    E: ExecAdapter,
    W: WorkflowTransport,
    M: MailTransport,
    C: Clock,
{
    exec: E,
    workflow: WorkflowClient<W>,
    notifier: Notifier<M>,
    clock: C,
    config: GlobalConfig,
}

impl<E, W, M, C> StageEngine<E, W, M, C>
where
    E: ExecAdapter,
    W: WorkflowTransport,
    M: MailTransport,
    C: Clock,
{
    pub fn new(exec: E, workflow: WorkflowClient<W>, notifier: Notifier<M>, clock: C, config: GlobalConfig) -> Self {
        Self {
            exec,
            workflow,
            notifier,
            clock,
            config,
        }
    }

    /// KEY: delegates to [`credential::ensure_key`].
    pub async fn key(&self, inv: &Invocation) -> StageOutcome {
        info!("Stage >>> ensure private key");
        StageOutcome::from_bool(credential::ensure_key(&self.exec, &self.notifier, inv).await)
    }

    /// STORAGE_WF: fleet-wide blocking-rule check across every configured
    /// tenancy. A tenancy whose fetch fails contributes nothing rather
    /// than failing the whole stage.
    pub async fn storage_wf(&self, _inv: &Invocation) -> StageOutcome {
        info!("Stage >>> check for workflows on all tenancies");
        let mut counts = WorkflowTypeCounts::default();
        for (customer, lcm) in &self.config.tenancies {
            let snapshot = self.workflow.fetch_snapshot(lcm).await;
            let active_types = snapshot.active_storage_workflow_types();
            if active_types.is_empty() {
                info!(customer, "no workflows running");
            } else {
                info!(customer, "workflows running");
                for record in snapshot.active_storage_wfs() {
                    log_workflow(record);
                }
            }
            counts.record_tenancy(&active_types);
        }
        StageOutcome::from_bool(evaluate(&counts, &self.config.blocking_wf_rules))
    }

    /// ALL_WF: any active workflow on *this* tenancy.
    pub async fn all_wf(&self, inv: &Invocation) -> StageOutcome {
        info!(lcm = %inv.tenancy.lcm_host, "Stage >>> check for any workflows");
        match self.workflow.try_fetch_snapshot(&inv.tenancy.lcm_host).await {
            Ok(snapshot) => {
                let active = snapshot.active();
                if active.is_empty() {
                    info!("no active workflows");
                    StageOutcome::Success
                } else {
                    info!("there are workflows running");
                    for record in active {
                        log_workflow(record);
                    }
                    StageOutcome::Failure
                }
            }
            Err(err) => {
                warn!(%err, "failed to retrieve workflows");
                StageOutcome::Indeterminate
            }
        }
    }

    /// RETENTION: `consul kv put` of the configured retention value.
    pub async fn retention(&self, inv: &Invocation) -> StageOutcome {
        info!("Stage >>> set retention");
        let consul_cmd = format!(
            "consul kv put enm/applications/bur/services/backup/retention_value {}",
            self.config.retention_value
        );
        let out = self
            .exec
            .ssh_exec(&inv.tenancy.enm_key_path, "cloud-user", &inv.tenancy.lcm_host, &consul_cmd)
            .await;
        if out.success() {
            return StageOutcome::Success;
        }
        error!(stderr = %out.stderr_str(), "failed to set retention");
        let msg = format!("Failed to set consul retention value on {}", inv.tenancy.lcm_host);
        self.notifier.notify(inv, false, &msg).await;
        StageOutcome::Failure
    }

    /// `_get_backup_tag`: never throws, degrades to the unknown-version
    /// form on any parse or transport failure.
    pub async fn get_backup_tag(&self, inv: &Invocation) -> String {
        let consul_cmd = "consul kv get enm/deployment/enm_version";
        let out = self
            .exec
            .ssh_exec(&inv.tenancy.enm_key_path, "cloud-user", &inv.tenancy.lcm_host, consul_cmd)
            .await;
        if !out.success() {
            warn!("failed to get ENM version from consul");
        }
        tag::generate(&inv.tenancy.deployment_id, &out.stdout_str(), self.clock.local_now())
    }

    /// BACKUP: triggers the external backup script and parses its id out
    /// of stdout. Returns the stage outcome plus the one-line info string
    /// the original prints to stdout.
    pub async fn backup(&self, inv: &mut Invocation) -> (StageOutcome, String) {
        if inv.tag.is_none() {
            inv.tag = Some(self.get_backup_tag(inv).await);
        }
        let tag = inv.tag.clone().unwrap_or_default();

        info!("Stage >>> start backup");
        let cmd = format!("{} --lcm={} --tag={} --stdout", self.config.backup_cmd, inv.tenancy.lcm_host, tag);
        let out = self.exec.run(&cmd, None, true).await;

        let backup_id = parse_backup_id(&out.stdout_str());
        inv.backup_id = backup_id.clone();

        let Some(backup_id) = backup_id else {
            error!("failed to get backup id, assuming no backup");
            return (StageOutcome::Failure, format!("ID: None  TAG: {tag}"));
        };

        let info_line = format!("ID: {backup_id}  TAG: {tag}");
        if out.success() {
            info!(backup_id, %tag, "backup started");
            return (StageOutcome::Success, info_line);
        }

        error!("starting backup failed");
        let msg = format!("Failed to start backup on {}", inv.tenancy.lcm_host);
        self.notifier.notify(inv, false, &msg).await;
        (StageOutcome::Failure, info_line)
    }

    /// RUNNING: requires `backup_id`; true while the backup workflow is
    /// still active.
    pub async fn running(&self, inv: &Invocation) -> StageOutcome {
        info!("Stage >>> is backup running");
        let Some(backup_id) = inv.backup_id.as_deref() else {
            error!("no backup ID to check backup state");
            return StageOutcome::Indeterminate;
        };

        match self.workflow.try_fetch_snapshot(&inv.tenancy.lcm_host).await {
            Ok(snapshot) => match snapshot.by_id(backup_id) {
                Some(record) => {
                    log_workflow(record);
                    if record.is_terminal_bad() {
                        error!("backup has a problem");
                        StageOutcome::Failure
                    } else if record.active {
                        info!("backup is running");
                        StageOutcome::Success
                    } else {
                        info!("backup is not running");
                        StageOutcome::Failure
                    }
                }
                None => {
                    error!("backup not found");
                    StageOutcome::Indeterminate
                }
            },
            Err(err) => {
                warn!(%err, "failed to retrieve workflows from LCM");
                StageOutcome::Indeterminate
            }
        }
    }

    /// CHECK: verifies the finished backup workflow reached its success
    /// terminal node.
    pub async fn check(&self, inv: &Invocation) -> StageOutcome {
        info!("Stage >>> checking if backup completed ok");
        let fail_msg = format!(
            "Backup with tag {} and ID {} has failed",
            inv.tag.as_deref().unwrap_or("None"),
            inv.backup_id.as_deref().unwrap_or("None")
        );

        let Some(backup_id) = inv.backup_id.as_deref() else {
            error!("no backup ID to check backup state");
            self.notifier.notify(inv, false, &fail_msg).await;
            return StageOutcome::Indeterminate;
        };

        let record = match self.workflow.try_fetch_snapshot(&inv.tenancy.lcm_host).await {
            Ok(snapshot) => snapshot.by_id(backup_id).cloned(),
            Err(err) => {
                warn!(%err, "failed to retrieve workflows from LCM");
                None
            }
        };

        let Some(record) = record else {
            error!("backup could not be retrieved");
            self.notifier.notify(inv, false, &fail_msg).await;
            return StageOutcome::Indeterminate;
        };

        log_workflow(&record);

        if record.is_terminal_bad() {
            error!("backup has a problem");
            self.notifier.notify(inv, false, &fail_msg).await;
            return StageOutcome::Failure;
        }

        if record.active {
            info!("backup is running");
            return StageOutcome::Failure;
        }

        if record.is_terminal_good() {
            info!("backup workflow completed ok");
            return StageOutcome::Success;
        }

        error!("backup has failed");
        self.notifier.notify(inv, false, &fail_msg).await;
        StageOutcome::Failure
    }

    /// VALIDATE: starts the validation workflow, then polls every 60s.
    pub async fn validate(&self, inv: &Invocation) -> StageOutcome {
        info!("Stage >>> verify backup state");
        let tag = inv.tag.clone().unwrap_or_default();

        let Some(wf_id) = self.workflow.start_validation(&inv.tenancy.lcm_host, &tag, &self.clock).await else {
            error!("failed to start validation workflow");
            self.notifier.notify(inv, false, "Failed to start validation workflow").await;
            return StageOutcome::Failure;
        };

        let wait = std::time::Duration::from_secs(60);
        let deadline = tokio::time::Instant::now()
            + self.config.timers.max_validation_time.saturating_sub(wait);

        while tokio::time::Instant::now() < deadline {
            info!(wait_s = wait.as_secs(), "waiting to check workflow");
            tokio::time::sleep(wait).await;

            let snapshot = match self.workflow.try_fetch_snapshot(&inv.tenancy.lcm_host).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(%err, "failed to retrieve workflows from LCM");
                    continue;
                }
            };

            let Some(val_wf) = snapshot.by_id(&wf_id) else {
                warn!("did not get validation workflow");
                continue;
            };

            if val_wf.end_node_id == "ValidateBackupsEnd" {
                info!("backup has been validated and is good");
                return StageOutcome::Success;
            }

            if val_wf.end_node_id == "BackupValidationFailed" {
                error!("backup has been validated and is NOT GOOD");
                self.notifier.notify(inv, false, "Backup is not good, validation failed").await;
                return StageOutcome::Failure;
            }

            if val_wf.is_terminal_bad() {
                error!("backup validation has a problem");
                log_workflow(val_wf);
                self.notifier.notify(inv, false, "Backup validation failed").await;
                return StageOutcome::Failure;
            }
        }

        error!("failed to run backup validation workflow");
        StageOutcome::Indeterminate
    }

    /// METADATA: exports a metadata sidecar and ships it to the NFS target.
    pub async fn metadata(&self, inv: &Invocation) -> StageOutcome {
        info!("Stage >>> get backup metadata");
        let tag = inv.tag.clone().unwrap_or_default();
        const META_FILE: &str = "backup.metadata";
        let dest = format!("{}/{}/{}/{}", self.config.nfs.root_path, inv.tenancy.deployment_id, tag, META_FILE);

        let cmd = format!(
            "{} export --filename {META_FILE} --rcfile {} --tag {tag}",
            self.config.metadata_cmd, inv.tenancy.keystone_rc_path
        );
        let out = self.exec.run(&cmd, None, true).await;

        let file_exists = tokio::fs::try_exists(META_FILE).await.unwrap_or(false);
        if !(out.success() && file_exists) {
            error!(stdout = %out.stdout_str(), stderr = %out.stderr_str(), "failed to generate metadata file");
            self.notifier.notify(inv, false, "Failed to generate backup metadata").await;
            return StageOutcome::Failure;
        }
        info!("metadata file created ok");

        let transfer = self
            .exec
            .scp_put(&self.config.nfs.key_path, &self.config.nfs.user, &self.config.nfs.host, META_FILE, &dest)
            .await;
        if transfer.success() {
            info!(dest, "metadata file transferred to nfs ok");
            return StageOutcome::Success;
        }

        error!(stdout = %transfer.stdout_str(), stderr = %transfer.stderr_str(), "failed to transfer metadata file");
        self.notifier.notify(inv, false, "Failed to transfer metadata to backup server").await;
        StageOutcome::Failure
    }

    /// FLAG: creates the `BACKUP_OK` success marker on the NFS target.
    pub async fn flag(&self, inv: &Invocation) -> StageOutcome {
        info!("Stage >>> create success flag");
        let tag = inv.tag.clone().unwrap_or_default();
        let ok_file = format!("{}/{}/{}/BACKUP_OK", self.config.nfs.root_path, inv.tenancy.deployment_id, tag);
        let touch_cmd = format!("touch {ok_file}");
        let out = self
            .exec
            .ssh_exec(&self.config.nfs.key_path, &self.config.nfs.user, &self.config.nfs.host, &touch_cmd)
            .await;

        if out.success() {
            info!(ok_file, "success flag created");
            return StageOutcome::Success;
        }

        error!(stdout = %out.stdout_str(), stderr = %out.stderr_str(), "failed to create success flag");
        self.notifier.notify(inv, false, "Failed to create success flag on backup server").await;
        StageOutcome::Failure
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier<M> {
        &self.notifier
    }
}

/// Scans `stdout` for the first line containing `Backup workflow requested
/// with`, taking the last whitespace-separated token with its trailing
/// `.` stripped. Falls back to a structured `{"instanceId": "..."}` line
/// for scripts that emit JSON instead of the human-readable sentence.
fn parse_backup_id(stdout: &str) -> Option<String> {
    if let Some(line) = stdout.lines().find(|line| line.contains("Backup workflow requested with")) {
        let last = line.split_whitespace().last()?;
        return Some(last.trim_end_matches('.').to_string());
    }

    stdout.lines().find_map(|line| {
        let line = line.trim();
        if !(line.starts_with('{') && line.ends_with('}')) {
            return None;
        }
        let value: serde_json::Value = serde_json::from_str(line).ok()?;
        value.get("instanceId")?.as_str().map(str::to_string)
    })
}

#[cfg(test)]
#[path = "stages_tests.rs"]
mod tests;
