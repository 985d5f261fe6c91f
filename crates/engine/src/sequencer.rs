// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The sequencer (C7): composes the ten stages into the two timed
//! waiters (`check_for_wfs`, `wait_for_backup`) and the full `ALL`
//! pipeline.

use crate::invocation::Invocation;
use crate::notifier::Notifier;
use crate::stages::StageEngine;
use bur_adapters::{ExecAdapter, MailTransport, WorkflowTransport};
use bur_core::clock::Clock;
use bur_core::stage::StageOutcome;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

const WFS_RETRY_WAIT: Duration = Duration::from_secs(120);
const BACKUP_INITIAL_WAIT: Duration = Duration::from_secs(30);
const BACKUP_POLL_WAIT: Duration = Duration::from_secs(300);

/// Wraps a [`StageEngine`] with the timed composition rules above it.
pub struct Sequencer<E, W, M, C>
where
    E: ExecAdapter,
    W: WorkflowTransport,
    M: MailTransport,
    C: Clock,
{
    stages: StageEngine<E, W, M, C>,
}

impl<E, W, M, C> Sequencer<E, W, M, C>
where
    E: ExecAdapter,
    W: WorkflowTransport,
    M: MailTransport,
    C: Clock,
{
    pub fn new(stages: StageEngine<E, W, M, C>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &StageEngine<E, W, M, C> {
        &self.stages
    }

    fn notifier(&self) -> &Notifier<M> {
        self.stages.notifier()
    }

    /// Waits until no blocking workflow is running anywhere, bounded by
    /// `max_start_delay`. Retries every 120s.
    pub async fn check_for_wfs(&self, inv: &Invocation) -> StageOutcome {
        info!("wait for no workflows");
        let max_delay = self.stages.config().timers.max_start_delay;
        let deadline = Instant::now() + max_delay.saturating_sub(WFS_RETRY_WAIT);

        while Instant::now() < deadline {
            let storage_ok = if self.stages.config().skip_all_check {
                info!("not checking other tenancies' workflows");
                true
            } else {
                match self.stages.storage_wf(inv).await {
                    StageOutcome::Success => true,
                    StageOutcome::Failure => false,
                    // Storage layer considered down; don't let it block.
                    StageOutcome::Indeterminate => true,
                }
            };

            if storage_ok {
                match self.stages.all_wf(inv).await {
                    StageOutcome::Success => {
                        info!("no workflows running on this tenancy");
                        return StageOutcome::Success;
                    }
                    StageOutcome::Failure => info!("workflows are running on this tenancy"),
                    StageOutcome::Indeterminate => warn!("failed to check workflows"),
                }
            }

            info!(wait_s = WFS_RETRY_WAIT.as_secs(), "waiting before checking again");
            tokio::time::sleep(WFS_RETRY_WAIT).await;
        }

        error!("timed out waiting for no workflows");
        StageOutcome::Failure
    }

    /// Waits for the backup workflow to leave its active state, bounded by
    /// `max_duration` per attempt; the outer loop is unbounded when
    /// `fail_long_backup` is false, so a deployment that would rather wait
    /// forever than declare a long backup failed can do so.
    pub async fn wait_for_backup(&self, inv: &Invocation) -> StageOutcome {
        info!("wait for backup");
        tokio::time::sleep(BACKUP_INITIAL_WAIT).await;

        loop {
            let max_duration = self.stages.config().timers.max_duration;
            let deadline = Instant::now() + max_duration.saturating_sub(BACKUP_POLL_WAIT);
            let mut indeterminate_streak = 0u8;

            while Instant::now() < deadline {
                match self.stages.running(inv).await {
                    StageOutcome::Success => {
                        indeterminate_streak = 0;
                        info!(wait_s = BACKUP_POLL_WAIT.as_secs(), "rechecking later");
                        tokio::time::sleep(BACKUP_POLL_WAIT).await;
                    }
                    StageOutcome::Indeterminate => {
                        error!("failed to retrieve backup");
                        indeterminate_streak += 1;
                        if indeterminate_streak == 3 {
                            return StageOutcome::Indeterminate;
                        }
                        tokio::time::sleep(BACKUP_POLL_WAIT).await;
                    }
                    StageOutcome::Failure => {
                        info!("backup is not running");
                        return StageOutcome::Success;
                    }
                }
            }

            if self.stages.config().fail_long_backup {
                warn!("timed out waiting for backup to complete");
                return StageOutcome::Failure;
            }

            warn!("backup is taking longer than expected");
            self.notifier()
                .notify(inv, true, "Warning, the backup is taking longer than expected")
                .await;
        }
    }

    /// Runs the whole sequence: KEY -> wait-for-quiet -> RETENTION ->
    /// BACKUP -> wait-for-backup -> CHECK -> VALIDATE -> METADATA -> FLAG,
    /// short-circuiting on the first non-success. The sequence itself
    /// never returns `Indeterminate` — every sub-stage's non-success
    /// (including its own `Indeterminate`) collapses to an overall
    /// failure, matching the original's plain boolean `run()`.
    pub async fn run(&self, inv: &mut Invocation) -> StageOutcome {
        info!("run backup sequence");
        let mut ok = true;

        if ok && !self.stages.key(inv).await.is_success() {
            error!("failed to get working private key, backup not started");
            ok = false;
        }

        if ok && !self.check_for_wfs(inv).await.is_success() {
            error!("timed out waiting for workflows to stop, backup not started");
            self.notifier()
                .notify(inv, false, "Backup could not be started as workflows are running")
                .await;
            ok = false;
        }

        if ok && !self.stages.retention(inv).await.is_success() {
            error!("failed to set backup retention");
            ok = false;
        }

        if ok {
            let (outcome, _info) = self.stages.backup(inv).await;
            if !outcome.is_success() {
                error!("could not start backup");
                ok = false;
            }
        }

        if ok {
            let wait = self.wait_for_backup(inv).await;
            if !wait.is_success() {
                let msg = if wait.is_failure() {
                    "Timed out waiting for backup (it is still running)"
                } else {
                    "Unable to retrieve backup info"
                };
                error!("{msg}");
                self.notifier().notify(inv, false, msg).await;
                ok = false;
            }
        }

        if ok && !self.stages.check(inv).await.is_success() {
            error!("backup did not complete okay");
            ok = false;
        }

        if ok && !self.stages.validate(inv).await.is_success() {
            error!("verification of backup failed");
            ok = false;
        }

        if ok && !self.stages.metadata(inv).await.is_success() {
            error!("failed to get backup metadata");
            ok = false;
        }

        if ok && !self.stages.flag(inv).await.is_success() {
            error!("failed to create ok flag");
            ok = false;
        }

        if ok {
            info!("backup completed successfully");
        }
        StageOutcome::from_bool(ok)
    }
}

#[cfg(test)]
#[path = "sequencer_tests.rs"]
mod tests;
