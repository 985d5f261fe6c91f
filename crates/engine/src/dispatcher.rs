// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher (C9): maps a CLI `--stage` keyword onto the engine call
//! it drives, validates the identifiers that keyword needs (`--tag`/`--id`)
//! before touching anything, and turns the resulting [`StageOutcome`] into
//! the post-run log line and process exit code.
//!
//! Every direct single-stage invocation that ends in `Failure` gets a
//! dispatcher-level mail, regardless of whether the stage body already sent
//! its own (some do) — a direct `--stage RETENTION` failure really does
//! mail twice, matching the deliberately-duplicated notification behavior
//! this tool is modelled on. `ALL` is the one exception: its sub-stages
//! already notify on whichever one fails, so the dispatcher only adds the
//! overall-success mail and stays quiet on overall failure. `Indeterminate`
//! never mails from here — an ambiguous outcome shouldn't page anyone
//! until a human or a retry resolves it one way or the other.

use crate::error::EngineError;
use crate::invocation::Invocation;
use crate::sequencer::Sequencer;
use bur_adapters::{ExecAdapter, MailTransport, WorkflowTransport};
use bur_core::clock::Clock;
use bur_core::stage::StageOutcome;
use std::str::FromStr;
use tracing::{error, info};

/// One of the thirteen keywords the CLI `--stage` flag accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKey {
    Key,
    StorageWf,
    AllWf,
    Retention,
    Backup,
    Running,
    Check,
    Validate,
    Metadata,
    Flag,
    All,
    Wfs,
    Wait,
}

impl StageKey {
    pub const ALL: [StageKey; 13] = [
        StageKey::Key,
        StageKey::StorageWf,
        StageKey::AllWf,
        StageKey::Retention,
        StageKey::Backup,
        StageKey::Running,
        StageKey::Check,
        StageKey::Validate,
        StageKey::Metadata,
        StageKey::Flag,
        StageKey::All,
        StageKey::Wfs,
        StageKey::Wait,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageKey::Key => "KEY",
            StageKey::StorageWf => "STORAGE_WF",
            StageKey::AllWf => "ALL_WF",
            StageKey::Retention => "RETENTION",
            StageKey::Backup => "BACKUP",
            StageKey::Running => "RUNNING",
            StageKey::Check => "CHECK",
            StageKey::Validate => "VALIDATE",
            StageKey::Metadata => "METADATA",
            StageKey::Flag => "FLAG",
            StageKey::All => "ALL",
            StageKey::Wfs => "WFS",
            StageKey::Wait => "WAIT",
        }
    }

    /// Whether `--tag` must already be set before this stage runs.
    /// BACKUP and ALL are excluded because they mint the tag themselves
    /// when it's absent.
    fn requires_tag(self) -> bool {
        matches!(
            self,
            StageKey::Running | StageKey::Check | StageKey::Validate | StageKey::Metadata | StageKey::Flag | StageKey::Wait
        )
    }

    /// Whether `--id` (the backup workflow instance id) must be supplied.
    fn requires_id(self) -> bool {
        matches!(self, StageKey::Running | StageKey::Check | StageKey::Wait)
    }

    /// The dispatcher-level failure mail body for this stage. WAIT gets its
    /// own wording (it's reporting a timeout, not a stage error); every
    /// other stage gets the generic "failed at stage X" message.
    fn failure_message(self) -> String {
        match self {
            StageKey::Wait => "Timed out waiting for backup to finish".to_string(),
            _ => format!("Backup failed at stage {}", self.as_str()),
        }
    }
}

impl FromStr for StageKey {
    type Err = EngineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw {
            "KEY" => StageKey::Key,
            "STORAGE_WF" => StageKey::StorageWf,
            "ALL_WF" => StageKey::AllWf,
            "RETENTION" => StageKey::Retention,
            "BACKUP" => StageKey::Backup,
            "RUNNING" => StageKey::Running,
            "CHECK" => StageKey::Check,
            "VALIDATE" => StageKey::Validate,
            "METADATA" => StageKey::Metadata,
            "FLAG" => StageKey::Flag,
            "ALL" => StageKey::All,
            "WFS" => StageKey::Wfs,
            "WAIT" => StageKey::Wait,
            other => return Err(EngineError::UnknownStage(other.to_string())),
        })
    }
}

/// Result of dispatching one stage: the process exit code the CLI should
/// return, and the stage's stdout info line, if it produced one (today,
/// only BACKUP does).
pub struct DispatchResult {
    pub exit_code: i32,
    pub info: Option<String>,
}

/// Validates `inv` carries what `key` needs, returning a usage error
/// otherwise. Usage errors exit 1, same as a definite stage failure,
/// but never run any stage body or send mail.
pub fn validate_invocation(key: StageKey, inv: &Invocation) -> Result<(), EngineError> {
    if key.requires_tag() && inv.tag.is_none() {
        return Err(EngineError::MissingTag(key.as_str().to_string()));
    }
    if key.requires_id() && inv.backup_id.is_none() {
        return Err(EngineError::MissingBackupId(key.as_str().to_string()));
    }
    Ok(())
}

/// Runs `key` against `sequencer`, logs the post-run line, sends the
/// dispatcher-level mail where the stage itself wouldn't, and returns the
/// CLI exit code (0 success / 1 failure / 2 indeterminate).
pub async fn dispatch<E, W, M, C>(
    sequencer: &Sequencer<E, W, M, C>,
    key: StageKey,
    inv: &mut Invocation,
) -> Result<DispatchResult, EngineError>
where
    E: ExecAdapter,
    W: WorkflowTransport,
    M: MailTransport,
    C: Clock,
{
    validate_invocation(key, inv)?;

    let (outcome, info) = run_stage(sequencer, key, inv).await;

    match outcome {
        StageOutcome::Success => {
            info!(stage = key.as_str(), "Stage Completed Successfully");
            if key == StageKey::All {
                sequencer.stages().notifier().notify_success(inv, "Backup successful").await;
            }
        }
        StageOutcome::Failure => {
            error!(stage = key.as_str(), "Stage Failed to Run");
            if key != StageKey::All {
                let msg = key.failure_message();
                sequencer.stages().notifier().notify(inv, false, &msg).await;
            }
        }
        StageOutcome::Indeterminate => {
            error!(stage = key.as_str(), "Stage Failed to Run");
        }
    }

    Ok(DispatchResult {
        exit_code: outcome.exit_code(),
        info,
    })
}

async fn run_stage<E, W, M, C>(
    sequencer: &Sequencer<E, W, M, C>,
    key: StageKey,
    inv: &mut Invocation,
) -> (StageOutcome, Option<String>)
where
    E: ExecAdapter,
    W: WorkflowTransport,
    M: MailTransport,
    C: Clock,
{
    match key {
        StageKey::Key => (sequencer.stages().key(inv).await, None),
        StageKey::StorageWf => (sequencer.stages().storage_wf(inv).await, None),
        StageKey::AllWf => (sequencer.stages().all_wf(inv).await, None),
        StageKey::Retention => (sequencer.stages().retention(inv).await, None),
        StageKey::Backup => {
            let (outcome, info) = sequencer.stages().backup(inv).await;
            (outcome, Some(info))
        }
        StageKey::Running => (sequencer.stages().running(inv).await, None),
        StageKey::Check => (sequencer.stages().check(inv).await, None),
        StageKey::Validate => (sequencer.stages().validate(inv).await, None),
        StageKey::Metadata => (sequencer.stages().metadata(inv).await, None),
        StageKey::Flag => (sequencer.stages().flag(inv).await, None),
        StageKey::All => (sequencer.run(inv).await, None),
        StageKey::Wfs => (sequencer.check_for_wfs(inv).await, None),
        StageKey::Wait => (sequencer.wait_for_backup(inv).await, None),
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
