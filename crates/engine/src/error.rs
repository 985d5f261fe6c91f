// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Genuine programmer/usage errors — a bad stage keyword, a config value
//! that doesn't parse. These are allowed to bubble up past the engine
//! boundary via `anyhow` in `bur-cli`, unlike `ExecError`/`WorkflowClientError`
//! /`MailError` which never escape a stage method.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown stage keyword '{0}'")]
    UnknownStage(String),

    #[error("stage '{0}' requires --id")]
    MissingBackupId(String),

    #[error("stage '{0}' requires --tag")]
    MissingTag(String),
}
