// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-run context threaded through the stage engine, sequencer, and
//! notifier — a typed stand-in for process-wide globals like `CUSTOMER`,
//! `BACKUP_TAG`, and `BACKUP_ID`.
//!
//! A driver is expected to run each stage in a fresh process, so nothing
//! here survives past one `Invocation`'s lifetime; `tag`/`backup_id` only
//! accumulate within a single `ALL` run.

use bur_core::config::TenancyConfig;

/// Mutable identifiers produced as a run progresses. `tag` is set either
/// by the caller (`--tag`) or generated by the BACKUP stage; `backup_id`
/// is set by the BACKUP stage from the external script's stdout.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tenancy: TenancyConfig,
    pub tag: Option<String>,
    pub backup_id: Option<String>,
}

impl Invocation {
    pub fn new(tenancy: TenancyConfig) -> Self {
        Self {
            tenancy,
            tag: None,
            backup_id: None,
        }
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_backup_id(mut self, backup_id: Option<String>) -> Self {
        self.backup_id = backup_id;
        self
    }
}
