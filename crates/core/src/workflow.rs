// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow snapshots and the classifier queries run against them (C4).
//!
//! A snapshot is whatever `GET …/progresssummaries` returned for one
//! tenancy at one point in time; everything here is a pure read over that
//! list, no network or clock involved.

use crate::blocking::WorkflowType;
use std::collections::HashSet;

/// Definition names whose presence gates whether a tenancy is counted at
/// all for the fleet-wide blocking check (§4.4). `ENM Upgrade` is
/// deliberately excluded from this gate: it is only tallied once a
/// tenancy already has one of these four active, mirroring
/// `workflows.py`'s `no_banned_wfs` (gated on this exact four-name set)
/// plus its separate `get_wf_by_type(UPGRADE)` scan.
pub const STORAGE_WORKFLOW_NAMES: &[&str] = &[
    "Backup Deployment",
    "Restore Deployment",
    "ENM Initial Install",
    "Rollback Deployment",
];

const UPGRADE_DEFINITION_NAME: &str = "ENM Upgrade";

fn workflow_type_for_definition_name(name: &str) -> Option<WorkflowType> {
    match name {
        "Backup Deployment" => Some(WorkflowType::Backup),
        "Restore Deployment" => Some(WorkflowType::Restore),
        "ENM Initial Install" => Some(WorkflowType::Install),
        "Rollback Deployment" => Some(WorkflowType::Rollback),
        n if n == UPGRADE_DEFINITION_NAME => Some(WorkflowType::Upgrade),
        _ => None,
    }
}

/// One workflow instance as reported by the remote workflow service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRecord {
    pub instance_id: String,
    pub definition_name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub active: bool,
    pub aborted: bool,
    pub incident_active: bool,
    pub end_node_id: String,
}

impl WorkflowRecord {
    /// Reached the success end node for a backup (`*__prg__p100`) or a
    /// validation (`ValidateBackupsEnd`).
    pub fn is_terminal_good(&self) -> bool {
        self.end_node_id.ends_with("__prg__p100") || self.end_node_id == "ValidateBackupsEnd"
    }

    /// Reached an explicit failure node, or was aborted, or has an open
    /// incident against it.
    pub fn is_terminal_bad(&self) -> bool {
        self.end_node_id == "BackupValidationFailed" || self.incident_active || self.aborted
    }

    /// Neither terminal-good nor terminal-bad; `active` is the only
    /// positive indicator of progress in this state.
    pub fn is_in_flight(&self) -> bool {
        !self.is_terminal_good() && !self.is_terminal_bad()
    }
}

/// A point-in-time list of workflow instances for one tenancy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowSnapshot {
    records: Vec<WorkflowRecord>,
}

impl WorkflowSnapshot {
    pub fn new(records: Vec<WorkflowRecord>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with `active == true`.
    pub fn active(&self) -> Vec<&WorkflowRecord> {
        self.records.iter().filter(|r| r.active).collect()
    }

    /// Active records whose definition is one of [`STORAGE_WORKFLOW_NAMES`].
    pub fn active_storage_wfs(&self) -> Vec<&WorkflowRecord> {
        self.active()
            .into_iter()
            .filter(|r| STORAGE_WORKFLOW_NAMES.contains(&r.definition_name.as_str()))
            .collect()
    }

    /// Unique record by instance id; duplicates collapse to `None`
    /// (defensive — a malformed snapshot should never be trusted).
    pub fn by_id(&self, id: &str) -> Option<&WorkflowRecord> {
        let mut matches = self.records.iter().filter(|r| r.instance_id == id);
        let first = matches.next()?;
        if matches.next().is_some() {
            None
        } else {
            Some(first)
        }
    }

    /// Records whose definition name is in `names`, optionally restricted
    /// to active ones.
    pub fn by_type(&self, names: &[&str], active_only: bool) -> Vec<&WorkflowRecord> {
        self.records
            .iter()
            .filter(|r| !active_only || r.active)
            .filter(|r| names.contains(&r.definition_name.as_str()))
            .collect()
    }

    /// True when an `ENM Upgrade` workflow is active for this tenancy.
    /// Checked over every active record, not just [`STORAGE_WORKFLOW_NAMES`],
    /// since upgrade is excluded from that gate set.
    fn has_active_upgrade(&self) -> bool {
        self.active().into_iter().any(|r| r.definition_name == UPGRADE_DEFINITION_NAME)
    }

    /// The set of storage workflow types currently active for this tenancy,
    /// used to feed [`crate::blocking::WorkflowTypeCounts::record_tenancy`].
    ///
    /// Gated on [`Self::active_storage_wfs`] being non-empty: a tenancy
    /// running only an `ENM Upgrade` workflow (no other storage-intensive
    /// one) contributes nothing, exactly as the original's upgrade tally
    /// only runs for tenancies that already passed its four-name gate.
    pub fn active_storage_workflow_types(&self) -> HashSet<WorkflowType> {
        let gated = self.active_storage_wfs();
        if gated.is_empty() {
            return HashSet::new();
        }
        let mut types: HashSet<WorkflowType> = gated
            .into_iter()
            .filter_map(|r| workflow_type_for_definition_name(&r.definition_name))
            .collect();
        if self.has_active_upgrade() {
            types.insert(WorkflowType::Upgrade);
        }
        types
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
