// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow client (C3): the business layer on top of
//! `bur_adapters::http::WorkflowTransport` — snapshot fetching with the
//! spec's "empty list + error log" fallback, latest-validation-definition
//! lookup, and validation-instance start.

use bur_adapters::http::{WorkflowDefinitionDto, WorkflowInstanceDto};
use bur_adapters::WorkflowTransport;
use bur_core::version::LooseVersion;
use bur_core::{Clock, WorkflowRecord, WorkflowSnapshot};
use std::collections::HashMap;
use tracing::{error, info};

/// Definition name the validation workflow is published under; see
/// `workflows.py::WfTypes.get_backup_validation_wf_id`.
const VALIDATION_DEFINITION_NAME: &str = "BackupValidation__top";

fn to_record(dto: WorkflowInstanceDto) -> WorkflowRecord {
    WorkflowRecord {
        instance_id: dto.instance_id,
        definition_name: dto.definition_name,
        start_time: dto.start_time,
        end_time: dto.end_time,
        active: dto.active,
        aborted: dto.aborted,
        incident_active: dto.incident_active,
        end_node_id: dto.end_node_id,
    }
}

/// Logs a fixed subset of a workflow's fields, mirroring the original's
/// `log_wf` helper, at every call site that inspects one.
pub fn log_workflow(record: &WorkflowRecord) {
    info!(
        definition_name = %record.definition_name,
        instance_id = %record.instance_id,
        start_time = ?record.start_time,
        end_time = ?record.end_time,
        active = record.active,
        aborted = record.aborted,
        incident_active = record.incident_active,
        end_node_id = %record.end_node_id,
        "workflow"
    );
}

#[derive(Clone)]
pub struct WorkflowClient<W: WorkflowTransport> {
    transport: W,
}

impl<W: WorkflowTransport> WorkflowClient<W> {
    pub fn new(transport: W) -> Self {
        Self { transport }
    }

    /// `GET .../progresssummaries`, surfacing the transport error so a
    /// caller that needs to distinguish "no workflows" from "couldn't ask"
    /// (RUNNING, CHECK, ALL_WF) can do so.
    pub async fn try_fetch_snapshot(
        &self,
        lcm: &str,
    ) -> Result<WorkflowSnapshot, bur_adapters::WorkflowClientError> {
        let records = self.transport.list_instances(lcm).await?;
        Ok(WorkflowSnapshot::new(records.into_iter().map(to_record).collect()))
    }

    /// `GET .../progresssummaries`, degrading to an empty snapshot and an
    /// error log on any transport/decode failure. Used by
    /// callers like STORAGE_WF where a per-tenancy fetch failure should
    /// just contribute nothing to the count, not fail the whole stage.
    pub async fn fetch_snapshot(&self, lcm: &str) -> WorkflowSnapshot {
        match self.try_fetch_snapshot(lcm).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(lcm, %err, "failed to get workflows from LCM");
                WorkflowSnapshot::default()
            }
        }
    }

    async fn list_definitions(&self, lcm: &str) -> Vec<WorkflowDefinitionDto> {
        match self.transport.list_definitions(lcm).await {
            Ok(defs) => defs,
            Err(err) => {
                error!(lcm, %err, "failed to get workflow definitions from LCM");
                Vec::new()
            }
        }
    }

    /// Finds the highest-versioned `BackupValidation__top` definition id,
    /// dotted as `<ns>.--.<version>.--.<name>`.
    pub async fn latest_validation_definition(&self, lcm: &str) -> Option<String> {
        let defs = self.list_definitions(lcm).await;
        let mut by_version: HashMap<LooseVersion, String> = HashMap::new();
        for def in defs {
            let mut parts = def.definition_id.splitn(3, ".--.");
            let (Some(_ns), Some(version), Some(name)) = (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            if name == VALIDATION_DEFINITION_NAME {
                by_version.insert(LooseVersion::parse(version), def.definition_id.clone());
            }
        }
        let latest_version = by_version.keys().max()?.clone();
        by_version.remove(&latest_version)
    }

    /// Starts a validation instance for `tag`, composing
    /// `Backup Validation_YYYYMMDD_HHMMSS` from `clock`'s wall-clock time.
    pub async fn start_validation(
        &self,
        lcm: &str,
        tag: &str,
        clock: &impl Clock,
    ) -> Option<String> {
        let definition_id = self.latest_validation_definition(lcm).await?;
        let business_key = format!("Backup Validation_{}", clock.local_now().format("%Y%m%d_%H%M%S"));
        match self
            .transport
            .start_instance(lcm, &definition_id, &business_key, tag)
            .await
        {
            Ok(instance_id) => {
                info!(instance_id, "backup validation started");
                Some(instance_id)
            }
            Err(err) => {
                error!(lcm, %err, "failed to start backup validation workflow");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "workflow_client_tests.rs"]
mod tests;
