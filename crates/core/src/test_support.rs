// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test builders, available to every crate in the workspace behind
//! the `test-support` feature so adapter and engine tests don't each
//! reinvent a `GlobalConfig` with every field filled in by hand.

use crate::blocking::BlockingRule;
use crate::config::{GlobalConfig, MailConfig, NfsConfig, TenancyConfig, Timers};
use crate::workflow::WorkflowRecord;
use std::collections::BTreeMap;
use std::time::Duration;

/// A `TenancyConfig` for a tenancy named `dummy`, used throughout the
/// engine's test scenarios.
pub fn sample_tenancy_config() -> TenancyConfig {
    TenancyConfig {
        deployment_id: "dummy".to_string(),
        lcm_host: "dummy_lcm".to_string(),
        enm_key_path: "/keys/dummy_enm_key".to_string(),
        keystone_rc_path: "/keys/dummy_keystone_rc".to_string(),
    }
}

/// A fully populated `GlobalConfig` with conservative, short timers so
/// sequencer tests don't need to wait out production-sized deadlines.
pub fn sample_global_config() -> GlobalConfig {
    GlobalConfig {
        backup_cmd: "/opt/ericsson/backup/bin/backup.sh".to_string(),
        metadata_cmd: "/opt/ericsson/backup/bin/metadata.sh".to_string(),
        nfs: NfsConfig {
            host: "nfs_host".to_string(),
            user: "nfs_user".to_string(),
            key_path: "/keys/nfs_key".to_string(),
            root_path: "/nfs/backups".to_string(),
        },
        retention_value: 5,
        blocking_wf_rules: BlockingRule::parse_rules("2:backup|restore").unwrap(),
        skip_all_check: false,
        fail_long_backup: true,
        timers: Timers {
            max_start_delay: Duration::from_secs(2),
            max_duration: Duration::from_secs(2),
            max_validation_time: Duration::from_secs(2),
        },
        mail: MailConfig {
            url: "http://mail.example.invalid/send".to_string(),
            recipient: "oncall@example.invalid".to_string(),
        },
        tenancies: BTreeMap::from([("dummy".to_string(), "dummy_lcm".to_string())]),
    }
}

/// Builds a minimal `WorkflowRecord`, defaulting to an in-flight state;
/// override fields on the returned value for other scenarios.
pub fn sample_workflow_record(instance_id: &str, definition_name: &str) -> WorkflowRecord {
    WorkflowRecord {
        instance_id: instance_id.to_string(),
        definition_name: definition_name.to_string(),
        start_time: Some("2018-11-07T15:41:33".to_string()),
        end_time: None,
        active: true,
        aborted: false,
        incident_active: false,
        end_node_id: "SomeMiddleNode".to_string(),
    }
}
