// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::notifier::Notifier;
use crate::sequencer::Sequencer;
use crate::stages::StageEngine;
use crate::workflow_client::WorkflowClient;
use bur_adapters::{ExecOutput, FakeExecAdapter, FakeMailTransport, FakeWorkflowTransport};
use bur_core::clock::FakeClock;
use bur_core::test_support::{sample_global_config, sample_tenancy_config, sample_workflow_record};
use chrono::TimeZone;

fn sequencer(
    exec: FakeExecAdapter,
    transport: FakeWorkflowTransport,
    mail: FakeMailTransport,
) -> Sequencer<FakeExecAdapter, FakeWorkflowTransport, FakeMailTransport, FakeClock> {
    let notifier = Notifier::enabled(mail, "http://mail.example.invalid/send".to_string(), "oncall@example.invalid".to_string());
    let clock = FakeClock::new(chrono::Local.with_ymd_and_hms(2018, 11, 7, 15, 41, 33).unwrap());
    Sequencer::new(StageEngine::new(exec, WorkflowClient::new(transport), notifier, clock, sample_global_config()))
}

fn invocation() -> Invocation {
    Invocation::new(sample_tenancy_config())
}

fn to_dto(record: &bur_core::WorkflowRecord) -> bur_adapters::http::WorkflowInstanceDto {
    bur_adapters::http::WorkflowInstanceDto {
        instance_id: record.instance_id.clone(),
        definition_name: record.definition_name.clone(),
        start_time: record.start_time.clone(),
        end_time: record.end_time.clone(),
        active: record.active,
        aborted: record.aborted,
        incident_active: record.incident_active,
        end_node_id: record.end_node_id.clone(),
    }
}

#[test]
fn parses_every_stage_keyword() {
    for key in StageKey::ALL {
        assert_eq!(StageKey::from_str(key.as_str()).unwrap(), key);
    }
}

#[test]
fn rejects_unknown_stage_keyword() {
    assert!(matches!(StageKey::from_str("BOGUS"), Err(EngineError::UnknownStage(_))));
}

#[test]
fn validate_invocation_requires_tag_for_check() {
    let inv = invocation();
    let err = validate_invocation(StageKey::Check, &inv).unwrap_err();
    assert!(matches!(err, EngineError::MissingTag(stage) if stage == "CHECK"));
}

#[test]
fn validate_invocation_requires_id_for_running() {
    let mut inv = invocation();
    inv.tag = Some("t".to_string());
    let err = validate_invocation(StageKey::Running, &inv).unwrap_err();
    assert!(matches!(err, EngineError::MissingBackupId(stage) if stage == "RUNNING"));
}

#[test]
fn validate_invocation_allows_backup_without_tag() {
    assert!(validate_invocation(StageKey::Backup, &invocation()).is_ok());
}

#[tokio::test]
async fn dispatch_key_success_has_no_info_line() {
    let existing_key = tempfile::NamedTempFile::new().unwrap();
    let key_path = existing_key.path().to_string_lossy().into_owned();
    let exec = FakeExecAdapter::new();
    exec.set_ssh_response(&key_path, ExecOutput { exit: 0, ..Default::default() });
    let seq = sequencer(exec, FakeWorkflowTransport::new(), FakeMailTransport::new());

    let mut inv = invocation();
    inv.tenancy.enm_key_path = key_path;

    let result = dispatch(&seq, StageKey::Key, &mut inv).await.unwrap();

    assert_eq!(result.exit_code, 0);
    assert!(result.info.is_none());
}

#[tokio::test]
async fn dispatch_retention_failure_sends_both_stage_and_generic_mail() {
    // RETENTION notifies itself on Failure, and the dispatcher adds its
    // own generic mail on top for a direct `--stage RETENTION` invocation.
    let exec = FakeExecAdapter::new();
    exec.set_default_response(ExecOutput { exit: 1, ..Default::default() });
    let mail = FakeMailTransport::new();
    let seq = sequencer(exec, FakeWorkflowTransport::new(), mail.clone());

    let mut inv = invocation();
    let result = dispatch(&seq, StageKey::Retention, &mut inv).await.unwrap();

    assert_eq!(result.exit_code, 1);
    let calls = mail.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].subject, "Backup failure: dummy");
    assert!(calls[0].body.starts_with("Failed to set consul retention value"));
    assert_eq!(calls[1].subject, "Backup failure: dummy");
    assert!(calls[1].body.starts_with("Backup failed at stage RETENTION"));
}

#[tokio::test]
async fn dispatch_all_wf_failure_sends_generic_mail() {
    // ALL_WF never calls the notifier itself; the dispatcher sends the
    // only mail for a direct `--stage ALL_WF` invocation.
    let transport = FakeWorkflowTransport::new();
    transport.set_instances("dummy_lcm", vec![to_dto(&sample_workflow_record("id-1", "Backup Deployment"))]);
    let mail = FakeMailTransport::new();
    let seq = sequencer(FakeExecAdapter::new(), transport, mail.clone());

    let mut inv = invocation();
    let result = dispatch(&seq, StageKey::AllWf, &mut inv).await.unwrap();

    assert_eq!(result.exit_code, 1);
    let calls = mail.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].subject, "Backup failure: dummy");
    assert_eq!(calls[0].body.lines().next(), Some("Backup failed at stage ALL_WF"));
}

#[tokio::test(start_paused = true)]
async fn dispatch_wait_failure_uses_timeout_wording() {
    let mail = FakeMailTransport::new();

    let mut config = bur_core::test_support::sample_global_config();
    config.fail_long_backup = true;
    config.timers.max_duration = std::time::Duration::from_secs(5);
    let transport = FakeWorkflowTransport::new();
    let mut wf = sample_workflow_record("abc123", "Backup Deployment");
    wf.active = true;
    transport.set_instances("dummy_lcm", vec![to_dto(&wf)]);
    let notifier = Notifier::enabled(mail.clone(), "http://mail.example.invalid/send".to_string(), "oncall@example.invalid".to_string());
    let clock = FakeClock::new(chrono::Local.with_ymd_and_hms(2018, 11, 7, 15, 41, 33).unwrap());
    let seq = Sequencer::new(StageEngine::new(FakeExecAdapter::new(), WorkflowClient::new(transport), notifier, clock, config));

    let mut inv = invocation();
    inv.backup_id = Some("abc123".to_string());

    let result = dispatch(&seq, StageKey::Wait, &mut inv).await.unwrap();

    assert_eq!(result.exit_code, 1);
    let calls = mail.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body.lines().next(), Some("Timed out waiting for backup to finish"));
}

#[tokio::test]
async fn dispatch_all_success_sends_success_mail() {
    let exec = FakeExecAdapter::new();
    let existing_key = tempfile::NamedTempFile::new().unwrap();
    let key_path = existing_key.path().to_string_lossy().into_owned();
    exec.set_ssh_response(&key_path, ExecOutput { exit: 0, ..Default::default() });
    exec.set_run_response(
        "--stdout",
        ExecOutput {
            exit: 0,
            stdout: b"Backup workflow requested with ID abc123.\n".to_vec(),
            stderr: Vec::new(),
        },
    );
    exec.set_run_response("export", ExecOutput { exit: 0, ..Default::default() });
    exec.set_default_response(ExecOutput { exit: 0, ..Default::default() });

    let dir = tempfile::tempdir().unwrap();
    let original_dir = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    std::fs::write(dir.path().join("backup.metadata"), b"meta").unwrap();

    let transport = FakeWorkflowTransport::new();
    transport.set_definitions(
        "dummy_lcm",
        vec![bur_adapters::http::WorkflowDefinitionDto {
            definition_id: "ns.--.1.0.--.BackupValidation__top".to_string(),
        }],
    );
    transport.set_start_result("val-1");
    let mut backup_wf = sample_workflow_record("abc123", "Backup Deployment");
    backup_wf.active = false;
    backup_wf.end_node_id = "Backup__prg__p100".to_string();
    let mut val_wf = sample_workflow_record("val-1", "BackupValidation__top");
    val_wf.active = false;
    val_wf.end_node_id = "ValidateBackupsEnd".to_string();
    transport.set_instances("dummy_lcm", vec![to_dto(&backup_wf), to_dto(&val_wf)]);

    let mut config = bur_core::test_support::sample_global_config();
    config.timers.max_validation_time = std::time::Duration::from_secs(300);
    let mail = FakeMailTransport::new();
    let notifier = Notifier::enabled(mail.clone(), "http://mail.example.invalid/send".to_string(), "oncall@example.invalid".to_string());
    let clock = FakeClock::new(chrono::Local.with_ymd_and_hms(2018, 11, 7, 15, 41, 33).unwrap());
    let seq = Sequencer::new(StageEngine::new(exec, WorkflowClient::new(transport), notifier, clock, config));

    let mut inv = invocation();
    inv.tenancy.enm_key_path = key_path;

    let result = dispatch(&seq, StageKey::All, &mut inv).await.unwrap();

    std::env::set_current_dir(original_dir).unwrap();

    assert_eq!(result.exit_code, 0);
    let calls = mail.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].subject, "Backup Successful for dummy");
    assert_eq!(calls[0].body.lines().next(), Some("Backup successful"));
}

#[tokio::test]
async fn dispatch_running_indeterminate_sends_no_mail() {
    let seq = sequencer(FakeExecAdapter::new(), FakeWorkflowTransport::new(), FakeMailTransport::new());
    let mut inv = invocation();
    inv.tag = Some("t".to_string());
    inv.backup_id = Some("missing".to_string());

    let result = dispatch(&seq, StageKey::Running, &mut inv).await.unwrap();

    assert_eq!(result.exit_code, 2);
}

#[tokio::test]
async fn dispatch_backup_returns_info_line() {
    let exec = FakeExecAdapter::new();
    exec.set_run_response(
        "--stdout",
        ExecOutput {
            exit: 0,
            stdout: b"Backup workflow requested with ID abc123.\n".to_vec(),
            stderr: Vec::new(),
        },
    );
    let seq = sequencer(exec, FakeWorkflowTransport::new(), FakeMailTransport::new());

    let mut inv = invocation();
    inv.tag = Some("mytag".to_string());

    let result = dispatch(&seq, StageKey::Backup, &mut inv).await.unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.info.as_deref(), Some("ID: abc123  TAG: mytag"));
}

#[tokio::test]
async fn dispatch_missing_tag_is_a_usage_error_before_any_stage_runs() {
    let mail = FakeMailTransport::new();
    let seq = sequencer(FakeExecAdapter::new(), FakeWorkflowTransport::new(), mail.clone());

    let mut inv = invocation();
    let err = dispatch(&seq, StageKey::Check, &mut inv).await.unwrap_err();

    assert!(matches!(err, EngineError::MissingTag(_)));
    assert!(mail.calls().is_empty());
}
