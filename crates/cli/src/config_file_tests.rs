// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const SAMPLE: &str = r#"
[general]
customers = dummy, other
backup_script = /opt/ericsson/backup/bin/backup.sh
metadata_script = /opt/ericsson/backup/bin/metadata.sh
skip_check_all = false
fail_long_backup = true
retention = 5
blocking_wfs = 2:backup|restore

[timers]
max_start_delay = 30m
max_duration = 3h
max_validation_time = 10m

[nfs]
ip = nfs_host
user = nfs_user
key = /keys/nfs_key
path = /nfs/backups

[mail]
url = http://mail.example.invalid/send
dest = oncall@example.invalid

[logging]
format = %(asctime)s %(levelname)s %(message)s
datefmt = %Y-%m-%d %H:%M:%S
log_file = /var/log/backup_scheduler.log
level = INFO

[dummy]
lcm = dummy_lcm
enm_key = /keys/dummy_enm_key
keystone_rc = /keys/dummy_keystone_rc
deployment_id = dummy

[other]
lcm = other_lcm
enm_key = /keys/other_enm_key
keystone_rc = /keys/other_keystone_rc
deployment_id = other
"#;

fn sample_ini() -> Ini {
    Ini::load_from_str(SAMPLE).unwrap()
}

#[test]
fn loads_global_config_from_sample() {
    let ini = sample_ini();
    let global = load_global(&ini).unwrap();

    assert_eq!(global.backup_cmd, "/opt/ericsson/backup/bin/backup.sh");
    assert!(!global.skip_all_check);
    assert!(global.fail_long_backup);
    assert_eq!(global.retention_value, 5);
    assert_eq!(global.timers.max_start_delay, std::time::Duration::from_secs(1800));
    assert_eq!(global.timers.max_duration, std::time::Duration::from_secs(3 * 3600));
    assert_eq!(global.nfs.host, "nfs_host");
    assert_eq!(global.mail.url, "http://mail.example.invalid/send");
    assert_eq!(global.tenancies.get("dummy").map(String::as_str), Some("dummy_lcm"));
    assert_eq!(global.tenancies.get("other").map(String::as_str), Some("other_lcm"));
    assert_eq!(global.blocking_wf_rules.len(), 1);
}

#[test]
fn loads_logging_config_from_sample() {
    let ini = sample_ini();
    let logging = load_logging(&ini).unwrap();
    assert_eq!(logging.log_file, "/var/log/backup_scheduler.log");
    assert_eq!(logging.level, "INFO");
}

#[test]
fn loads_tenancy_config_for_known_customer() {
    let ini = sample_ini();
    let tenancy = load_tenancy(&ini, "dummy").unwrap();
    assert_eq!(tenancy.deployment_id, "dummy");
    assert_eq!(tenancy.lcm_host, "dummy_lcm");
    assert_eq!(tenancy.enm_key_path, "/keys/dummy_enm_key");
}

#[test]
fn rejects_customer_not_in_general_list() {
    let ini = sample_ini();
    let err = load_tenancy(&ini, "nope").unwrap_err();
    assert!(matches!(err, ConfigFileError::UnknownCustomer(c) if c == "nope"));
}

#[test]
fn missing_section_is_a_typed_error() {
    let ini = Ini::load_from_str("[general]\ncustomers = dummy\n").unwrap();
    let err = load_global(&ini).unwrap_err();
    assert!(matches!(err, ConfigFileError::MissingKey { ref section, ref key } if section == "general" && key == "backup_script"));
}

#[test]
fn invalid_bool_is_a_typed_error() {
    let bad = SAMPLE.replace("skip_check_all = false", "skip_check_all = maybe");
    let ini = Ini::load_from_str(&bad).unwrap();
    let err = load_global(&ini).unwrap_err();
    assert!(matches!(err, ConfigFileError::InvalidBool { .. }));
}

#[test]
fn parse_file_reads_a_real_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run-backup-stages.ini");
    std::fs::write(&path, SAMPLE).unwrap();

    let ini = parse_file(&path).unwrap();
    assert!(load_global(&ini).is_ok());
}

#[test]
fn parse_file_reports_missing_file() {
    let err = parse_file(std::path::Path::new("/no/such/run-backup-stages.ini")).unwrap_err();
    assert!(matches!(err, ConfigFileError::Read { .. }));
}
