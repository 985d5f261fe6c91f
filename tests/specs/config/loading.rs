//! Config file loading specs: malformed ini sections/values must fail
//! fast with a message naming the offending section/key, rather than
//! panicking.

use crate::prelude::*;

fn run_with(contents: &str, stage: &str) -> String {
    let cfg = ConfigFile::minimal();
    cfg.write(contents);
    let out = cli()
        .args(&["--customer", "dummy", "--stage", stage, "--cfg"])
        .args(&[cfg.path().to_str().unwrap()])
        .fails();
    out.stderr()
}

const BASE: &str = r#"
[general]
customers = dummy
backup_script = /opt/ericsson/enm/backup/run_backup.py
metadata_script = /opt/ericsson/enm/backup/metadata.py
skip_check_all = false
fail_long_backup = true
retention = 3
blocking_wfs = 1:install|upgrade

[timers]
max_start_delay = 2h
max_duration = 6h
max_validation_time = 30m

[nfs]
ip = nfs.example.invalid
user = nfsuser
key = /keys/nfs_key
path = /backups

[mail]
url = http://mail.example.invalid/send
dest = oncall@example.invalid

[logging]
format = %(asctime)s %(levelname)s %(message)s
datefmt = %Y-%m-%d %H:%M:%S
log_file = /tmp/bur-spec-does-not-matter.log
level = INFO

[dummy]
lcm = dummy_lcm
enm_key = /keys/dummy_enm_key
keystone_rc = /keys/dummy_keystone.rc
deployment_id = dummy
"#;

const WITHOUT_NFS_SECTION: &str = r#"
[general]
customers = dummy
backup_script = /opt/ericsson/enm/backup/run_backup.py
metadata_script = /opt/ericsson/enm/backup/metadata.py
skip_check_all = false
fail_long_backup = true
retention = 3
blocking_wfs = 1:install|upgrade

[timers]
max_start_delay = 2h
max_duration = 6h
max_validation_time = 30m

[mail]
url = http://mail.example.invalid/send
dest = oncall@example.invalid

[logging]
format = %(asctime)s %(levelname)s %(message)s
datefmt = %Y-%m-%d %H:%M:%S
log_file = /tmp/bur-spec-does-not-matter.log
level = INFO

[dummy]
lcm = dummy_lcm
enm_key = /keys/dummy_enm_key
keystone_rc = /keys/dummy_keystone.rc
deployment_id = dummy
"#;

#[test]
fn missing_nfs_section_names_the_section() {
    let err = run_with(WITHOUT_NFS_SECTION, "RETENTION");
    assert!(err.contains("nfs"), "stderr: {err}");
}

#[test]
fn bad_duration_unit_is_rejected() {
    let bad = BASE.replace("max_start_delay = 2h", "max_start_delay = 2x");
    let err = run_with(&bad, "RETENTION");
    assert!(err.contains("max_start_delay"), "stderr: {err}");
}

#[test]
fn non_numeric_retention_is_rejected() {
    let bad = BASE.replace("retention = 3", "retention = many");
    let err = run_with(&bad, "RETENTION");
    assert!(err.contains("retention"), "stderr: {err}");
}

#[test]
fn malformed_blocking_rule_is_rejected() {
    let bad = BASE.replace("blocking_wfs = 1:install|upgrade", "blocking_wfs = not-a-rule");
    let err = run_with(&bad, "RETENTION");
    assert!(err.contains("blocking_wfs"), "stderr: {err}");
}

#[test]
fn unknown_workflow_type_in_blocking_rule_is_rejected() {
    let bad = BASE.replace("blocking_wfs = 1:install|upgrade", "blocking_wfs = 1:teleport");
    let err = run_with(&bad, "RETENTION");
    assert!(err.contains("teleport"), "stderr: {err}");
}

#[test]
fn invalid_bool_for_skip_check_all_is_rejected() {
    let bad = BASE.replace("skip_check_all = false", "skip_check_all = maybe");
    let err = run_with(&bad, "RETENTION");
    assert!(err.contains("skip_check_all"), "stderr: {err}");
}
