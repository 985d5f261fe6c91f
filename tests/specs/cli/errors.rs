//! Usage-error specs: bad stage keywords and missing stage-specific
//! identifiers, all of which must be caught before any stage body runs
//! (no mail, no adapters constructed) and must exit 1.

use crate::prelude::*;

#[test]
fn unknown_stage_keyword_fails() {
    let cfg = ConfigFile::minimal();
    cli()
        .args(&["--customer", "dummy", "--stage", "BOGUS", "--cfg"])
        .args(&[cfg.path().to_str().unwrap()])
        .exits_with(1)
        .stderr_has("unknown stage keyword");
}

#[test]
fn check_without_tag_fails() {
    let cfg = ConfigFile::minimal();
    cli()
        .args(&["--customer", "dummy", "--stage", "CHECK", "--cfg"])
        .args(&[cfg.path().to_str().unwrap()])
        .exits_with(1)
        .stderr_has("requires --tag");
}

#[test]
fn running_without_id_fails() {
    let cfg = ConfigFile::minimal();
    cli()
        .args(&["--customer", "dummy", "--stage", "RUNNING", "--tag", "some_tag", "--cfg"])
        .args(&[cfg.path().to_str().unwrap()])
        .exits_with(1)
        .stderr_has("requires --id");
}

#[test]
fn wait_without_id_fails() {
    let cfg = ConfigFile::minimal();
    cli()
        .args(&["--customer", "dummy", "--stage", "WAIT", "--tag", "some_tag", "--cfg"])
        .args(&[cfg.path().to_str().unwrap()])
        .exits_with(1)
        .stderr_has("requires --id");
}

#[test]
fn backup_and_all_do_not_require_a_pre_supplied_tag() {
    // BACKUP and ALL mint their own tag when absent, so leaving --tag off
    // must not be rejected at the validation stage (it will instead go on
    // to try the network, which isn't available in this sandbox, so we
    // only assert it gets *past* argument validation, i.e. isn't a usage
    // error the way CHECK/RUNNING/VALIDATE are).
    let cfg = ConfigFile::minimal();
    let out = cli()
        .env("BUR_SSH_TIMEOUT_MS", "2000")
        .args(&["--customer", "dummy", "--stage", "BACKUP", "--cfg"])
        .args(&[cfg.path().to_str().unwrap()])
        .fails();
    assert!(!out.stderr().contains("requires --tag"), "stderr: {}", out.stderr());
}

#[test]
fn unknown_customer_fails() {
    let cfg = ConfigFile::minimal();
    cli()
        .args(&["--customer", "nope", "--stage", "KEY", "--cfg"])
        .args(&[cfg.path().to_str().unwrap()])
        .exits_with(1)
        .stderr_has("nope");
}

#[test]
fn missing_config_file_fails() {
    cli()
        .args(&["--customer", "dummy", "--stage", "KEY", "--cfg", "/nonexistent/backup.cfg"])
        .exits_with(1)
        .stderr_has("backup.cfg");
}
