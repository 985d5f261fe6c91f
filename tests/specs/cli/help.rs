//! `--help`/`--version` output specs.

use crate::prelude::*;

#[test]
fn help_lists_every_stage_keyword() {
    cli()
        .args(&["--help"])
        .exits_with(0)
        .stdout_has("--customer")
        .stdout_has("--stage")
        .stdout_has("KEY")
        .stdout_has("STORAGE_WF")
        .stdout_has("VALIDATE")
        .stdout_has("WAIT");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).exits_with(0).stdout_has("run-backup-stages");
}

#[test]
fn missing_required_flags_exits_one_not_clap_default_two() {
    // clap's own default usage-error exit code is 2, which would collide
    // with this tool's own "indeterminate" exit code; usage errors
    // (including a bare invocation with no flags at all) should exit 1
    // instead.
    cli().args(&[]).exits_with(1).stderr_has("required");
}
