// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `run-backup-stages`: the dispatcher's process entry point (C9).
//!
//! Parses `--customer`/`--stage` (plus the stage-specific `--tag`/`--id`),
//! loads the ini config file, stands up logging and the real adapters,
//! and runs exactly one stage or sequence before exiting with the
//! resulting stage outcome's exit code.

mod config_file;
mod logging;

use bur_adapters::{HttpMailTransport, HttpWorkflowTransport, ProcessExecAdapter};
use bur_core::clock::SystemClock;
use bur_engine::dispatcher::{self, StageKey};
use bur_engine::notifier::Notifier;
use bur_engine::sequencer::Sequencer;
use bur_engine::stages::StageEngine;
use bur_engine::workflow_client::WorkflowClient;
use bur_engine::Invocation;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

const DEFAULT_CFG_PATH: &str = "/etc/enm_bur/backup.cfg";

/// Stage keywords accepted by `--stage`, listed here only so clap can
/// render them in `--help`; parsing itself goes through `StageKey`.
const STAGE_HELP: &str = "KEY STORAGE_WF ALL_WF RETENTION BACKUP RUNNING CHECK VALIDATE METADATA FLAG ALL WFS WAIT";

#[derive(Parser, Debug)]
#[command(
    name = "run-backup-stages",
    about = "Runs one stage (or the full sequence) of an ENM deployment backup",
    version
)]
struct Cli {
    /// Tenancy name, as listed in the config file's `[general] customers`.
    #[arg(long)]
    customer: String,

    /// Stage keyword to run.
    #[arg(long, help = STAGE_HELP)]
    stage: String,

    /// Backup tag. Required by every stage except KEY/WFS/STORAGE_WF/ALL_WF/RETENTION/ALL/BACKUP,
    /// which either don't need one or mint it themselves.
    #[arg(long)]
    tag: Option<String>,

    /// Backup workflow instance id. Required by RUNNING/CHECK/WAIT.
    #[arg(long)]
    id: Option<String>,

    /// Path to the ini configuration file.
    #[arg(long, default_value = DEFAULT_CFG_PATH)]
    cfg: PathBuf,

    /// Disable outbound mail notifications.
    #[arg(long)]
    nomail: bool,

    /// Also log to stdout, in addition to the configured log file.
    #[arg(long)]
    stdout: bool,
}

#[tokio::main]
async fn main() {
    // clap's default exit code for a usage error is 2, which would
    // collide with this tool's own "indeterminate" exit code; every usage
    // error (including a bad/missing flag) should exit 1 instead, so
    // --help/--version are let through as-is but anything else is
    // re-exited with the code the rest of `run` uses for its own
    // usage errors (missing --tag/--id, unknown --stage).
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let stage = StageKey::from_str(&cli.stage)?;

    let ini = config_file::parse_file(&cli.cfg)?;
    let global = config_file::load_global(&ini)?;
    let tenancy = config_file::load_tenancy(&ini, &cli.customer)?;
    let logging_cfg = config_file::load_logging(&ini)?;

    let _guard = logging::init(&logging_cfg, &cli.customer, cli.stdout)?;
    info!(customer = %cli.customer, stage = %cli.stage, "run-backup-stages starting");

    let mut inv = Invocation::new(tenancy).with_tag(cli.tag.clone()).with_backup_id(cli.id.clone());

    dispatcher::validate_invocation(stage, &inv)?;

    let exec = ProcessExecAdapter::new();
    let workflow = WorkflowClient::new(HttpWorkflowTransport::new());
    let notifier = if cli.nomail {
        Notifier::disabled()
    } else {
        Notifier::enabled(HttpMailTransport::new(), global.mail.url.clone(), global.mail.recipient.clone())
    };
    let clock = SystemClock;

    let engine = StageEngine::new(exec, workflow, notifier, clock, global);
    let sequencer = Sequencer::new(engine);

    let result = dispatcher::dispatch(&sequencer, stage, &mut inv).await?;

    if let Some(info_line) = &result.info {
        println!("{info_line}");
    }

    Ok(result.exit_code)
}
