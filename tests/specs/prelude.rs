//! Test helpers for the `run-backup-stages` black-box specs.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn binary_path() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug/run-backup-stages");
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join("run-backup-stages");
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

/// Create a CLI builder for `run-backup-stages`.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    fn command(self) -> Command {
        let mut cmd = Command::new(binary_path());
        cmd.args(&self.args);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn passes(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and assert the exact process exit code.
    pub fn exits_with(self, code: i32) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert_eq!(
            output.status.code(),
            Some(code),
            "expected exit code {code}, got {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{expected}'\nstdout: {stdout}");
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr does not contain '{expected}'\nstderr: {stderr}");
        self
    }
}

/// A temporary ini config file covering every section `config_file`
/// reads, with sane defaults a test can override piecemeal.
pub struct ConfigFile {
    dir: tempfile::TempDir,
}

impl ConfigFile {
    /// Writes a minimal-but-complete config with one customer, `dummy`.
    pub fn minimal() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("backup.log");
        let contents = format!(
            r#"
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
log_file = {}
level = INFO

[dummy]
lcm = dummy_lcm
enm_key = /keys/dummy_enm_key
keystone_rc = /keys/dummy_keystone.rc
deployment_id = dummy
"#,
            log_path.display()
        );
        std::fs::write(dir.path().join("backup.cfg"), contents).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("backup.cfg")
    }

    /// Rewrites the whole file, for tests exercising malformed configs.
    pub fn write(&self, contents: &str) {
        std::fs::write(self.dir.path().join("backup.cfg"), contents).unwrap();
    }
}
