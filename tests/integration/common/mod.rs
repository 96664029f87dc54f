#![allow(dead_code)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

/// Stand-in for `systemctl` that keeps its state in marker files next to itself.
///
/// * `active`: present once the unit reports active.
/// * `polls_needed`: on restart, the unit becomes active on this many-th query.
/// * `restart_fails`: restart exits 1.
/// * `hang`: `is-active` blocks far past any test deadline.
/// * `calls.log`: one line of arguments per invocation.
const FAKE_SYSTEMCTL: &str = r#"#!/bin/sh
dir="$(dirname "$0")"
echo "$*" >> "$dir/calls.log"
case "$1" in
  is-active)
    if [ -f "$dir/hang" ]; then
      exec sleep 30
    fi
    if [ -f "$dir/active" ]; then
      exit 0
    fi
    if [ -f "$dir/pending" ]; then
      left=$(cat "$dir/pending")
      if [ "$left" -le 1 ]; then
        rm -f "$dir/pending"
        touch "$dir/active"
        exit 0
      fi
      echo $((left - 1)) > "$dir/pending"
    fi
    exit 3
    ;;
  restart)
    if [ -f "$dir/restart_fails" ]; then
      exit 1
    fi
    if [ -f "$dir/polls_needed" ]; then
      cp "$dir/polls_needed" "$dir/pending"
    fi
    exit 0
    ;;
esac
exit 2
"#;

pub struct FakeSystemctl {
    dir: TempDir,
    script: PathBuf,
}

impl FakeSystemctl {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let script = dir.path().join("systemctl");
        fs::write(&script, FAKE_SYSTEMCTL).expect("failed to write fake systemctl");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("failed to mark fake systemctl executable");
        Self { dir, script }
    }

    pub fn path(&self) -> &Path {
        &self.script
    }

    pub fn path_str(&self) -> &str {
        self.script.to_str().expect("tempdir path is utf-8")
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn set_active(&self) -> &Self {
        self.touch("active");
        self
    }

    pub fn active_after_polls(&self, polls: u32) -> &Self {
        fs::write(self.dir().join("polls_needed"), polls.to_string())
            .expect("failed to write polls_needed");
        self
    }

    pub fn fail_restart(&self) -> &Self {
        self.touch("restart_fails");
        self
    }

    pub fn hang_queries(&self) -> &Self {
        self.touch("hang");
        self
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn touch(&self, name: &str) {
        fs::write(self.dir().join(name), "").expect("failed to write marker");
    }
}
