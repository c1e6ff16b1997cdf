// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! State file handling of the CLI commands, against a fake k0sctl.

#![cfg(unix)]

use k0s_provider::cli::cluster::{
    CreateCommand, DeleteCommand, ProviderArgs, ReadCommand, UpdateCommand,
};
use k0s_provider::{ClusterDesiredState, ClusterRecord};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

// Every invocation appends its sub-command to $FAKE_LOG. $FAKE_FAIL names the
// sub-command that should fail; $FAKE_FAIL_MESSAGE is what it prints.
const FAKE_K0SCTL: &str = r#"#!/bin/sh
echo "$1" >> "$FAKE_LOG"
if [ "$1" = "$FAKE_FAIL" ]; then
  echo "$FAKE_FAIL_MESSAGE" >&2
  exit 1
fi
if [ "$1" = "kubeconfig" ]; then
  printf 'apiVersion: v1\nkind: Config\ncurrent-context: k0s\nclusters: []\ncontexts: []\nusers: []\n'
fi
"#;

/// Written once per test binary so no test execs the script while another
/// still holds it open for writing.
fn fake_k0sctl() -> &'static str {
    static FAKE: OnceLock<(TempDir, String)> = OnceLock::new();
    let (_, binary) = FAKE.get_or_init(|| {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("k0sctl");
        fs::write(&binary, FAKE_K0SCTL).unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();
        let binary = binary.to_string_lossy().into_owned();
        (dir, binary)
    });
    binary
}

struct Fixture {
    dir: TempDir,
    binary: &'static str,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("staging")).unwrap();
        Self {
            dir,
            binary: fake_k0sctl(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn provider(&self, fail: Option<(&str, &str)>) -> ProviderArgs {
        self.provider_with_staging(&self.path("staging"), fail)
    }

    fn provider_with_staging(&self, staging: &Path, fail: Option<(&str, &str)>) -> ProviderArgs {
        let mut properties = vec![
            format!("k0sctl.binary={}", self.binary),
            format!("staging.dir={}", staging.display()),
            format!("k0sctl.env.FAKE_LOG={}", self.path("calls.log").display()),
        ];
        if let Some((operation, message)) = fail {
            properties.push(format!("k0sctl.env.FAKE_FAIL={}", operation));
            properties.push(format!("k0sctl.env.FAKE_FAIL_MESSAGE={}", message));
        }
        ProviderArgs {
            config_file: None,
            properties,
        }
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.path("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn write_plan(&self, config: &str) -> PathBuf {
        let plan = self.path("plan.json");
        let desired = ClusterDesiredState::new(config, "K1");
        fs::write(&plan, serde_json::to_string(&desired).unwrap()).unwrap();
        plan
    }

    fn write_state(&self) -> (PathBuf, String) {
        let state = self.path("state.json");
        let mut record = ClusterRecord::from_desired(ClusterDesiredState::new("C1", "K1"));
        record.kubeconfig = Some("KUBECONFIG-DATA".to_string());
        let json = serde_json::to_string_pretty(&record).unwrap();
        fs::write(&state, &json).unwrap();
        (state, json)
    }
}

#[tokio::test]
async fn test_create_writes_private_state() {
    let fixture = Fixture::new();
    let state = fixture.path("state.json");
    let cmd = CreateCommand {
        provider: fixture.provider(None),
        plan: fixture.write_plan("C1"),
        state: state.clone(),
    };

    cmd.execute().await.unwrap();

    let record: ClusterRecord = serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(record.config, "C1");
    assert!(record.kubeconfig().unwrap().contains("current-context: k0s"));
    let mode = fs::metadata(&state).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(fixture.calls(), vec!["apply", "kubeconfig"]);
}

#[tokio::test]
async fn test_update_failed_apply_keeps_state() {
    let fixture = Fixture::new();
    let (state, before) = fixture.write_state();
    let cmd = UpdateCommand {
        provider: fixture.provider(Some(("apply", "host unreachable"))),
        plan: fixture.write_plan("C2"),
        state: state.clone(),
    };

    let err = cmd.execute().await.unwrap_err();
    assert!(err.to_string().contains("Failed to run k0sctl apply"));
    assert_eq!(fs::read_to_string(&state).unwrap(), before);
    assert_eq!(fixture.calls(), vec!["apply"]);
}

#[tokio::test]
async fn test_read_missing_cluster_removes_state() {
    let fixture = Fixture::new();
    let (state, _) = fixture.write_state();
    let cmd = ReadCommand {
        provider: fixture.provider(Some((
            "kubeconfig",
            "failed to read file /var/lib/k0s/kubelet.conf",
        ))),
        state: state.clone(),
    };

    cmd.execute().await.unwrap();
    assert!(!state.exists());
}

#[tokio::test]
async fn test_read_fatal_failure_keeps_state() {
    let fixture = Fixture::new();
    let (state, before) = fixture.write_state();
    let cmd = ReadCommand {
        provider: fixture.provider(Some(("kubeconfig", "dial tcp: connection refused"))),
        state: state.clone(),
    };

    let err = cmd.execute().await.unwrap_err();
    assert!(err.to_string().contains("Failed to read kubeconfig"));
    assert_eq!(fs::read_to_string(&state).unwrap(), before);
}

#[tokio::test]
async fn test_delete_failed_reset_removes_state() {
    let fixture = Fixture::new();
    let (state, _) = fixture.write_state();
    let cmd = DeleteCommand {
        provider: fixture.provider(Some(("reset", "controller unreachable"))),
        state: state.clone(),
    };

    let err = cmd.execute().await.unwrap_err();
    assert!(err.to_string().contains("Failed to reset k0s cluster"));
    assert!(!state.exists());
    assert_eq!(fixture.calls(), vec!["reset"]);
}

#[tokio::test]
async fn test_delete_staging_failure_keeps_state() {
    let fixture = Fixture::new();
    let (state, before) = fixture.write_state();
    let missing = fixture.path("missing");
    let cmd = DeleteCommand {
        provider: fixture.provider_with_staging(&missing, None),
        state: state.clone(),
    };

    let err = cmd.execute().await.unwrap_err();
    assert!(err.to_string().contains("Failed to create temporary files"));
    assert_eq!(fs::read_to_string(&state).unwrap(), before);
    assert!(fixture.calls().is_empty());
}
