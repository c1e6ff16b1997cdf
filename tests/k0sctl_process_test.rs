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

//! Full lifecycle against a fake k0sctl executable.

#![cfg(unix)]

use k0s_provider::domain::cluster::reconciler::RESET_FAILED;
use k0s_provider::*;
use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

const FAKE_K0SCTL: &str = r#"#!/bin/sh
case " $* " in
  *" --config k0sctl.yaml "*) ;;
  *) echo "bad arguments: $*" >&2; exit 2 ;;
esac
[ -f k0sctl.yaml ] && [ -f id_dsa ] || { echo "artifacts not staged" >&2; exit 3; }
case "$1" in
  apply)
    echo "Running phase: Connect to hosts"
    ;;
  kubeconfig)
    if [ -n "$FAKE_CLUSTER_GONE" ]; then
      echo "failed to read file /var/lib/k0s/kubelet.conf" >&2
      exit 1
    fi
    printf 'apiVersion: v1\nkind: Config\ncurrent-context: k0s\nclusters: []\ncontexts: []\nusers: []\n'
    ;;
  reset)
    echo "reset refused on $(cat k0sctl.yaml)" >&2
    exit 1
    ;;
esac
"#;

fn install_fake(dir: &Path) -> String {
    let path = dir.join("k0sctl");
    std::fs::write(&path, FAKE_K0SCTL).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

fn config(binary: String, staging: &Path, env: BTreeMap<String, String>) -> ProviderConfig {
    ProviderConfig {
        k0sctl: K0sctlConf {
            binary,
            debug: false,
            env,
        },
        staging: StagingConf {
            dir: staging.to_string_lossy().into_owned(),
            isolate: true,
        },
    }
}

#[tokio::test]
async fn test_lifecycle_with_fake_k0sctl() {
    let bin = tempfile::tempdir().unwrap();
    let staging = tempfile::tempdir().unwrap();
    let binary = install_fake(bin.path());

    let reconciler =
        ClusterReconciler::from_config(&config(binary.clone(), staging.path(), BTreeMap::new()));

    let created = reconciler
        .create(ClusterDesiredState::new("cluster-a", "KEY"))
        .await;
    assert!(!created.diagnostics.has_error(), "{:?}", created.diagnostics);
    let record = created.record.unwrap();
    assert!(record
        .kubeconfig()
        .unwrap()
        .contains("current-context: k0s"));

    let read = reconciler.read(record.clone()).await;
    assert_eq!(read.state, ReadState::Present(record.clone()));

    let deleted = reconciler.delete(record.clone()).await;
    let error = deleted.diagnostics.errors().next().unwrap();
    assert_eq!(error.summary, RESET_FAILED);
    assert_eq!(error.detail, "reset refused on cluster-a");

    // The cluster vanishes: the environment switch makes kubeconfig fail
    let mut env = BTreeMap::new();
    env.insert("FAKE_CLUSTER_GONE".to_string(), "1".to_string());
    let gone = ClusterReconciler::from_config(&config(binary, staging.path(), env));
    let read = gone.read(record).await;
    assert_eq!(read.state, ReadState::Removed);
    assert!(read.diagnostics.is_empty());

    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
}
