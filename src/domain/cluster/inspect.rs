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

//! Best-effort look into the k0sctl configuration.
//!
//! The configuration is handed to k0sctl unchanged; parsing here only feeds
//! logging and warnings.

use crate::infrastructure::constants::SSH_KEY_FILE_NAME;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct K0sctlManifest {
    metadata: Metadata,
    spec: Spec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Metadata {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Spec {
    hosts: Vec<Host>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Host {
    role: Option<String>,
    ssh: Option<SshConnection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SshConnection {
    address: String,
    #[serde(rename = "keyPath")]
    key_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigInspection {
    pub cluster_name: Option<String>,
    pub host_count: usize,
    pub controller_count: usize,
    /// SSH hosts whose key path does not resolve to the staged key
    pub foreign_key_hosts: Vec<String>,
}

/// Returns `None` when the text is not a YAML mapping.
pub fn inspect_config(config: &str) -> Option<ConfigInspection> {
    let manifest: K0sctlManifest = serde_yaml::from_str(config).ok()?;

    let controller_count = manifest
        .spec
        .hosts
        .iter()
        .filter(|h| {
            h.role
                .as_deref()
                .map(|r| r.starts_with("controller") || r == "single")
                .unwrap_or(false)
        })
        .count();

    let foreign_key_hosts = manifest
        .spec
        .hosts
        .iter()
        .filter_map(|h| h.ssh.as_ref())
        .filter(|ssh| !uses_staged_key(ssh.key_path.as_deref()))
        .map(|ssh| ssh.address.clone())
        .collect();

    Some(ConfigInspection {
        cluster_name: manifest.metadata.name,
        host_count: manifest.spec.hosts.len(),
        controller_count,
        foreign_key_hosts,
    })
}

fn uses_staged_key(key_path: Option<&str>) -> bool {
    match key_path {
        Some(path) => {
            let path = path.trim();
            path == SSH_KEY_FILE_NAME || path.strip_prefix("./") == Some(SSH_KEY_FILE_NAME)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
apiVersion: k0sctl.k0sproject.io/v1beta1
kind: Cluster
metadata:
  name: k0s-cluster
spec:
  hosts:
  - ssh:
      address: 10.0.0.1
      user: root
      port: 22
      keyPath: ./id_dsa
    role: controller
  - ssh:
      address: 10.0.0.2
      user: root
      keyPath: ~/.ssh/id_rsa
    role: worker
  - ssh:
      address: 10.0.0.3
      user: root
    role: worker
"#;

    #[test]
    fn test_inspect_config() {
        let inspection = inspect_config(CONFIG).unwrap();
        assert_eq!(inspection.cluster_name.as_deref(), Some("k0s-cluster"));
        assert_eq!(inspection.host_count, 3);
        assert_eq!(inspection.controller_count, 1);
        assert_eq!(inspection.foreign_key_hosts, vec!["10.0.0.2", "10.0.0.3"]);
    }

    #[test]
    fn test_opaque_config() {
        assert_eq!(inspect_config("C1"), None);
        assert_eq!(inspect_config("- a\n- b"), None);
    }

    #[test]
    fn test_staged_key_paths() {
        assert!(uses_staged_key(Some("./id_dsa")));
        assert!(uses_staged_key(Some("id_dsa")));
        assert!(!uses_staged_key(Some("/root/id_dsa")));
        assert!(!uses_staged_key(None));
    }
}
