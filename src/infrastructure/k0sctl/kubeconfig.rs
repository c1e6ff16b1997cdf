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

use super::runner::{CommandRunner, Operation, OutputSink};
use crate::shared::error::{CommandError, ProviderError, Result};
use kube::config::Kubeconfig;
use std::path::Path;

/// Runs `k0sctl kubeconfig` and returns what it printed.
///
/// The command error is returned untouched so callers can inspect its message.
pub async fn capture_kubeconfig(
    runner: &dyn CommandRunner,
    workdir: &Path,
) -> std::result::Result<String, CommandError> {
    let mut buffer = Vec::new();
    runner
        .run(workdir, Operation::Kubeconfig, OutputSink::Capture(&mut buffer))
        .await?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Non-secret facts about an admin kubeconfig, for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KubeconfigSummary {
    pub current_context: Option<String>,
    pub servers: Vec<String>,
}

pub fn summarize_kubeconfig(kubeconfig: &str) -> Result<KubeconfigSummary> {
    let parsed = Kubeconfig::from_yaml(kubeconfig)
        .map_err(|e| ProviderError::config_error(format!("Invalid kubeconfig: {}", e)))?;

    let servers = parsed
        .clusters
        .iter()
        .filter_map(|named| named.cluster.as_ref().and_then(|c| c.server.clone()))
        .collect();

    Ok(KubeconfigSummary {
        current_context: parsed.current_context,
        servers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN_KUBECONFIG: &str = r#"apiVersion: v1
clusters:
- cluster:
    server: https://10.0.0.1:6443
  name: k0s-cluster
contexts:
- context:
    cluster: k0s-cluster
    user: admin
  name: k0s-cluster
current-context: k0s-cluster
kind: Config
preferences: {}
users:
- name: admin
  user:
    token: abc
"#;

    #[test]
    fn test_summarize_kubeconfig() {
        let summary = summarize_kubeconfig(ADMIN_KUBECONFIG).unwrap();
        assert_eq!(summary.current_context.as_deref(), Some("k0s-cluster"));
        assert_eq!(summary.servers, vec!["https://10.0.0.1:6443".to_string()]);
    }

    #[test]
    fn test_summarize_rejects_garbage() {
        assert!(summarize_kubeconfig("::: not yaml [").is_err());
    }
}
