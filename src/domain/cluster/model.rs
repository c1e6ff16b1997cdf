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

use serde::{Deserialize, Serialize};
use std::fmt;

const REDACTED: &str = "<sensitive>";

/// Caller-supplied desired configuration of a k0s cluster.
///
/// Unknown attributes in the incoming document (including a planned
/// `kubeconfig`) are ignored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDesiredState {
    /// k0sctl cluster configuration, passed through unchanged
    pub config: String,
    pub ssh_private_key: String,
}

impl ClusterDesiredState {
    pub fn new(config: impl Into<String>, ssh_private_key: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            ssh_private_key: ssh_private_key.into(),
        }
    }
}

impl fmt::Debug for ClusterDesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterDesiredState")
            .field("config", &self.config)
            .field("ssh_private_key", &REDACTED)
            .finish()
    }
}

/// Desired state plus the computed kubeconfig; what the caller persists
/// between lifecycle calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub config: String,
    pub ssh_private_key: String,
    #[serde(default)]
    pub kubeconfig: Option<String>,
}

impl ClusterRecord {
    /// A record that has not been applied yet.
    pub fn from_desired(desired: ClusterDesiredState) -> Self {
        Self {
            config: desired.config,
            ssh_private_key: desired.ssh_private_key,
            kubeconfig: None,
        }
    }

    pub fn desired(&self) -> ClusterDesiredState {
        ClusterDesiredState::new(self.config.clone(), self.ssh_private_key.clone())
    }

    pub fn kubeconfig(&self) -> Option<&str> {
        self.kubeconfig.as_deref()
    }
}

impl fmt::Debug for ClusterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterRecord")
            .field("config", &self.config)
            .field("ssh_private_key", &REDACTED)
            .field("kubeconfig", &self.kubeconfig.as_ref().map(|_| REDACTED))
            .finish()
    }
}
