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

/// Provider and resource naming
pub const PROVIDER_TYPE_NAME: &str = "k0s";
pub const CLUSTER_RESOURCE_NAME: &str = "cluster";

/// Staged artifact file names, expected by k0sctl in its working directory
pub const CONFIG_FILE_NAME: &str = "k0sctl.yaml";
pub const SSH_KEY_FILE_NAME: &str = "id_dsa";

/// Per-operation staging directory prefix
pub const STAGING_DIR_PREFIX: &str = ".k0sctl-";

/// File modes
pub const ARTIFACT_FILE_MODE: u32 = 0o600;
pub const STAGING_DIR_MODE: u32 = 0o700;
pub const STATE_FILE_MODE: u32 = 0o600;

/// k0sctl defaults
pub const DEFAULT_K0SCTL_BINARY: &str = "k0sctl";
pub const DEFAULT_STAGING_DIR: &str = ".";

/// Host-side kubelet config; k0sctl fails to read it once the cluster is reset
pub const KUBELET_CONF_PATH: &str = "/var/lib/k0s/kubelet.conf";
pub const CLUSTER_MISSING_MARKER: &str = "failed to read file /var/lib/k0s/kubelet.conf";

/// Environment variable naming the provider config file
pub const CONFIG_ENV_VAR: &str = "K0S_PROVIDER_CONFIG";

/// Log target for k0sctl output forwarded to tracing
pub const K0SCTL_LOG_TARGET: &str = "k0sctl";
