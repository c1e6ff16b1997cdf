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

use crate::domain::cluster::classify::{classify_read_failure, ReadFailure};
use crate::domain::cluster::diagnostics::Diagnostics;
use crate::domain::cluster::inspect::inspect_config;
use crate::domain::cluster::model::{ClusterDesiredState, ClusterRecord};
use crate::domain::config::ProviderConfig;
use crate::infrastructure::k0sctl::{
    capture_kubeconfig, ArtifactStager, CommandRunner, K0sctlRunner, Operation, OutputSink,
    StagedArtifacts,
};
use crate::shared::error::CommandError;

pub const STAGING_FAILED: &str = "Failed to create temporary files";
pub const CLEANUP_FAILED: &str = "Failed to clean up temporary files";
pub const APPLY_FAILED: &str = "Failed to run k0sctl apply";
pub const KUBECONFIG_FAILED: &str = "Failed to get kubeconfig";
pub const READ_FAILED: &str = "Failed to read kubeconfig";
pub const RESET_FAILED: &str = "Failed to reset k0s cluster";
pub const FOREIGN_KEY_PATH: &str = "Hosts do not use the staged SSH key";

/// Result of Create and Update. `record` is set only on success.
#[derive(Debug)]
pub struct ApplyResponse {
    pub record: Option<ClusterRecord>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadState {
    Present(ClusterRecord),
    /// The cluster no longer exists and the record should be dropped.
    Removed,
}

#[derive(Debug)]
pub struct ReadResponse {
    pub state: ReadState,
    pub diagnostics: Diagnostics,
}

/// Result of Delete.
///
/// `reset_attempted` is false when staging failed and k0sctl never ran; the
/// record must then be kept. Once the reset has run the record counts as
/// removed, even when `diagnostics` carries a reset error.
#[derive(Debug)]
pub struct DeleteResponse {
    pub reset_attempted: bool,
    pub diagnostics: Diagnostics,
}

/// Drives k0sctl through the cluster lifecycle.
///
/// Every operation stages the config and key, runs k0sctl against them and
/// removes them again before returning, whatever the command's outcome. The
/// reconciler keeps no state between calls.
pub struct ClusterReconciler {
    runner: Box<dyn CommandRunner>,
    stager: ArtifactStager,
}

impl ClusterReconciler {
    pub fn new(runner: Box<dyn CommandRunner>, stager: ArtifactStager) -> Self {
        Self { runner, stager }
    }

    pub fn from_config(conf: &ProviderConfig) -> Self {
        Self::new(
            Box::new(K0sctlRunner::from_config(&conf.k0sctl)),
            ArtifactStager::from_config(&conf.staging),
        )
    }

    pub async fn create(&self, desired: ClusterDesiredState) -> ApplyResponse {
        tracing::info!("Creating k0s cluster");
        self.apply(desired).await
    }

    /// Full re-apply; nothing is diffed against the prior record.
    pub async fn update(&self, desired: ClusterDesiredState) -> ApplyResponse {
        tracing::info!("Updating k0s cluster");
        self.apply(desired).await
    }

    pub async fn read(&self, mut record: ClusterRecord) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(staged) = self.stage(&record.config, &record.ssh_private_key, &mut diagnostics)
        else {
            return ReadResponse {
                state: ReadState::Present(record),
                diagnostics,
            };
        };

        let state = match self.fetch_kubeconfig(&staged).await {
            Ok(kubeconfig) => {
                record.kubeconfig = Some(kubeconfig);
                ReadState::Present(record)
            }
            Err(err) => match classify_read_failure(&err) {
                ReadFailure::ClusterGone => {
                    tracing::info!("k0s cluster no longer exists, dropping it from state");
                    ReadState::Removed
                }
                ReadFailure::Fatal => {
                    tracing::error!(error = %err, "Failed to read kubeconfig");
                    diagnostics.add_error(READ_FAILED, err.to_string());
                    ReadState::Present(record)
                }
            },
        };

        self.release(staged, &mut diagnostics);
        ReadResponse { state, diagnostics }
    }

    pub async fn delete(&self, record: ClusterRecord) -> DeleteResponse {
        let mut diagnostics = Diagnostics::new();
        tracing::info!("Resetting k0s cluster");

        let Some(staged) = self.stage(&record.config, &record.ssh_private_key, &mut diagnostics)
        else {
            return DeleteResponse {
                reset_attempted: false,
                diagnostics,
            };
        };

        if let Err(err) = self
            .runner
            .run(staged.dir(), Operation::Reset, OutputSink::Default)
            .await
        {
            tracing::error!(error = %err, "k0sctl reset failed");
            diagnostics.add_error(RESET_FAILED, err.to_string());
        }

        self.release(staged, &mut diagnostics);
        DeleteResponse {
            reset_attempted: true,
            diagnostics,
        }
    }

    async fn apply(&self, desired: ClusterDesiredState) -> ApplyResponse {
        let mut diagnostics = Diagnostics::new();
        self.inspect(&desired.config, &mut diagnostics);

        let Some(staged) = self.stage(&desired.config, &desired.ssh_private_key, &mut diagnostics)
        else {
            return ApplyResponse {
                record: None,
                diagnostics,
            };
        };

        let record = match self.apply_staged(&staged).await {
            Ok(kubeconfig) => {
                let mut record = ClusterRecord::from_desired(desired);
                record.kubeconfig = Some(kubeconfig);
                Some(record)
            }
            Err((summary, err)) => {
                tracing::error!(error = %err, "{}", summary);
                diagnostics.add_error(summary, err.to_string());
                None
            }
        };

        self.release(staged, &mut diagnostics);
        ApplyResponse {
            record,
            diagnostics,
        }
    }

    async fn apply_staged(
        &self,
        staged: &StagedArtifacts,
    ) -> Result<String, (&'static str, CommandError)> {
        self.runner
            .run(staged.dir(), Operation::Apply, OutputSink::Default)
            .await
            .map_err(|e| (APPLY_FAILED, e))?;

        self.fetch_kubeconfig(staged)
            .await
            .map_err(|e| (KUBECONFIG_FAILED, e))
    }

    async fn fetch_kubeconfig(&self, staged: &StagedArtifacts) -> Result<String, CommandError> {
        let kubeconfig = capture_kubeconfig(self.runner.as_ref(), staged.dir()).await?;
        if kubeconfig.trim().is_empty() {
            return Err(CommandError::new(
                Operation::Kubeconfig.as_str(),
                "k0sctl kubeconfig produced no output",
            ));
        }
        Ok(kubeconfig)
    }

    fn stage(
        &self,
        config: &str,
        ssh_private_key: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<StagedArtifacts> {
        match self.stager.stage(config, ssh_private_key) {
            Ok(staged) => Some(staged),
            Err(e) => {
                tracing::error!(error = %e, "Failed to stage k0sctl artifacts");
                diagnostics.add_error(STAGING_FAILED, e.to_string());
                None
            }
        }
    }

    fn release(&self, staged: StagedArtifacts, diagnostics: &mut Diagnostics) {
        if let Err(e) = staged.clean_up() {
            tracing::warn!(error = %e, "Failed to clean up staged k0sctl artifacts");
            diagnostics.add_warning(CLEANUP_FAILED, e.to_string());
        }
    }

    fn inspect(&self, config: &str, diagnostics: &mut Diagnostics) {
        let Some(inspection) = inspect_config(config) else {
            tracing::debug!("k0sctl config is not a YAML mapping, passing it through");
            return;
        };

        tracing::info!(
            cluster = inspection.cluster_name.as_deref().unwrap_or("<unnamed>"),
            hosts = inspection.host_count,
            controllers = inspection.controller_count,
            "Inspected k0sctl config"
        );

        if !inspection.foreign_key_hosts.is_empty() {
            diagnostics.add_warning(
                FOREIGN_KEY_PATH,
                format!(
                    "ssh.keyPath should be ./id_dsa for: {}",
                    inspection.foreign_key_hosts.join(", ")
                ),
            );
        }
    }
}
