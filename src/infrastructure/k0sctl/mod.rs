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

//! k0sctl integration: process runner, artifact staging and kubeconfig capture

pub mod kubeconfig;
pub mod runner;
pub mod staging;

pub use kubeconfig::{capture_kubeconfig, summarize_kubeconfig, KubeconfigSummary};
pub use runner::{CommandRunner, K0sctlRunner, Operation, OutputSink};
pub use staging::{ArtifactStager, StagedArtifacts, StagingLayout};
