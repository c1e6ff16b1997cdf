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

//! Cluster resource domain

pub mod classify;
pub mod diagnostics;
pub mod inspect;
pub mod model;
pub mod reconciler;
pub mod schema;

pub use self::classify::{classify_read_failure, indicates_missing_cluster, ReadFailure};
pub use self::diagnostics::{Diagnostic, Diagnostics, Severity};
pub use self::inspect::{inspect_config, ConfigInspection};
pub use self::model::{ClusterDesiredState, ClusterRecord};
pub use self::reconciler::{
    ApplyResponse, ClusterReconciler, DeleteResponse, ReadResponse, ReadState,
};
pub use self::schema::{cluster_schema, Attribute, AttributeMode, ResourceSchema};
