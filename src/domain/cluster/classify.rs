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

//! Interpretation of failed kubeconfig reads.
//!
//! k0sctl has no structured "cluster absent" error. Once a cluster has been
//! reset, `k0sctl kubeconfig` fails because the controller no longer has
//! `/var/lib/k0s/kubelet.conf`, and that text is the only signal available.
//! If k0sctl rewords the message, absent clusters surface as read errors.

use crate::infrastructure::constants::CLUSTER_MISSING_MARKER;
use crate::shared::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFailure {
    /// The cluster no longer exists; drop the record.
    ClusterGone,
    Fatal,
}

pub fn classify_read_failure(err: &CommandError) -> ReadFailure {
    if indicates_missing_cluster(&err.message) {
        ReadFailure::ClusterGone
    } else {
        ReadFailure::Fatal
    }
}

pub fn indicates_missing_cluster(message: &str) -> bool {
    message.contains(CLUSTER_MISSING_MARKER)
}
