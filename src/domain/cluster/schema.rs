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

use crate::infrastructure::constants::{CLUSTER_RESOURCE_NAME, PROVIDER_TYPE_NAME};
use crate::shared::error::{ProviderError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeMode {
    Required,
    Computed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    pub description: &'static str,
    pub mode: AttributeMode,
    pub sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSchema {
    pub type_name: String,
    pub attributes: Vec<Attribute>,
}

impl ResourceSchema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn required(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.mode == AttributeMode::Required)
    }

    /// Checks that every required attribute is present and is a string.
    /// Computed attributes in the document are ignored.
    pub fn check_plan(&self, plan: &serde_json::Value) -> Result<()> {
        let object = plan
            .as_object()
            .ok_or_else(|| ProviderError::config_error("plan must be a JSON object"))?;

        let mut missing = Vec::new();
        for attribute in self.required() {
            match object.get(attribute.name) {
                Some(serde_json::Value::String(_)) => {}
                Some(serde_json::Value::Null) | None => missing.push(attribute.name),
                Some(_) => {
                    return Err(ProviderError::config_error(format!(
                        "attribute '{}' must be a string",
                        attribute.name
                    )))
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::config_error(format!(
                "missing required attribute(s): {}",
                missing.join(", ")
            )))
        }
    }

    /// Markdown reference page for the resource.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {} (Resource)\n\n", self.type_name);
        out.push_str("Manages a k0s cluster with k0sctl.\n\n## Schema\n");

        for (heading, mode) in [
            ("Required", AttributeMode::Required),
            ("Read-Only", AttributeMode::Computed),
        ] {
            out.push_str(&format!("\n### {}\n\n", heading));
            for attribute in self.attributes.iter().filter(|a| a.mode == mode) {
                let sensitive = if attribute.sensitive {
                    ", Sensitive"
                } else {
                    ""
                };
                out.push_str(&format!(
                    "- `{}` (String{}) {}\n",
                    attribute.name, sensitive, attribute.description
                ));
            }
        }
        out
    }
}

pub fn cluster_resource_type_name() -> String {
    format!("{}_{}", PROVIDER_TYPE_NAME, CLUSTER_RESOURCE_NAME)
}

pub fn cluster_schema() -> ResourceSchema {
    ResourceSchema {
        type_name: cluster_resource_type_name(),
        attributes: vec![
            Attribute {
                name: "config",
                description: "k0sctl cluster configuration. Make sure to set host private key path to ./id_dsa",
                mode: AttributeMode::Required,
                sensitive: false,
            },
            Attribute {
                name: "ssh_private_key",
                description: "SSH private key to authenticate with the hosts defined in configuration.",
                mode: AttributeMode::Required,
                sensitive: true,
            },
            Attribute {
                name: "kubeconfig",
                description: "The created k0s cluster admin kubeconfig",
                mode: AttributeMode::Computed,
                sensitive: true,
            },
        ],
    }
}
