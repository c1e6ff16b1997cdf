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

use super::provider::ProviderConfig;
use crate::shared::error::{ProviderError, Result};
use regex::Regex;
use std::collections::HashMap;

const ENV_PREFIX: &str = "k0sctl.env.";

/// Applies `-D key=value` overrides on top of the loaded configuration.
pub fn apply_to_provider_config(
    configs: &HashMap<String, String>,
    conf: &mut ProviderConfig,
) -> Result<()> {
    if let Some(binary) = configs.get("k0sctl.binary") {
        conf.k0sctl.binary = binary.clone();
    }

    if let Some(debug) = configs.get("k0sctl.debug") {
        conf.k0sctl.debug = parse_bool("k0sctl.debug", debug)?;
    }

    if let Some(dir) = configs.get("staging.dir") {
        conf.staging.dir = dir.clone();
    }

    if let Some(isolate) = configs.get("staging.isolate") {
        conf.staging.isolate = parse_bool("staging.isolate", isolate)?;
    }

    let env_name = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .map_err(|e| ProviderError::config_error(e.to_string()))?;
    for (key, value) in configs {
        if let Some(name) = key.strip_prefix(ENV_PREFIX) {
            if !env_name.is_match(name) {
                return Err(ProviderError::config_error(format!(
                    "Invalid environment variable name in '{}'",
                    key
                )));
            }
            conf.k0sctl.env.insert(name.to_string(), value.clone());
        }
    }

    conf.validate()
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ProviderError::config_error(format!(
            "Invalid boolean for {}: {}",
            key, value
        ))),
    }
}
