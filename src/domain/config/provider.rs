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

//! Provider configuration, loaded from TOML

use crate::infrastructure::constants::{CONFIG_ENV_VAR, DEFAULT_K0SCTL_BINARY, DEFAULT_STAGING_DIR};
use crate::shared::error::{ProviderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::read_to_string;

/// Top-level provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub k0sctl: K0sctlConf,
    pub staging: StagingConf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct K0sctlConf {
    /// k0sctl executable; bare names go through PATH, relative paths are
    /// taken from the current directory
    pub binary: String,
    pub debug: bool,
    /// Extra environment for every k0sctl invocation
    pub env: BTreeMap<String, String>,
}

impl Default for K0sctlConf {
    fn default() -> Self {
        Self {
            binary: DEFAULT_K0SCTL_BINARY.to_string(),
            debug: false,
            env: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StagingConf {
    pub dir: String,
    /// Stage each operation in its own subdirectory
    pub isolate: bool,
}

impl Default for StagingConf {
    fn default() -> Self {
        Self {
            dir: DEFAULT_STAGING_DIR.to_string(),
            isolate: true,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from TOML file
    pub fn from<T: AsRef<str>>(path: T) -> Result<Self> {
        let content = read_to_string(path.as_ref()).map_err(|e| {
            ProviderError::config_error(format!(
                "Failed to read config file {}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let conf: Self = toml::from_str(&content)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Explicit path > `K0S_PROVIDER_CONFIG` > defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from(path);
        }
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(env_path) if !env_path.is_empty() => Self::from(env_path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.k0sctl.binary.trim().is_empty() {
            return Err(ProviderError::config_error("k0sctl.binary must not be empty"));
        }
        if self.staging.dir.trim().is_empty() {
            return Err(ProviderError::config_error("staging.dir must not be empty"));
        }
        Ok(())
    }
}
