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

//! Staging of the k0sctl input files.
//!
//! k0sctl reads its cluster configuration and the SSH key from fixed file
//! names in its working directory. [`ArtifactStager::stage`] writes both
//! files and hands back a [`StagedArtifacts`] handle that must be released
//! with [`StagedArtifacts::clean_up`] once the command has run.

use crate::domain::config::StagingConf;
use crate::infrastructure::constants::{
    ARTIFACT_FILE_MODE, CONFIG_FILE_NAME, SSH_KEY_FILE_NAME, STAGING_DIR_MODE, STAGING_DIR_PREFIX,
};
use crate::shared::error::{ProviderError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// How staged files are laid out under the base directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingLayout {
    /// A fresh `.k0sctl-<uuid>` directory per operation.
    Isolated,
    /// Files directly in the base directory. Concurrent operations sharing a
    /// base directory overwrite each other's input.
    Shared,
}

#[derive(Debug, Clone)]
pub struct ArtifactStager {
    base_dir: PathBuf,
    layout: StagingLayout,
}

impl ArtifactStager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            layout: StagingLayout::Isolated,
        }
    }

    pub fn shared(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            layout: StagingLayout::Shared,
        }
    }

    pub fn from_config(conf: &StagingConf) -> Self {
        if conf.isolate {
            Self::new(&conf.dir)
        } else {
            Self::shared(&conf.dir)
        }
    }

    /// Writes `config` and `ssh_private_key` to their fixed file names.
    ///
    /// The config file is written first. If writing the key fails the config
    /// file stays on disk.
    pub fn stage(&self, config: &str, ssh_private_key: &str) -> Result<StagedArtifacts> {
        let (dir, owns_dir) = match self.layout {
            StagingLayout::Isolated => {
                let dir = self
                    .base_dir
                    .join(format!("{}{}", STAGING_DIR_PREFIX, Uuid::new_v4()));
                create_private_dir(&dir).map_err(|e| ProviderError::staging(&dir, e))?;
                (dir, true)
            }
            StagingLayout::Shared => (self.base_dir.clone(), false),
        };

        let config_path = dir.join(CONFIG_FILE_NAME);
        write_private_file(&config_path, config)
            .map_err(|e| ProviderError::staging(&config_path, e))?;

        let key_path = dir.join(SSH_KEY_FILE_NAME);
        write_private_file(&key_path, ssh_private_key)
            .map_err(|e| ProviderError::staging(&key_path, e))?;

        tracing::debug!(dir = %dir.display(), "Staged k0sctl artifacts");

        Ok(StagedArtifacts {
            dir,
            owns_dir,
            released: false,
        })
    }
}

/// Handle to staged files.
///
/// Dropping the handle without calling [`clean_up`](Self::clean_up) removes
/// the files silently.
#[derive(Debug)]
pub struct StagedArtifacts {
    dir: PathBuf,
    owns_dir: bool,
    released: bool,
}

impl StagedArtifacts {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    pub fn ssh_key_path(&self) -> PathBuf {
        self.dir.join(SSH_KEY_FILE_NAME)
    }

    /// Removes both files, then the staging directory when it was created for
    /// this operation. Every removal is attempted; failures are reported
    /// together.
    pub fn clean_up(mut self) -> Result<()> {
        self.released = true;

        let mut failures = Vec::new();
        for name in [CONFIG_FILE_NAME, SSH_KEY_FILE_NAME] {
            if let Err(e) = fs::remove_file(self.dir.join(name)) {
                failures.push(format!("failed to remove {}: {}", name, e));
            }
        }

        if self.owns_dir && failures.is_empty() {
            if let Err(e) = fs::remove_dir(&self.dir) {
                failures.push(format!("failed to remove {}: {}", self.dir.display(), e));
            }
        }

        if failures.is_empty() {
            tracing::debug!(dir = %self.dir.display(), "Removed staged k0sctl artifacts");
            Ok(())
        } else {
            Err(ProviderError::Cleanup(failures))
        }
    }
}

impl Drop for StagedArtifacts {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let _ = fs::remove_file(self.config_path());
        let _ = fs::remove_file(self.ssh_key_path());
        if self.owns_dir {
            let _ = fs::remove_dir(&self.dir);
        }
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().mode(STAGING_DIR_MODE).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir(dir)
}

fn write_private_file(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(ARTIFACT_FILE_MODE);
    }
    let mut file = options.open(path)?;
    // The open mode only applies to new files; a leftover keeps its own.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(ARTIFACT_FILE_MODE))?;
    }
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}
