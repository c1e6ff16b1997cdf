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

use crate::domain::config::K0sctlConf;
use crate::infrastructure::constants::{CONFIG_FILE_NAME, K0SCTL_LOG_TARGET};
use crate::shared::error::CommandError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;

/// k0sctl sub-operations driven by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Apply,
    Kubeconfig,
    Reset,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Apply => "apply",
            Operation::Kubeconfig => "kubeconfig",
            Operation::Reset => "reset",
        }
    }

    /// Sub-command arguments. Reset never prompts.
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            Operation::Apply => &["apply"],
            Operation::Kubeconfig => &["kubeconfig"],
            Operation::Reset => &["reset", "--force"],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an invocation's standard output goes.
///
/// The sink is chosen per call; nothing about it outlives the invocation.
#[derive(Debug)]
pub enum OutputSink<'a> {
    /// The runner's own default destination.
    Default,
    /// Appended to the caller's buffer.
    Capture(&'a mut Vec<u8>),
}

#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `operation` with `workdir` as working directory, which must hold
    /// the staged artifacts.
    async fn run(
        &self,
        workdir: &Path,
        operation: Operation,
        sink: OutputSink<'_>,
    ) -> Result<(), CommandError>;
}

/// Runs the k0sctl binary as a child process.
///
/// Default output is forwarded line by line to `tracing` under the `k0sctl`
/// target. Standard error is collected and becomes the error message when the
/// process exits unsuccessfully.
#[derive(Debug, Clone)]
pub struct K0sctlRunner {
    binary: String,
    debug: bool,
    env: BTreeMap<String, String>,
}

impl K0sctlRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            debug: false,
            env: BTreeMap::new(),
        }
    }

    /// Relative paths such as `./bin/k0sctl` are anchored to the current
    /// directory, since k0sctl itself runs inside the staging directory.
    /// Bare names are left for PATH lookup.
    pub fn from_config(conf: &K0sctlConf) -> Self {
        Self {
            binary: resolve_binary(&conf.binary),
            debug: conf.debug,
            env: conf.env.clone(),
        }
    }

    pub fn command_args(&self, operation: Operation) -> Vec<String> {
        let mut args: Vec<String> = operation.args().iter().map(|a| a.to_string()).collect();
        args.push("--config".to_string());
        args.push(CONFIG_FILE_NAME.to_string());
        if self.debug {
            args.push("--debug".to_string());
        }
        args
    }
}

#[async_trait::async_trait]
impl CommandRunner for K0sctlRunner {
    async fn run(
        &self,
        workdir: &Path,
        operation: Operation,
        sink: OutputSink<'_>,
    ) -> Result<(), CommandError> {
        let args = self.command_args(operation);
        tracing::debug!(
            binary = %self.binary,
            args = ?args,
            workdir = %workdir.display(),
            "Running k0sctl"
        );

        let mut child = Command::new(&self.binary)
            .args(&args)
            .current_dir(workdir)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CommandError::new(
                    operation.as_str(),
                    format!("failed to start {}: {}", self.binary, e),
                )
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            CommandError::new(operation.as_str(), "k0sctl stdout was not captured")
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            CommandError::new(operation.as_str(), "k0sctl stderr was not captured")
        })?;

        let (stdout_result, stderr_result) =
            futures::join!(pump_stdout(stdout, sink, operation), read_stderr(stderr));

        let status = child.wait().await.map_err(|e| {
            CommandError::new(
                operation.as_str(),
                format!("failed to wait for {}: {}", self.binary, e),
            )
        })?;

        let stderr_text = stderr_result
            .map_err(|e| CommandError::new(operation.as_str(), e.to_string()))?;
        stdout_result.map_err(|e| CommandError::new(operation.as_str(), e.to_string()))?;

        if status.success() {
            tracing::debug!(operation = %operation, "k0sctl finished");
            return Ok(());
        }

        let message = stderr_text.trim();
        if message.is_empty() {
            Err(CommandError::new(
                operation.as_str(),
                format!("k0sctl {} exited with {}", operation, status),
            ))
        } else {
            Err(CommandError::new(operation.as_str(), message))
        }
    }
}

fn resolve_binary(binary: &str) -> String {
    let path = Path::new(binary);
    if path.is_absolute() || path.components().count() < 2 {
        return binary.to_string();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path).to_string_lossy().into_owned(),
        Err(e) => {
            tracing::warn!(binary, error = %e, "Cannot resolve k0sctl binary path");
            binary.to_string()
        }
    }
}

async fn pump_stdout<R>(
    stdout: R,
    sink: OutputSink<'_>,
    operation: Operation,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    match sink {
        OutputSink::Capture(buffer) => {
            let mut reader = stdout;
            reader.read_to_end(buffer).await?;
        }
        OutputSink::Default => {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                tracing::info!(target: K0SCTL_LOG_TARGET, operation = %operation, "{}", line);
            }
        }
    }
    Ok(())
}

async fn read_stderr<R>(stderr: R) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut collected = String::new();
    let mut lines = BufReader::new(stderr).lines();
    while let Some(line) = lines.next_line().await? {
        tracing::debug!(target: K0SCTL_LOG_TARGET, "{}", line);
        collected.push_str(&line);
        collected.push('\n');
    }
    Ok(collected)
}
