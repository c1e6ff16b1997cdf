//! Cluster lifecycle commands

use crate::cli::display::{StatusIcon, TableRenderer};
use crate::domain::cluster::{
    cluster_schema, ClusterDesiredState, ClusterReconciler, ClusterRecord, Diagnostics, ReadState,
};
use crate::domain::config::{apply_to_provider_config, ProviderConfig};
use crate::infrastructure::constants::STATE_FILE_MODE;
use crate::infrastructure::k0sctl::summarize_kubeconfig;
use clap::Parser;
use colored::Colorize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Options shared by every command that talks to k0sctl
#[derive(Parser, Debug, Clone)]
pub struct ProviderArgs {
    /// Path to provider configuration file (TOML)
    /// If not provided, K0S_PROVIDER_CONFIG is consulted, then defaults are used
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<String>,

    /// Configuration overrides (-D key=value)
    ///
    /// Keys: k0sctl.binary, k0sctl.debug, k0sctl.env.NAME, staging.dir, staging.isolate
    ///
    /// Example: -Dk0sctl.binary=/usr/local/bin/k0sctl -Dk0sctl.env.DISABLE_TELEMETRY=true
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

impl ProviderArgs {
    pub fn load(&self) -> anyhow::Result<ProviderConfig> {
        let mut conf = ProviderConfig::load(self.config_file.as_deref())?;
        if !self.properties.is_empty() {
            let overrides = parse_dynamic_configs(&self.properties)
                .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
            apply_to_provider_config(&overrides, &mut conf)?;
        }
        Ok(conf)
    }

    pub fn reconciler(&self) -> anyhow::Result<ClusterReconciler> {
        let conf = self.load()?;
        tracing::debug!(config = ?conf, "Loaded provider configuration");
        Ok(ClusterReconciler::from_config(&conf))
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CreateCommand {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Planned resource attributes (JSON with config and ssh_private_key)
    #[arg(long, value_name = "PATH")]
    pub plan: PathBuf,

    /// Where to write the resulting state (JSON)
    #[arg(long, value_name = "PATH")]
    pub state: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct UpdateCommand {
    #[command(flatten)]
    pub provider: ProviderArgs,

    #[arg(long, value_name = "PATH")]
    pub plan: PathBuf,

    /// Current state; rewritten on success, left untouched on failure
    #[arg(long, value_name = "PATH")]
    pub state: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct ReadCommand {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Current state; refreshed in place, or removed when the cluster is gone
    #[arg(long, value_name = "PATH")]
    pub state: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Current state; removed once the reset has run, kept if staging failed
    #[arg(long, value_name = "PATH")]
    pub state: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct SchemaCommand {
    /// Print the resource documentation as Markdown
    #[arg(long)]
    pub markdown: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct KubeconfigCommand {
    #[arg(long, value_name = "PATH")]
    pub state: PathBuf,

    /// Write the kubeconfig to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

impl CreateCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let desired = load_plan(&self.plan)?;
        let reconciler = self.provider.reconciler()?;

        let response = reconciler.create(desired).await;
        if let Some(ref record) = response.record {
            write_state(&self.state, record)?;
            print_kubeconfig_summary(record);
        }
        finish(&response.diagnostics, "k0s cluster created")
    }
}

impl UpdateCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        // The prior state only has to exist; the update re-applies the plan as a whole.
        let _prior: ClusterRecord = read_json(&self.state)?;
        let desired = load_plan(&self.plan)?;
        let reconciler = self.provider.reconciler()?;

        let response = reconciler.update(desired).await;
        if let Some(ref record) = response.record {
            write_state(&self.state, record)?;
            print_kubeconfig_summary(record);
        }
        finish(&response.diagnostics, "k0s cluster updated")
    }
}

impl ReadCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let record: ClusterRecord = read_json(&self.state)?;
        let reconciler = self.provider.reconciler()?;

        let response = reconciler.read(record).await;
        match response.state {
            ReadState::Present(ref record) => {
                if !response.diagnostics.has_error() {
                    write_state(&self.state, record)?;
                    print_kubeconfig_summary(record);
                }
            }
            ReadState::Removed => {
                remove_state(&self.state)?;
                println!(
                    "{} k0s cluster no longer exists, removed {}",
                    "ℹ".cyan(),
                    self.state.display()
                );
            }
        }
        finish(&response.diagnostics, "k0s cluster state refreshed")
    }
}

impl DeleteCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let record: ClusterRecord = read_json(&self.state)?;
        let reconciler = self.provider.reconciler()?;

        let response = reconciler.delete(record).await;
        if response.reset_attempted {
            remove_state(&self.state)?;
        } else {
            tracing::warn!(
                state = %self.state.display(),
                "k0sctl reset did not run, keeping state"
            );
        }
        finish(&response.diagnostics, "k0s cluster deleted")
    }
}

impl SchemaCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let schema = cluster_schema();
        if self.markdown {
            print!("{}", schema.to_markdown());
        } else {
            println!("{}", TableRenderer::new().render_schema(&schema));
        }
        Ok(())
    }
}

impl KubeconfigCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let record: ClusterRecord = read_json(&self.state)?;
        let kubeconfig = record.kubeconfig().ok_or_else(|| {
            anyhow::anyhow!(
                "No kubeconfig in {}; run create or read first",
                self.state.display()
            )
        })?;

        match self.out {
            Some(ref path) => {
                write_private(path, kubeconfig.as_bytes())?;
                println!(
                    "{} Kubeconfig written to {}",
                    StatusIcon::SUCCESS.green(),
                    path.display()
                );
            }
            None => print!("{}", kubeconfig),
        }
        Ok(())
    }
}

fn finish(diagnostics: &Diagnostics, success: &str) -> anyhow::Result<()> {
    if !diagnostics.is_empty() {
        println!("{}", TableRenderer::new().render_diagnostics(diagnostics));
    }

    if diagnostics.has_error() {
        let first = diagnostics
            .errors()
            .next()
            .map(|d| d.summary.clone())
            .unwrap_or_default();
        anyhow::bail!("{}", first);
    }

    println!("{} {}", StatusIcon::SUCCESS.green(), success);
    Ok(())
}

fn print_kubeconfig_summary(record: &ClusterRecord) {
    let Some(kubeconfig) = record.kubeconfig() else {
        return;
    };
    match summarize_kubeconfig(kubeconfig) {
        Ok(summary) => {
            if let Some(context) = summary.current_context {
                println!("  Context: {}", context);
            }
            for server in summary.servers {
                println!("  API server: {}", server);
            }
        }
        Err(e) => tracing::debug!(error = %e, "Could not summarize kubeconfig"),
    }
}

fn load_plan(path: &Path) -> anyhow::Result<ClusterDesiredState> {
    let value: serde_json::Value = read_json(path)?;
    cluster_schema()
        .check_plan(&value)
        .map_err(|e| anyhow::anyhow!("Invalid plan {}: {}", path.display(), e))?;
    Ok(serde_json::from_value(value)?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
}

fn write_state(path: &Path, record: &ClusterRecord) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(record)?;
    write_private(path, &json)
}

/// Writes through a sibling temp file and renames it into place, so the
/// target is either the old or the new content and always ends up 0600.
fn write_private(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path {}", path.display()))?;
    let tmp = path.with_file_name(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        Uuid::new_v4()
    ));

    let written = write_new_private(&tmp, contents).and_then(|()| std::fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        anyhow::bail!("Failed to write {}: {}", path.display(), e);
    }
    Ok(())
}

fn write_new_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(STATE_FILE_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

fn remove_state(path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::anyhow!(
            "Failed to remove {}: {}",
            path.display(),
            e
        )),
    }
}

/// Parse dynamic configuration properties from -D key=value format
fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>, String> {
    let mut map = HashMap::new();

    for config in configs {
        let (key, value) = config
            .split_once('=')
            .ok_or_else(|| format!("Invalid config format: '{}'. Expected 'key=value'", config))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Empty key in config: '{}'", config));
        }

        map.insert(key.to_string(), value.trim().to_string());
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dynamic_configs() {
        let parsed = parse_dynamic_configs(&[
            "k0sctl.binary=/opt/k0sctl".to_string(),
            "k0sctl.env.A= b=c ".to_string(),
        ])
        .unwrap();
        assert_eq!(parsed.get("k0sctl.binary").unwrap(), "/opt/k0sctl");
        assert_eq!(parsed.get("k0sctl.env.A").unwrap(), "b=c");

        assert!(parse_dynamic_configs(&["novalue".to_string()]).is_err());
        assert!(parse_dynamic_configs(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_load_plan_rejects_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let plan = dir.path().join("plan.json");
        std::fs::write(&plan, r#"{"config":"C1"}"#).unwrap();
        let err = load_plan(&plan).unwrap_err();
        assert!(err.to_string().contains("ssh_private_key"));
    }

    #[cfg(unix)]
    #[test]
    fn test_state_is_written_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut record = ClusterRecord::from_desired(ClusterDesiredState::new("C1", "K1"));
        record.kubeconfig = Some("KUBECONFIG-DATA".to_string());

        write_state(&path, &record).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, STATE_FILE_MODE);

        let loaded: ClusterRecord = read_json(&path).unwrap();
        assert_eq!(loaded, record);

        remove_state(&path).unwrap();
        remove_state(&path).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_tightens_existing_state_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let record = ClusterRecord::from_desired(ClusterDesiredState::new("C1", "K1"));
        write_state(&path, &record).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, STATE_FILE_MODE);
        let loaded: ClusterRecord = read_json(&path).unwrap();
        assert_eq!(loaded, record);

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["state.json"]);
    }

    #[test]
    fn test_failed_write_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the final rename fail
        let path = dir.path().join("state.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let record = ClusterRecord::from_desired(ClusterDesiredState::new("C1", "K1"));
        assert!(write_state(&path, &record).is_err());
        assert!(path.join("keep").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
