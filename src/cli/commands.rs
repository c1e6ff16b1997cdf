// CLI command definitions

use super::cluster::{
    CreateCommand, DeleteCommand, KubeconfigCommand, ReadCommand, SchemaCommand, UpdateCommand,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "k0s-provider",
    version,
    about = "Declarative lifecycle for k0s clusters",
    long_about = "Creates, refreshes, updates and deletes a k0s cluster by driving k0sctl from a desired-state plan and a persisted state file"
)]
pub struct CliArgs {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Create a k0s cluster from a plan (runs k0sctl apply)
    Create(CreateCommand),

    /// Refresh state from the live cluster (runs k0sctl kubeconfig)
    Read(ReadCommand),

    /// Re-apply a changed plan to an existing cluster
    Update(UpdateCommand),

    /// Tear the cluster down (runs k0sctl reset --force)
    Delete(DeleteCommand),

    /// Show the cluster resource schema
    Schema(SchemaCommand),

    /// Print or export the admin kubeconfig held in state
    Kubeconfig(KubeconfigCommand),
}
