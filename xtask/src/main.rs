//! Build automation for k0s-provider
//!
//! Usage: cargo run -p xtask -- <command>
//!
//! Available commands:
//! - build: Build the project
//! - test: Run tests
//! - docs: Regenerate the resource documentation
//! - dist: Create a release tarball
//! - ci: Run CI checks

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

const BINARY: &str = "k0s-provider";
const RESOURCE_DOC: &str = "docs/resources/cluster.md";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for k0s-provider")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        /// Run only the tests/ suites
        #[arg(long)]
        integration: bool,
    },
    /// Write the cluster resource schema as Markdown
    Docs {
        /// Fail if the checked-in document is out of date
        #[arg(long)]
        check: bool,
    },
    /// Create a release tarball
    Dist {
        /// Target triple (e.g., x86_64-unknown-linux-gnu)
        #[arg(long)]
        target: Option<String>,
    },
    /// Run CI checks (format, clippy, test, docs)
    Ci,
    /// Format code
    Format {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    let root = project_root()?;
    sh.change_dir(&root);

    match cli.command {
        Commands::Build { release } => build(&sh, release),
        Commands::Test { integration } => test(&sh, integration),
        Commands::Docs { check } => docs(&sh, &root, check),
        Commands::Dist { target } => dist(&sh, &root, target),
        Commands::Ci => ci(&sh, &root),
        Commands::Format { check } => format(&sh, check),
        Commands::Clippy => clippy(&sh),
    }
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    println!("🔨 Building {}...", BINARY);

    if release {
        cmd!(sh, "cargo build --release --bin {BINARY}").run()?;
        println!("✅ Release build completed: target/release/{}", BINARY);
    } else {
        cmd!(sh, "cargo build --bin {BINARY}").run()?;
        println!("✅ Debug build completed: target/debug/{}", BINARY);
    }

    Ok(())
}

fn test(sh: &Shell, integration: bool) -> Result<()> {
    println!("🧪 Running tests...");

    if integration {
        cmd!(sh, "cargo test -p {BINARY} --test '*'").run()?;
    } else {
        cmd!(sh, "cargo test --workspace").run()?;
    }

    println!("✅ All tests passed");
    Ok(())
}

fn docs(sh: &Shell, root: &Path, check: bool) -> Result<()> {
    let markdown = cmd!(sh, "cargo run --quiet --bin {BINARY} -- schema --markdown")
        .read()
        .context("Failed to render the resource schema")?;
    let path = root.join(RESOURCE_DOC);

    if check {
        let current = sh.read_file(&path).unwrap_or_default();
        if current.trim_end() != markdown.trim_end() {
            anyhow::bail!("{} is stale; run `cargo run -p xtask -- docs`", RESOURCE_DOC);
        }
        println!("✅ {} is up to date", RESOURCE_DOC);
        return Ok(());
    }

    sh.write_file(&path, format!("{}\n", markdown.trim_end()))?;
    println!("📝 Wrote {}", RESOURCE_DOC);
    Ok(())
}

fn dist(sh: &Shell, root: &Path, target: Option<String>) -> Result<()> {
    println!("📦 Creating distribution package...");

    let binary_src = match target {
        Some(ref triple) => {
            cmd!(sh, "cargo build --release --bin {BINARY} --target {triple}").run()?;
            root.join(format!("target/{}/release/{}", triple, BINARY))
        }
        None => {
            cmd!(sh, "cargo build --release --bin {BINARY}").run()?;
            root.join(format!("target/release/{}", BINARY))
        }
    };

    let dist_dir = root.join("dist");
    sh.create_dir(&dist_dir)?;
    sh.copy_file(&binary_src, dist_dir.join(BINARY))?;

    let archive_name = format!("{}-{}.tar.gz", BINARY, env!("CARGO_PKG_VERSION"));
    cmd!(sh, "tar -czf {archive_name} -C dist {BINARY}")
        .run()
        .context("Failed to create tarball")?;

    println!("✅ Distribution package created: {}", archive_name);
    Ok(())
}

fn ci(sh: &Shell, root: &Path) -> Result<()> {
    println!("🔍 Running CI checks...");

    println!("\n📝 Checking formatting...");
    format(sh, true)?;

    println!("\n🔧 Running clippy...");
    clippy(sh)?;

    println!("\n🧪 Running tests...");
    test(sh, false)?;

    println!("\n📚 Checking resource docs...");
    docs(sh, root, true)?;

    println!("\n✅ All CI checks passed!");
    Ok(())
}

fn format(sh: &Shell, check: bool) -> Result<()> {
    if check {
        cmd!(sh, "cargo fmt --all -- --check").run()?;
        println!("✅ Code formatting is correct");
    } else {
        cmd!(sh, "cargo fmt --all").run()?;
        println!("✅ Code formatted");
    }
    Ok(())
}

fn clippy(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;
    println!("✅ Clippy checks passed");
    Ok(())
}

fn project_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask must live inside the workspace")
}
