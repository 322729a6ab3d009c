//! Anchor CLI - Workspace kernel boot
//!
//! Boots the kernel into a workspace and holds it until interrupted, or
//! inspects the workspace registry.

use anchor::error;
use anchor::logging::{self, EARLY_LOG_FILE};
use anchor::registry::user_conf_dir;
use anchor::{
    list_workspaces, version_info, BootArgs, BootSequencer, KernelContext, PathRegistry,
    ResolverOptions, RuntimeEnv, ShutdownCoordinator,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "anchor")]
#[command(about = "Anchor - Workspace ownership and boot sequencing kernel", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(flatten)]
    boot: BootArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Boot into the workspace and hold it until interrupted (default)
    Serve,

    /// List registered workspaces and whether they are in use
    Workspaces {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let home = dirs::home_dir().context("Could not determine home directory")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(cli.boot, cli.verbose, &home).await,
        Commands::Workspaces { json } => {
            logging::init(cli.verbose, None);
            show_workspaces(&home, json)
        }
        Commands::Version => {
            println!("{}", version_info());
            Ok(())
        }
    }
}

async fn serve(args: BootArgs, verbose: bool, home: &Path) -> anyhow::Result<()> {
    let early_log = user_conf_dir(home).join(EARLY_LOG_FILE);
    let sink = logging::init(verbose, Some(&early_log));
    info!("Starting {}", version_info());

    let shutdown = ShutdownCoordinator::new();
    let _signal_handler = shutdown.install_signal_handlers();

    let boot = Arc::new(BootSequencer::new());
    let ctx = match KernelContext::boot(
        args,
        RuntimeEnv::detect(),
        ResolverOptions::from_home(home),
        boot.clone(),
    ) {
        Ok(ctx) => ctx,
        Err(e) => error::terminate(e),
    };

    let log_path = &ctx.layout().log_path;
    match sink.set_path(log_path) {
        Ok(()) => info!(path = %log_path.display(), "Switched log file to workspace"),
        Err(e) => warn!(path = %log_path.display(), "open workspace log failed: {}", e),
    }

    boot.mark_booted();
    info!(workspace = %ctx.workspace(), "Kernel serving, press Ctrl+C to stop");

    shutdown.wait_for_shutdown().await;
    ctx.close();
    Ok(())
}

fn show_workspaces(home: &Path, json: bool) -> anyhow::Result<()> {
    let workspaces = list_workspaces(&PathRegistry::in_home(home));

    if json {
        println!("{}", serde_json::to_string_pretty(&workspaces)?);
        return Ok(());
    }

    if workspaces.is_empty() {
        println!("No registered workspaces");
        return Ok(());
    }

    println!("{:<8} {}", "Status", "Path");
    println!("{}", "-".repeat(60));
    for ws in &workspaces {
        let status = if ws.locked { "in use" } else { "free" };
        println!("{:<8} {}", status, ws.path);
    }
    Ok(())
}
