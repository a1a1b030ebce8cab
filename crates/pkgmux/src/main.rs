// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! pkgmux - one paginated catalog over many package plugins.
//!
//! This is the binary entry point. Results are printed to stdout as JSON;
//! logs and errors go to stderr.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod plugins;
mod query;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use pkgmux_config::PkgmuxConfig;
use pkgmux_core::PkgmuxError;
use pkgmux_plugin::PluginRegistry;
use pkgmux_server::PackagesServer;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// pkgmux - query package catalog plugins as one catalog.
#[derive(Parser, Debug)]
#[command(name = "pkgmux", version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to the XDG lookup of `pkgmux.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List available packages across all plugins, one page at a time.
    ListAvailable(query::ListAvailableArgs),
    /// List installed packages across all plugins.
    ListInstalled(query::ContextArgs),
    /// Show the detail of an available package.
    Detail(query::PackageArgs),
    /// Show the versions of an available package.
    Versions(query::PackageArgs),
    /// List the configured plugins.
    Plugins,
    /// Validate the configuration and every catalog.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => pkgmux_config::load_and_validate_path(path),
        None => pkgmux_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            pkgmux_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.server.log_level);

    if let Err(e) = run(cli, config).await {
        eprintln!("error [{}]: {e}", e.code());
        std::process::exit(1);
    }
}

/// Initialise the tracing subscriber on stderr. `RUST_LOG` overrides the
/// configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pkgmux={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Directory relative catalog paths are resolved against.
fn catalog_base(config_path: Option<&Path>) -> Result<PathBuf, PkgmuxError> {
    match config_path.and_then(Path::parent) {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.to_path_buf()),
        _ => std::env::current_dir().map_err(|e| {
            PkgmuxError::Config(format!("unable to read the working directory: {e}"))
        }),
    }
}

async fn run(cli: Cli, config: PkgmuxConfig) -> Result<(), PkgmuxError> {
    let base = catalog_base(cli.config.as_deref())?;
    let registry = plugins::build_registry(&config, &base)?;

    match cli.command {
        Commands::Plugins => print_json(&plugins::list_plugins(&config, &registry, &base)),
        Commands::Check => {
            let enabled = registry.snapshot().len();
            info!(plugins = registry.len(), enabled, "configuration is valid");
            println!(
                "ok: {} plugin(s) configured, {enabled} enabled",
                registry.len()
            );
            Ok(())
        }
        Commands::ListAvailable(args) => {
            let server = serve(&registry, &config);
            print_json(&query::list_available(&server, args).await?)
        }
        Commands::ListInstalled(args) => {
            let server = serve(&registry, &config);
            print_json(&query::list_installed(&server, args).await?)
        }
        Commands::Detail(args) => {
            let server = serve(&registry, &config);
            print_json(&query::detail(&server, args).await?)
        }
        Commands::Versions(args) => {
            let server = serve(&registry, &config);
            print_json(&query::versions(&server, args).await?)
        }
    }
}

/// Build the core service; Ctrl+C cancels in-flight aggregations.
fn serve(registry: &PluginRegistry, config: &PkgmuxConfig) -> PackagesServer {
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, cancelling");
            trigger.cancel();
        }
    });
    PackagesServer::from_registry(registry, &config.aggregation).with_shutdown(shutdown)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), PkgmuxError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| PkgmuxError::Internal(format!("unable to render output: {e}")))?;
    println!("{rendered}");
    Ok(())
}
