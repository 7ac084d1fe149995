// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Porter gateway daemon (porterd)
//!
//! Binds the HTTP listener and serves two planes from one port: the
//! subdomain router + streaming proxy for `<user>--<repo>.<base>` hosts,
//! and the application fallback for everything else.

use std::sync::Arc;

use porter_core::UpstreamAuthority;
use porter_engine::{ActorConfig, HttpMachineApi, Registry};
use porter_gateway::{build_router, AppState, Config, CookieAuthenticator};
use porter_provider::{MachinesClient, ProviderSettings};
use porter_storage::StateStore;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config loading
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("porterd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("porterd {}", env!("CARGO_PKG_VERSION"));
                println!("Porter workspace gateway - routes <user>--<repo> subdomains to sandbox machines");
                println!();
                println!("USAGE:");
                println!("    porterd");
                println!();
                println!("Configuration is read from porter.toml (override with PORTER_CONFIG).");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: porterd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    let _log_guard = setup_logging(&config);

    info!(
        base_domain = %config.base_domain,
        listen = %config.listen_addr,
        "starting porter gateway"
    );

    let provider = MachinesClient::new(ProviderSettings {
        api_url: config.provider.api_url.clone(),
        api_key: config.provider.api_key.clone(),
        app_name: config.provider.app_name.clone(),
        image: config.provider.image.clone(),
        region: config.provider.region.clone(),
    })?;

    let upstream = match &config.proxy.upstream_authority {
        Some(template) => UpstreamAuthority::new(template, &config.provider.app_name),
        None => UpstreamAuthority::internal(&config.provider.app_name),
    };
    let machines = HttpMachineApi::new(upstream.clone())?;

    let store = StateStore::new(&config.data_dir);
    let registry = Arc::new(Registry::new(
        provider,
        machines,
        store,
        ActorConfig {
            inactivity_timeout: config.inactivity_timeout(),
            ..ActorConfig::default()
        },
    ));

    let state = AppState::new(
        registry,
        Arc::new(CookieAuthenticator::new(&config.auth.cookie_name)),
        upstream,
        &config.base_domain,
        config.proxy.body_limit,
        config.proxy.chunk_idle_timeout(),
        config.proxy.connect_timeout(),
    )?;

    let app = build_router(state);
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("porter gateway stopped");
    Ok(())
}

/// Structured logging: env-filter over stderr, or a file when configured.
fn setup_logging(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_path {
        Some(path) => {
            let dir = path.parent().unwrap_or(std::path::Path::new("."));
            let file = path.file_name().map(|f| f.to_os_string()).unwrap_or_else(|| "porterd.log".into());
            let appender = tracing_appender::rolling::never(dir, file);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let mut interrupt = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => return,
    };
    tokio::select! {
        _ = interrupt.recv() => info!("received SIGINT, shutting down"),
        _ = terminate.recv() => info!("received SIGTERM, shutting down"),
    }
}
