// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use anyhow::{Context, Result};
use clap::Parser;
use hopbench_server::{AppState, serve};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hopbench-server", version, about = "Two-route demo server for hopbench")]
struct Args {
    /// Bind address.
    #[arg(long, default_value = "127.0.0.1:8787")]
    bind: String,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("hopbench=debug")
    } else {
        EnvFilter::new("hopbench=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("bind {}", args.bind))?;
    let addr = listener.local_addr().context("local addr")?;

    let state = Arc::new(AppState {
        client: reqwest::Client::new(),
        base_url: format!("http://{addr}"),
    });

    // The supervising driver scans raw stdout for this marker, so it goes
    // through println rather than the tracing pipeline.
    println!("hopbench-server listening on http://{addr}");
    info!(target: "hopbench.server", %addr, "serving /hello and /relay");

    serve(listener, state).await.context("serve")
}
