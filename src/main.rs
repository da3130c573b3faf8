mod config;
mod csrf;
mod routes;
mod schema;
mod viewer;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Docs viewer: serves an interactive API documentation page with
/// CSRF-protected request forwarding to the documented API.
#[derive(Parser, Debug)]
#[command(name = "docs-viewer", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = match config::load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    // CLI --port overrides config
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    tracing::info!(
        schema_url = %cfg.viewer.schema_url,
        mount_point = %cfg.viewer.mount_point,
        settings = cfg.viewer.settings.len(),
        "Configuration loaded successfully"
    );
    if let Some(upstream) = &cfg.upstream {
        tracing::info!(upstream_url = %upstream.url, "  Forwarding /api/ to upstream");
    }

    let csrf = match csrf::CsrfKey::from_base64(&cfg.server.csrf_secret) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let http = reqwest::Client::new();

    if cfg.viewer.check_schema {
        tokio::spawn(schema::check_and_log(
            http.clone(),
            cfg.viewer.schema_url.clone(),
            cfg.server.public_url.clone(),
        ));
    }

    let bind_addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    tracing::info!("Listening on {bind_addr}");
    tracing::info!("Docs page: {}/docs/", cfg.server.public_url);

    let app = routes::router(routes::AppState {
        config: Arc::new(cfg),
        csrf,
        http,
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to {bind_addr}: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    });
}
