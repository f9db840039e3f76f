//! Local static server for the web bundle.

use std::path::{Path, PathBuf};

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use clap::Parser;
use tower_http::services::ServeDir;

const BANNER_WIDTH: usize = 60;

/// Command line of `pointmark-serve`.
#[derive(Debug, Clone, Parser)]
#[command(name = "pointmark-serve", about = "Serve the keypoint editor locally")]
pub struct ServeArgs {
    /// Port to run the server on
    #[arg(short, long, default_value_t = 8080, value_parser = clap::value_parser!(u16).range(1024..))]
    pub port: u16,

    /// Host to bind the server to
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Directory holding index.html and the wasm bundle
    #[arg(long, default_value = "web")]
    pub dir: PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: log::LevelFilter,
}

impl ServeArgs {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("Static directory {0} does not exist")]
    MissingDir(PathBuf),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Install `env_logger` at `level`; `RUST_LOG` takes precedence.
pub fn init_logging(level: log::LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
    if let Err(e) = result {
        eprintln!("Logger already initialized: {}", e);
    }
}

/// `/` serves `index.html`; every other path is a file under `dir`.
pub fn build_router(dir: impl Into<PathBuf>) -> Router {
    let dir = dir.into();
    let index = dir.join("index.html");
    Router::new()
        .route("/", get(move || serve_index(index.clone())))
        .fallback_service(ServeDir::new(dir))
}

async fn serve_index(path: PathBuf) -> Response {
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], bytes).into_response(),
        Err(e) => {
            log::warn!("Cannot read {}: {}", path.display(), e);
            (StatusCode::NOT_FOUND, "Error: index.html not found").into_response()
        }
    }
}

fn print_banner(args: &ServeArgs, dir: &Path) {
    let rule = "=".repeat(BANNER_WIDTH);
    println!("{}", rule);
    println!("pointmark keypoint editor");
    println!("{}", rule);
    println!("Server running at: {}", args.url());
    println!("Serving files from: {}", dir.display());
    println!("{}", rule);
    println!("Press Ctrl+C to stop the server");
    println!("{}", rule);
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    log::info!("Server stopped by user");
}

/// Bind and serve until Ctrl+C.
pub async fn run(args: ServeArgs) -> Result<(), ServeError> {
    if !args.dir.is_dir() {
        return Err(ServeError::MissingDir(args.dir));
    }

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.clone(),
            source,
        })?;

    print_banner(&args, &args.dir);
    log::info!("Listening on {}", addr);

    axum::serve(listener, build_router(&args.dir))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
