// Define data modules
mod db; // In-memory task store with crash-safe persistence
mod models; // Data structures (Task, Tag, Snapshot, etc.)
mod routes_tasks; // HTTP handlers for the task API
mod store; // Snapshot file handling (load/save tasks.json)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::db::TaskDb;

#[derive(Debug, Parser)]
#[command(name = "taskboard", about = "Task board backend with JSON snapshot persistence")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Path of the snapshot file
    #[arg(long, default_value = "data/tasks.json")]
    db: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskboard=info")),
        )
        .init();

    // Refuse to serve with unknown state: a snapshot that exists but
    // cannot be parsed stops the process here.
    let db = match TaskDb::open(&args.db) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("cannot open snapshot {}: {e}", args.db.display());
            std::process::exit(1);
        }
    };

    // The browser front-end runs on its own dev server, so responses
    // carry CORS headers for it.
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:5173".parse::<HeaderValue>().unwrap())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(60));

    let app = routes_tasks::router(db).layer(cors);

    info!("server running at http://{}", args.addr);
    info!("snapshot file: {}", args.db.display());

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .expect("bind failed");

    axum::serve(listener, app).await.expect("server error");
}
