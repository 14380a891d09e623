//! Branch Service Library
//!
//! HTTP API for management and branch records, with file uploads and their
//! metadata kept in an optional document store.

pub mod auth;
pub mod config;
pub mod extractors;
pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use persistence::DocumentRepository;

use crate::auth::{TokenPair, TokenUtil};
use crate::config::BranchServiceConfig;
use crate::infra::{Database, DocumentStore};
use crate::repository::UploadRepository;
use crate::routes::create_router;
use crate::service::{BranchManager, UploadManager};
use crate::state::AppState;

/// Run the service on `host:port`, everything else from the environment.
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = BranchServiceConfig::from_env()?;
    config.service.host = host.to_string();
    config.service.port = port;

    run_server_with_config(config).await
}

/// Mint a token pair for `uid` with the configured secret.
pub fn issue_token(uid: &str) -> Result<TokenPair, Box<dyn std::error::Error>> {
    let config = BranchServiceConfig::from_env()?;
    Ok(TokenUtil::new(&config.jwt).create_token_pair(uid)?)
}

/// Run the HTTP server with the given configuration.
async fn run_server_with_config(
    config: BranchServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize stores
    let database = Database::connect(&config.database).await?;
    let document_store = match &config.document_store {
        Some(store_config) => Some(DocumentStore::connect(store_config).await?),
        None => {
            info!("MONGO_URL not set, upload records are disabled");
            None
        }
    };

    tokio::fs::create_dir_all(&config.upload.upload_dir).await?;

    // Create services
    let upload_records = document_store
        .as_ref()
        .map(|store| UploadRepository::new(DocumentRepository::new(store.database())));
    let state = AppState {
        branches: Arc::new(BranchManager::new(database.get_connection())),
        uploads: Arc::new(UploadManager::new(config.upload.clone(), upload_records)),
        tokens: Arc::new(TokenUtil::new(&config.jwt)),
        database,
        document_store,
        service: config.service.clone(),
        upload_dir: config.upload.upload_dir.clone(),
    };

    // Build router
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Build address
    let addr: SocketAddr = format!("{}:{}", config.service.host, config.service.port).parse()?;
    info!(
        mode = ?config.service.mode,
        "{} listening on {}", config.service.service_name, addr
    );

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
