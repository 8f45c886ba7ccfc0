//! HTTP service
//!
//! axum front end over [`ParkingSystem`]. The facade is synchronous, so
//! the server wraps it in a single `parking_lot::RwLock`; handlers take
//! the lock, apply one operation, and release it before responding. This
//! is the only concurrency boundary in the crate.

pub mod handlers;
pub mod routes;

use std::sync::Arc;

use axum::{extract::Extension, Router};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::system::ParkingSystem;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub http_addr: String,
    /// HTTP port
    pub http_port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1".to_string(),
            http_port: 8080,
            enable_cors: true,
            timeout_secs: 30,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub system: Arc<RwLock<ParkingSystem>>,
    pub config: ServerConfig,
    pub started_at: DateTime<Utc>,
    /// Random id distinguishing this process in logs and health output
    pub instance_id: String,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("instance_id", &self.instance_id)
            .finish()
    }
}

/// Start the parking HTTP server
pub async fn start_server(config: ServerConfig, system: ParkingSystem) -> anyhow::Result<()> {
    info!(
        addr = %config.http_addr,
        port = config.http_port,
        timeout_secs = config.timeout_secs,
        "Starting parking HTTP server"
    );

    let state = AppState {
        system: Arc::new(RwLock::new(system)),
        config: config.clone(),
        started_at: Utc::now(),
        instance_id: format!("parkeon-{}", uuid::Uuid::new_v4()),
    };
    info!(instance = %state.instance_id, "Application state initialized");

    // Build router with all routes
    let app = Router::new()
        .merge(routes::api_routes())
        .merge(routes::health_routes())
        .layer(Extension(Arc::new(state)))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    // Add CORS if enabled
    let app = if config.enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    // Bind and serve
    let addr = format!("{}:{}", config.http_addr, config.http_port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Server listening on http://{}", addr);
    info!("❤️  Health: http://{}/health", addr);
    info!("📊 Status: http://{}/api/status", addr);

    axum::serve(listener, app).await.map_err(|e| {
        error!(error = %e, "Server error");
        anyhow::anyhow!("Server failed: {}", e)
    })
}
