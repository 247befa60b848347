use std::sync::Arc;

use sanctum_core::governance::AssetGovernance;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The asset governance service (stores + People directory).
    pub governance: Arc<AssetGovernance>,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
}
