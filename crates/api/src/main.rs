use std::net::SocketAddr;
use std::sync::Arc;

use sanctum_core::governance::AssetGovernance;
use sanctum_core::relationship::{
    CustodianLookup, DepartmentLookup, InMemoryDirectory, OptimisticDirectory,
};
use sanctum_core::store::{InMemoryAssetStore, InMemoryUsageRequestStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sanctum_api::config::ServerConfig;
use sanctum_api::router::build_app_router;
use sanctum_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sanctum_api=debug,sanctum_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- People directory ---
    let (departments, custodians): (Arc<dyn DepartmentLookup>, Arc<dyn CustodianLookup>) =
        match &config.directory_seed_path {
            Some(path) => {
                let directory = Arc::new(
                    InMemoryDirectory::load_from_file(path)
                        .expect("Failed to load directory seed"),
                );
                tracing::info!(path = %path.display(), "Loaded department and custodian directory");
                (directory.clone(), directory)
            }
            None => {
                tracing::warn!(
                    "DIRECTORY_SEED_PATH not set, accepting every department and custodian reference"
                );
                let directory = Arc::new(OptimisticDirectory);
                (directory.clone(), directory)
            }
        };

    // --- Governance service ---
    let governance = AssetGovernance::new(
        Arc::new(InMemoryAssetStore::new()),
        Arc::new(InMemoryUsageRequestStore::new()),
        departments,
        custodians,
    );

    let state = AppState {
        governance: Arc::new(governance),
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
