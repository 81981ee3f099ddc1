//! Thin wrapper binary for running the notification daemon as a standalone
//! process. Config loading, the scheduling clock, and the concrete chat
//! platform client are external collaborators this binary wires together —
//! the library crate only supplies the traits and the reference provider.

use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use notify_server::config::RootConfig;
use notify_server::executor::registry::ProviderRegistry;
use notify_server::executor::Executor;
use notify_server::fetcher::ReqwestFetcher;
use notify_server::notifier::service::NotificationService;
use notify_server::provider::navershopping::NaverShoppingProvider;
use notify_server::snapshot::InMemorySnapshotStore;

#[tokio::main]
async fn main() {
    #[cfg(feature = "subscriber")]
    init_tracing();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %chrono::Utc::now().to_rfc3339(),
        "notify-server starting"
    );

    let config = Arc::new(load_config());
    let shutdown = CancellationToken::new();

    let mut registry = ProviderRegistry::new();
    let fetcher = Arc::new(ReqwestFetcher::default());
    registry.register(Arc::new(NaverShoppingProvider::new(fetcher)));

    let notification_service = match NotificationService::build(&config, &registry, shutdown.child_token()) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!(error = %e, "failed to build notification service");
            return;
        }
    };

    let store = Arc::new(InMemorySnapshotStore::new());
    // A real deployment supplies a `ChatPlatform` per notifier (e.g. a
    // Telegram long-poll client scoped to that notifier's bot token) and
    // passes it to `NotificationService::spawn_all` alongside this
    // `Executor`; this binary has no wire client to ship (see the crate's
    // external-interface boundary), so it stops short of spawning workers.
    let _executor: Arc<dyn notify_server::executor::seam::TaskExecutor> = Arc::new(Executor::new(
        registry,
        store,
        Arc::clone(&notification_service) as Arc<dyn notify_server::executor::seam::NotifierLookup>,
        Arc::clone(&config) as Arc<dyn notify_server::executor::seam::ExecutorConfigSource>,
        shutdown.child_token(),
    ));

    info!("notify-server started successfully, press Ctrl+C to shut down");
    shutdown_signal().await;
    info!("shutdown signal received, stopping notifier workers");
    notification_service.shutdown().await;
    info!("notify-server shutdown complete");
}

fn load_config() -> RootConfig {
    // Loading a config file from disk is an external collaborator (see the
    // crate's scope notes); a real deployment replaces this with a loader
    // that deserializes the same `RootConfig` shape from disk, env, or a
    // remote config service.
    RootConfig {
        notifiers: Vec::new(),
        default_notifier_id: notify_server::ids::NotifierId::new("default"),
        tasks: Vec::new(),
    }
}

#[cfg(feature = "subscriber")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
