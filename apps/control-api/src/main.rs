//! Siteforge control-plane server.
//!
//! Wires the client store, provider adapters and orchestrators into the
//! management API, then serves it with graceful shutdown. In-flight
//! provisioning runs observe the shutdown token between steps and roll back
//! what they had created.

mod config;
mod logging;
mod openapi;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use siteforge_api_clients::{clients_router, ClientsAppState};
use siteforge_provisioning::adapters::{
    Adapters, HttpDatastoreProvisioner, HttpDeploymentService, HttpDomainConfigurator,
    HttpIdentityBootstrapper, WebhookNotificationService,
};
use siteforge_provisioning::{DeprovisioningOrchestrator, ProvisioningOrchestrator, TemplateResolver};
use siteforge_store::{ClientStore, MemoryClientStore, PgClientStore};

use config::Config;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.bind_addr(),
        base_domain = %config.base_domain,
        "Starting siteforge control API"
    );

    let store = build_store(&config).await;
    let adapters = build_adapters(&config);

    for (name, configured) in [
        ("datastore", config.datastore_api.is_some()),
        ("deployment", config.deploy_api.is_some()),
        ("domains", config.domains_api.is_some()),
        ("identity", config.identity_bootstrap_enabled),
        ("notifications", config.welcome_webhook_url.is_some()),
    ] {
        if configured {
            info!(adapter = name, "Provider adapter configured");
        } else {
            info!(adapter = name, "Provider adapter unconfigured, using fallbacks");
        }
    }

    let provisioning = config.provisioning();
    let provisioner = Arc::new(ProvisioningOrchestrator::new(
        Arc::clone(&store),
        adapters.clone(),
        TemplateResolver::with_defaults(),
        provisioning.clone(),
    ));
    let deprovisioner = Arc::new(DeprovisioningOrchestrator::new(
        Arc::clone(&store),
        adapters,
        provisioning,
        provisioner.locks(),
    ));

    let cancel = CancellationToken::new();
    let state = ClientsAppState {
        store,
        provisioner,
        deprovisioner,
        cancel: cancel.clone(),
    };

    let app = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .merge(clients_router(state))
        .merge(openapi::swagger_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Postgres when `DATABASE_URL` is set, the in-memory store otherwise.
async fn build_store(config: &Config) -> Arc<dyn ClientStore> {
    match &config.database_url {
        Some(url) => {
            let pool = match PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(5))
                .connect(url)
                .await
            {
                Ok(pool) => {
                    info!("Database connection established");
                    pool
                }
                Err(e) => {
                    eprintln!("Failed to connect to database: {e}");
                    std::process::exit(1);
                }
            };

            let store = PgClientStore::new(pool);
            if let Err(e) = store.migrate().await {
                eprintln!("Failed to run migrations: {e}");
                std::process::exit(1);
            }
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (state is not durable)");
            Arc::new(MemoryClientStore::new())
        }
    }
}

fn build_adapters(config: &Config) -> Adapters {
    let timeout = Duration::from_secs(config.adapter_timeout_secs);
    Adapters {
        datastore: Arc::new(HttpDatastoreProvisioner::new(
            config.datastore_api.clone(),
            timeout,
        )),
        deployment: Arc::new(HttpDeploymentService::new(config.deploy_api.clone(), timeout)),
        domains: Arc::new(HttpDomainConfigurator::new(
            config.domains_api.clone(),
            timeout,
        )),
        identity: Arc::new(HttpIdentityBootstrapper::new(
            config.identity_bootstrap_enabled,
            timeout,
        )),
        notifications: Arc::new(WebhookNotificationService::new(
            config.welcome_webhook_url.clone(),
            timeout,
        )),
    }
}

/// Graceful shutdown signal handler.
///
/// Cancels the shared token before returning so provisioning runs stop at the
/// next step boundary and compensate while Axum drains connections.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    cancel.cancel();
    info!("Cancellation requested, in-flight provisioning runs will roll back");
}
