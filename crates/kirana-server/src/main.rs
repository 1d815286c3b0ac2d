mod api;
mod console;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use kirana_alerts::{AlertClient, LogNotifier};
use kirana_db::{CatalogStore, ChangeBus, OrderStore};
use kirana_payments::PaymentClient;

use crate::{
    api::{build_app, AppState},
    console::spawn_order_console,
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(kirana_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = kirana_db::PoolConfig::from_app_config(&config);
    let pool = kirana_db::connect_pool(&config.database_url, pool_config).await?;
    kirana_db::run_migrations(&pool).await?;

    let bus = ChangeBus::new();
    let catalog = CatalogStore::new(pool.clone(), bus.clone());
    let orders = OrderStore::new(pool.clone(), bus, config.report_max_rows);

    let alerts = config
        .alert_webhook_url
        .as_deref()
        .map(|url| AlertClient::new(url, config.http_timeout_secs))
        .transpose()?;
    let payments = config
        .payments
        .as_ref()
        .map(|p| {
            PaymentClient::new(&p.base_url, &p.key_id, &p.key_secret, config.http_timeout_secs)
        })
        .transpose()?;

    let _console = spawn_order_console(
        orders.clone(),
        Arc::new(LogNotifier),
        config.live_orders_limit,
    );

    let auth = AuthState::from_env(matches!(config.env, kirana_core::Environment::Development))?;
    let app = build_app(
        AppState {
            pool,
            catalog,
            orders,
            alerts,
            payments,
            live_orders_limit: config.live_orders_limit,
        },
        auth,
    );

    tracing::info!(addr = %config.bind_addr, env = %config.env, "starting server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
