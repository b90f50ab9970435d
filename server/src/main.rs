//! Entry point for the table server binary.

use std::sync::Arc;
use std::time::Duration;

use table_server::config::Config;
use table_server::net::AppCtx;
use table_server::store::MemStore;
use table_server::table_manager::TableManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Arc::new(Config::from_env()?);
    let store: Arc<dyn table_server::store::Store> = Arc::new(MemStore::new());
    let (table_manager, mut timeouts_rx) = TableManager::new(config.clone(), store.clone());

    let default_table = table_manager.create_table(6, 1, 2, 200);
    tracing::info!(table_id = %default_table, "opened default table");

    {
        let table_manager = table_manager.clone();
        tokio::spawn(async move {
            while let Some(fired) = timeouts_rx.recv().await {
                table_manager.apply_timeout_default(fired).await;
            }
        });
    }

    {
        let table_manager = table_manager.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;
                table_manager.sweep_abandoned().await;
            }
        });
    }

    let ctx = Arc::new(AppCtx { table_manager, store, config: config.clone() });
    let app = table_server::net::build_router(ctx);

    tracing::info!(addr = %config.bind_addr, "starting server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
