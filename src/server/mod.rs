use std::sync::Arc;

use tracing::info;

use crate::config::DraftConfig;
use crate::data::JsonFileStore;

pub mod api;
pub mod routes;

pub use routes::{router, AppState};

/// Serves the draft API on `config.bind` until the process is stopped.
pub fn run_server(config: DraftConfig) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let bind_addr = config.bind.clone();
        let store = Arc::new(JsonFileStore::new(&config.store_dir));
        let app = router(AppState::new(config, store));
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        info!("draftroom server listening on http://{bind_addr}");
        axum::serve(listener, app).await
    })
}
