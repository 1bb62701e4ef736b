//! HTTP trigger for crawl runs.
//!
//! A request to `/` runs one complete crawl and answers with the JSON
//! summary. Only one run executes at a time.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::crawler::build_http_client;
use crate::storage::ObjectStore;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: ObjectStore,
    /// Held for the duration of a run.
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = build_http_client(&config.user_agent, config.crawler.timeout())?;
        let store = ObjectStore::new(&config.storage, client);
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: ObjectStore) -> Self {
        Self {
            config: Arc::new(config),
            store,
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Start the web server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(config)?;
    let app = create_router(state);

    tracing::info!("Listening for crawl triggers at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
