//! Application state - shared across all handlers.

use std::sync::Arc;

use feed_core::domain::LinkBuilder;
use feed_core::ports::{FollowGraph, InterestCatalog, PostStore};
use feed_core::services::FeedServices;
use feed_infra::{DatabaseConnections, InMemoryStore};

#[cfg(feature = "postgres")]
use feed_infra::PostgresFeedStore;

use crate::config::AppConfig;

type Ports = (
    Arc<dyn PostStore>,
    Arc<dyn FollowGraph>,
    Arc<dyn InterestCatalog>,
);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<FeedServices>,
    pub catalog: Arc<dyn InterestCatalog>,
    pub db: Option<Arc<DatabaseConnections>>,
    /// Backend name reported by the health endpoint.
    pub storage: &'static str,
    pub service_name: String,
    pub identity_header: String,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig, service_name: &str) -> Self {
        let links = LinkBuilder::new(config.public_base_url.as_str());

        let (db, (store, follows, catalog)) = match connect(config).await {
            Some((conn, ports)) => (Some(conn), ports),
            None => (None, in_memory_ports()),
        };

        let mut state = Self::from_ports(store, follows, catalog, links, config, service_name);
        if db.is_some() {
            state.storage = "postgres";
        }
        state.db = db;

        tracing::info!(storage = state.storage, "Application state initialized");
        state
    }

    /// Wire the core services to explicit port implementations.
    pub fn from_ports(
        store: Arc<dyn PostStore>,
        follows: Arc<dyn FollowGraph>,
        catalog: Arc<dyn InterestCatalog>,
        links: LinkBuilder,
        config: &AppConfig,
        service_name: &str,
    ) -> Self {
        Self {
            services: Arc::new(FeedServices::new(store, follows, catalog.clone(), links)),
            catalog,
            db: None,
            storage: "memory",
            service_name: service_name.to_string(),
            identity_header: config.identity_header.clone(),
        }
    }
}

fn in_memory_ports() -> Ports {
    let memory = Arc::new(InMemoryStore::new());
    (memory.clone(), memory.clone(), memory)
}

#[cfg(feature = "postgres")]
async fn connect(config: &AppConfig) -> Option<(Arc<DatabaseConnections>, Ports)> {
    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return None;
    };

    let connections = match DatabaseConnections::init(db_config).await {
        Ok(connections) => connections,
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            return None;
        }
    };

    if config.run_migrations {
        use migration::{Migrator, MigratorTrait};

        match Migrator::up(&connections.main, None).await {
            Ok(()) => tracing::info!("Database migrations applied"),
            Err(e) => tracing::error!("Failed to apply migrations: {}", e),
        }
    }

    let connections = Arc::new(connections);
    let store = Arc::new(PostgresFeedStore::from_connections(connections.clone()));
    let ports: Ports = (store.clone(), store.clone(), store);
    Some((connections, ports))
}

#[cfg(not(feature = "postgres"))]
async fn connect(_config: &AppConfig) -> Option<(Arc<DatabaseConnections>, Ports)> {
    tracing::info!("Running without postgres feature - using in-memory store");
    None
}
