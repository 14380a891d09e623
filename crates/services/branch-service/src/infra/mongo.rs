//! Document store connection.

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use common::{AppResult, DocumentStoreConfig};

/// Handle to the configured MongoDB database.
#[derive(Clone)]
pub struct DocumentStore {
    database: Database,
}

impl DocumentStore {
    /// Build a client from `config` and select its database.
    ///
    /// The driver connects lazily, so this succeeds even when the server is
    /// down; use [`DocumentStore::ping`] to check reachability.
    pub async fn connect(config: &DocumentStoreConfig) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.url).await?;
        options.app_name = Some("branch-service".to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.min_pool_size = Some(config.min_pool_size);
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_seconds));

        let client = Client::with_options(options)?;
        tracing::info!(database = %config.database, "Document store client created");

        Ok(Self {
            database: client.database(&config.database),
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
