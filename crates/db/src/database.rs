use bson::doc;
use mongodb::{options::ClientOptions, Client, Collection};

use bookshelf_kernel::settings::DatabaseSettings;

use crate::error::{StoreError, StoreResult};

/// Process-wide handle to the document store.
///
/// Cloning is cheap: the underlying client is reference counted and pools its
/// connections, so one handle is created at startup and shared by every request.
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    database: mongodb::Database,
}

impl Database {
    /// Build a client from the connection string.
    ///
    /// The database named in the URI is used when present, `settings.name` otherwise.
    pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Self> {
        let options = ClientOptions::parse(&settings.uri)
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        let client =
            Client::with_options(options).map_err(|e| StoreError::Initialization(e.to_string()))?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(&settings.name));

        tracing::info!(
            target: "bookshelf-db",
            database = database.name(),
            "document store client created"
        );

        Ok(Self { client, database })
    }

    /// Name of the database in use.
    pub fn name(&self) -> &str {
        self.database.name()
    }

    /// Typed handle to a collection of this database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }

    /// Round-trip a `ping` command to the server.
    pub async fn ping(&self) -> StoreResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        Ok(())
    }

    /// Close pooled connections. Other clones of this handle become unusable.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}
