use async_trait::async_trait;
use bookshelf_kernel::{InitCtx, Module};

use crate::database::Database;

/// Core module owning the store connection lifecycle.
pub struct DbModule {
    database: Database,
}

impl DbModule {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.database.ping().await?;
        tracing::info!(
            module = self.name(),
            database = self.database.name(),
            "document store reachable"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.database.clone().shutdown().await;
        tracing::info!(module = self.name(), "document store connection closed");
        Ok(())
    }
}
