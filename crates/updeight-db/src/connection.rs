//! Opening the store.
//!
//! The endpoint scheme picks the engine: `ws://` / `wss://` for a
//! SurrealDB server, `mem://` for a throwaway in-process store that needs
//! no credentials.

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::{info, warn};

use crate::error::DbError;
use crate::schema::run_migrations;

const IN_MEMORY_SCHEME: &str = "mem://";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials; ignored for `mem://`.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000".into(),
            namespace: "updeight".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with(IN_MEMORY_SCHEME)
    }
}

/// An open store with its schema migrated.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
}

impl DbManager {
    /// Connect, sign in as root (remote stores only), select the
    /// namespace and database, then apply pending migrations.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let db = any::connect(config.url.as_str()).await?;

        if config.is_in_memory() {
            warn!("Using an in-memory store; data is lost on shutdown");
        } else {
            db.signin(Root {
                username: config.username.clone(),
                password: config.password.clone(),
            })
            .await?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;
        let applied = run_migrations(&db).await?;

        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            applied,
            "Store ready"
        );
        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }

    pub fn into_client(self) -> Surreal<Any> {
        self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_selects_the_engine() {
        assert!(!DbConfig::default().is_in_memory());
        let memory = DbConfig {
            url: "mem://".into(),
            ..Default::default()
        };
        assert!(memory.is_in_memory());
    }

    #[tokio::test]
    async fn in_memory_store_comes_up_migrated() {
        let config = DbConfig {
            url: "mem://".into(),
            ..Default::default()
        };
        let manager = DbManager::connect(&config).await.unwrap();

        let mut result = manager
            .client()
            .query("SELECT VALUE version FROM _migration")
            .await
            .unwrap();
        let versions: Vec<u32> = result.take(0).unwrap();
        assert_eq!(versions, vec![1]);
    }
}
