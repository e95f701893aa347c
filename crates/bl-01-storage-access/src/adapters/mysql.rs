//! # MySQL Storage Adapter
//!
//! Networked implementation of the `Connection` port on top of a `sqlx`
//! connection pool. Each table holds an auto-increment id and an opaque
//! payload column; a batch insert runs inside one transaction.

use crate::config::NetworkStoreConfig;
use crate::domain::{ConfigError, ConnectionError, RowId, StoreError};
use crate::ports::outbound::{Connection, ConnectionSupplier};
use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// SQLSTATE for an unknown table.
const SQLSTATE_NO_SUCH_TABLE: &str = "42S02";
/// SQLSTATE for rejected credentials.
const SQLSTATE_ACCESS_DENIED: &str = "28000";

/// Supplier opening a pooled connection to a MySQL server.
#[derive(Clone, Debug)]
pub struct MySqlSupplier {
    config: NetworkStoreConfig,
    max_connections: u32,
}

impl MySqlSupplier {
    /// Supplier for the given parameters.
    pub fn new(config: NetworkStoreConfig) -> Self {
        Self {
            config,
            max_connections: 4,
        }
    }

    /// Supplier described by a `{host, port, database, username, password}` file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::new(NetworkStoreConfig::from_file(path)?))
    }

    /// Set the pool size.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        let mut opts = MySqlConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .database(&self.config.database);
        if let Some(user) = &self.config.username {
            opts = opts.username(user);
        }
        if let Some(password) = &self.config.password {
            opts = opts.password(password);
        }
        opts
    }

    fn connection_error(&self, err: sqlx::Error) -> ConnectionError {
        let target = self.config.target();
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(SQLSTATE_ACCESS_DENIED) => {
                ConnectionError::AuthenticationFailed {
                    target,
                    message: err.to_string(),
                }
            }
            _ => ConnectionError::Unreachable {
                target,
                message: err.to_string(),
            },
        }
    }
}

#[async_trait]
impl ConnectionSupplier for MySqlSupplier {
    async fn create_connection(&self) -> Result<Arc<dyn Connection>, ConnectionError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(self.connect_options())
            .await
            .map_err(|e| self.connection_error(e))?;
        debug!("[bl-01] Connected to mysql://{}", self.config.target());

        Ok(Arc::new(MySqlConnection {
            pool: RwLock::new(Some(pool)),
            target: self.config.target(),
        }))
    }

    fn target(&self) -> String {
        format!("mysql://{}", self.config.target())
    }
}

/// A pooled MySQL session.
pub struct MySqlConnection {
    pool: RwLock<Option<MySqlPool>>,
    target: String,
}

impl MySqlConnection {
    fn pool(&self) -> Result<MySqlPool, StoreError> {
        self.pool.read().clone().ok_or(StoreError::Closed)
    }
}

/// Table names are interpolated into SQL, so only identifier characters pass.
fn checked_table(table: &str) -> Result<&str, StoreError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(table)
    } else {
        Err(StoreError::Database {
            message: format!("invalid table name '{table}'"),
        })
    }
}

fn store_error(table: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(SQLSTATE_NO_SUCH_TABLE) => {
            StoreError::TableMissing {
                table: table.to_string(),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Closed,
        _ => StoreError::Database {
            message: err.to_string(),
        },
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn create_table_if_not_exists(&self, table: &str) -> Result<(), StoreError> {
        let table = checked_table(table)?;
        let pool = self.pool()?;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS `{table}` (\
             id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY, \
             payload LONGBLOB NOT NULL)"
        );
        sqlx::query(&sql)
            .execute(&pool)
            .await
            .map_err(|e| store_error(table, e))?;
        Ok(())
    }

    async fn insert_batch(
        &self,
        table: &str,
        payloads: Vec<Vec<u8>>,
    ) -> Result<Vec<RowId>, StoreError> {
        let table = checked_table(table)?;
        let pool = self.pool()?;
        let sql = format!("INSERT INTO `{table}` (payload) VALUES (?)");

        let mut tx = pool.begin().await.map_err(|e| store_error(table, e))?;
        let mut ids = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let result = sqlx::query(&sql)
                .bind(payload)
                .execute(&mut *tx)
                .await
                .map_err(|e| store_error(table, e))?;
            ids.push(result.last_insert_id());
        }
        // Dropping an uncommitted transaction rolls it back.
        tx.commit().await.map_err(|e| store_error(table, e))?;
        Ok(ids)
    }

    async fn query_all(&self, table: &str) -> Result<Vec<(RowId, Vec<u8>)>, StoreError> {
        let table = checked_table(table)?;
        let pool = self.pool()?;
        let sql = format!("SELECT id, payload FROM `{table}` ORDER BY id");
        sqlx::query_as::<_, (u64, Vec<u8>)>(&sql)
            .fetch_all(&pool)
            .await
            .map_err(|e| store_error(table, e))
    }

    async fn close(&self) -> Result<(), StoreError> {
        let pool = self.pool.write().take();
        if let Some(pool) = pool {
            pool.close().await;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("mysql://{}", self.target)
    }
}
