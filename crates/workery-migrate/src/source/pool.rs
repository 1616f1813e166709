//! Connection pool for the legacy PostgreSQL database.

use std::time::Duration;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use futures::TryStreamExt;
use tokio_postgres::{Config as PgConfig, Row};
use tracing::{debug, info, warn};

use crate::config::SourceConfig;
use crate::error::{MigrateError, Result};

use super::row::FromLegacyRow;
use super::tls::SslMode;

/// Deadline for a legacy query to start producing rows. Consuming the rows
/// afterwards is unbounded.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// The tool reads one table at a time, a single connection is enough.
const MAX_CONNECTIONS: usize = 1;

/// Read-only handle on the legacy database.
pub struct LegacyPool {
    pool: Pool,
    public_schema: String,
    london_schema: String,
}

impl LegacyPool {
    /// Connect to the legacy database and verify the connection.
    pub async fn new(config: &SourceConfig) -> Result<Self> {
        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(config.port);
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let mgr = match SslMode::parse(&config.ssl_mode)?.connector()? {
            Some(tls) => Manager::from_config(pg_config, tls, mgr_config),
            None => {
                warn!("Legacy PostgreSQL TLS is disabled");
                Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config)
            }
        };

        let pool = Pool::builder(mgr)
            .max_size(MAX_CONNECTIONS)
            .build()
            .map_err(|e| MigrateError::pool(e, "creating legacy PostgreSQL pool"))?;

        let client = pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, "testing legacy PostgreSQL connection"))?;
        client.simple_query("SELECT 1").await?;

        info!(
            "Connected to legacy PostgreSQL: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self {
            pool,
            public_schema: config.public_schema.clone(),
            london_schema: config.london_schema.clone(),
        })
    }

    /// Schema holding tenants, users and user groups.
    pub fn public_schema(&self) -> &str {
        &self.public_schema
    }

    /// Schema holding the tenant's operational tables.
    pub fn london_schema(&self) -> &str {
        &self.london_schema
    }

    /// Run one fixed legacy query and scan every row into `T`.
    ///
    /// The query step is bounded by [`QUERY_TIMEOUT`]. Any scan failure
    /// aborts the whole read.
    pub async fn fetch_all<T: FromLegacyRow>(&self, sql: &str) -> Result<Vec<T>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, format!("getting connection for {}", T::TABLE)))?;

        let params: Vec<String> = Vec::new();
        let stream = tokio::time::timeout(QUERY_TIMEOUT, client.query_raw(sql, params))
            .await
            .map_err(|_| MigrateError::Timeout {
                table: T::TABLE.to_string(),
                seconds: QUERY_TIMEOUT.as_secs(),
            })??;

        let rows: Vec<Row> = stream.try_collect().await?;
        debug!("Fetched {} rows from {}", rows.len(), T::TABLE);

        rows.iter().map(T::from_row).collect()
    }

    /// Column names of a legacy table, in no particular order.
    pub async fn columns(&self, schema: &str, table: &'static str) -> Result<Vec<String>> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, format!("getting connection for {}", table)))?;

        let sql = "SELECT column_name::text FROM information_schema.columns \
                   WHERE table_schema::text = $1 AND table_name::text = $2";
        let rows = tokio::time::timeout(QUERY_TIMEOUT, client.query(sql, &[&schema, &table]))
            .await
            .map_err(|_| MigrateError::Timeout {
                table: table.to_string(),
                seconds: QUERY_TIMEOUT.as_secs(),
            })??;

        rows.iter()
            .map(|row| {
                row.try_get::<_, String>(0)
                    .map_err(|e| MigrateError::scan(table, e.to_string()))
            })
            .collect()
    }

    /// Close the pool.
    pub fn close(&self) {
        self.pool.close();
    }
}
