//! # workery-migrate
//!
//! One-shot migration of the legacy Workery PostgreSQL database into MongoDB.
//!
//! The migration is a sequence of independent steps, each one a subcommand of
//! the CLI. Steps must run in the order of [`Step::ALL`]:
//!
//! - **Bulk load** of tenants, users, reference tables, customers, associates,
//!   staff, orders and their join tables
//! - **Attachment transfer** from the legacy object store to the new one,
//!   through a local staging directory
//! - **Hotfix passes** that repair documents after the load
//!
//! ## Example
//!
//! ```rust,no_run
//! use workery_migrate::{Config, Orchestrator, Step};
//!
//! #[tokio::main]
//! async fn main() -> workery_migrate::Result<()> {
//!     let config = Config::from_env()?;
//!     let orchestrator = Orchestrator::new(config, Step::ImportTenant).await?;
//!     let result = orchestrator.run(Step::ImportTenant).await?;
//!     println!("Imported {} tenants", result.records);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod hotfix;
pub mod model;
pub mod objects;
pub mod orchestrator;
pub mod password;
pub mod resolver;
pub mod source;
pub mod store;
pub mod translate;

// Re-exports for convenient access
pub use config::{Config, ObjectStoreConfig, SourceConfig, TargetConfig};
pub use error::{MigrateError, Result};
pub use objects::{MemoryObjectStore, ObjectStore, S3ObjectStore};
pub use orchestrator::{Orchestrator, Step, StepResult};
pub use resolver::Resolver;
pub use store::{DocumentStore, MemoryStore, MongoStore, Repository};
