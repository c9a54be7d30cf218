//! PostgreSQL plumbing shared by the domain crates and the API binary.
//!
//! - [`postgres`]: pooled SeaORM connections, startup retry, health checks, migrations
//! - [`unit_of_work`]: explicit transaction boundaries with propagation rules
//! - [`common`]: error type and retry/backoff helpers
//!
//! # Example
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "roster_api").await?;
//! ```

pub mod common;
pub mod postgres;
pub mod unit_of_work;

pub use common::{DatabaseError, DatabaseResult};
pub use unit_of_work::Propagation;
