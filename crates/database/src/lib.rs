//! SQLite persistence layer for SafeWalk.
//!
//! This crate stores users, emergency contacts, trips, location updates and
//! SOS events using SQLx with SQLite. Query functions accept any executor, so
//! they run against the pool or inside a transaction alike.
//!
//! # Example
//!
//! ```no_run
//! use database::{trip, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:safewalk.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Mutations of one trip happen under its row lock
//!     let mut tx = db.begin().await?;
//!     trip::lock_trip(&mut tx, 1).await?;
//!     let current = trip::get_trip(&mut *tx, 1).await?;
//!     println!("trip 1 is {}", current.status);
//!     tx.commit().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod location;
mod models;
pub mod sos_event;
pub mod trip;
pub mod user;

pub use error::{DatabaseError, Result};
pub use trip::NewTrip;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// `sqlite::memory:` gives an in-memory database shared by the pool.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
