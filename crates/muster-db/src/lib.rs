//! # muster-db
//!
//! Document storage implementing the `DocumentStore` port.
//!
//! ## Overview
//!
//! - Connection pool management and schema setup for PostgreSQL
//! - `PgDocumentStore`: JSONB rows, patches applied under a row lock
//! - `MemoryDocumentStore`: process-local store for tests and `STORE_BACKEND=memory`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use muster_db::{create_pool, run_migrations, PgDocumentStore, PoolConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::new("postgres://localhost/muster")).await?;
//!     run_migrations(&pool).await?;
//!     let store = PgDocumentStore::new(pool);
//!     Ok(())
//! }
//! ```

pub mod pool;
pub mod stores;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use stores::{MemoryDocumentStore, PgDocumentStore};
