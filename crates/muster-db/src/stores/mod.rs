//! Document store implementations
//!
//! Both backends implement the `DocumentStore` port from muster-core.

mod error;
mod memory;
mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
