//! Impls - implementations of the ports.
//!
//! # Included
//! - **NotionStore**: the production `TableStore` (HTTP)
//! - **InMemoryTableStore**: local `TableStore` for tests and dry runs

pub mod inmem_store;
pub mod notion_codec;
pub mod notion_store;

pub use self::inmem_store::{CallCounts, InMemoryTableStore, StoreOp};
pub use self::notion_store::NotionStore;
