//! tasksync-core
//!
//! Keeps a task tracker's tables in step with each other.
//!
//! # Modules
//! - **domain**: records, filters, schemas, dates, outcomes, errors
//! - **ports**: `TableStore`, `Clock`, `IdGenerator`
//! - **impls**: Notion HTTP store and an in-memory store
//! - **app**: the completion sweep, the rollup phase and their wiring
//! - **config**: settings with environment overrides
//! - **observability**: log setup and run summaries

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
