// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod config;
pub mod database;
pub mod fetch;
pub mod metrics;
pub mod model;
pub mod pipeline;
