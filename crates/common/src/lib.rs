//! Shared building blocks for the TgNotify crates: configuration, errors,
//! connection pools and the persisted notification types.

pub mod config;
pub mod db;
pub mod error;
pub mod redis_pool;
pub mod types;
