//! Data models: configuration and extracted receipt records.

pub mod config;
pub mod receipt;
