//! Infrastructure adapters for configuration and the system clipboard.

pub mod clipboard;
pub mod config;
