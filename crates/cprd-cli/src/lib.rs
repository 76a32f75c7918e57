//! Shared CLI components: logging setup and study configuration.

pub mod config;
pub mod logging;
