//! Scheduler configuration management
//!
//! This crate provides configuration loading and parsing for the OFDMA scheduler:
//! - TOML configuration file parsing
//! - Scheduler and PHY configuration structures

pub mod sched_config;
pub mod toml_config;

pub use sched_config::*;
pub use toml_config::*;
