//! Core types for the OFDMA multi-user scheduler
//!
//! This crate provides fundamental types and utilities shared by the scheduler crates:
//! - MAC addresses and association identifiers
//! - TID / access category mapping
//! - HE resource unit types and RU specifications
//! - TX vector, TX parameters and trigger frame descriptors
//! - TxTime for logical transmission time budgets
//! - Logging setup and debug macros

pub mod address;
pub mod debug;
pub mod he_ru;
pub mod mpdu;
pub mod qos;
pub mod sched_err;
pub mod trigger;
pub mod tx_params;
pub mod tx_time;
pub mod tx_vector;

// Re-export commonly used items
pub use address::*;
pub use he_ru::*;
pub use mpdu::Mpdu;
pub use qos::*;
pub use sched_err::SchedErr;
pub use trigger::*;
pub use tx_params::*;
pub use tx_time::TxTime;
pub use tx_vector::*;

/// Modulation and coding scheme index
pub type Mcs = u8;

/// Number of spatial streams
pub type Nss = u8;
