//! Core data types for the gas monitor.

pub mod error;
pub mod quote;
pub mod threshold;

pub use error::*;
pub use quote::*;
pub use threshold::*;
