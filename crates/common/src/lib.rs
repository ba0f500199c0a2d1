//! Common utilities for hubctl
//!
//! This crate provides shared functionality for the hub control tool:
//! error handling, logging setup, and test doubles for the device
//! capability surface.

pub mod error;
pub mod logging;
pub mod test_utils;

pub use error::{Error, Result};
pub use logging::setup_logging;
