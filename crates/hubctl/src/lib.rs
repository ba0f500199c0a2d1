//! hubctl
//!
//! Connects to one USB hub by serial number and isolates a single downstream
//! port: the target port is enabled, every other port is disabled.
//!
//! The device itself is reached through [`protocol::DeviceSession`]; the
//! [`usb`] module provides the hardware backend and
//! `common::test_utils::FakeHub` an in-memory one.
//!
//! # Example
//!
//! ```
//! use common::test_utils::FakeHub;
//! use hubctl::config::HubConfig;
//! use hubctl::controller::HubController;
//! use protocol::PortIndex;
//!
//! let config = HubConfig::default();
//! let hub = FakeHub::new(config.hub.serial_number);
//! let recorder = hub.recorder();
//!
//! let outcome = HubController::new(&config).isolate(hub, PortIndex(3)).unwrap();
//! assert_eq!(outcome.report.commands.len(), 8);
//! assert_eq!(recorder.disconnect_count(), 1);
//! ```

pub mod cli;
pub mod config;
pub mod controller;
pub mod isolator;
pub mod lock;
pub mod session;
pub mod usb;

pub use controller::{HubController, Outcome};
pub use isolator::{FailurePolicy, IsolationReport, PortIsolator};
pub use session::{HubSession, SessionManager, SessionState};
