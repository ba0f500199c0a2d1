//! Hub control vocabulary for hubctl
//!
//! This crate defines the types shared by every layer of the tool: device
//! identity, port indices and states, the result codes reported by device
//! discovery, and the [`DeviceSession`] capability that a hub backend
//! implements.
//!
//! # Example
//!
//! ```
//! use protocol::{PortCommand, PortIndex, PortState, SerialNumber};
//!
//! let serial: SerialNumber = "0xA360110F".parse().unwrap();
//! assert_eq!(serial.to_string(), "0xA360110F");
//!
//! let cmd = PortCommand::enable(PortIndex(3));
//! assert_eq!(cmd.state, PortState::Enabled);
//! ```

pub mod device;
pub mod error;
pub mod types;

pub use device::DeviceSession;
pub use error::{HubError, PortFailure, Result, TransportError};
pub use types::{
    DEFAULT_PORT_COUNT, PortCommand, PortIndex, PortState, ResultCode, SerialNumber, Transport,
};
