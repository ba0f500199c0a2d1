//! Device capability surface
//!
//! A hub backend exposes exactly these five operations. Everything behind
//! them (discovery protocol, transport, electrical port control) belongs to
//! the backend.

use crate::error::TransportError;
use crate::types::{PortIndex, ResultCode, SerialNumber, Transport};

/// Operations the hub control workflow needs from a device
///
/// Every call is a blocking round-trip to hardware. Implementations must make
/// [`DeviceSession::disconnect`] idempotent: it is called on every exit path,
/// including after a failed discovery.
pub trait DeviceSession {
    /// Locate the hub identified by `serial` over `transport` and connect to it
    fn discover_and_connect(&mut self, transport: Transport, serial: SerialNumber) -> ResultCode;

    /// Serial number reported by the connected device
    fn serial_number(&mut self) -> Result<SerialNumber, TransportError>;

    /// Turn a downstream port on
    fn set_port_enable(&mut self, port: PortIndex) -> Result<(), TransportError>;

    /// Turn a downstream port off
    fn set_port_disable(&mut self, port: PortIndex) -> Result<(), TransportError>;

    /// Release the device
    fn disconnect(&mut self);
}

impl<D: DeviceSession + ?Sized> DeviceSession for Box<D> {
    fn discover_and_connect(&mut self, transport: Transport, serial: SerialNumber) -> ResultCode {
        (**self).discover_and_connect(transport, serial)
    }

    fn serial_number(&mut self) -> Result<SerialNumber, TransportError> {
        (**self).serial_number()
    }

    fn set_port_enable(&mut self, port: PortIndex) -> Result<(), TransportError> {
        (**self).set_port_enable(port)
    }

    fn set_port_disable(&mut self, port: PortIndex) -> Result<(), TransportError> {
        (**self).set_port_disable(port)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }
}
