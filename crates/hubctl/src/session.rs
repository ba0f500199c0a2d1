//! Hub session management
//!
//! A [`HubSession`] owns the device for the whole run and disconnects it
//! exactly once, whichever way the run ends. Discovery failures included:
//! the device handle is released even when no connection was made.

use protocol::{
    DeviceSession, HubError, PortCommand, PortState, SerialNumber, Transport, TransportError,
};
use tracing::{debug, info, warn};

/// Lifecycle of a session
///
/// `NotConnected → Connected → (PortsIsolated | ConnectFailed) → Disconnected`.
/// `Disconnected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotConnected,
    Connected,
    PortsIsolated,
    ConnectFailed,
    Disconnected,
}

/// Opens sessions against one configured hub
#[derive(Debug, Clone, Copy)]
pub struct SessionManager {
    transport: Transport,
    serial: SerialNumber,
}

impl SessionManager {
    pub fn new(transport: Transport, serial: SerialNumber) -> Self {
        Self { transport, serial }
    }

    pub fn serial(&self) -> SerialNumber {
        self.serial
    }

    /// Discover the hub and take ownership of it
    ///
    /// On failure the device is disconnected before the error is returned.
    pub fn connect<D: DeviceSession>(&self, device: D) -> Result<HubSession<D>, HubError> {
        let mut session = HubSession {
            device,
            serial: self.serial,
            state: SessionState::NotConnected,
        };

        info!(
            "Connecting to hub {} over {}",
            self.serial, self.transport
        );
        let code = session
            .device
            .discover_and_connect(self.transport, self.serial);

        if !code.is_ok() {
            warn!("Discovery of hub {} failed: {}", self.serial, code);
            session.state = SessionState::ConnectFailed;
            return Err(HubError::Connection {
                serial: self.serial,
                code,
            });
        }

        session.state = SessionState::Connected;
        debug!("Session open for hub {}", self.serial);
        Ok(session)
    }
}

/// Exclusive ownership of a connected hub
///
/// Dropping the session disconnects the device if [`HubSession::release`]
/// was not called.
pub struct HubSession<D: DeviceSession> {
    device: D,
    serial: SerialNumber,
    state: SessionState,
}

impl<D: DeviceSession> HubSession<D> {
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Serial number the hub was looked up by
    pub fn serial(&self) -> SerialNumber {
        self.serial
    }

    /// Serial number the device reports about itself
    pub fn identify(&mut self) -> Result<SerialNumber, HubError> {
        let serial = self.device.serial_number()?;
        debug!("Hub reports serial number {}", serial);
        Ok(serial)
    }

    /// Issue one port write
    pub fn apply(&mut self, command: PortCommand) -> Result<(), TransportError> {
        if self.state == SessionState::Disconnected {
            return Err(TransportError::NotConnected);
        }
        match command.state {
            PortState::Enabled => self.device.set_port_enable(command.port),
            PortState::Disabled => self.device.set_port_disable(command.port),
        }
    }

    pub(crate) fn mark_isolated(&mut self) {
        if self.state == SessionState::Connected {
            self.state = SessionState::PortsIsolated;
        }
    }

    /// Disconnect now instead of at drop
    pub fn release(mut self) {
        self.disconnect_once();
    }

    fn disconnect_once(&mut self) {
        if self.state == SessionState::Disconnected {
            return;
        }
        debug!("Releasing hub {} ({:?})", self.serial, self.state);
        self.device.disconnect();
        self.state = SessionState::Disconnected;
    }
}

impl<D: DeviceSession> Drop for HubSession<D> {
    fn drop(&mut self) {
        self.disconnect_once();
    }
}
