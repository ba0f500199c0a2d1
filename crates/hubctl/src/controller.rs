//! Isolation workflow
//!
//! Validate target → acquire session → identify → isolate → release. The
//! session is released on every path once it has been acquired; an invalid
//! target is rejected before the device is touched.

use crate::config::HubConfig;
use crate::isolator::{IsolationReport, PortIsolator};
use crate::lock::DeviceLocks;
use crate::session::SessionManager;
use protocol::{DeviceSession, HubError, PortIndex, SerialNumber};
use tracing::{info, warn};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_USAGE: u8 = 1;
pub const EXIT_CONNECTION: u8 = 2;
pub const EXIT_PORT_COMMANDS: u8 = 3;
pub const EXIT_INVALID_PORT: u8 = 4;

/// Result of a completed isolation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Serial the hub reported, if it answered the query
    pub reported_serial: Option<SerialNumber>,
    pub report: IsolationReport,
}

pub struct HubController {
    sessions: SessionManager,
    isolator: PortIsolator,
    locks: DeviceLocks,
}

impl HubController {
    pub fn new(config: &HubConfig) -> Self {
        Self {
            sessions: SessionManager::new(config.hub.transport, config.hub.serial_number),
            isolator: PortIsolator::new(config.hub.port_count, config.isolation.on_port_error),
            locks: DeviceLocks::new(),
        }
    }

    pub fn isolator(&self) -> &PortIsolator {
        &self.isolator
    }

    /// Isolate `target` on the configured hub using `device`
    ///
    /// Concurrent calls against the same hub are serialized.
    pub fn isolate<D: DeviceSession>(
        &self,
        device: D,
        target: PortIndex,
    ) -> Result<Outcome, HubError> {
        self.isolate_with(device, target, |_, _| {})
    }

    /// Like [`HubController::isolate`], calling `on_connected` once the hub is
    /// connected and identified, before any port command is sent
    ///
    /// `on_connected` receives the serial the hub reported (if any) and the
    /// target. It is not called when connecting fails.
    pub fn isolate_with<D, F>(
        &self,
        device: D,
        target: PortIndex,
        on_connected: F,
    ) -> Result<Outcome, HubError>
    where
        D: DeviceSession,
        F: FnOnce(Option<SerialNumber>, PortIndex),
    {
        self.isolator.check_target(target)?;

        self.locks.with_device(self.sessions.serial(), || -> Result<Outcome, HubError> {
            let mut session = self.sessions.connect(device)?;

            let reported_serial = match session.identify() {
                Ok(serial) => {
                    info!("Connected to hub with serial number: {}", serial);
                    Some(serial)
                }
                Err(e) => {
                    warn!("Connected, but the hub did not report its serial: {}", e);
                    None
                }
            };
            on_connected(reported_serial, target);

            let report = self.isolator.isolate(&mut session, target)?;
            session.release();

            Ok(Outcome {
                reported_serial,
                report,
            })
        })
    }
}

/// Process exit status for a finished run
pub fn exit_code(result: &Result<Outcome, HubError>) -> u8 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(err) => error_exit_code(err),
    }
}

pub fn error_exit_code(err: &HubError) -> u8 {
    match err {
        HubError::Connection { .. } => EXIT_CONNECTION,
        HubError::PortCommandsFailed { .. } | HubError::Transport(_) => EXIT_PORT_COMMANDS,
        HubError::InvalidPortIndex { .. } => EXIT_INVALID_PORT,
        HubError::InvalidArgument(_) => EXIT_USAGE,
    }
}

/// Line shown to the user when a run fails
pub fn user_message(err: &HubError) -> String {
    match err {
        HubError::Connection { .. } => "Could not find a module with which to connect.".to_string(),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{PortIndex, ResultCode, TransportError};

    fn connection_error() -> HubError {
        HubError::Connection {
            serial: SerialNumber(1),
            code: ResultCode::NotFound,
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&Err(connection_error())), EXIT_CONNECTION);
        assert_eq!(
            exit_code(&Err(HubError::InvalidPortIndex {
                index: 9,
                port_count: 8
            })),
            EXIT_INVALID_PORT
        );
        assert_eq!(
            exit_code(&Err(HubError::InvalidArgument("x".into()))),
            EXIT_USAGE
        );
        assert_eq!(
            exit_code(&Err(HubError::PortCommandsFailed {
                target: PortIndex(0),
                issued: 8,
                failures: Vec::new(),
            })),
            EXIT_PORT_COMMANDS
        );
        assert_eq!(
            exit_code(&Err(HubError::Transport(TransportError::Io))),
            EXIT_PORT_COMMANDS
        );
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            user_message(&connection_error()),
            "Could not find a module with which to connect."
        );

        let err = HubError::InvalidPortIndex {
            index: 9,
            port_count: 8,
        };
        assert_eq!(user_message(&err), err.to_string());
    }
}
