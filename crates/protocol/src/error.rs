//! Hub control error types

use crate::types::{PortIndex, PortState, ResultCode, SerialNumber};
use std::fmt;
use thiserror::Error;

/// Failure of a single device operation on an open link
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Operation timed out")]
    Timeout,

    #[error("Request stalled by device")]
    Pipe,

    #[error("Device disconnected")]
    NoDevice,

    #[error("Device or entity not found")]
    NotFound,

    #[error("Device busy")]
    Busy,

    #[error("I/O error")]
    Io,

    #[error("Access denied")]
    Access,

    #[error("Invalid parameter")]
    InvalidParam,

    #[error("Device is not connected")]
    NotConnected,

    #[error("{message}")]
    Other { message: String },
}

/// A port write the transport rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortFailure {
    pub port: PortIndex,
    pub state: PortState,
    pub error: TransportError,
}

impl fmt::Display for PortFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.state {
            PortState::Enabled => "enable",
            PortState::Disabled => "disable",
        };
        write!(f, "{} port {}: {}", action, self.port, self.error)
    }
}

/// Errors raised by the session and isolation workflow
#[derive(Debug, Error)]
pub enum HubError {
    /// Discovery returned anything other than `NoError`
    #[error("Could not connect to hub {serial}: {code}")]
    Connection {
        serial: SerialNumber,
        code: ResultCode,
    },

    /// Target port outside `[0, port_count)`
    #[error("Invalid port index {index}, hub has {port_count} ports (0-{max})", max = .port_count.saturating_sub(1))]
    InvalidPortIndex { index: u8, port_count: u8 },

    /// Malformed command-line input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// One or more port writes failed
    #[error("{} of {issued} port commands failed while isolating port {target}: {}", .failures.len(), format_failures(.failures))]
    PortCommandsFailed {
        target: PortIndex,
        issued: usize,
        failures: Vec<PortFailure>,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

fn format_failures(failures: &[PortFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HubError::Connection {
            serial: SerialNumber(0xA360110F),
            code: ResultCode::NotFound,
        };
        assert_eq!(
            err.to_string(),
            "Could not connect to hub 0xA360110F: device not found"
        );

        let err = HubError::InvalidPortIndex {
            index: 9,
            port_count: 8,
        };
        assert_eq!(
            err.to_string(),
            "Invalid port index 9, hub has 8 ports (0-7)"
        );
    }

    #[test]
    fn test_port_commands_failed_summary() {
        let err = HubError::PortCommandsFailed {
            target: PortIndex(3),
            issued: 8,
            failures: vec![
                PortFailure {
                    port: PortIndex(1),
                    state: PortState::Disabled,
                    error: TransportError::Timeout,
                },
                PortFailure {
                    port: PortIndex(3),
                    state: PortState::Enabled,
                    error: TransportError::Pipe,
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 of 8 port commands failed while isolating port 3"));
        assert!(msg.contains("disable port 1: Operation timed out"));
        assert!(msg.contains("enable port 3: Request stalled by device"));
    }

    #[test]
    fn test_transport_error_conversion() {
        let err: HubError = TransportError::NoDevice.into();
        assert!(matches!(err, HubError::Transport(TransportError::NoDevice)));
    }
}
