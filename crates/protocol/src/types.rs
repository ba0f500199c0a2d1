//! Hub control type definitions
//!
//! Device identity, port addressing and the result codes reported by device
//! discovery.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of downstream ports on the reference hub
pub const DEFAULT_PORT_COUNT: u8 = 8;

/// Serial number identifying one physical hub
///
/// Only ever used as a lookup key during discovery and for display. Serial
/// numbers are written as eight hex digits with a `0x` prefix, and parsed
/// from hex with or without the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SerialRepr", into = "String")]
pub struct SerialNumber(pub u32);

/// Accepted config representations of a serial number
#[derive(Deserialize)]
#[serde(untagged)]
enum SerialRepr {
    Int(u32),
    Text(String),
}

impl TryFrom<SerialRepr> for SerialNumber {
    type Error = String;

    fn try_from(repr: SerialRepr) -> Result<Self, Self::Error> {
        match repr {
            SerialRepr::Int(value) => Ok(SerialNumber(value)),
            SerialRepr::Text(text) => text.parse(),
        }
    }
}

impl From<SerialNumber> for String {
    fn from(serial: SerialNumber) -> Self {
        serial.to_string()
    }
}

impl FromStr for SerialNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex.is_empty() || hex.len() > 8 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "Invalid serial number '{}', expected 1-8 hex digits",
                s
            ));
        }

        u32::from_str_radix(hex, 16)
            .map(SerialNumber)
            .map_err(|_| format!("Invalid serial number '{}', not a valid hex number", s))
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Zero-based index of a downstream port
///
/// Carries no identity beyond the current invocation. Whether an index is in
/// range depends on the port count of the hub it is used against; see
/// [`PortIndex::checked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortIndex(pub u8);

impl PortIndex {
    /// Build an index only if it addresses one of `port_count` ports
    pub fn checked(raw: u8, port_count: u8) -> Option<Self> {
        (raw < port_count).then_some(PortIndex(raw))
    }

    /// Whether this index addresses one of `port_count` ports
    pub fn is_within(self, port_count: u8) -> bool {
        self.0 < port_count
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PortIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Desired state of a single port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Enabled,
    Disabled,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::Enabled => write!(f, "enabled"),
            PortState::Disabled => write!(f, "disabled"),
        }
    }
}

/// One write issued against a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortCommand {
    pub port: PortIndex,
    pub state: PortState,
}

impl PortCommand {
    pub fn enable(port: PortIndex) -> Self {
        Self {
            port,
            state: PortState::Enabled,
        }
    }

    pub fn disable(port: PortIndex) -> Self {
        Self {
            port,
            state: PortState::Disabled,
        }
    }
}

/// Link over which a hub is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Usb,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Usb => write!(f, "USB"),
        }
    }
}

/// Outcome of a discovery attempt
///
/// `NoError` is the only success value; every other code is treated the
/// same way by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    NoError,
    NotFound,
    Access,
    Busy,
    Timeout,
    Io,
    NoDevice,
    Unsupported,
    Unknown(i32),
}

impl ResultCode {
    pub fn is_ok(self) -> bool {
        self == ResultCode::NoError
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::NoError => write!(f, "no error"),
            ResultCode::NotFound => write!(f, "device not found"),
            ResultCode::Access => write!(f, "access denied"),
            ResultCode::Busy => write!(f, "device busy"),
            ResultCode::Timeout => write!(f, "timed out"),
            ResultCode::Io => write!(f, "I/O error"),
            ResultCode::NoDevice => write!(f, "device disconnected"),
            ResultCode::Unsupported => write!(f, "operation not supported"),
            ResultCode::Unknown(code) => write!(f, "unknown error ({})", code),
        }
    }
}
