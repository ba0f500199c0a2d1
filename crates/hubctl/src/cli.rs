//! Target port selection from the command line
//!
//! Two forms are accepted: an explicit `--port <n>` flag, and the legacy
//! positional token used by the board flashing tool (`ECU3`), where the port
//! is the single ASCII digit at a fixed character offset.

use protocol::{HubError, PortIndex};

/// Position of the port digit in `ECU<n>`
pub const LEGACY_DIGIT_OFFSET: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelector {
    /// `--port <n>`
    Flag(u8),
    /// Positional token such as `ECU3`
    Legacy(String),
}

impl PortSelector {
    /// Build a selector from the two mutually exclusive arguments
    pub fn from_args(port: Option<u8>, token: Option<String>) -> Result<Self, HubError> {
        match (port, token) {
            (Some(port), None) => Ok(PortSelector::Flag(port)),
            (None, Some(token)) => Ok(PortSelector::Legacy(token)),
            (Some(_), Some(_)) => Err(HubError::InvalidArgument(
                "give either --port or an ECU token, not both".to_string(),
            )),
            (None, None) => Err(HubError::InvalidArgument(
                "no target port; use --port <N> or an ECU<n> token".to_string(),
            )),
        }
    }

    /// Port index this selector names
    ///
    /// Range is not checked here; that depends on the hub's port count.
    pub fn resolve(&self, digit_offset: usize) -> Result<PortIndex, HubError> {
        match self {
            PortSelector::Flag(port) => Ok(PortIndex(*port)),
            PortSelector::Legacy(token) => parse_legacy_token(token, digit_offset),
        }
    }
}

/// Extract the port digit from a legacy token
///
/// Only the one character at `offset` is read, so `ECU12` names port 1.
pub fn parse_legacy_token(token: &str, offset: usize) -> Result<PortIndex, HubError> {
    let c = token.chars().nth(offset).ok_or_else(|| {
        HubError::InvalidArgument(format!(
            "'{}' is too short, expected a port digit at position {}",
            token, offset
        ))
    })?;

    c.to_digit(10)
        .map(|digit| PortIndex(digit as u8))
        .ok_or_else(|| {
            HubError::InvalidArgument(format!(
                "'{}' has '{}' at position {}, expected a port digit",
                token, c, offset
            ))
        })
}
