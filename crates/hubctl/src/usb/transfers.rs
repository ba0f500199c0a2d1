//! Hub class control requests
//!
//! Port power is switched with the standard hub-class SET_FEATURE /
//! CLEAR_FEATURE requests addressed to a port. Hub ports are numbered from 1
//! on the wire, so `PortIndex(0)` is port 1.

use protocol::{PortIndex, ResultCode, TransportError};
use rusb::{Context, DeviceHandle, Direction, Recipient, RequestType};
use std::time::Duration;
use tracing::debug;

/// Default timeout for hub control transfers (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// bDeviceClass of a hub
pub const HUB_CLASS: u8 = 0x09;

pub const CLEAR_FEATURE: u8 = 0x01;
pub const SET_FEATURE: u8 = 0x03;

/// Hub port feature selector for port power
pub const PORT_POWER: u16 = 8;

/// bmRequestType for a class request to a hub port (host-to-device)
pub fn port_request_type() -> u8 {
    rusb::request_type(Direction::Out, RequestType::Class, Recipient::Other)
}

/// wIndex of the hub port addressed by `port`
pub fn hub_port_number(port: PortIndex) -> u16 {
    u16::from(port.get()) + 1
}

/// Switch power on or off for one downstream port
pub fn set_port_power(
    handle: &DeviceHandle<Context>,
    port: PortIndex,
    powered: bool,
) -> Result<(), TransportError> {
    let request = if powered { SET_FEATURE } else { CLEAR_FEATURE };

    handle
        .write_control(
            port_request_type(),
            request,
            PORT_POWER,
            hub_port_number(port),
            &[],
            DEFAULT_TIMEOUT,
        )
        .map(|_| debug!("Hub port {} power {}", hub_port_number(port), powered))
        .map_err(map_rusb_error)
}

/// Map rusb errors to transport errors
pub fn map_rusb_error(err: rusb::Error) -> TransportError {
    match err {
        rusb::Error::Timeout => TransportError::Timeout,
        rusb::Error::Pipe => TransportError::Pipe,
        rusb::Error::NoDevice => TransportError::NoDevice,
        rusb::Error::NotFound => TransportError::NotFound,
        rusb::Error::Busy => TransportError::Busy,
        rusb::Error::Io => TransportError::Io,
        rusb::Error::InvalidParam => TransportError::InvalidParam,
        rusb::Error::Access => TransportError::Access,
        _ => TransportError::Other {
            message: err.to_string(),
        },
    }
}

/// Map rusb errors seen during discovery to result codes
pub fn map_result_code(err: rusb::Error) -> ResultCode {
    match err {
        rusb::Error::NotFound => ResultCode::NotFound,
        rusb::Error::Access => ResultCode::Access,
        rusb::Error::Busy => ResultCode::Busy,
        rusb::Error::Timeout => ResultCode::Timeout,
        rusb::Error::Io => ResultCode::Io,
        rusb::Error::NoDevice => ResultCode::NoDevice,
        rusb::Error::NotSupported => ResultCode::Unsupported,
        rusb::Error::InvalidParam => ResultCode::Unknown(-2),
        rusb::Error::Pipe => ResultCode::Unknown(-9),
        rusb::Error::Overflow => ResultCode::Unknown(-8),
        rusb::Error::Interrupted => ResultCode::Unknown(-10),
        rusb::Error::NoMem => ResultCode::Unknown(-11),
        _ => ResultCode::Unknown(-99),
    }
}
