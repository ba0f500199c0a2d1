//! Test utilities for hubctl
//!
//! Provides an in-memory hub that implements [`DeviceSession`] and records
//! every call made against it, so workflows can be checked without hardware.
//!
//! # Example
//!
//! ```
//! use common::test_utils::{FakeHub, HubOp};
//! use protocol::{DeviceSession, PortIndex, SerialNumber, Transport};
//!
//! let mut hub = FakeHub::new(SerialNumber(0xA360110F));
//! let recorder = hub.recorder();
//!
//! assert!(hub.discover_and_connect(Transport::Usb, SerialNumber(0xA360110F)).is_ok());
//! hub.set_port_enable(PortIndex(2)).unwrap();
//! hub.disconnect();
//!
//! assert_eq!(recorder.disconnect_count(), 1);
//! assert_eq!(recorder.ops()[1], HubOp::Enable(PortIndex(2)));
//! ```

use protocol::{
    DeviceSession, PortCommand, PortIndex, PortState, ResultCode, SerialNumber, Transport,
    TransportError,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// A call observed by [`FakeHub`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubOp {
    Discover {
        transport: Transport,
        serial: SerialNumber,
    },
    SerialNumber,
    Enable(PortIndex),
    Disable(PortIndex),
    Disconnect,
}

#[derive(Debug, Default)]
struct Recorded {
    ops: Vec<HubOp>,
    ports: BTreeMap<PortIndex, PortState>,
}

/// Read-only view of what a [`FakeHub`] has seen
///
/// Stays valid after the hub itself has been moved into a session and
/// dropped.
#[derive(Debug, Clone)]
pub struct HubRecorder {
    recorded: Arc<Mutex<Recorded>>,
}

impl HubRecorder {
    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every call in the order it was made
    pub fn ops(&self) -> Vec<HubOp> {
        self.lock().ops.clone()
    }

    /// Only the port writes, in order
    pub fn port_commands(&self) -> Vec<PortCommand> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                HubOp::Enable(port) => Some(PortCommand::enable(*port)),
                HubOp::Disable(port) => Some(PortCommand::disable(*port)),
                _ => None,
            })
            .collect()
    }

    /// Last state successfully written to each port
    pub fn port_states(&self) -> BTreeMap<PortIndex, PortState> {
        self.lock().ports.clone()
    }

    pub fn disconnect_count(&self) -> usize {
        self.lock()
            .ops
            .iter()
            .filter(|op| **op == HubOp::Disconnect)
            .count()
    }

    /// Calls made after the first disconnect
    pub fn ops_after_disconnect(&self) -> Vec<HubOp> {
        let recorded = self.lock();
        match recorded.ops.iter().position(|op| *op == HubOp::Disconnect) {
            Some(pos) => recorded.ops[pos + 1..].to_vec(),
            None => Vec::new(),
        }
    }
}

/// In-memory hub with scriptable failures
#[derive(Debug)]
pub struct FakeHub {
    serial: SerialNumber,
    connect_result: ResultCode,
    failing_ports: HashMap<PortIndex, TransportError>,
    connected: bool,
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeHub {
    /// Hub that answers to `serial` and accepts every command
    pub fn new(serial: SerialNumber) -> Self {
        Self {
            serial,
            connect_result: ResultCode::NoError,
            failing_ports: HashMap::new(),
            connected: false,
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    /// Make discovery report `code` regardless of the requested serial
    pub fn with_connect_result(mut self, code: ResultCode) -> Self {
        self.connect_result = code;
        self
    }

    /// Make every write to `port` fail with `error`
    pub fn with_failing_port(mut self, port: PortIndex, error: TransportError) -> Self {
        self.failing_ports.insert(port, error);
        self
    }

    pub fn recorder(&self) -> HubRecorder {
        HubRecorder {
            recorded: Arc::clone(&self.recorded),
        }
    }

    fn record(&self, op: HubOp) {
        trace!("fake hub {}: {:?}", self.serial, op);
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ops
            .push(op);
    }

    fn write_port(&mut self, port: PortIndex, state: PortState) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        if let Some(error) = self.failing_ports.get(&port) {
            return Err(error.clone());
        }
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ports
            .insert(port, state);
        Ok(())
    }
}

impl DeviceSession for FakeHub {
    fn discover_and_connect(&mut self, transport: Transport, serial: SerialNumber) -> ResultCode {
        self.record(HubOp::Discover { transport, serial });

        if !self.connect_result.is_ok() {
            return self.connect_result;
        }
        if serial != self.serial {
            return ResultCode::NotFound;
        }

        self.connected = true;
        ResultCode::NoError
    }

    fn serial_number(&mut self) -> Result<SerialNumber, TransportError> {
        self.record(HubOp::SerialNumber);
        if self.connected {
            Ok(self.serial)
        } else {
            Err(TransportError::NotConnected)
        }
    }

    fn set_port_enable(&mut self, port: PortIndex) -> Result<(), TransportError> {
        self.record(HubOp::Enable(port));
        self.write_port(port, PortState::Enabled)
    }

    fn set_port_disable(&mut self, port: PortIndex) -> Result<(), TransportError> {
        self.record(HubOp::Disable(port));
        self.write_port(port, PortState::Disabled)
    }

    fn disconnect(&mut self) {
        self.record(HubOp::Disconnect);
        self.connected = false;
    }
}
