//! USB hub backend
//!
//! Finds a hub by the serial number in its string descriptor and drives its
//! downstream port power through hub-class control requests.

use crate::usb::transfers::{self, HUB_CLASS};
use protocol::{DeviceSession, PortIndex, ResultCode, SerialNumber, Transport, TransportError};
use rusb::{Context, Device, DeviceHandle, UsbContext};
use tracing::{debug, info, warn};

/// A hub reached over libusb
pub struct UsbHub {
    /// Only hubs with this vendor ID are considered
    vendor_id: Option<u16>,
    /// Open handle while connected
    handle: Option<DeviceHandle<Context>>,
}

impl UsbHub {
    pub fn new(vendor_id: Option<u16>) -> Self {
        Self {
            vendor_id,
            handle: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    fn handle(&self) -> Result<&DeviceHandle<Context>, TransportError> {
        self.handle.as_ref().ok_or(TransportError::NotConnected)
    }

    /// Open `device` if it is a hub carrying `serial`
    fn try_open(
        &self,
        device: &Device<Context>,
        serial: SerialNumber,
    ) -> Result<Option<DeviceHandle<Context>>, rusb::Error> {
        let descriptor = device.device_descriptor()?;

        if descriptor.class_code() != HUB_CLASS {
            return Ok(None);
        }
        if let Some(vid) = self.vendor_id {
            if descriptor.vendor_id() != vid {
                return Ok(None);
            }
        }
        if descriptor.serial_number_string_index().is_none() {
            return Ok(None);
        }

        let handle = device.open()?;
        let text = handle.read_serial_number_string_ascii(&descriptor)?;

        match text.parse::<SerialNumber>() {
            Ok(found) if found == serial => Ok(Some(handle)),
            Ok(found) => {
                debug!(
                    "Skipping hub {} at bus={}, addr={}",
                    found,
                    device.bus_number(),
                    device.address()
                );
                Ok(None)
            }
            Err(_) => {
                debug!("Skipping hub with non-hex serial '{}'", text);
                Ok(None)
            }
        }
    }
}

impl DeviceSession for UsbHub {
    fn discover_and_connect(&mut self, transport: Transport, serial: SerialNumber) -> ResultCode {
        match transport {
            Transport::Usb => debug!("Scanning USB for hub {}", serial),
        }

        if self.handle.is_some() {
            self.disconnect();
        }

        let context = match Context::new() {
            Ok(context) => context,
            Err(e) => {
                warn!("Failed to initialize libusb: {}", e);
                return transfers::map_result_code(e);
            }
        };

        let devices = match context.devices() {
            Ok(devices) => devices,
            Err(e) => {
                warn!("Failed to list USB devices: {}", e);
                return transfers::map_result_code(e);
            }
        };

        // Last open error; reported instead of NotFound when nothing matched
        let mut last_error = None;

        for device in devices.iter() {
            match self.try_open(&device, serial) {
                Ok(Some(handle)) => {
                    info!(
                        "Found hub {} at bus={}, addr={}",
                        serial,
                        device.bus_number(),
                        device.address()
                    );
                    self.handle = Some(handle);
                    return ResultCode::NoError;
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(
                        "Could not inspect device at bus={}, addr={}: {}",
                        device.bus_number(),
                        device.address(),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        last_error.map_or(ResultCode::NotFound, transfers::map_result_code)
    }

    fn serial_number(&mut self) -> Result<SerialNumber, TransportError> {
        let handle = self.handle()?;
        let descriptor = handle
            .device()
            .device_descriptor()
            .map_err(transfers::map_rusb_error)?;
        let text = handle
            .read_serial_number_string_ascii(&descriptor)
            .map_err(transfers::map_rusb_error)?;

        text.parse().map_err(|message| TransportError::Other { message })
    }

    fn set_port_enable(&mut self, port: PortIndex) -> Result<(), TransportError> {
        transfers::set_port_power(self.handle()?, port, true)
    }

    fn set_port_disable(&mut self, port: PortIndex) -> Result<(), TransportError> {
        transfers::set_port_power(self.handle()?, port, false)
    }

    fn disconnect(&mut self) {
        if self.handle.take().is_some() {
            debug!("Closed hub handle");
        }
    }
}
