//! USB backend
//!
//! Implements the device capability surface for a standard USB hub using
//! libusb through rusb. Discovery matches the serial number string
//! descriptor; port control uses hub-class port power requests.

pub mod hub;
pub mod transfers;

pub use hub::UsbHub;
