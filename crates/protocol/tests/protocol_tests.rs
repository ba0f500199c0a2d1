//! Integration tests for the hub control vocabulary
//!
//! Covers how identities and port settings appear in configuration files and
//! how the device trait composes through trait objects.

use protocol::{
    DeviceSession, PortCommand, PortIndex, PortState, ResultCode, SerialNumber, Transport,
    TransportError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct HubSection {
    serial_number: SerialNumber,
    #[serde(default)]
    transport: Transport,
}

mod config_representation {
    use super::*;

    #[test]
    fn test_serial_from_hex_string() {
        let section: HubSection = toml::from_str(r#"serial_number = "0xA360110F""#).unwrap();
        assert_eq!(section.serial_number, SerialNumber(0xA360110F));
        assert_eq!(section.transport, Transport::Usb);
    }

    #[test]
    fn test_serial_from_integer() {
        let section: HubSection = toml::from_str("serial_number = 2741047567").unwrap();
        assert_eq!(section.serial_number, SerialNumber(0xA360110F));
    }

    #[test]
    fn test_serial_written_as_hex() {
        let section = HubSection {
            serial_number: SerialNumber(0xA360110F),
            transport: Transport::Usb,
        };
        let text = toml::to_string(&section).unwrap();
        assert!(text.contains(r#"serial_number = "0xA360110F""#));
        assert!(text.contains(r#"transport = "usb""#));
    }

    #[test]
    fn test_invalid_serial_rejected() {
        let result: Result<HubSection, _> = toml::from_str(r#"serial_number = "hub-one""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_transport_rejected() {
        let result: Result<HubSection, _> =
            toml::from_str("serial_number = \"0x1\"\ntransport = \"tcpip\"");
        assert!(result.is_err());
    }
}

mod boxed_session {
    use super::*;

    #[derive(Default)]
    struct CountingHub {
        writes: Vec<PortCommand>,
        disconnects: usize,
    }

    impl DeviceSession for CountingHub {
        fn discover_and_connect(&mut self, _: Transport, _: SerialNumber) -> ResultCode {
            ResultCode::NoError
        }

        fn serial_number(&mut self) -> Result<SerialNumber, TransportError> {
            Ok(SerialNumber(7))
        }

        fn set_port_enable(&mut self, port: PortIndex) -> Result<(), TransportError> {
            self.writes.push(PortCommand::enable(port));
            Ok(())
        }

        fn set_port_disable(&mut self, port: PortIndex) -> Result<(), TransportError> {
            self.writes.push(PortCommand::disable(port));
            Ok(())
        }

        fn disconnect(&mut self) {
            self.disconnects += 1;
        }
    }

    fn drive(session: &mut dyn DeviceSession) {
        assert!(
            session
                .discover_and_connect(Transport::Usb, SerialNumber(7))
                .is_ok()
        );
        session.set_port_disable(PortIndex(0)).unwrap();
        session.set_port_enable(PortIndex(1)).unwrap();
        session.disconnect();
    }

    #[test]
    fn test_boxed_session_forwards_calls() {
        let mut boxed: Box<CountingHub> = Box::default();
        drive(&mut boxed);

        assert_eq!(
            boxed.writes,
            vec![
                PortCommand::disable(PortIndex(0)),
                PortCommand::enable(PortIndex(1))
            ]
        );
        assert_eq!(boxed.writes[1].state, PortState::Enabled);
        assert_eq!(boxed.disconnects, 1);
    }
}
