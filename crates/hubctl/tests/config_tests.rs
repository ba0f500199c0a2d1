//! Integration tests for configuration parsing
//!
//! Tests hubctl configuration files, including:
//! - Minimal and full configuration files
//! - Defaults for omitted sections
//! - Save/load through the filesystem
//! - Invalid configuration handling

use hubctl::FailurePolicy;
use hubctl::config::HubConfig;
use hubctl::controller::HubController;
use protocol::{PortIndex, SerialNumber, Transport};
use std::fs;
use tempfile::TempDir;

const MINIMAL_CONFIG: &str = r#"
[hub]
serial_number = "0xA360110F"
"#;

const FULL_CONFIG: &str = r#"
[hub]
serial_number = "0x0BADF00D"
transport = "usb"
port_count = 4
vendor_id = "0x24ff"

[isolation]
on_port_error = "abort"

[cli]
log_level = "debug"
ecu_digit_offset = 4
"#;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("hubctl.toml");
    fs::write(&path, content).unwrap();
    path
}

mod parsing {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let dir = TempDir::new().unwrap();
        let config = HubConfig::load(Some(write_config(&dir, MINIMAL_CONFIG))).unwrap();

        assert_eq!(config.hub.serial_number, SerialNumber(0xA360110F));
        assert_eq!(config.hub.transport, Transport::Usb);
        assert_eq!(config.hub.port_count, 8);
        assert_eq!(config.hub.vendor_id_filter().unwrap(), None);
        assert_eq!(config.isolation.on_port_error, FailurePolicy::Continue);
        assert_eq!(config.cli.log_level, "info");
        assert_eq!(config.cli.ecu_digit_offset, 3);
    }

    #[test]
    fn test_full_config() {
        let dir = TempDir::new().unwrap();
        let config = HubConfig::load(Some(write_config(&dir, FULL_CONFIG))).unwrap();

        assert_eq!(config.hub.serial_number, SerialNumber(0x0BADF00D));
        assert_eq!(config.hub.port_count, 4);
        assert_eq!(config.hub.vendor_id_filter().unwrap(), Some(0x24ff));
        assert_eq!(config.isolation.on_port_error, FailurePolicy::Abort);
        assert_eq!(config.cli.log_level, "debug");
        assert_eq!(config.cli.ecu_digit_offset, 4);
    }

    #[test]
    fn test_port_count_drives_isolation_range() {
        let dir = TempDir::new().unwrap();
        let config = HubConfig::load(Some(write_config(&dir, FULL_CONFIG))).unwrap();
        let controller = HubController::new(&config);

        assert!(controller.isolator().check_target(PortIndex(3)).is_ok());
        assert!(controller.isolator().check_target(PortIndex(4)).is_err());
    }
}

mod invalid {
    use super::*;

    #[test]
    fn test_missing_hub_section() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[cli]\nlog_level = \"info\"\n");
        assert!(HubConfig::load(Some(path)).is_err());
    }

    #[test]
    fn test_bad_serial() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[hub]\nserial_number = \"not-hex\"\n");
        assert!(HubConfig::load(Some(path)).is_err());
    }

    #[test]
    fn test_bad_log_level() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[hub]\nserial_number = \"0x1\"\n[cli]\nlog_level = \"chatty\"\n",
        );
        assert!(HubConfig::load(Some(path)).is_err());
    }

    #[test]
    fn test_zero_ports() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[hub]\nserial_number = \"0x1\"\nport_count = 0\n");
        assert!(HubConfig::load(Some(path)).is_err());
    }

    #[test]
    fn test_bad_vendor_id() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[hub]\nserial_number = \"0x1\"\nvendor_id = \"24ff\"\n",
        );
        assert!(HubConfig::load(Some(path)).is_err());
    }

    #[test]
    fn test_unknown_failure_policy() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[hub]\nserial_number = \"0x1\"\n[isolation]\non_port_error = \"retry\"\n",
        );
        assert!(HubConfig::load(Some(path)).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(HubConfig::load(Some(dir.path().join("absent.toml"))).is_err());
    }
}

mod persistence {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("hubctl.toml");

        let mut config = HubConfig::default();
        config.hub.serial_number = SerialNumber(0xCAFE);
        config.isolation.on_port_error = FailurePolicy::Abort;
        config.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("serial_number = \"0x0000CAFE\""));

        let loaded = HubConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.hub.serial_number, SerialNumber(0xCAFE));
        assert_eq!(loaded.isolation.on_port_error, FailurePolicy::Abort);
    }
}
