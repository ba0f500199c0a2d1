//! hubctl
//!
//! Enables one downstream port of a USB hub and disables all the others, so
//! that exactly one board on the bench is attached to the host.

use anyhow::{Context, Result};
use clap::Parser;
use common::setup_logging;
use hubctl::cli::PortSelector;
use hubctl::config::{self, HubConfig};
use hubctl::controller::{self, EXIT_USAGE, HubController};
use hubctl::usb::UsbHub;
use protocol::{HubError, SerialNumber};
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "hubctl")]
#[command(
    author,
    version,
    about = "USB hub port isolation - enable one port, disable the rest"
)]
#[command(long_about = "
Connects to a USB hub by serial number, enables the selected downstream port
and disables every other port.

EXAMPLES:
    # Enable port 3 only
    hubctl --port 3

    # Legacy form used by the board flashing tool (port digit at position 3)
    hubctl ECU3

    # Talk to a different hub
    hubctl --serial 0xA360110F --port 0

    # Write the default configuration and exit
    hubctl --save-config

CONFIGURATION:
    The configuration file is looked up in the following order:
    1. Path specified with --config
    2. ~/.config/hubctl/hubctl.toml
    3. /etc/hubctl/hubctl.toml
    4. Built-in defaults

EXIT STATUS:
    0 success, 1 usage or configuration error, 2 hub not found,
    3 a port command failed, 4 port index out of range
")]
struct Args {
    /// Legacy target token, e.g. ECU3 (port digit at the configured position)
    #[arg(value_name = "ECU_ID", conflicts_with = "port")]
    ecu_id: Option<String>,

    /// Port to enable (0-based)
    #[arg(short, long, value_name = "N")]
    port: Option<u8>,

    /// Hub serial number in hex, overrides the configuration file
    #[arg(short, long, value_name = "HEX")]
    serial: Option<SerialNumber>,

    /// Number of downstream ports, overrides the configuration file
    #[arg(long, value_name = "COUNT")]
    port_count: Option<u8>,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn run(args: Args) -> Result<u8> {
    if args.save_config {
        let path = match args.config.as_deref() {
            Some(path) => config::expand_path(path),
            None => HubConfig::default_path(),
        };
        HubConfig::default()
            .save(&path)
            .context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(controller::EXIT_SUCCESS);
    }

    let mut config = match args.config.as_deref() {
        Some(path) => HubConfig::load(Some(config::expand_path(path)))
            .context("Failed to load configuration")?,
        None => HubConfig::load_or_default().context("Failed to load configuration")?,
    };

    if let Some(serial) = args.serial {
        config.hub.serial_number = serial;
    }
    if let Some(port_count) = args.port_count {
        config.hub.port_count = port_count;
    }
    if let Some(level) = args.log_level {
        config.cli.log_level = level;
    }
    config.validate().context("Invalid configuration")?;

    setup_logging(&config.cli.log_level).context("Failed to setup logging")?;

    info!("hubctl v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Invocation: {}",
        std::env::args_os()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let target = match PortSelector::from_args(args.port, args.ecu_id)
        .and_then(|selector| selector.resolve(config.cli.ecu_digit_offset))
    {
        Ok(target) => target,
        Err(e) => return Ok(report_failure(&e)),
    };

    let vendor_id = config.hub.vendor_id_filter()?;
    let hub_controller = HubController::new(&config);

    println!("Connecting to hub {}...", config.hub.serial_number);
    let result =
        hub_controller.isolate_with(UsbHub::new(vendor_id), target, |reported, target| {
            match reported {
                Some(serial) => println!("Connected to hub with serial number: {}.", serial),
                None => println!("Connected to hub {}.", config.hub.serial_number),
            }
            println!("Disabling all ports except port number {}...", target);
        });

    match &result {
        Ok(outcome) => println!(
            "Port {} enabled, {} other port(s) disabled.",
            outcome.report.target,
            outcome.report.disabled_count()
        ),
        Err(e) => {
            report_failure(e);
        }
    }

    Ok(controller::exit_code(&result))
}

/// Print a user-facing line for `err` and return its exit status
fn report_failure(err: &HubError) -> u8 {
    debug!("Run failed: {:?}", err);
    let message = controller::user_message(err);
    match err {
        HubError::Connection { .. } => println!("{}", message),
        _ => eprintln!("{}", message),
    }
    controller::error_exit_code(err)
}
