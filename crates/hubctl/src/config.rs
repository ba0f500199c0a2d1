//! hubctl configuration management

use crate::cli::LEGACY_DIGIT_OFFSET;
use crate::isolator::FailurePolicy;
use anyhow::{Context, Result, anyhow};
use protocol::{DEFAULT_PORT_COUNT, SerialNumber, Transport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Serial number of the bench hub the tool was written for
pub const DEFAULT_SERIAL_NUMBER: SerialNumber = SerialNumber(0xA360110F);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    pub hub: HubSettings,
    #[serde(default)]
    pub isolation: IsolationSettings,
    #[serde(default)]
    pub cli: CliSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSettings {
    /// Serial number the hub is discovered by (e.g. "0xA360110F")
    pub serial_number: SerialNumber,
    #[serde(default)]
    pub transport: Transport,
    /// Number of downstream ports
    #[serde(default = "HubSettings::default_port_count")]
    pub port_count: u8,
    /// Only consider hubs with this vendor ID during discovery (e.g. "0x24ff")
    #[serde(default)]
    pub vendor_id: Option<String>,
}

impl HubSettings {
    fn default_port_count() -> u8 {
        DEFAULT_PORT_COUNT
    }

    /// Vendor ID filter as a number
    pub fn vendor_id_filter(&self) -> Result<Option<u16>> {
        self.vendor_id
            .as_deref()
            .map(|id| HubConfig::parse_hex_id(id, "vendor_id"))
            .transpose()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IsolationSettings {
    /// Keep going or stop when a port write fails
    #[serde(default)]
    pub on_port_error: FailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSettings {
    #[serde(default = "CliSettings::default_log_level")]
    pub log_level: String,
    /// Character position of the port digit in a legacy `ECU<n>` token
    #[serde(default = "CliSettings::default_digit_offset")]
    pub ecu_digit_offset: usize,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            ecu_digit_offset: Self::default_digit_offset(),
        }
    }
}

impl CliSettings {
    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_digit_offset() -> usize {
        LEGACY_DIGIT_OFFSET
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            hub: HubSettings {
                serial_number: DEFAULT_SERIAL_NUMBER,
                transport: Transport::Usb,
                port_count: DEFAULT_PORT_COUNT,
                vendor_id: None,
            },
            isolation: IsolationSettings::default(),
            cli: CliSettings::default(),
        }
    }
}

impl HubConfig {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_existing(&Self::candidate_paths())
                .ok_or_else(|| anyhow!("No configuration file found"))?,
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: HubConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", config_path.display()))?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Load the first existing standard config file, or defaults if none exists
    ///
    /// A file that exists but cannot be read, parsed or validated is an error.
    pub fn load_or_default() -> Result<Self> {
        Self::load_first_of(&Self::candidate_paths())
    }

    /// Load the first of `candidates` that exists, or defaults if none does
    pub fn load_first_of(candidates: &[PathBuf]) -> Result<Self> {
        match Self::find_existing(candidates) {
            Some(path) => Self::load(Some(path)),
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Standard locations, in lookup order
    pub fn candidate_paths() -> Vec<PathBuf> {
        vec![
            Self::default_path(),
            PathBuf::from("/etc/hubctl/hubctl.toml"),
        ]
    }

    fn find_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
        candidates.iter().find(|p| p.exists()).cloned()
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("hubctl").join("hubctl.toml")
        } else {
            PathBuf::from(".config/hubctl/hubctl.toml")
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.cli.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.cli.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.hub.port_count == 0 {
            return Err(anyhow!("Invalid port_count 0, a hub has at least one port"));
        }

        self.hub.vendor_id_filter()?;

        Ok(())
    }

    /// Parse a 16-bit hex ID written as "0x1234"
    fn parse_hex_id(id: &str, name: &str) -> Result<u16> {
        let hex_part = id
            .strip_prefix("0x")
            .or_else(|| id.strip_prefix("0X"))
            .ok_or_else(|| {
                anyhow!(
                    "Invalid {} '{}', must start with '0x' (e.g., '0x24ff')",
                    name,
                    id
                )
            })?;

        if hex_part.is_empty() || hex_part.len() > 4 {
            return Err(anyhow!(
                "Invalid {} '{}', hex part must be 1-4 digits",
                name,
                id
            ));
        }

        u16::from_str_radix(hex_part, 16)
            .map_err(|_| anyhow!("Invalid {} '{}', not a valid hex number", name, id))
    }
}

/// Expand `~` in a user-supplied config path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
