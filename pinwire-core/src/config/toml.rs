//! Simple TOML parser for device configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `device.toml`. It does NOT support the full TOML grammar.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Flat integer arrays: `locked = [2, 3]`
//! - [section] headers
//! - [network.name] headers, one per known network
//! - Comments (# ...)
//!
//! Unknown keys are ignored; the firmware build script rejects them before
//! they ever reach a device.

use heapless::{String, Vec};

use super::types::DeviceConfig;
use crate::net::KnownNetwork;
use crate::pins::{PinIndex, PIN_COUNT};

/// Configuration parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// A `[network.*]` section without an ssid
    MissingSsid,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Server,
    Storage,
    Debug,
    Serial,
    Pins,
    Network,
}

/// Parse TOML text into a [`DeviceConfig`]
pub fn parse_config(input: &str) -> Result<DeviceConfig, ConfigError> {
    let mut config = DeviceConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            if section == Section::Network {
                let network = KnownNetwork {
                    ssid: String::new(),
                    password: String::new(),
                    priority: 0,
                };
                config
                    .networks
                    .push(network)
                    .map_err(|_| ConfigError::TooManyItems)?;
            }
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    if config.networks.iter().any(|n| n.ssid.is_empty()) {
        return Err(ConfigError::MissingSsid);
    }

    Ok(config)
}

/// Parse a section header like "server" or "network.home"
fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    let header = header.trim();

    if let Some(name) = header.strip_prefix("network.") {
        if name.is_empty() || name.contains('.') {
            return Err(ConfigError::InvalidSection);
        }
        return Ok(Section::Network);
    }

    match header {
        "server" => Ok(Section::Server),
        "storage" => Ok(Section::Storage),
        "debug" => Ok(Section::Debug),
        "serial" => Ok(Section::Serial),
        "pins" => Ok(Section::Pins),
        _ => Err(ConfigError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

fn parse_heapless<const N: usize>(value: &str) -> Result<String<N>, ConfigError> {
    String::try_from(parse_string(value)).map_err(|_| ConfigError::InvalidValue)
}

/// Parse an integer value; `_` separators are allowed
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    let mut digits = String::<24>::new();
    for ch in value.chars().filter(|&c| c != '_') {
        digits.push(ch).map_err(|_| ConfigError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ConfigError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

/// Parse a flat array of small integers like "[2, 3, 14]"
fn parse_byte_array<const N: usize>(value: &str) -> Result<Vec<u8, N>, ConfigError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ConfigError::InvalidValue)?;

    let mut items = Vec::new();
    for item in inner.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        items
            .push(parse_int(item)?)
            .map_err(|_| ConfigError::TooManyItems)?;
    }
    Ok(items)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DeviceConfig,
) -> Result<(), ConfigError> {
    match (section, key) {
        (Section::Root, "node_name") => {
            let name = parse_string(value);
            if name.is_empty() {
                return Err(ConfigError::InvalidValue);
            }
            config.node_name = parse_heapless(value)?;
        }

        (Section::Server, "port") => config.port = parse_int(value)?,
        (Section::Server, "client_timeout_ms") => config.client_timeout_ms = parse_int(value)?,
        (Section::Server, "blink_interval_ms") => {
            let interval: u32 = parse_int(value)?;
            if interval == 0 {
                return Err(ConfigError::InvalidValue);
            }
            config.blink_interval_ms = interval;
        }

        (Section::Storage, "persistence") => config.persistence = parse_bool(value)?,

        (Section::Debug, "enabled") => config.debug.enabled = parse_bool(value)?,
        (Section::Debug, "store") => config.debug.store = parse_bool(value)?,
        (Section::Debug, "echo") => config.debug.echo = parse_bool(value)?,
        (Section::Debug, "info") => config.debug.info = parse_bool(value)?,
        (Section::Debug, "warn") => config.debug.warn = parse_bool(value)?,
        (Section::Debug, "error") => config.debug.error = parse_bool(value)?,

        (Section::Serial, "baudrate") => config.serial_baudrate = parse_int(value)?,

        (Section::Pins, "map") => {
            let map: Vec<u8, PIN_COUNT> = parse_byte_array(value)?;
            config.pin_map = map
                .as_slice()
                .try_into()
                .map_err(|_| ConfigError::InvalidValue)?;
        }
        (Section::Pins, "locked") => {
            let locked: Vec<u8, PIN_COUNT> = parse_byte_array(value)?;
            if locked.iter().any(|&n| PinIndex::new(n).is_none()) {
                return Err(ConfigError::InvalidValue);
            }
            config.locked_pins = locked;
        }

        (Section::Network, _) => {
            let network = config
                .networks
                .last_mut()
                .ok_or(ConfigError::InvalidSection)?;
            match key {
                "ssid" => network.ssid = parse_heapless(value)?,
                "password" => network.password = parse_heapless(value)?,
                "priority" => network.priority = parse_int(value)?,
                _ => {}
            }
        }

        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_section_header() {
        assert_eq!(parse_section_header("server"), Ok(Section::Server));
        assert_eq!(parse_section_header(" pins "), Ok(Section::Pins));
        assert_eq!(parse_section_header("network.home"), Ok(Section::Network));
        assert_eq!(parse_section_header("network."), Err(ConfigError::InvalidSection));
        assert_eq!(parse_section_header("mqtt"), Err(ConfigError::InvalidSection));
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("port = 8080"), Some(("port", "8080")));
        assert_eq!(
            parse_key_value("ssid = \"home\" # upstairs"),
            Some(("ssid", "\"home\""))
        );
        assert_eq!(parse_key_value("port ="), None);
    }

    #[test]
    fn test_parse_byte_array() {
        let items: Vec<u8, 4> = parse_byte_array("[2, 3,14 ]").unwrap();
        assert_eq!(&items[..], &[2, 3, 14]);
        let empty: Vec<u8, 4> = parse_byte_array("[]").unwrap();
        assert!(empty.is_empty());
        assert_eq!(parse_byte_array::<2>("[1, 2, 3]"), Err(ConfigError::TooManyItems));
        assert_eq!(parse_byte_array::<2>("1, 2"), Err(ConfigError::InvalidValue));
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
# Bench controller
node_name = "bench-a"

[server]
port = 8080
client_timeout_ms = 5_000
blink_interval_ms = 100

[storage]
persistence = false

[debug]
enabled = true
store = true
info = false

[serial]
baudrate = 9600

[pins]
map = [16, 5, 4, 0, 2, 14, 12, 13, 15, 3, 1, 9, 10, 6, 7, 8]
locked = [2, 3]

[network.home]
ssid = "home"
password = "hunter22"
priority = 2

[network.lab]
ssid = "lab"
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.node_name.as_str(), "bench-a");
        assert_eq!(config.port, 8080);
        assert_eq!(config.client_timeout_ms, 5000);
        assert_eq!(config.blink_interval_ms, 100);
        assert!(!config.persistence);
        assert!(config.debug.enabled && config.debug.store);
        assert!(!config.debug.info && config.debug.warn);
        assert_eq!(config.serial_baudrate, 9600);
        assert_eq!(config.pin_map[0], 16);
        assert_eq!(config.locked().map(PinIndex::get).sum::<u8>(), 5);
        assert_eq!(config.networks.len(), 2);
        assert_eq!(config.networks[0].password.as_str(), "hunter22");
        assert_eq!(config.networks[1].priority, 0);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("# nothing\n").unwrap(), DeviceConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(parse_config("[pins]\nlocked = [16]"), Err(ConfigError::InvalidValue));
        assert_eq!(parse_config("[pins]\nmap = [1, 2]"), Err(ConfigError::InvalidValue));
        assert_eq!(parse_config("[server]\nport = 70000"), Err(ConfigError::InvalidValue));
        assert_eq!(parse_config("[storage]\npersistence = yes"), Err(ConfigError::InvalidValue));
        assert_eq!(parse_config("[network.x]\npassword = \"p\""), Err(ConfigError::MissingSsid));
        assert_eq!(parse_config("[display]\n"), Err(ConfigError::InvalidSection));
    }
}
