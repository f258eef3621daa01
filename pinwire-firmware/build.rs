//! Build script for pinwire-firmware
//!
//! - Adds the esp-hal and defmt linker scripts
//! - Validates device.toml at compile time

use std::fs;
use std::path::Path;

/// Number of remotely controllable pins
const PIN_COUNT: usize = 16;

/// Keys accepted per section; anything else is a typo
const ROOT_KEYS: &[&str] = &["node_name"];
const SERVER_KEYS: &[&str] = &["port", "client_timeout_ms", "blink_interval_ms"];
const STORAGE_KEYS: &[&str] = &["persistence"];
const DEBUG_KEYS: &[&str] = &["enabled", "store", "echo", "info", "warn", "error"];
const SERIAL_KEYS: &[&str] = &["baudrate"];
const PINS_KEYS: &[&str] = &["map", "locked"];
const NETWORK_KEYS: &[&str] = &["ssid", "password", "priority"];

fn main() {
    setup_linker();
    validate_config();

    println!("cargo:rerun-if-env-changed=PINWIRE_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=PINWIRE_WIFI_PSK");
}

fn setup_linker() {
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    println!("cargo:rustc-link-arg=-Tlinkall.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a device.toml configuration file.         ║\n\
            ║  Please create one in the pinwire-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config = match toml::from_str::<toml::Table>(&config_content) {
        Ok(table) => toml::Value::Table(table),
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_keys(&config, &mut errors);
    validate_server(&config, &mut errors);
    validate_pins(&config, &mut errors);
    validate_networks(&config, &mut errors);
    report("Invalid device configuration", &errors);

    println!("cargo:warning=device.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn check_table(name: &str, table: &toml::Table, allowed: &[&str], errors: &mut Vec<String>) {
    for key in table.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown key '{}'", name, key));
        }
    }
}

/// Reject unknown sections and keys; the runtime parser skips them silently
fn validate_keys(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (key, value) in root {
        let allowed = match key.as_str() {
            "server" => SERVER_KEYS,
            "storage" => STORAGE_KEYS,
            "debug" => DEBUG_KEYS,
            "serial" => SERIAL_KEYS,
            "pins" => PINS_KEYS,
            "network" => continue,
            _ if ROOT_KEYS.contains(&key.as_str()) => continue,
            _ => {
                errors.push(format!("unknown key or section '{}'", key));
                continue;
            }
        };

        match value.as_table() {
            Some(table) => check_table(key, table, allowed, errors),
            None => errors.push(format!("[{}] must be a table", key)),
        }
    }

    if let Some(toml::Value::String(name)) = root.get("node_name") {
        if name.trim().is_empty() || name.len() > 32 {
            errors.push("node_name must be 1-32 characters".to_string());
        }
    }
}

fn validate_server(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(server) = config.get("server").and_then(|s| s.as_table()) else {
        return;
    };

    if let Some(toml::Value::Integer(port)) = server.get("port") {
        if *port < 1 || *port > 65535 {
            errors.push("[server] port must be 1-65535".to_string());
        }
    }

    for key in ["client_timeout_ms", "blink_interval_ms"] {
        if let Some(toml::Value::Integer(ms)) = server.get(key) {
            if *ms <= 0 || *ms > u32::MAX as i64 {
                errors.push(format!("[server] {} must be positive", key));
            }
        }
    }
}

fn validate_pins(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(pins) = config.get("pins").and_then(|p| p.as_table()) else {
        return;
    };

    match pins.get("map") {
        Some(toml::Value::Array(map)) => {
            if map.len() != PIN_COUNT {
                errors.push(format!("[pins] map must have exactly {} entries", PIN_COUNT));
            }
            let mut seen = Vec::new();
            for gpio in map {
                match gpio.as_integer() {
                    Some(n) if (0..=48).contains(&n) => {
                        if seen.contains(&n) {
                            errors.push(format!("[pins] map lists GPIO {} twice", n));
                        }
                        seen.push(n);
                    }
                    _ => errors.push("[pins] map entries must be GPIO numbers 0-48".to_string()),
                }
            }
        }
        Some(_) => errors.push("[pins] map must be an array".to_string()),
        None => {}
    }

    match pins.get("locked") {
        Some(toml::Value::Array(locked)) => {
            for pin in locked {
                match pin.as_integer() {
                    Some(n) if (0..PIN_COUNT as i64).contains(&n) => {}
                    _ => errors.push(format!(
                        "[pins] locked entries must be pin indices 0-{}",
                        PIN_COUNT - 1
                    )),
                }
            }
        }
        Some(_) => errors.push("[pins] locked must be an array".to_string()),
        None => {}
    }
}

fn validate_networks(config: &toml::Value, errors: &mut Vec<String>) {
    let networks = match config.get("network") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[network.*] entries must be tables".to_string());
            return;
        }
        None => {
            println!(
                "cargo:warning=device.toml has no [network.*] section; set PINWIRE_WIFI_SSID"
            );
            return;
        }
    };

    if networks.len() > 4 {
        errors.push("at most 4 [network.*] sections are supported".to_string());
    }

    for (name, network) in networks {
        let Some(network) = network.as_table() else {
            errors.push(format!("[network.{}] must be a table", name));
            continue;
        };
        check_table(&format!("network.{}", name), network, NETWORK_KEYS, errors);

        match network.get("ssid") {
            Some(toml::Value::String(ssid)) if !ssid.is_empty() && ssid.len() <= 32 => {}
            Some(_) => errors.push(format!("[network.{}] ssid must be 1-32 bytes", name)),
            None => errors.push(format!("[network.{}] missing 'ssid'", name)),
        }

        if let Some(toml::Value::String(password)) = network.get("password") {
            if password.len() > 64 {
                errors.push(format!("[network.{}] password longer than 64 bytes", name));
            }
        }

        if let Some(toml::Value::Integer(priority)) = network.get("priority") {
            if !(0..=255).contains(priority) {
                errors.push(format!("[network.{}] priority must be 0-255", name));
            }
        }
    }
}
