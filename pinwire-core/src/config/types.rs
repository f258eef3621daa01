//! Configuration type definitions
//!
//! These types describe one device. They are filled from `device.toml`
//! by [`super::toml::parse_config`] at boot.

use heapless::{String, Vec};

use crate::device::{DEFAULT_NODE_NAME, MAX_NODE_NAME_LEN};
use crate::log::DebugSettings;
use crate::net::{KnownNetwork, MAX_KNOWN_NETWORKS};
use crate::pins::{PinIndex, PinMap, PIN_COUNT};
use crate::server::ServerSettings;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default listening port
pub const DEFAULT_PORT: u16 = 80;

/// Default serial passthrough baud rate
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Name reported by `GET /`
    pub node_name: String<MAX_NODE_NAME_LEN>,
    /// TCP port of the request server
    pub port: u16,
    /// Silent-client timeout
    pub client_timeout_ms: u32,
    /// Status indicator blink period while waiting
    pub blink_interval_ms: u32,
    /// Write pin changes through to non-volatile memory
    pub persistence: bool,
    /// Debug log behaviour
    pub debug: DebugSettings,
    /// Serial passthrough baud rate
    pub serial_baudrate: u32,
    /// Pin index → GPIO number
    pub pin_map: [u8; PIN_COUNT],
    /// Pins latched at boot
    pub locked_pins: Vec<u8, PIN_COUNT>,
    /// Networks to try, best first by priority
    pub networks: Vec<KnownNetwork, MAX_KNOWN_NETWORKS>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let server = ServerSettings::default();
        Self {
            node_name: String::try_from(DEFAULT_NODE_NAME).unwrap_or_default(),
            port: DEFAULT_PORT,
            client_timeout_ms: server.client_timeout_ms,
            blink_interval_ms: server.blink_interval_ms,
            persistence: true,
            debug: DebugSettings::default(),
            serial_baudrate: DEFAULT_BAUDRATE,
            pin_map: core::array::from_fn(|i| i as u8),
            locked_pins: Vec::new(),
            networks: Vec::new(),
        }
    }
}

impl DeviceConfig {
    /// Server timing taken from this configuration
    pub fn server_settings(&self) -> ServerSettings {
        ServerSettings {
            client_timeout_ms: self.client_timeout_ms,
            blink_interval_ms: self.blink_interval_ms,
        }
    }

    /// Pin lookup table
    pub fn pin_map(&self) -> PinMap {
        PinMap::new(self.pin_map)
    }

    /// Pins to lock at boot; out-of-range entries were rejected at parse time
    pub fn locked(&self) -> impl Iterator<Item = PinIndex> + '_ {
        self.locked_pins.iter().filter_map(|&n| PinIndex::new(n))
    }

    /// Add a network, replacing the lowest-priority one when full
    pub fn add_network(&mut self, network: KnownNetwork) {
        if let Err(network) = self.networks.push(network) {
            if let Some(lowest) = self.networks.iter_mut().min_by_key(|n| n.priority) {
                if lowest.priority <= network.priority {
                    *lowest = network;
                }
            }
        }
    }
}
