//! Access-point selection for the network join
//!
//! The firmware scans, then joins the best known network that is visible:
//! highest configured priority first, strongest signal among equals.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum SSID length (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Maximum number of configured networks
pub const MAX_KNOWN_NETWORKS: usize = 4;

/// A configured network the device may join
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KnownNetwork {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
    /// Higher wins
    pub priority: u8,
}

impl KnownNetwork {
    /// Build from string slices; `None` if either is too long
    pub fn new(ssid: &str, password: &str, priority: u8) -> Option<Self> {
        Some(Self {
            ssid: String::try_from(ssid).ok()?,
            password: String::try_from(password).ok()?,
            priority,
        })
    }
}

/// One access point seen in a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScannedNetwork<'a> {
    pub ssid: &'a str,
    /// Signal strength in dBm
    pub rssi: i8,
}

/// Pick the network to join
///
/// Known networks not present in the scan are ignored. Returns `None` when
/// no known network is visible.
pub fn select_network<'k>(
    known: &'k [KnownNetwork],
    scanned: &[ScannedNetwork<'_>],
) -> Option<&'k KnownNetwork> {
    known
        .iter()
        .filter_map(|network| {
            scanned
                .iter()
                .filter(|ap| ap.ssid == network.ssid.as_str())
                .map(|ap| ap.rssi)
                .max()
                .map(|rssi| (network, rssi))
        })
        .max_by(|(a, a_rssi), (b, b_rssi)| {
            a.priority.cmp(&b.priority).then(a_rssi.cmp(b_rssi))
        })
        .map(|(network, _)| network)
}

/// Known networks ordered for blind connection attempts (no scan results)
pub fn by_priority(known: &[KnownNetwork]) -> Vec<&KnownNetwork, MAX_KNOWN_NETWORKS> {
    let mut ordered: Vec<&KnownNetwork, MAX_KNOWN_NETWORKS> = known.iter().take(MAX_KNOWN_NETWORKS).collect();
    ordered.sort_unstable_by(|a, b| b.priority.cmp(&a.priority));
    ordered
}
