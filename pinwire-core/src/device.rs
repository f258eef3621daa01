//! Device context shared by every request
//!
//! Owns the pin manager, the serial channel and the debug log. The server
//! hands a `&mut Device` to the router for each connection, so there is
//! exactly one writer at any time.

use heapless::String;

use crate::pins::PinManager;

/// Longest node name accepted
pub const MAX_NODE_NAME_LEN: usize = 32;

/// Node name used when none is configured
pub const DEFAULT_NODE_NAME: &str = "pinwire";

/// Node name rejected because it is empty or too long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidNodeName;

/// Everything a request may touch
pub struct Device<G, M, S, L> {
    pub pins: PinManager<G, M>,
    pub serial: S,
    pub log: L,
    node_name: String<MAX_NODE_NAME_LEN>,
}

impl<G, M, S, L> Device<G, M, S, L> {
    /// Assemble a device; an unusable name falls back to [`DEFAULT_NODE_NAME`]
    pub fn new(pins: PinManager<G, M>, serial: S, log: L, node_name: &str) -> Self {
        let mut device = Self {
            pins,
            serial,
            log,
            node_name: String::new(),
        };
        if device.set_node_name(node_name).is_err() {
            let _ = device.node_name.push_str(DEFAULT_NODE_NAME);
        }
        device
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Rename the node; surrounding whitespace is ignored
    pub fn set_node_name(&mut self, name: &str) -> Result<(), InvalidNodeName> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidNodeName);
        }
        self.node_name = String::try_from(name).map_err(|_| InvalidNodeName)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{DebugLog, DebugSettings};
    use crate::pins::PinMap;
    use crate::store::PinStore;
    use crate::testing::{MemRegion, MockBank, MockSerial};

    fn device(name: &str) -> Device<MockBank, MemRegion, MockSerial, DebugLog<64>> {
        Device::new(
            PinManager::new(
                MockBank::new(),
                PinStore::new(MemRegion::formatted(), false),
                PinMap::default(),
            ),
            MockSerial::new(),
            DebugLog::new(DebugSettings::default()),
            name,
        )
    }

    #[test]
    fn test_node_name() {
        let mut dev = device("bench-a");
        assert_eq!(dev.node_name(), "bench-a");

        dev.set_node_name("  greenhouse\r\n").unwrap();
        assert_eq!(dev.node_name(), "greenhouse");
    }

    #[test]
    fn test_invalid_node_name_rejected() {
        let mut dev = device("bench-a");
        assert_eq!(dev.set_node_name("   "), Err(InvalidNodeName));
        let long = [b'n'; MAX_NODE_NAME_LEN + 1];
        assert_eq!(
            dev.set_node_name(core::str::from_utf8(&long).unwrap()),
            Err(InvalidNodeName)
        );
        assert_eq!(dev.node_name(), "bench-a");
    }

    #[test]
    fn test_default_name_fallback() {
        assert_eq!(device("").node_name(), DEFAULT_NODE_NAME);
    }
}
