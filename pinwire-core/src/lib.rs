//! Board-agnostic core logic for the pinwire firmware
//!
//! This crate contains everything that does not depend on a specific chip:
//!
//! - Bit-packed persistent pin store with integrity marker
//! - Per-pin lifecycle state machine (initialize, set, lock, restore)
//! - Request router mapping the wire protocol onto pin operations
//! - Debug log sink with drain-on-read buffering
//! - Access-point selection for the network join
//! - Single-connection request server
//! - Configuration types and the device.toml parser

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod device;
pub mod error;
pub mod log;
pub mod net;
pub mod pins;
pub mod router;
pub mod server;
pub mod store;

#[cfg(test)]
mod testing;

pub use device::Device;
pub use error::ErrorKind;
pub use pins::{Level, PinError, PinIndex, PinManager, PinMap, PinSnapshot};
pub use store::{Field, LoadOutcome, PinStore, StoreError};
