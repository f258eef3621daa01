//! Pinwire Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the pinwire core is written
//! against. Chip crates implement them; the core and its tests only ever
//! see these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pinwire-core (store, pins, router)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pinwire-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ pinwire-hal-  │
//!             │    esp32      │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioBank`] - Runtime-configurable digital pins addressed by physical id
//! - [`gpio::OutputPin`] - Single output, used for the status indicator
//! - [`nvm::NvMemory`] - Small byte-addressed non-volatile region
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial passthrough
//! - [`transport::Transport`] - Client connection of the request server

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod nvm;
pub mod transport;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{GpioBank, GpioError, OutputPin, PhysicalPin, PinMode};
pub use nvm::{NvMemory, NvmError};
pub use transport::Transport;
pub use uart::{UartRx, UartTx};
