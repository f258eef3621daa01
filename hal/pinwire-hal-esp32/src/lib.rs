//! ESP32-specific HAL for the Pinwire firmware
//!
//! This crate implements the `pinwire-hal` traits on top of `esp-hal`,
//! `esp-storage` and `embassy-net`. It supports:
//!
//! - ESP32-C6 (default)
//! - ESP32-C3
//! - ESP32-S3
//!
//! # Features
//!
//! - `esp32c6`, `esp32c3`, `esp32s3` - Chip selection, exactly one
//! - `defmt` - Enable debug formatting support
//!
//! # Modules
//!
//! - [`gpio`] - [`GpioBank`](pinwire_hal::GpioBank) over `Flex` pins keyed by GPIO number
//! - [`led`] - Active-low status LED
//! - [`nvm`] - Flash-backed emulated EEPROM region
//! - [`transport`] - TCP client connection
//! - [`uart`] - Blocking serial passthrough port

#![no_std]

pub mod gpio;
pub mod led;
pub mod nvm;
pub mod transport;
pub mod uart;

pub use gpio::EspGpioBank;
pub use led::StatusLed;
pub use nvm::FlashEeprom;
pub use transport::TcpTransport;
pub use uart::SerialPort;
