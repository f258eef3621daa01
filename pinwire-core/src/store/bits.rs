//! One-bit-per-pin flag vector

use crate::pins::PinIndex;

/// Bytes each field occupies in the persisted region
pub const FIELD_LEN: usize = 2;

/// A flag for each of the 16 pins
///
/// Bit `n` belongs to pin `n`. Persisted little-endian: byte `n / 8`, bit
/// `n % 8`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinBits(u16);

impl PinBits {
    /// All flags clear
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Decode the persisted form
    pub fn from_le_bytes(bytes: [u8; FIELD_LEN]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }

    /// Encode the persisted form
    pub fn to_le_bytes(self) -> [u8; FIELD_LEN] {
        self.0.to_le_bytes()
    }

    /// Flag of one pin
    pub fn get(self, pin: PinIndex) -> bool {
        self.0 & (1 << pin.get()) != 0
    }

    /// Set or clear the flag of one pin
    pub fn set(&mut self, pin: PinIndex, value: bool) {
        if value {
            self.0 |= 1 << pin.get();
        } else {
            self.0 &= !(1 << pin.get());
        }
    }

    /// Byte holding this pin's flag: offset within the field and its value
    pub fn byte_of(self, pin: PinIndex) -> (usize, u8) {
        let byte = pin.as_usize() / 8;
        (byte, self.to_le_bytes()[byte])
    }
}
