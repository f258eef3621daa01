//! Digital pin indices and the index → GPIO lookup table

use pinwire_hal::PhysicalPin;

use super::PinError;

/// Number of remotely controllable pins
pub const PIN_COUNT: usize = 16;

/// Prefix selecting the board-label form of a pin token (`d5` for D5)
pub const LABEL_PREFIX: char = 'd';

/// External pin number, guaranteed to be in `0..PIN_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinIndex(u8);

impl PinIndex {
    /// Create an index, or `None` when out of range
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < PIN_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Numeric value
    pub fn get(self) -> u8 {
        self.0
    }

    /// Numeric value as an array index
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// All indices in ascending order
    pub fn all() -> impl Iterator<Item = PinIndex> {
        (0..PIN_COUNT as u8).map(PinIndex)
    }

    /// Parse a pin token from a request path
    ///
    /// Accepts one or two decimal digits, optionally prefixed with
    /// [`LABEL_PREFIX`] to name the pin by its board label. Both forms must
    /// land in `0..PIN_COUNT`.
    pub fn parse_token(token: &str) -> Result<Self, PinError> {
        let digits = token.strip_prefix(LABEL_PREFIX).unwrap_or(token);

        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PinError::InvalidToken);
        }

        let value = digits
            .bytes()
            .fold(0u8, |acc, b| acc * 10 + (b - b'0'));

        Self::try_from(value)
    }
}

impl TryFrom<u8> for PinIndex {
    type Error = PinError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PinError::OutOfRange)
    }
}

impl core::fmt::Display for PinIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed, total mapping from pin index to the board's GPIO numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMap {
    gpio: [u8; PIN_COUNT],
}

impl PinMap {
    /// Build a map from the GPIO number of each index
    pub const fn new(gpio: [u8; PIN_COUNT]) -> Self {
        Self { gpio }
    }

    /// Physical pin of a validated index
    pub fn physical(&self, pin: PinIndex) -> PhysicalPin {
        PhysicalPin(self.gpio[pin.as_usize()])
    }

    /// Physical pin of a raw index
    pub fn lookup(&self, index: u8) -> Result<PhysicalPin, PinError> {
        PinIndex::try_from(index).map(|pin| self.physical(pin))
    }
}

impl Default for PinMap {
    /// Index `n` maps to GPIO `n`
    fn default() -> Self {
        let mut gpio = [0u8; PIN_COUNT];
        let mut i = 0;
        while i < PIN_COUNT {
            gpio[i] = i as u8;
            i += 1;
        }
        Self::new(gpio)
    }
}
