//! Pin operation errors

use core::fmt;

use pinwire_hal::GpioError;

use crate::error::ErrorKind;
use crate::store::StoreError;

/// Errors from pin lifecycle operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin index outside the lookup table
    OutOfRange,
    /// Pin token is not one or two digits
    InvalidToken,
    /// Mode token is not `input`, `output` or `input_pullup`
    InvalidMode,
    /// Level token is not `0`, `1`, `low` or `high`
    InvalidLevel,
    /// Pin must be un-initialized first
    AlreadyInitialized,
    /// Pin has not been initialized
    NotInitialized,
    /// Pin is latched by the operator
    Locked,
    /// Only output pins can be set
    NotOutput,
    /// GPIO driver failed
    Hardware(GpioError),
    /// Persistent store failed
    Storage(StoreError),
}

impl PinError {
    /// Classification used for the response status
    pub fn kind(&self) -> ErrorKind {
        match self {
            PinError::OutOfRange
            | PinError::InvalidToken
            | PinError::InvalidMode
            | PinError::InvalidLevel => ErrorKind::Validation,
            PinError::AlreadyInitialized
            | PinError::NotInitialized
            | PinError::Locked
            | PinError::NotOutput => ErrorKind::Precondition,
            PinError::Hardware(_) | PinError::Storage(_) => ErrorKind::Internal,
        }
    }
}

impl From<GpioError> for PinError {
    fn from(e: GpioError) -> Self {
        PinError::Hardware(e)
    }
}

impl From<StoreError> for PinError {
    fn from(e: StoreError) -> Self {
        PinError::Storage(e)
    }
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinError::OutOfRange => f.write_str("pin index out of range (0-15)"),
            PinError::InvalidToken => f.write_str("invalid pin, expected 0-15 or d0-d15"),
            PinError::InvalidMode => {
                f.write_str("invalid mode, expected input, output or input_pullup")
            }
            PinError::InvalidLevel => f.write_str("invalid state, expected 0, 1, low or high"),
            PinError::AlreadyInitialized => f.write_str("pin already initialized"),
            PinError::NotInitialized => f.write_str("pin not initialized"),
            PinError::Locked => f.write_str("pin is locked"),
            PinError::NotOutput => f.write_str("pin is not an initialized output"),
            PinError::Hardware(_) => f.write_str("gpio operation failed"),
            PinError::Storage(_) => f.write_str("persistent storage failed"),
        }
    }
}
