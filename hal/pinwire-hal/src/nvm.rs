//! Non-volatile memory abstractions
//!
//! Models an EEPROM-like region: a handful of bytes that are read and
//! written at byte granularity and made durable by an explicit commit.
//! Flash-backed implementations keep a RAM mirror and write it out on
//! [`NvMemory::commit`].

/// Errors from non-volatile memory operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NvmError {
    /// The media could not be accessed at all
    Unavailable,
    /// Access outside the region
    OutOfBounds,
    /// Reading from the media failed
    Read,
    /// Writing to the media failed
    Write,
    /// Making pending writes durable failed
    Commit,
}

/// Small byte-addressed non-volatile region
pub trait NvMemory {
    /// Size of the region in bytes
    fn capacity(&self) -> usize;

    /// Read `buf.len()` bytes starting at `offset`
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), NvmError>;

    /// Stage `data` at `offset`
    ///
    /// Staged bytes are visible to [`NvMemory::read`] immediately but are
    /// only guaranteed to survive a power cycle after [`NvMemory::commit`].
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), NvmError>;

    /// Make all staged writes durable
    fn commit(&mut self) -> Result<(), NvmError>;

    /// Stage a single byte
    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), NvmError> {
        self.write(offset, &[value])
    }
}

/// Bounds check shared by implementations
pub fn check_range(offset: usize, len: usize, capacity: usize) -> Result<(), NvmError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(NvmError::OutOfBounds),
    }
}
