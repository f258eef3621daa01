//! Emulated EEPROM on ESP32 flash
//!
//! A small RAM mirror of one flash region. Reads and writes go to the
//! mirror; [`NvMemory::commit`] writes it back with a sector
//! read-modify-write through `embedded_storage::Storage`.

use embedded_storage::{ReadStorage, Storage};
use esp_storage::FlashStorage;
use pinwire_hal::nvm::check_range;
use pinwire_hal::{NvMemory, NvmError};

/// Size of the emulated region
pub const REGION_SIZE: usize = 128;

/// Default flash offset of the region, past the application partition
pub const DEFAULT_OFFSET: u32 = 0x110000;

// Flash reads must be word aligned and a multiple of 4 long
const _: () = assert!(REGION_SIZE % 4 == 0);

/// Flash-backed [`NvMemory`]
pub struct FlashEeprom<'d> {
    flash: FlashStorage<'d>,
    offset: u32,
    mirror: [u8; REGION_SIZE],
    loaded: bool,
    dirty: bool,
}

impl<'d> FlashEeprom<'d> {
    pub fn new(flash: FlashStorage<'d>, offset: u32) -> Self {
        Self {
            flash,
            offset,
            mirror: [0; REGION_SIZE],
            loaded: false,
            dirty: false,
        }
    }

    /// Fill the mirror from flash on first use
    fn ensure_loaded(&mut self) -> Result<(), NvmError> {
        if !self.loaded {
            self.flash
                .read(self.offset, &mut self.mirror)
                .map_err(|_| NvmError::Unavailable)?;
            self.loaded = true;
        }
        Ok(())
    }
}

impl NvMemory for FlashEeprom<'_> {
    fn capacity(&self) -> usize {
        REGION_SIZE
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), NvmError> {
        check_range(offset, buf.len(), REGION_SIZE)?;
        self.ensure_loaded()?;
        buf.copy_from_slice(&self.mirror[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), NvmError> {
        check_range(offset, data.len(), REGION_SIZE)?;
        self.ensure_loaded()?;
        let target = &mut self.mirror[offset..offset + data.len()];
        if target != data {
            target.copy_from_slice(data);
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), NvmError> {
        if !self.dirty {
            return Ok(());
        }
        self.flash
            .write(self.offset, &self.mirror)
            .map_err(|_| NvmError::Commit)?;
        self.dirty = false;
        Ok(())
    }
}
