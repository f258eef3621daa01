//! Persistent pin store
//!
//! Region layout (128 bytes, EEPROM style):
//!
//! ```text
//! offset  len  content
//! 0       3    magic (112, 112, 112)
//! 3       2    mode         (1 = output)
//! 5       2    pull-up
//! 7       2    state        (last commanded output level)
//! 9       2    initialized
//! 11      2    locked
//! 13      115  reserved, zero
//! ```
//!
//! A region without the magic is treated as blank or corrupt and is reset
//! to zeros. Every change is written through and committed before the call
//! returns.

mod bits;

pub use bits::{PinBits, FIELD_LEN};

use pinwire_hal::{NvMemory, NvmError};

use crate::pins::PinIndex;

/// Integrity marker at the start of the region
pub const MAGIC: [u8; 3] = [112, 112, 112];

/// Size of the persisted region
pub const REGION_LEN: usize = 128;

/// A persisted per-pin flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Set when the pin is an output
    Mode,
    /// Set when an input pin uses its pull-up
    PullUp,
    /// Last commanded output level
    State,
    /// Pin completed its setup transition
    Initialized,
    /// Operator latch
    Locked,
}

impl Field {
    /// All fields in layout order
    pub const ALL: [Field; 5] = [
        Field::Mode,
        Field::PullUp,
        Field::State,
        Field::Initialized,
        Field::Locked,
    ];

    /// Byte offset of the field in the region
    pub const fn offset(self) -> usize {
        MAGIC.len() + self.slot() * FIELD_LEN
    }

    const fn slot(self) -> usize {
        match self {
            Field::Mode => 0,
            Field::PullUp => 1,
            Field::State => 2,
            Field::Initialized => 3,
            Field::Locked => 4,
        }
    }
}

/// What [`PinStore::load`] found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadOutcome {
    /// Region was blank, corrupt, or persistence is off; nothing to restore
    Fresh,
    /// Valid prior data was loaded
    Restored,
}

/// Errors from the persistent store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The media is smaller than the region layout
    RegionTooSmall,
    /// The media failed
    Media(NvmError),
}

impl From<NvmError> for StoreError {
    fn from(e: NvmError) -> Self {
        StoreError::Media(e)
    }
}

/// Bit-packed per-pin flags with write-through persistence
pub struct PinStore<M> {
    media: M,
    fields: [PinBits; 5],
    persistence: bool,
}

impl<M: NvMemory> PinStore<M> {
    /// Create a store over `media`
    ///
    /// With `persistence` off the media is never touched and all flags live
    /// in memory only.
    pub fn new(media: M, persistence: bool) -> Self {
        Self {
            media,
            fields: [PinBits::empty(); 5],
            persistence,
        }
    }

    /// Whether changes are written to the media
    pub fn persistence_enabled(&self) -> bool {
        self.persistence
    }

    /// Stop writing to the media for the rest of the session
    pub fn disable_persistence(&mut self) {
        self.persistence = false;
    }

    /// Check the magic and load all fields
    ///
    /// On a missing magic the region is reset and [`LoadOutcome::Fresh`] is
    /// returned. On error all flags are left cleared.
    pub fn load(&mut self) -> Result<LoadOutcome, StoreError> {
        self.fields = [PinBits::empty(); 5];

        if !self.persistence {
            return Ok(LoadOutcome::Fresh);
        }

        let result = self.load_from_media();
        if result.is_err() {
            self.fields = [PinBits::empty(); 5];
        }
        result
    }

    fn load_from_media(&mut self) -> Result<LoadOutcome, StoreError> {
        if self.media.capacity() < REGION_LEN {
            return Err(StoreError::RegionTooSmall);
        }

        let mut magic = [0u8; MAGIC.len()];
        self.media.read(0, &mut magic)?;
        if magic != MAGIC {
            self.factory_reset()?;
            return Ok(LoadOutcome::Fresh);
        }

        for field in Field::ALL {
            let mut bytes = [0u8; FIELD_LEN];
            self.media.read(field.offset(), &mut bytes)?;
            self.fields[field.slot()] = PinBits::from_le_bytes(bytes);
        }

        Ok(LoadOutcome::Restored)
    }

    /// Zero the whole region and rewrite the magic
    pub fn factory_reset(&mut self) -> Result<(), StoreError> {
        self.fields = [PinBits::empty(); 5];

        if !self.persistence {
            return Ok(());
        }

        self.media.write(0, &MAGIC)?;
        let zeros = [0u8; REGION_LEN - MAGIC.len()];
        self.media.write(MAGIC.len(), &zeros)?;
        self.media.commit()?;
        Ok(())
    }

    /// In-memory flag of one pin
    pub fn get_bit(&self, field: Field, pin: PinIndex) -> bool {
        self.fields[field.slot()].get(pin)
    }

    /// All flags of one field
    pub fn bits(&self, field: Field) -> PinBits {
        self.fields[field.slot()]
    }

    /// Change one flag and write its byte through to the media
    ///
    /// If the write or commit fails the in-memory flag is rolled back.
    pub fn set_bit(&mut self, field: Field, pin: PinIndex, value: bool) -> Result<(), StoreError> {
        let previous = self.get_bit(field, pin);
        if previous == value {
            return Ok(());
        }

        self.fields[field.slot()].set(pin, value);

        if self.persistence {
            if let Err(e) = self.flush_byte(field, pin) {
                self.fields[field.slot()].set(pin, previous);
                return Err(e);
            }
        }

        Ok(())
    }

    fn flush_byte(&mut self, field: Field, pin: PinIndex) -> Result<(), StoreError> {
        let (byte, value) = self.fields[field.slot()].byte_of(pin);
        self.media.write_byte(field.offset() + byte, value)?;
        self.media.commit()?;
        Ok(())
    }

    /// Underlying media
    pub fn media(&self) -> &M {
        &self.media
    }

    /// Give back the media
    pub fn into_media(self) -> M {
        self.media
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemRegion;

    fn pin(n: u8) -> PinIndex {
        PinIndex::new(n).unwrap()
    }

    #[test]
    fn test_field_offsets() {
        assert_eq!(Field::Mode.offset(), 3);
        assert_eq!(Field::PullUp.offset(), 5);
        assert_eq!(Field::State.offset(), 7);
        assert_eq!(Field::Initialized.offset(), 9);
        assert_eq!(Field::Locked.offset(), 11);
    }

    #[test]
    fn test_blank_media_is_reset() {
        let mut store = PinStore::new(MemRegion::filled(0xFF), true);
        assert_eq!(store.load(), Ok(LoadOutcome::Fresh));

        let media = store.media();
        assert_eq!(&media.bytes[..3], &MAGIC);
        assert!(media.bytes[3..].iter().all(|&b| b == 0));
        assert!(media.commits >= 1);
        for field in Field::ALL {
            assert_eq!(store.bits(field), PinBits::empty());
        }
    }

    #[test]
    fn test_valid_media_is_loaded() {
        let mut media = MemRegion::formatted();
        media.bytes[Field::Mode.offset()] = 0b0010_0000;
        media.bytes[Field::Initialized.offset()] = 0b0010_0000;
        media.bytes[Field::Locked.offset() + 1] = 0b1000_0000;

        let mut store = PinStore::new(media, true);
        assert_eq!(store.load(), Ok(LoadOutcome::Restored));
        assert!(store.get_bit(Field::Mode, pin(5)));
        assert!(store.get_bit(Field::Initialized, pin(5)));
        assert!(store.get_bit(Field::Locked, pin(15)));
        assert!(!store.get_bit(Field::State, pin(5)));
    }

    #[test]
    fn test_set_bit_writes_through() {
        let mut store = PinStore::new(MemRegion::formatted(), true);
        store.load().unwrap();

        store.set_bit(Field::State, pin(10), true).unwrap();
        assert!(store.get_bit(Field::State, pin(10)));

        let media = store.media();
        assert_eq!(media.bytes[Field::State.offset()], 0);
        assert_eq!(media.bytes[Field::State.offset() + 1], 0b0000_0100);
        assert_eq!(media.commits, 1);
    }

    #[test]
    fn test_unchanged_bit_skips_media() {
        let mut store = PinStore::new(MemRegion::formatted(), true);
        store.load().unwrap();
        store.set_bit(Field::Locked, pin(0), false).unwrap();
        assert_eq!(store.media().commits, 0);
    }

    #[test]
    fn test_failed_commit_rolls_back() {
        let mut media = MemRegion::formatted();
        media.fail_commit = true;
        let mut store = PinStore::new(media, true);
        store.load().unwrap();

        let result = store.set_bit(Field::Initialized, pin(2), true);
        assert_eq!(result, Err(StoreError::Media(NvmError::Commit)));
        assert!(!store.get_bit(Field::Initialized, pin(2)));
    }

    #[test]
    fn test_disabled_persistence_stays_in_memory() {
        let mut store = PinStore::new(MemRegion::filled(0xAA), false);
        assert_eq!(store.load(), Ok(LoadOutcome::Fresh));

        store.set_bit(Field::Mode, pin(1), true).unwrap();
        assert!(store.get_bit(Field::Mode, pin(1)));
        assert!(store.media().bytes.iter().all(|&b| b == 0xAA));
        assert_eq!(store.media().commits, 0);
    }

    #[test]
    fn test_unavailable_media() {
        let mut media = MemRegion::formatted();
        media.bytes[Field::Mode.offset()] = 0xFF;
        media.fail_read = true;
        let mut store = PinStore::new(media, true);

        assert_eq!(store.load(), Err(StoreError::Media(NvmError::Unavailable)));
        assert_eq!(store.bits(Field::Mode), PinBits::empty());
    }

    #[test]
    fn test_region_too_small() {
        let mut store = PinStore::new(MemRegion::with_capacity(64), true);
        assert_eq!(store.load(), Err(StoreError::RegionTooSmall));
    }
}
