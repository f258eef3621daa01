//! Pin lifecycle manager
//!
//! Each pin moves through a small state machine:
//!
//! ```text
//!                 initialize(mode)
//!  Uninitialized ─────────────────▶ Active(mode)
//!        ▲                              │
//!        └──────────────────────────────┘
//!              unset_initialization
//! ```
//!
//! `Locked` is an independent latch checked before every mutating
//! transition. It survives reboots and is only cleared by [`PinManager::unlock`]
//! or by a boot whose lock list no longer names the pin.
//!
//! The manager is the only owner of both the GPIO bank and the persistent
//! store, so hardware and stored flags are always changed together.

mod error;
mod index;

pub use error::PinError;
pub use index::{PinIndex, PinMap, LABEL_PREFIX, PIN_COUNT};

use core::fmt;

use pinwire_hal::{GpioBank, NvMemory, PhysicalPin, PinMode};

use crate::store::{Field, LoadOutcome, PinStore, StoreError};

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Parse a level token (`0`, `1`, `low`, `high`)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "0" | "low" => Some(Level::Low),
            "1" | "high" => Some(Level::High),
            _ => None,
        }
    }

    /// Level from a boolean (`true` is high)
    pub fn from_bool(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }

    /// True for [`Level::High`]
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_high() { "1" } else { "0" })
    }
}

/// Read-only view of one pin
///
/// `mode` and `state` are `None` while the pin is not initialized, and
/// `state` is also `None` if a live input read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinSnapshot {
    pub initialized: bool,
    pub locked: bool,
    pub mode: Option<PinMode>,
    pub state: Option<Level>,
}

impl fmt::Display for PinSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "initialized={}", self.initialized as u8)?;
        writeln!(f, "locked={}", self.locked as u8)?;
        match self.state {
            Some(level) => writeln!(f, "state={}", level)?,
            None => writeln!(f, "state=unknown")?,
        }
        match self.mode {
            Some(mode) => writeln!(f, "mode={}", mode.as_str()),
            None => writeln!(f, "mode=unknown"),
        }
    }
}

/// Result of re-applying persisted pin configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RestoreReport {
    /// Pins configured from the store
    pub restored: u8,
    /// Initialized pins left alone because they are locked
    pub skipped_locked: u8,
    /// Pins whose hardware configuration failed
    pub failed: u8,
}

/// What happened at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootOutcome {
    /// Store was blank or reset; nothing restored
    Fresh,
    /// Prior configuration was re-applied
    Restored(RestoreReport),
    /// Media unusable; persistence is disabled for the rest of the session
    StorageUnavailable(StoreError),
}

/// Owner of the GPIO bank and the persistent pin store
pub struct PinManager<G, M> {
    gpio: G,
    store: PinStore<M>,
    map: PinMap,
}

impl<G: GpioBank, M: NvMemory> PinManager<G, M> {
    /// Create a manager; call [`PinManager::boot`] before use
    pub fn new(gpio: G, store: PinStore<M>, map: PinMap) -> Self {
        Self { gpio, store, map }
    }

    /// Load the store and restore pins from it, keeping the stored latches
    pub fn boot(&mut self) -> BootOutcome {
        match self.load() {
            Ok(loaded) => self.restore_loaded(loaded),
            Err(e) => BootOutcome::StorageUnavailable(e),
        }
    }

    /// Load the store, make the latches match `locked`, then restore
    ///
    /// Latches are settled before any hardware is touched: a pin dropped
    /// from `locked` gets its stored configuration back, a pin added to it
    /// stays in its hardware default.
    pub fn boot_with_locks(&mut self, locked: &[PinIndex]) -> BootOutcome {
        let loaded = self.load();
        let synced = self.sync_locks(locked);

        match (loaded, synced) {
            (Err(e), _) => BootOutcome::StorageUnavailable(e),
            (Ok(loaded), Ok(())) => self.restore_loaded(loaded),
            (Ok(loaded), Err(e)) => {
                self.restore_loaded(loaded);
                BootOutcome::StorageUnavailable(e)
            }
        }
    }

    fn load(&mut self) -> Result<LoadOutcome, StoreError> {
        let loaded = self.store.load();
        if loaded.is_err() {
            self.store.disable_persistence();
        }
        loaded
    }

    fn restore_loaded(&mut self, loaded: LoadOutcome) -> BootOutcome {
        match loaded {
            LoadOutcome::Fresh => BootOutcome::Fresh,
            LoadOutcome::Restored => BootOutcome::Restored(self.restore_all()),
        }
    }

    /// Set the latch of every pin in `locked` and clear all others
    ///
    /// If the media refuses a change, persistence is switched off and the
    /// latch still takes effect for this session. The first media error is
    /// returned.
    pub fn sync_locks(&mut self, locked: &[PinIndex]) -> Result<(), StoreError> {
        let mut result = Ok(());

        for pin in PinIndex::all() {
            let wanted = locked.contains(&pin);
            if let Err(e) = self.store.set_bit(Field::Locked, pin, wanted) {
                self.store.disable_persistence();
                self.store.set_bit(Field::Locked, pin, wanted)?;
                result = result.and(Err(e));
            }
        }

        result
    }

    /// Physical pin of a raw index
    pub fn map_to_physical(&self, index: u8) -> Result<PhysicalPin, PinError> {
        self.map.lookup(index)
    }

    /// Whether the pin completed its setup transition
    pub fn is_initialized(&self, pin: PinIndex) -> bool {
        self.store.get_bit(Field::Initialized, pin)
    }

    /// Whether the operator latch is set
    pub fn is_locked(&self, pin: PinIndex) -> bool {
        self.store.get_bit(Field::Locked, pin)
    }

    /// Whether the pin is an initialized output
    pub fn is_output(&self, pin: PinIndex) -> bool {
        self.is_initialized(pin) && self.stored_mode(pin).is_output()
    }

    /// Mode recorded in the store, regardless of the initialized flag
    fn stored_mode(&self, pin: PinIndex) -> PinMode {
        if self.store.get_bit(Field::Mode, pin) {
            PinMode::Output
        } else if self.store.get_bit(Field::PullUp, pin) {
            PinMode::InputPullUp
        } else {
            PinMode::Input
        }
    }

    /// Configure a pin and mark it initialized
    ///
    /// Outputs start low. The initialized flag is written last so an
    /// interrupted initialization leaves the pin uninitialized.
    pub fn initialize(&mut self, pin: PinIndex, mode: PinMode) -> Result<(), PinError> {
        if self.is_initialized(pin) {
            return Err(PinError::AlreadyInitialized);
        }
        if self.is_locked(pin) {
            return Err(PinError::Locked);
        }

        let physical = self.map.physical(pin);
        self.gpio.configure(physical, mode)?;
        if mode.is_output() {
            self.gpio.write(physical, false)?;
        }

        self.store.set_bit(Field::Mode, pin, mode.is_output())?;
        self.store.set_bit(Field::PullUp, pin, mode.pull_up())?;
        self.store.set_bit(Field::State, pin, false)?;
        self.store.set_bit(Field::Initialized, pin, true)?;
        Ok(())
    }

    /// Drive an output pin and persist the level
    pub fn set_state(&mut self, pin: PinIndex, level: Level) -> Result<(), PinError> {
        if self.is_locked(pin) {
            return Err(PinError::Locked);
        }
        if !self.is_output(pin) {
            return Err(PinError::NotOutput);
        }

        self.gpio.write(self.map.physical(pin), level.is_high())?;
        self.store.set_bit(Field::State, pin, level.is_high())?;
        Ok(())
    }

    /// Current level: live for inputs, last commanded for outputs
    pub fn get_state(&mut self, pin: PinIndex) -> Result<Level, PinError> {
        if !self.is_initialized(pin) {
            return Err(PinError::NotInitialized);
        }

        if self.stored_mode(pin).is_output() {
            Ok(Level::from_bool(self.store.get_bit(Field::State, pin)))
        } else {
            let high = self.gpio.read(self.map.physical(pin))?;
            Ok(Level::from_bool(high))
        }
    }

    /// Clear the initialized flag
    ///
    /// Mode, pull-up and state are kept; the hardware is not touched.
    pub fn unset_initialization(&mut self, pin: PinIndex) -> Result<(), PinError> {
        if self.is_locked(pin) {
            return Err(PinError::Locked);
        }
        self.store.set_bit(Field::Initialized, pin, false)?;
        Ok(())
    }

    /// Set the operator latch
    pub fn lock(&mut self, pin: PinIndex) -> Result<(), PinError> {
        self.store.set_bit(Field::Locked, pin, true)?;
        Ok(())
    }

    /// Clear the operator latch
    pub fn unlock(&mut self, pin: PinIndex) -> Result<(), PinError> {
        self.store.set_bit(Field::Locked, pin, false)?;
        Ok(())
    }

    /// Read-only view of a pin
    pub fn snapshot(&mut self, pin: PinIndex) -> PinSnapshot {
        let initialized = self.is_initialized(pin);
        PinSnapshot {
            initialized,
            locked: self.is_locked(pin),
            mode: initialized.then(|| self.stored_mode(pin)),
            state: if initialized {
                self.get_state(pin).ok()
            } else {
                None
            },
        }
    }

    /// Re-apply the stored configuration of every initialized, unlocked pin
    ///
    /// Locked pins are left in their hardware default state.
    pub fn restore_all(&mut self) -> RestoreReport {
        let mut report = RestoreReport::default();

        for pin in PinIndex::all() {
            if !self.is_initialized(pin) {
                continue;
            }
            if self.is_locked(pin) {
                report.skipped_locked += 1;
                continue;
            }

            match self.restore_pin(pin) {
                Ok(()) => report.restored += 1,
                Err(_) => report.failed += 1,
            }
        }

        report
    }

    fn restore_pin(&mut self, pin: PinIndex) -> Result<(), PinError> {
        let physical = self.map.physical(pin);
        let mode = self.stored_mode(pin);

        self.gpio.configure(physical, mode)?;
        if mode.is_output() {
            self.gpio
                .write(physical, self.store.get_bit(Field::State, pin))?;
        }
        Ok(())
    }

    /// Persistent store
    pub fn store(&self) -> &PinStore<M> {
        &self.store
    }

    /// GPIO bank
    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// Tear down into the bank and store
    pub fn into_parts(self) -> (G, PinStore<M>) {
        (self.gpio, self.store)
    }
}
