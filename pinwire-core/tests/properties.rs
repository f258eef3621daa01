//! Property tests for the pin lifecycle and its persistence

use pinwire_core::pins::{BootOutcome, PIN_COUNT};
use pinwire_core::store::{MAGIC, REGION_LEN};
use pinwire_core::{ErrorKind, Level, PinError, PinIndex, PinManager, PinMap, PinStore};
use pinwire_hal::{GpioBank, GpioError, NvMemory, NvmError, PhysicalPin, PinMode};
use proptest::prelude::*;

struct Region {
    bytes: [u8; REGION_LEN],
}

impl NvMemory for Region {
    fn capacity(&self) -> usize {
        REGION_LEN
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), NvmError> {
        pinwire_hal::nvm::check_range(offset, buf.len(), REGION_LEN)?;
        buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), NvmError> {
        pinwire_hal::nvm::check_range(offset, data.len(), REGION_LEN)?;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), NvmError> {
        Ok(())
    }
}

#[derive(Default)]
struct Bank {
    modes: [Option<PinMode>; PIN_COUNT],
    levels: [bool; PIN_COUNT],
}

impl GpioBank for Bank {
    fn configure(&mut self, pin: PhysicalPin, mode: PinMode) -> Result<(), GpioError> {
        let slot = self
            .modes
            .get_mut(pin.number() as usize)
            .ok_or(GpioError::UnknownPin(pin))?;
        *slot = Some(mode);
        Ok(())
    }

    fn write(&mut self, pin: PhysicalPin, high: bool) -> Result<(), GpioError> {
        self.levels[pin.number() as usize] = high;
        Ok(())
    }

    fn read(&mut self, pin: PhysicalPin) -> Result<bool, GpioError> {
        Ok(self.levels[pin.number() as usize])
    }
}

fn blank_region() -> Region {
    Region {
        bytes: [0; REGION_LEN],
    }
}

fn boot(region: Region) -> PinManager<Bank, Region> {
    let mut pins = PinManager::new(Bank::default(), PinStore::new(region, true), PinMap::default());
    pins.boot();
    pins
}

fn reboot(pins: PinManager<Bank, Region>) -> PinManager<Bank, Region> {
    let (_, store) = pins.into_parts();
    boot(store.into_media())
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Init(u8, PinMode),
    Set(u8, bool),
    Unset(u8),
    Lock(u8),
    Unlock(u8),
}

fn mode_strategy() -> impl Strategy<Value = PinMode> {
    prop_oneof![
        Just(PinMode::Input),
        Just(PinMode::InputPullUp),
        Just(PinMode::Output),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let pin = 0..PIN_COUNT as u8;
    prop_oneof![
        (pin.clone(), mode_strategy()).prop_map(|(p, m)| Op::Init(p, m)),
        (pin.clone(), any::<bool>()).prop_map(|(p, h)| Op::Set(p, h)),
        pin.clone().prop_map(Op::Unset),
        pin.clone().prop_map(Op::Lock),
        pin.prop_map(Op::Unlock),
    ]
}

fn apply(pins: &mut PinManager<Bank, Region>, op: Op) {
    let index = |n: u8| PinIndex::new(n).unwrap();
    let _ = match op {
        Op::Init(n, mode) => pins.initialize(index(n), mode),
        Op::Set(n, high) => pins.set_state(index(n), Level::from_bool(high)),
        Op::Unset(n) => pins.unset_initialization(index(n)),
        Op::Lock(n) => pins.lock(index(n)),
        Op::Unlock(n) => pins.unlock(index(n)),
    };
}

proptest! {
    #[test]
    fn prop_state_survives_reboot(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut pins = boot(blank_region());
        for op in ops {
            apply(&mut pins, op);
        }

        let before: Vec<_> = PinIndex::all().map(|p| pins.snapshot(p)).collect();
        let mut rebooted = reboot(pins);

        // Identity map: index n drives GPIO n
        let bank = rebooted.gpio();
        for (pin, expected) in PinIndex::all().zip(&before) {
            let gpio = pin.as_usize();
            if expected.initialized && !expected.locked {
                prop_assert_eq!(bank.modes[gpio], expected.mode);
                if expected.mode == Some(PinMode::Output) {
                    prop_assert_eq!(Some(Level::from_bool(bank.levels[gpio])), expected.state);
                }
            } else {
                prop_assert_eq!(bank.modes[gpio], None);
            }
        }

        for (pin, expected) in PinIndex::all().zip(before) {
            let after = rebooted.snapshot(pin);
            prop_assert_eq!(after.initialized, expected.initialized);
            prop_assert_eq!(after.locked, expected.locked);
            prop_assert_eq!(after.mode, expected.mode);
            if expected.mode == Some(PinMode::Output) {
                prop_assert_eq!(after.state, expected.state);
            }
        }
    }

    #[test]
    fn prop_lock_list_decides_restore(
        modes in prop::collection::vec(prop::option::of(mode_strategy()), PIN_COUNT),
        stored_locks in any::<u16>(),
        wanted_locks in any::<u16>(),
    ) {
        let mut pins = boot(blank_region());
        for (pin, mode) in PinIndex::all().zip(&modes) {
            if let Some(mode) = mode {
                pins.initialize(pin, *mode).unwrap();
            }
            if stored_locks & (1 << pin.get()) != 0 {
                pins.lock(pin).unwrap();
            }
        }

        let locked: Vec<PinIndex> = PinIndex::all()
            .filter(|p| wanted_locks & (1 << p.get()) != 0)
            .collect();
        let (_, store) = pins.into_parts();
        let mut rebooted = PinManager::new(
            Bank::default(),
            PinStore::new(store.into_media(), true),
            PinMap::default(),
        );
        rebooted.boot_with_locks(&locked);

        for (pin, mode) in PinIndex::all().zip(&modes) {
            let wanted = locked.contains(&pin);
            prop_assert_eq!(rebooted.is_locked(pin), wanted);
            let expected = if wanted { None } else { *mode };
            prop_assert_eq!(rebooted.gpio().modes[pin.as_usize()], expected);
        }
    }

    #[test]
    fn prop_locked_pin_rejects_mutation(
        n in 0..PIN_COUNT as u8,
        setup in prop::option::of(mode_strategy()),
        mode in mode_strategy(),
        high in any::<bool>(),
    ) {
        let pin = PinIndex::new(n).unwrap();
        let mut pins = boot(blank_region());
        if let Some(m) = setup {
            pins.initialize(pin, m).unwrap();
        }
        pins.lock(pin).unwrap();
        let before = pins.snapshot(pin);

        let set = pins.set_state(pin, Level::from_bool(high));
        let init = pins.initialize(pin, mode);
        prop_assert_eq!(set.unwrap_err().kind(), ErrorKind::Precondition);
        prop_assert_eq!(init.unwrap_err().kind(), ErrorKind::Precondition);
        prop_assert_eq!(pins.unset_initialization(pin), Err(PinError::Locked));
        prop_assert_eq!(pins.snapshot(pin), before);
    }

    #[test]
    fn prop_second_initialize_rejected(
        n in 0..PIN_COUNT as u8,
        first in mode_strategy(),
        second in mode_strategy(),
    ) {
        let pin = PinIndex::new(n).unwrap();
        let mut pins = boot(blank_region());
        pins.initialize(pin, first).unwrap();

        prop_assert_eq!(pins.initialize(pin, second), Err(PinError::AlreadyInitialized));
        prop_assert_eq!(pins.snapshot(pin).mode, Some(first));
    }

    #[test]
    fn prop_pin_tokens(n in 0u8..100, labelled in any::<bool>()) {
        let token = if labelled { format!("d{}", n) } else { n.to_string() };
        let parsed = PinIndex::parse_token(&token);
        if (n as usize) < PIN_COUNT {
            prop_assert_eq!(parsed.map(PinIndex::get), Ok(n));
        } else {
            prop_assert_eq!(parsed, Err(PinError::OutOfRange));
        }
    }

    #[test]
    fn prop_garbage_tokens_rejected(token in "[a-ce-z]{1,3}|[0-9]{3,5}|d|") {
        prop_assert!(PinIndex::parse_token(&token).is_err());
    }

    #[test]
    fn prop_bad_magic_resets(seed in prop::array::uniform32(any::<u8>()), first in any::<u8>()) {
        prop_assume!(first != MAGIC[0]);
        let mut region = blank_region();
        for (i, byte) in region.bytes.iter_mut().enumerate() {
            *byte = seed[i % seed.len()];
        }
        region.bytes[0] = first;

        let mut pins = PinManager::new(Bank::default(), PinStore::new(region, true), PinMap::default());
        prop_assert_eq!(pins.boot(), BootOutcome::Fresh);

        let (bank, store) = pins.into_parts();
        let region = store.into_media();
        prop_assert_eq!(&region.bytes[..MAGIC.len()], &MAGIC[..]);
        prop_assert!(region.bytes[MAGIC.len()..].iter().all(|&b| b == 0));
        prop_assert!(bank.modes.iter().all(Option::is_none));
    }
}
