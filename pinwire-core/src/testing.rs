//! Test doubles shared by the unit tests

use core::convert::Infallible;

use heapless::Vec;
use pinwire_hal::nvm::check_range;
use pinwire_hal::{GpioBank, GpioError, NvMemory, NvmError, OutputPin, PhysicalPin, PinMode, Transport};
use pinwire_hal::{UartRx, UartTx};

use crate::store::{MAGIC, REGION_LEN};

/// RAM-backed non-volatile region with failure injection
pub struct MemRegion {
    pub bytes: [u8; REGION_LEN],
    pub capacity: usize,
    pub commits: u32,
    pub fail_read: bool,
    pub fail_commit: bool,
}

impl MemRegion {
    pub fn filled(value: u8) -> Self {
        Self {
            bytes: [value; REGION_LEN],
            capacity: REGION_LEN,
            commits: 0,
            fail_read: false,
            fail_commit: false,
        }
    }

    /// Valid magic, all flags clear
    pub fn formatted() -> Self {
        let mut region = Self::filled(0);
        region.bytes[..MAGIC.len()].copy_from_slice(&MAGIC);
        region
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut region = Self::filled(0);
        region.capacity = capacity;
        region
    }
}

impl NvMemory for MemRegion {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), NvmError> {
        if self.fail_read {
            return Err(NvmError::Unavailable);
        }
        check_range(offset, buf.len(), self.capacity)?;
        buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), NvmError> {
        check_range(offset, data.len(), self.capacity)?;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), NvmError> {
        if self.fail_commit {
            return Err(NvmError::Commit);
        }
        self.commits += 1;
        Ok(())
    }
}

#[derive(Clone, Copy, Default)]
struct MockGpio {
    mode: Option<PinMode>,
    level: bool,
}

/// GPIO bank with 32 pins and failure injection
pub struct MockBank {
    pins: [MockGpio; 32],
    pub fail: bool,
}

impl MockBank {
    pub fn new() -> Self {
        Self {
            pins: [MockGpio::default(); 32],
            fail: false,
        }
    }

    pub fn mode(&self, gpio: u8) -> Option<PinMode> {
        self.pins[gpio as usize].mode
    }

    pub fn level(&self, gpio: u8) -> bool {
        self.pins[gpio as usize].level
    }

    /// Simulate an external signal on an input
    pub fn drive_input(&mut self, gpio: u8, high: bool) {
        self.pins[gpio as usize].level = high;
    }

    fn slot(&mut self, pin: PhysicalPin) -> Result<&mut MockGpio, GpioError> {
        if self.fail {
            return Err(GpioError::Hardware);
        }
        self.pins
            .get_mut(pin.number() as usize)
            .ok_or(GpioError::UnknownPin(pin))
    }
}

impl GpioBank for MockBank {
    fn configure(&mut self, pin: PhysicalPin, mode: PinMode) -> Result<(), GpioError> {
        let slot = self.slot(pin)?;
        slot.mode = Some(mode);
        if mode == PinMode::InputPullUp {
            slot.level = true;
        }
        Ok(())
    }

    fn write(&mut self, pin: PhysicalPin, high: bool) -> Result<(), GpioError> {
        self.slot(pin)?.level = high;
        Ok(())
    }

    fn read(&mut self, pin: PhysicalPin) -> Result<bool, GpioError> {
        Ok(self.slot(pin)?.level)
    }
}

/// Serial channel with a canned inbound queue
pub struct MockSerial {
    pub rx: Vec<u8, 256>,
    pub tx: Vec<u8, 256>,
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            rx: Vec::new(),
            tx: Vec::new(),
        }
    }
}

impl UartTx for MockSerial {
    type Error = ();

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx.extend_from_slice(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl UartRx for MockSerial {
    type Error = ();

    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.rx.len());
        buf[..n].copy_from_slice(&self.rx[..n]);
        let rest: Vec<u8, 256> = Vec::from_slice(&self.rx[n..])?;
        self.rx = rest;
        Ok(n)
    }
}

/// Status indicator that counts toggles
pub struct MockIndicator {
    pub on: bool,
    pub toggles: u32,
}

impl MockIndicator {
    pub fn new() -> Self {
        Self {
            on: true,
            toggles: 0,
        }
    }
}

impl OutputPin for MockIndicator {
    fn set_high(&mut self) {
        self.on = true;
    }

    fn set_low(&mut self) {
        self.on = false;
    }

    fn toggle(&mut self) {
        self.toggles += 1;
        self.on = !self.on;
    }

    fn is_set_high(&self) -> bool {
        self.on
    }
}

/// Connection with a canned request, delivered in fixed-size chunks
pub struct MockTransport {
    pub inbound: Vec<u8, 1024>,
    pub cursor: usize,
    pub chunk: usize,
    pub outbound: Vec<u8, 2048>,
    /// Ticks to report before data "arrives"; `None` means the client never talks
    pub ticks_until_data: Option<u32>,
}

impl MockTransport {
    pub fn new(request: &[u8]) -> Self {
        let mut inbound = Vec::new();
        let _ = inbound.extend_from_slice(request);
        Self {
            inbound,
            cursor: 0,
            chunk: 16,
            outbound: Vec::new(),
            ticks_until_data: Some(0),
        }
    }

    pub fn silent() -> Self {
        let mut transport = Self::new(b"");
        transport.ticks_until_data = None;
        transport
    }

    pub fn response(&self) -> &str {
        core::str::from_utf8(&self.outbound).unwrap_or("")
    }
}

impl Transport for MockTransport {
    type Error = Infallible;

    async fn wait_readable(
        &mut self,
        timeout_ms: u32,
        tick_ms: u32,
        on_tick: &mut dyn FnMut(u32),
    ) -> Result<bool, Self::Error> {
        let max_ticks = timeout_ms / tick_ms.max(1);
        let ticks = match self.ticks_until_data {
            Some(ticks) if ticks < max_ticks => ticks,
            _ => {
                for tick in 0..max_ticks {
                    on_tick(tick);
                }
                return Ok(false);
            }
        };
        for tick in 0..ticks {
            on_tick(tick);
        }
        Ok(true)
    }

    fn available(&self) -> usize {
        self.inbound.len() - self.cursor
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.chunk).min(self.available());
        buf[..n].copy_from_slice(&self.inbound[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let _ = self.outbound.extend_from_slice(data);
        Ok(())
    }
}
