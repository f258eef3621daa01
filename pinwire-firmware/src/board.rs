//! ESP32-C6 DevKitC pinout
//!
//! | Use              | GPIO                                          |
//! |------------------|-----------------------------------------------|
//! | Remote pins      | 0-7, 10, 11, 18-23 (see `[pins] map`)         |
//! | Status LED       | 15 (active low)                               |
//! | Serial TX / RX   | 16 / 17 on UART1                              |
//!
//! GPIO 8 drives the on-board RGB LED, 9 is the boot strap and 12/13
//! carry USB, so none of them are handed out.

use defmt::warn;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::peripherals::{Peripherals, GPIO16, GPIO17, TIMG0, UART1, WIFI};
use esp_hal::uart::{ConfigError, Uart};
use esp_storage::FlashStorage;
use pinwire_hal::uart::UartConfig;
use pinwire_hal_esp32::uart::esp_config;
use pinwire_hal_esp32::{EspGpioBank, SerialPort, StatusLed};

/// Hand each listed pin to the bank, warning about any it rejects
macro_rules! bank_pins {
    ($bank:expr, $($pin:expr),+ $(,)?) => {
        $(
            if let Err(e) = $bank.insert($pin) {
                warn!("GPIO bank rejected pin: {}", e);
            }
        )+
    };
}

/// Serial passthrough peripherals, opened once the baud rate is known
pub struct SerialPins {
    uart: UART1<'static>,
    tx: GPIO16<'static>,
    rx: GPIO17<'static>,
}

impl SerialPins {
    pub fn open(self, config: &UartConfig) -> Result<SerialPort, ConfigError> {
        let uart = Uart::new(self.uart, esp_config(config))?
            .with_tx(self.tx)
            .with_rx(self.rx);
        Ok(SerialPort::new(uart))
    }
}

/// Peripherals split by purpose
pub struct Board {
    pub gpio: EspGpioBank,
    pub led: StatusLed,
    pub serial: SerialPins,
    pub flash: FlashStorage<'static>,
    pub wifi: WIFI<'static>,
    pub timg0: TIMG0<'static>,
}

impl Board {
    pub fn split(p: Peripherals) -> Self {
        let mut gpio = EspGpioBank::new();
        bank_pins!(
            gpio, p.GPIO0, p.GPIO1, p.GPIO2, p.GPIO3, p.GPIO4, p.GPIO5, p.GPIO6, p.GPIO7,
            p.GPIO10, p.GPIO11, p.GPIO18, p.GPIO19, p.GPIO20, p.GPIO21, p.GPIO22, p.GPIO23,
        );

        // Lit until the first client wait starts blinking it
        let led = StatusLed::new(Output::new(p.GPIO15, Level::Low, OutputConfig::default()));

        Self {
            gpio,
            led,
            serial: SerialPins {
                uart: p.UART1,
                tx: p.GPIO16,
                rx: p.GPIO17,
            },
            flash: FlashStorage::new(p.FLASH),
            wifi: p.WIFI,
            timg0: p.TIMG0,
        }
    }
}
