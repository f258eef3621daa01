//! GPIO bank for ESP32
//!
//! Every remotely controllable pin is held as a [`Flex`] so its direction
//! can be changed at runtime. Pins are keyed by their GPIO number.

use esp_hal::gpio::{Flex, InputConfig, Level, Pin, Pull};
use pinwire_hal::{GpioBank, GpioError, PhysicalPin, PinMode};

/// Highest GPIO number + 1 across the supported chips
pub const GPIO_SLOTS: usize = 49;

/// Runtime-configurable bank of ESP32 pins
pub struct EspGpioBank {
    pins: [Option<Flex<'static>>; GPIO_SLOTS],
}

impl Default for EspGpioBank {
    fn default() -> Self {
        Self::new()
    }
}

impl EspGpioBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self {
            pins: [const { None }; GPIO_SLOTS],
        }
    }

    /// Hand a pin to the bank
    ///
    /// The pin starts as a floating input with its output driver off.
    pub fn insert(&mut self, pin: impl Pin + 'static) -> Result<(), GpioError> {
        let number = pin.number();
        let slot = self
            .pins
            .get_mut(number as usize)
            .ok_or(GpioError::UnknownPin(PhysicalPin(number)))?;

        let mut flex = Flex::new(pin);
        flex.set_output_enable(false);
        flex.set_input_enable(true);
        *slot = Some(flex);
        Ok(())
    }

    fn flex(&mut self, pin: PhysicalPin) -> Result<&mut Flex<'static>, GpioError> {
        self.pins
            .get_mut(pin.number() as usize)
            .and_then(Option::as_mut)
            .ok_or(GpioError::UnknownPin(pin))
    }
}

impl GpioBank for EspGpioBank {
    fn configure(&mut self, pin: PhysicalPin, mode: PinMode) -> Result<(), GpioError> {
        let flex = self.flex(pin)?;
        match mode {
            PinMode::Output => {
                flex.set_input_enable(false);
                flex.set_output_enable(true);
            }
            PinMode::Input | PinMode::InputPullUp => {
                let pull = if mode.pull_up() { Pull::Up } else { Pull::None };
                flex.set_output_enable(false);
                flex.apply_input_config(&InputConfig::default().with_pull(pull));
                flex.set_input_enable(true);
            }
        }
        Ok(())
    }

    fn write(&mut self, pin: PhysicalPin, high: bool) -> Result<(), GpioError> {
        self.flex(pin)?.set_level(Level::from(high));
        Ok(())
    }

    fn read(&mut self, pin: PhysicalPin) -> Result<bool, GpioError> {
        Ok(self.flex(pin)?.is_high())
    }
}
