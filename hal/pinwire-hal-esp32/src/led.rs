//! Status LED

use esp_hal::gpio::Output;
use pinwire_hal::OutputPin;

/// Active-low LED: "high" means lit
pub struct StatusLed {
    pin: Output<'static>,
}

impl StatusLed {
    pub fn new(pin: Output<'static>) -> Self {
        Self { pin }
    }
}

impl OutputPin for StatusLed {
    fn set_high(&mut self) {
        self.pin.set_low();
    }

    fn set_low(&mut self) {
        self.pin.set_high();
    }

    fn toggle(&mut self) {
        self.pin.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_low()
    }
}
