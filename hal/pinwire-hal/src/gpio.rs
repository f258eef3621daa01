//! GPIO pin abstractions
//!
//! Two shapes of pin access are needed:
//!
//! - [`GpioBank`]: the remotely controlled pins. Their direction is only
//!   known at runtime, so they are addressed by [`PhysicalPin`] and
//!   reconfigured on demand.
//! - [`OutputPin`]: a single fixed output such as the status indicator.

/// Hardware identifier of a pin (the chip's GPIO number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhysicalPin(pub u8);

impl PhysicalPin {
    /// GPIO number
    pub fn number(self) -> u8 {
        self.0
    }
}

/// Direction and bias of a runtime-configurable pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating input
    Input,
    /// Input with the internal pull-up enabled
    InputPullUp,
    /// Push-pull output
    Output,
}

impl PinMode {
    /// Parse a mode token as used on the wire (`input`, `output`, `input_pullup`)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "input" => Some(PinMode::Input),
            "output" => Some(PinMode::Output),
            "input_pullup" => Some(PinMode::InputPullUp),
            _ => None,
        }
    }

    /// Wire token for this mode
    pub fn as_str(self) -> &'static str {
        match self {
            PinMode::Input => "input",
            PinMode::InputPullUp => "input_pullup",
            PinMode::Output => "output",
        }
    }

    /// True for [`PinMode::Output`]
    pub fn is_output(self) -> bool {
        matches!(self, PinMode::Output)
    }

    /// True when the internal pull-up is requested
    pub fn pull_up(self) -> bool {
        matches!(self, PinMode::InputPullUp)
    }
}

/// Errors from GPIO bank operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// The bank has no pin with this physical id
    UnknownPin(PhysicalPin),
    /// The pin exists but the driver rejected the operation
    Hardware,
}

/// A set of digital pins whose direction is chosen at runtime
///
/// Implementations own the underlying pin drivers. Writing a pin that is
/// currently configured as input is implementation-defined but must not
/// fail silently in a way that corrupts the configured direction.
pub trait GpioBank {
    /// Configure direction and pull-up of a pin
    fn configure(&mut self, pin: PhysicalPin, mode: PinMode) -> Result<(), GpioError>;

    /// Drive an output pin
    fn write(&mut self, pin: PhysicalPin, high: bool) -> Result<(), GpioError>;

    /// Read the live level of a pin
    fn read(&mut self, pin: PhysicalPin) -> Result<bool, GpioError>;
}

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self) {
        if self.is_set_high() {
            self.set_low();
        } else {
            self.set_high();
        }
    }

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_mode_tokens() {
        assert_eq!(PinMode::from_token("input"), Some(PinMode::Input));
        assert_eq!(PinMode::from_token("output"), Some(PinMode::Output));
        assert_eq!(PinMode::from_token("input_pullup"), Some(PinMode::InputPullUp));
        assert_eq!(PinMode::from_token("Output"), None);
        assert_eq!(PinMode::from_token("bogus"), None);
        assert_eq!(PinMode::from_token(""), None);

        for mode in [PinMode::Input, PinMode::InputPullUp, PinMode::Output] {
            assert_eq!(PinMode::from_token(mode.as_str()), Some(mode));
        }
    }

    #[test]
    fn test_mode_flags() {
        assert!(PinMode::Output.is_output());
        assert!(!PinMode::Output.pull_up());
        assert!(PinMode::InputPullUp.pull_up());
        assert!(!PinMode::Input.pull_up());
        assert!(!PinMode::Input.is_output());
    }

    #[test]
    fn test_default_toggle() {
        let mut pin = MockPin { high: false };
        pin.toggle();
        assert!(pin.is_set_high());
        pin.toggle();
        assert!(!pin.is_set_high());

        pin.set_state(true);
        assert!(pin.is_set_high());
    }
}
