//! Printer status indicator
//!
//! The Blue Pill LED on PC13 sinks current, so the pin is driven low to
//! light it.

use tspectrum_hal::OutputPin;

/// Active-low status LED
pub struct StatusLed<P> {
    pin: P,
}

impl<P: OutputPin> StatusLed<P> {
    /// Take the pin and switch the LED off
    pub fn new(mut pin: P) -> Self {
        pin.set_high();
        Self { pin }
    }

    /// Switch the LED on or off
    pub fn set(&mut self, on: bool) {
        self.pin.set_state(!on);
    }

    /// Check if the LED is lit
    pub fn is_on(&self) -> bool {
        self.pin.is_set_low()
    }

    /// Get access to the underlying pin
    pub fn pin(&self) -> &P {
        &self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPin {
        high: bool,
        writes: u32,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
            self.writes += 1;
        }

        fn set_low(&mut self) {
            self.high = false;
            self.writes += 1;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_starts_off() {
        let led = StatusLed::new(MockPin {
            high: false,
            writes: 0,
        });
        assert!(!led.is_on());
        assert!(led.pin().high);
    }

    #[test]
    fn test_active_low() {
        let mut led = StatusLed::new(MockPin {
            high: false,
            writes: 0,
        });

        led.set(true);
        assert!(led.is_on());
        assert!(!led.pin().high);

        led.set(false);
        assert!(!led.is_on());
        assert!(led.pin().high);
        assert_eq!(led.pin().writes, 3);
    }
}
