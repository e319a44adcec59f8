//! GPIO adapters for STM32F1

use embassy_stm32::gpio::{Input, Output};

/// Push-pull or open-drain output
pub struct PinOutput<'d> {
    pin: Output<'d>,
}

impl<'d> PinOutput<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl tspectrum_hal::OutputPin for PinOutput<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Digital input
pub struct PinInput<'d> {
    pin: Input<'d>,
}

impl<'d> PinInput<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }
}

impl tspectrum_hal::InputPin for PinInput<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
