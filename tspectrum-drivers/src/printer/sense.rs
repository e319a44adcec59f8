//! Printer sense channel
//!
//! The converter is only powered for the duration of a sample: power on,
//! settle, convert, power off. It is never left running between sense
//! ticks.

use tspectrum_hal::AdcConversion;

/// Sense sampling errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SenseError {
    /// Conversion did not finish within the poll budget
    Timeout,
}

/// Power-cycled single-shot sampler
pub struct SenseChannel<A> {
    adc: A,
    settle_cycles: u32,
    poll_limit: u32,
}

impl<A: AdcConversion> SenseChannel<A> {
    /// Create a new sense channel
    pub fn new(adc: A, settle_cycles: u32, poll_limit: u32) -> Self {
        Self {
            adc,
            settle_cycles,
            poll_limit,
        }
    }

    /// Take one raw sample
    pub fn sample(&mut self) -> Result<u16, SenseError> {
        self.adc.power_on();
        self.adc.delay_cycles(self.settle_cycles);
        self.adc.start_conversion();

        let mut polls = 0;
        let result = loop {
            if self.adc.conversion_done() {
                break Ok(self.adc.data());
            }
            if polls >= self.poll_limit {
                break Err(SenseError::Timeout);
            }
            polls += 1;
        };

        self.adc.power_off();
        result
    }

    /// Get access to the underlying converter
    pub fn adc(&self) -> &A {
        &self.adc
    }
}
