//! Peripheral bring-up sequencing
//!
//! Bring-up runs once, before any interrupt source is armed. [`BringUp`]
//! tracks the ordered steps and refuses anything out of order, so the
//! firmware cannot arm interrupts against a half-configured peripheral.
//! ADC calibration is a bounded poll instead of an unbounded busy-wait; the
//! caller decides what a timeout means.

use tspectrum_hal::AdcCalibration;

/// Calibration poll budget
///
/// An STM32F1 ADC calibrates in well under 100 ADC clocks; this is orders of
/// magnitude more than a healthy converter needs.
pub const CALIBRATION_POLL_LIMIT: u32 = 100_000;

/// Bring-up steps, in the only order they may complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Core, bus and ADC clocks
    Clocks,
    /// Pin modes for every peripheral
    Pins,
    /// Printer serial link
    Serial,
    /// ADC power-on, settle, calibrate, power-off
    AnalogCalibration,
    /// Sense and capture tick sources
    Timers,
    /// Rising-edge interrupt on the legacy strobe line
    StrobeEdge,
    /// Interrupt sources enabled
    Interrupts,
}

const ORDER: [Step; 7] = [
    Step::Clocks,
    Step::Pins,
    Step::Serial,
    Step::AnalogCalibration,
    Step::Timers,
    Step::StrobeEdge,
    Step::Interrupts,
];

/// Bring-up errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BringUpError {
    /// A step was completed out of order
    OutOfOrder { expected: Step, got: Step },
    /// Every step has already completed
    AlreadyComplete,
    /// The calibration step must go through [`BringUp::calibrate`]
    CalibrationRequired,
    /// Calibration did not finish within the poll budget
    CalibrationTimeout { polls: u32 },
}

/// Bring-up progress tracker
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BringUp {
    next: usize,
    calibrated: bool,
    calibration_polls: u32,
}

impl BringUp {
    /// Start a fresh sequence
    pub const fn new() -> Self {
        Self {
            next: 0,
            calibrated: false,
            calibration_polls: 0,
        }
    }

    /// Next step that may complete, `None` once finished
    pub fn expected(&self) -> Option<Step> {
        ORDER.get(self.next).copied()
    }

    /// Mark a step complete
    pub fn complete(&mut self, step: Step) -> Result<(), BringUpError> {
        let expected = self.expected().ok_or(BringUpError::AlreadyComplete)?;
        if step != expected {
            return Err(BringUpError::OutOfOrder { expected, got: step });
        }
        if step == Step::AnalogCalibration || (step == Step::Interrupts && !self.calibrated) {
            return Err(BringUpError::CalibrationRequired);
        }
        self.next += 1;
        Ok(())
    }

    /// Run the ADC calibration step
    ///
    /// Powers the converter on, waits `settle_cycles`, starts calibration and
    /// polls for completion at most `poll_limit` times. The converter is
    /// powered off again whatever the outcome. Returns the number of polls
    /// calibration took.
    pub fn calibrate<A: AdcCalibration>(
        &mut self,
        adc: &mut A,
        settle_cycles: u32,
        poll_limit: u32,
    ) -> Result<u32, BringUpError> {
        let expected = self.expected().ok_or(BringUpError::AlreadyComplete)?;
        if expected != Step::AnalogCalibration {
            return Err(BringUpError::OutOfOrder {
                expected,
                got: Step::AnalogCalibration,
            });
        }

        adc.power_on();
        adc.delay_cycles(settle_cycles);
        adc.start_calibration();

        let mut polls = 0;
        let done = loop {
            if adc.calibration_done() {
                break true;
            }
            if polls >= poll_limit {
                break false;
            }
            polls += 1;
        };

        adc.power_off();

        if !done {
            return Err(BringUpError::CalibrationTimeout { polls });
        }

        self.calibrated = true;
        self.calibration_polls = polls;
        self.next += 1;
        Ok(polls)
    }

    /// Check if calibration has completed
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Polls the successful calibration took
    pub fn calibration_polls(&self) -> u32 {
        self.calibration_polls
    }

    /// Check if interrupt sources have been enabled
    pub fn interrupts_armed(&self) -> bool {
        self.next >= ORDER.len()
    }

    /// Check if every step has completed
    pub fn is_complete(&self) -> bool {
        self.expected().is_none()
    }
}
