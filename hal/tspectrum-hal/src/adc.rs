//! Analog front-end abstractions
//!
//! The ADC is calibrated once during bring-up and then powered down. Each
//! sense sample powers it up, converts once and powers it down again.

/// One-shot ADC calibration
///
/// Implementations drive the chip's calibration sequence. The caller owns
/// the polling policy, so none of these methods may block.
pub trait AdcCalibration {
    /// Power the converter on
    fn power_on(&mut self);

    /// Power the converter off
    fn power_off(&mut self);

    /// Busy-wait for `cycles` core clock cycles
    ///
    /// Used for the settle time after power-on.
    fn delay_cycles(&mut self, cycles: u32);

    /// Start the calibration sequence
    fn start_calibration(&mut self);

    /// Check whether the calibration sequence has completed
    fn calibration_done(&mut self) -> bool;
}

/// Single regular conversion on a powered converter
///
/// Like calibration, completion is polled by the caller.
pub trait AdcConversion: AdcCalibration {
    /// Start converting the selected channel
    fn start_conversion(&mut self);

    /// Check whether the conversion has completed
    fn conversion_done(&mut self) -> bool;

    /// Read the converted value
    fn data(&mut self) -> u16;
}
