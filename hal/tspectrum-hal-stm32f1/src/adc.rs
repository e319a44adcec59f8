//! ADC1 driver for STM32F1
//!
//! Register-level access to ADC1 for the printer sense input. Calibration
//! and conversion completion are polled by the caller. The ADC clock
//! prescaler is set by the RCC configuration.

use embassy_stm32::pac;
use embassy_stm32::pac::adc::vals::SampleTime;
use tspectrum_hal::{AdcCalibration, AdcConversion};

/// Single-channel ADC1 sampler
pub struct SenseAdc {
    channel: u8,
}

impl SenseAdc {
    /// Clock ADC1 and select `channel` as the only regular conversion
    pub fn new(channel: u8) -> Self {
        pac::RCC.apb2enr().modify(|w| w.set_adc1en(true));

        let adc = pac::ADC1;
        adc.cr2().modify(|w| w.set_adon(false));
        adc.sqr1().modify(|w| w.set_l(0));
        adc.sqr3().modify(|w| w.set_sq(0, channel));
        if channel < 10 {
            adc.smpr2()
                .modify(|w| w.set_smp(channel as usize, SampleTime::CYCLES239_5));
        } else {
            adc.smpr1()
                .modify(|w| w.set_smp(channel as usize - 10, SampleTime::CYCLES239_5));
        }

        Self { channel }
    }

    /// Selected input channel
    pub fn channel(&self) -> u8 {
        self.channel
    }
}

impl AdcCalibration for SenseAdc {
    fn power_on(&mut self) {
        pac::ADC1.cr2().modify(|w| w.set_adon(true));
    }

    fn power_off(&mut self) {
        pac::ADC1.cr2().modify(|w| w.set_adon(false));
    }

    fn delay_cycles(&mut self, cycles: u32) {
        cortex_m::asm::delay(cycles);
    }

    fn start_calibration(&mut self) {
        pac::ADC1.cr2().modify(|w| w.set_cal(true));
    }

    fn calibration_done(&mut self) -> bool {
        !pac::ADC1.cr2().read().cal()
    }
}

impl AdcConversion for SenseAdc {
    fn start_conversion(&mut self) {
        // Writing ADON while already on starts a regular conversion
        pac::ADC1.cr2().modify(|w| w.set_adon(true));
    }

    fn conversion_done(&mut self) -> bool {
        pac::ADC1.sr().read().eoc()
    }

    fn data(&mut self) -> u16 {
        // Reading DR clears EOC
        pac::ADC1.dr().read().data()
    }
}
