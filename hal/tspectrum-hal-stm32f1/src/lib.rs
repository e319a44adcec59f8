//! STM32F1-specific HAL for the Thermal Spectrum firmware
//!
//! This crate provides STM32F1 implementations of the `tspectrum-hal` traits
//! on top of embassy-stm32:
//!
//! - STM32F103C8 (Blue Pill)
//!
//! # Features
//!
//! - `stm32f103c8` - Enable support for STM32F103C8T6
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! The firmware creates peripherals with embassy-stm32 and wraps them in the
//! adapters here so the board-agnostic crates can drive them. The ADC and
//! the strobe EXTI line are driven at register level: bring-up needs a
//! bounded calibration, and the strobe edge must stay armed for the whole
//! run.

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod exti;
pub mod gpio;
pub mod uart;

pub use adc::SenseAdc;
pub use exti::{Edge, StrobeLine};
pub use gpio::{PinInput, PinOutput};
pub use uart::{usart_config, BlockingSerial, UartBusError};
