//! Thermal Spectrum Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that are implemented
//! by chip-specific HALs (STM32F1) and by test mocks. Core logic and the
//! collaborator drivers only ever see these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  tspectrum-firmware / tspectrum-drivers  │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  tspectrum-hal (this crate - traits)     │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//!           ┌──────────────────┐
//!           │ tspectrum-hal-   │
//!           │    stm32f1       │
//!           └──────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`uart::UartTx`] - Serial transmit towards the thermal printer
//! - [`adc::AdcCalibration`], [`adc::AdcConversion`] - Analog front-end calibration and sampling

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use adc::{AdcCalibration, AdcConversion};
pub use gpio::{InputPin, OutputPin};
pub use uart::UartTx;
