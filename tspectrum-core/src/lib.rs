//! Board-agnostic core logic for the Thermal Spectrum firmware
//!
//! This crate contains all logic that does not depend on a specific chip:
//!
//! - Raster line type shared by capture and print
//! - Line handoff between the capture producer and the print consumer
//! - The Arbiter state machine that drains published lines
//! - Peripheral bring-up sequencing and bounded ADC calibration
//! - Device configuration constants and clock derivations
//!
//! # Handoff
//!
//! ```text
//!  strobe / tick (interrupt priority)          foreground (thread mode)
//! ┌───────────────────┐   publish   ┌───────┐  front/advance  ┌─────────┐
//! │ capture collab.   │ ──────────▶ │ slots │ ──────────────▶ │ Arbiter │──▶ printer
//! └───────────────────┘  produced++ └───────┘   consumed++    └─────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod arbiter;
pub mod bringup;
pub mod config;
pub mod handoff;
pub mod line;

pub use arbiter::{Arbiter, ArbiterError, ArbiterState, LinePrinter, WakeSource};
pub use handoff::{HandoffError, LineConsumer, LineProducer, LineQueue, LineSink, LineSource};
pub use line::{Line, LINE_WIDTH};
