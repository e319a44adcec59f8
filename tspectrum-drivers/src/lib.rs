//! Collaborator bindings
//!
//! Thin implementations of the two collaborator contracts the core relies
//! on, so the firmware is complete:
//!
//! - Legacy capture: strobe-clocked dot assembly into raster lines
//! - Thermal printer: raster row encoding, serial link, readiness sensing,
//!   status indicator

#![no_std]
#![deny(unsafe_code)]

pub mod capture;
pub mod printer;
