//! Thermal printer collaborator

pub mod raster;
pub mod readiness;
pub mod sense;
pub mod serial;
pub mod status;

pub use raster::{raster_row, RASTER_ROW_LEN, RESET};
pub use readiness::ReadinessMonitor;
pub use sense::{SenseChannel, SenseError};
pub use serial::{PrinterStats, Readiness, SerialPrinter};
pub use status::StatusLed;
