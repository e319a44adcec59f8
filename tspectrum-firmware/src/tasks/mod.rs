//! Embassy async tasks
//!
//! The strobe edge is handled directly in its EXTI interrupt (see
//! [`capture::on_strobe`]). `capture_tick_task` and `sense_task` run on the
//! interrupt executor and stand in for the two timer interrupts.
//! `arbiter_task` runs in thread mode and owns the printer.

pub mod arbiter;
pub mod capture;
pub mod sense;

pub use arbiter::arbiter_task;
pub use capture::capture_tick_task;
pub use sense::sense_task;

use tspectrum_core::handoff::{LineConsumer, LineProducer, DEFAULT_CAPACITY};

/// Slots in the line handoff
pub const HANDOFF_CAPACITY: usize = DEFAULT_CAPACITY;

/// Capture side of the firmware's handoff
pub type Producer = LineProducer<'static, HANDOFF_CAPACITY>;

/// Arbiter side of the firmware's handoff
pub type Consumer = LineConsumer<'static, HANDOFF_CAPACITY>;
