//! Line handoff between the capture producer and the print consumer
//!
//! The producer runs at interrupt priority and the consumer in the
//! foreground loop. Ordering contract on both implementations:
//!
//! - producer: write the slot, then increment the produced counter
//! - consumer: read the produced counter, read the slot, transmit, then
//!   increment the consumed counter
//!
//! [`LineQueue`] is the bounded multi-slot handoff used by the firmware.
//! [`SlotHandoff`] is the single shared buffer with bare counters; a second
//! publish before the drain overwrites the unread line.

pub mod queue;
pub mod slot;

pub use queue::{LineConsumer, LineProducer, LineQueue, DEFAULT_CAPACITY};
pub use slot::SlotHandoff;

use crate::line::Line;

/// Handoff errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandoffError {
    /// Every slot holds an undrained line; the publish was refused
    Full,
    /// Nothing to advance past
    Empty,
}

/// Producer side of a handoff
pub trait LineSink {
    /// Publish a completed line
    ///
    /// Returns the produced counter after publication.
    fn publish(&mut self, line: &Line) -> Result<u32, HandoffError>;
}

/// Consumer side of a handoff
pub trait LineSource {
    /// Oldest published line that has not been drained yet
    fn front(&self) -> Option<&Line>;

    /// Mark the line returned by [`front`](Self::front) as drained
    ///
    /// Returns the consumed counter after the advance.
    fn advance(&mut self) -> Result<u32, HandoffError>;

    /// Lines published so far (`line_count_in`)
    fn produced(&self) -> u32;

    /// Lines drained so far (`line_count_out`)
    fn consumed(&self) -> u32;

    /// Published lines not yet drained
    fn pending(&self) -> u32 {
        self.produced().wrapping_sub(self.consumed())
    }

    /// Check if a published line is waiting
    fn has_pending(&self) -> bool {
        self.pending() > 0
    }
}
