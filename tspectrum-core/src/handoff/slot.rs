//! Single shared line buffer with bare counters
//!
//! This is the zero-queue handoff: one buffer, `line_count_in` and
//! `line_count_out`. Nothing stops the producer from publishing again before
//! the consumer drains, in which case the unread line is overwritten and the
//! counters claim two lines are pending while only the last one exists.
//! Not used by the firmware.

use super::{HandoffError, LineSink, LineSource};
use crate::line::Line;

/// One buffer, two counters
#[derive(Debug, Clone, Default)]
pub struct SlotHandoff {
    buffer: Line,
    line_count_in: u32,
    line_count_out: u32,
}

impl SlotHandoff {
    /// Create an empty handoff with a zeroed buffer
    pub const fn new() -> Self {
        Self {
            buffer: Line::blank(),
            line_count_in: 0,
            line_count_out: 0,
        }
    }
}

impl LineSink for SlotHandoff {
    /// Overwrites the buffer unconditionally
    fn publish(&mut self, line: &Line) -> Result<u32, HandoffError> {
        self.buffer = *line;
        self.line_count_in = self.line_count_in.wrapping_add(1);
        Ok(self.line_count_in)
    }
}

impl LineSource for SlotHandoff {
    fn front(&self) -> Option<&Line> {
        if self.line_count_in != self.line_count_out {
            Some(&self.buffer)
        } else {
            None
        }
    }

    fn advance(&mut self) -> Result<u32, HandoffError> {
        if self.line_count_in == self.line_count_out {
            return Err(HandoffError::Empty);
        }
        self.line_count_out = self.line_count_out.wrapping_add(1);
        Ok(self.line_count_out)
    }

    fn produced(&self) -> u32 {
        self.line_count_in
    }

    fn consumed(&self) -> u32 {
        self.line_count_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_roundtrip() {
        let mut slot = SlotHandoff::new();
        slot.publish(&Line::filled(0x55)).unwrap();

        assert_eq!(slot.pending(), 1);
        assert_eq!(slot.front(), Some(&Line::filled(0x55)));
        assert_eq!(slot.advance(), Ok(1));
        assert!(slot.front().is_none());
    }

    #[test]
    fn test_second_publish_overwrites_unread_line() {
        let mut slot = SlotHandoff::new();
        slot.publish(&Line::filled(0xC1)).unwrap();
        slot.publish(&Line::filled(0xC2)).unwrap();

        // Two lines counted, one buffer
        assert_eq!(slot.pending(), 2);
        assert_eq!(slot.front(), Some(&Line::filled(0xC2)));
    }

    #[test]
    fn test_advance_on_empty() {
        let mut slot = SlotHandoff::new();
        assert_eq!(slot.advance(), Err(HandoffError::Empty));
        assert_eq!(slot.consumed(), 0);
    }
}
