//! Legacy printer line capture
//!
//! The ZX Printer prints 256 dots per row, one dot per write strobe, left
//! to right. Each strobe latches the data line level as one dot; after 256
//! dots the row is complete. The row is centred on the 384-dot thermal head
//! and published through the handoff.
//!
//! The bus goes quiet between rows. A row that has started but sees no
//! strobe for [`IDLE_TICKS_RESYNC`] capture ticks is discarded, so a glitch
//! cannot shift every following row.

use tspectrum_core::handoff::{HandoffError, LineSink};
use tspectrum_core::line::{Line, LINE_DOTS};

/// Dots per legacy printer row
pub const ZX_DOTS: usize = 256;

/// White dots left of the centred row
pub const LEFT_MARGIN_DOTS: usize = (LINE_DOTS - ZX_DOTS) / 2;

/// Quiet capture ticks before a partial row is discarded
pub const IDLE_TICKS_RESYNC: u8 = 5;

/// Capture counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureStats {
    /// Rows handed to the sink
    pub lines_published: u32,
    /// Rows the sink refused
    pub lines_lost: u32,
    /// Partial rows discarded on idle
    pub resyncs: u32,
}

/// Outcome of a strobe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StrobeOutcome {
    /// Dot latched, row still incomplete
    Latched,
    /// Row completed and published; carries the produced counter
    Published(u32),
    /// Row completed but the sink refused it
    Lost(HandoffError),
}

/// Strobe-clocked row assembler feeding a handoff producer
pub struct LineCapture<S> {
    sink: S,
    row: Line,
    dot: usize,
    idle_ticks: u8,
    stats: CaptureStats,
}

impl<S: LineSink> LineCapture<S> {
    /// Bind the capture to the producer side of a handoff
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            row: Line::blank(),
            dot: 0,
            idle_ticks: 0,
            stats: CaptureStats::default(),
        }
    }

    /// Strobe edge handler
    ///
    /// `black` is the data line level latched by the edge.
    pub fn on_strobe(&mut self, black: bool) -> StrobeOutcome {
        self.idle_ticks = 0;
        self.row.set_dot(LEFT_MARGIN_DOTS + self.dot, black);
        self.dot += 1;

        if self.dot < ZX_DOTS {
            return StrobeOutcome::Latched;
        }

        let outcome = match self.sink.publish(&self.row) {
            Ok(produced) => {
                self.stats.lines_published = self.stats.lines_published.wrapping_add(1);
                StrobeOutcome::Published(produced)
            }
            Err(e) => {
                self.stats.lines_lost = self.stats.lines_lost.wrapping_add(1);
                StrobeOutcome::Lost(e)
            }
        };
        self.start_row();
        outcome
    }

    /// Capture tick handler
    ///
    /// Returns `true` when a partial row was discarded.
    pub fn on_tick(&mut self) -> bool {
        if self.dot == 0 {
            return false;
        }

        self.idle_ticks = self.idle_ticks.saturating_add(1);
        if self.idle_ticks < IDLE_TICKS_RESYNC {
            return false;
        }

        self.stats.resyncs = self.stats.resyncs.wrapping_add(1);
        self.start_row();
        true
    }

    /// Dots latched into the current row
    pub fn dots_in_row(&self) -> usize {
        self.dot
    }

    /// Counters since creation
    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// The bound sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn start_row(&mut self) {
        self.row.clear();
        self.dot = 0;
        self.idle_ticks = 0;
    }
}
