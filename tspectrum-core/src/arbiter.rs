//! Line handoff Arbiter
//!
//! The foreground state machine. It idles until something wakes it, then
//! checks the true handoff state and drains whatever was published. The
//! cause of the wake is only recorded, never trusted: an analog sample
//! interrupt may arrive while a line is waiting, and a strobe may wake us
//! before the line it belongs to is complete.
//!
//! ```text
//!            wake && produced > consumed
//!   ┌──────┐ ──────────────────────────▶ ┌──────────┐
//!   │ Idle │                             │ Draining │ print_line(front)
//!   └──────┘ ◀────────────────────────── └──────────┘
//!               consumed++ (after print)
//! ```

use crate::handoff::{HandoffError, LineSource};
use crate::line::Line;

/// What caused a wake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeSource {
    /// Rising edge on the legacy strobe line
    Strobe,
    /// Capture bit-timing tick
    CaptureTick,
    /// Printer sense-cadence tick
    PrinterTick,
    /// Analog conversion complete
    SampleReady,
}

/// Arbiter states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArbiterState {
    /// Waiting for a wake
    Idle,
    /// A line is being transmitted
    Draining,
}

/// Arbiter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArbiterError {
    /// `finish_drain` without a matching `begin_drain`
    NotDraining,
    /// The handoff refused to advance
    Handoff(HandoffError),
}

impl From<HandoffError> for ArbiterError {
    fn from(e: HandoffError) -> Self {
        ArbiterError::Handoff(e)
    }
}

/// Line transmit contract of the printer collaborator
///
/// Returns once the line has been accepted for printing. Readiness waits and
/// retries are the implementation's business.
pub trait LinePrinter {
    /// Transmit one line
    fn print_line(&mut self, line: &Line);
}

/// Arbiter counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArbiterStats {
    /// Wakes observed
    pub wakes: u32,
    /// Wakes that found nothing to drain
    pub idle_wakes: u32,
    /// Lines transmitted
    pub lines_drained: u32,
    /// Drains the handoff refused to finish
    pub drain_errors: u32,
}

/// Foreground consumer of a line handoff
pub struct Arbiter<S> {
    source: S,
    state: ArbiterState,
    stats: ArbiterStats,
}

impl<S: LineSource> Arbiter<S> {
    /// Create an idle Arbiter over the consumer side of a handoff
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: ArbiterState::Idle,
            stats: ArbiterStats::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> ArbiterState {
        self.state
    }

    /// Counters since creation
    pub fn stats(&self) -> ArbiterStats {
        self.stats
    }

    /// The underlying handoff
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Record a wake
    ///
    /// Returns whether a published line is waiting, whatever the source.
    pub fn on_wake(&mut self, _source: WakeSource) -> bool {
        self.stats.wakes = self.stats.wakes.wrapping_add(1);
        let pending = self.source.has_pending();
        if !pending {
            self.stats.idle_wakes = self.stats.idle_wakes.wrapping_add(1);
        }
        pending
    }

    /// Start draining the oldest published line
    ///
    /// Idle → Draining when `produced > consumed`. Returns the line to
    /// transmit, or `None` (staying Idle) when nothing is published. While
    /// Draining the same line is returned again.
    pub fn begin_drain(&mut self) -> Option<&Line> {
        let line = self.source.front()?;
        self.state = ArbiterState::Draining;
        Some(line)
    }

    /// Finish the line handed out by [`begin_drain`](Self::begin_drain)
    ///
    /// Advances the consumed counter and returns to Idle. Returns the new
    /// consumed count.
    pub fn finish_drain(&mut self) -> Result<u32, ArbiterError> {
        if self.state != ArbiterState::Draining {
            return Err(ArbiterError::NotDraining);
        }
        let consumed = self.source.advance()?;
        self.stats.lines_drained = self.stats.lines_drained.wrapping_add(1);
        self.state = ArbiterState::Idle;
        Ok(consumed)
    }

    /// Handle one wake synchronously
    ///
    /// Drains every published line, re-checking the counters after each
    /// transmit. Returns the number of lines printed. A drain the handoff
    /// refuses to finish stops the wake and is counted in
    /// [`ArbiterStats::drain_errors`].
    pub fn service<P: LinePrinter>(&mut self, wake: WakeSource, printer: &mut P) -> u32 {
        if !self.on_wake(wake) {
            return 0;
        }

        let mut printed = 0;
        while let Some(line) = self.begin_drain() {
            printer.print_line(line);
            if self.finish_drain().is_err() {
                self.stats.drain_errors = self.stats.drain_errors.wrapping_add(1);
                break;
            }
            printed += 1;
        }
        printed
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::handoff::{LineQueue, LineSink, SlotHandoff};
    use crate::line::LINE_WIDTH;

    /// Printer that records every transmitted line
    struct MockPrinter {
        printed: Vec<Line>,
    }

    impl MockPrinter {
        fn new() -> Self {
            Self {
                printed: Vec::new(),
            }
        }
    }

    impl LinePrinter for MockPrinter {
        fn print_line(&mut self, line: &Line) {
            self.printed.push(*line);
        }
    }

    #[test]
    fn test_zero_line_published_once() {
        let mut queue = LineQueue::<4>::new();
        let (mut producer, consumer) = queue.split();
        let mut arbiter = Arbiter::new(consumer);
        let mut printer = MockPrinter::new();

        producer.publish(&Line::from_bytes([0u8; LINE_WIDTH])).unwrap();

        let printed = arbiter.service(WakeSource::Strobe, &mut printer);
        assert_eq!(printed, 1);
        assert_eq!(printer.printed.len(), 1);
        assert_eq!(printer.printed[0].as_bytes(), &[0u8; LINE_WIDTH]);
        assert_eq!(arbiter.source().consumed(), 1);
        assert_eq!(arbiter.state(), ArbiterState::Idle);
    }

    #[test]
    fn test_single_slot_overwrite_loses_first_line() {
        let c1 = Line::filled(0xC1);
        let c2 = Line::filled(0xC2);

        let mut slot = SlotHandoff::new();
        slot.publish(&c1).unwrap();
        slot.publish(&c2).unwrap();

        let mut arbiter = Arbiter::new(slot);
        assert!(arbiter.on_wake(WakeSource::Strobe));
        let drained = *arbiter.begin_drain().unwrap();
        arbiter.finish_drain().unwrap();
        assert_eq!(drained, c2);

        // The counters still claim a line is waiting; draining it prints
        // the overwritten buffer a second time and C1 is never seen.
        let mut printer = MockPrinter::new();
        arbiter.service(WakeSource::CaptureTick, &mut printer);
        assert_eq!(printer.printed, [c2]);
        assert!(!printer.printed.contains(&c1));
    }

    #[test]
    fn test_queue_keeps_both_lines() {
        let c1 = Line::filled(0xC1);
        let c2 = Line::filled(0xC2);

        let mut queue = LineQueue::<4>::new();
        let (mut producer, consumer) = queue.split();
        producer.publish(&c1).unwrap();
        producer.publish(&c2).unwrap();

        let mut arbiter = Arbiter::new(consumer);
        let mut printer = MockPrinter::new();
        assert_eq!(arbiter.service(WakeSource::Strobe, &mut printer), 2);
        assert_eq!(printer.printed, [c1, c2]);
    }

    #[test]
    fn test_no_spurious_transmission() {
        let mut queue = LineQueue::<4>::new();
        let (_producer, consumer) = queue.split();
        let mut arbiter = Arbiter::new(consumer);
        let mut printer = MockPrinter::new();

        assert_eq!(arbiter.service(WakeSource::Strobe, &mut printer), 0);
        assert!(arbiter.begin_drain().is_none());
        assert_eq!(arbiter.state(), ArbiterState::Idle);
        assert!(printer.printed.is_empty());
    }

    #[test]
    fn test_unrelated_wake_changes_nothing() {
        let mut queue = LineQueue::<4>::new();
        let (_producer, consumer) = queue.split();
        let mut arbiter = Arbiter::new(consumer);
        let mut printer = MockPrinter::new();

        assert_eq!(arbiter.service(WakeSource::SampleReady, &mut printer), 0);
        assert!(printer.printed.is_empty());
        assert_eq!(arbiter.source().produced(), 0);
        assert_eq!(arbiter.source().consumed(), 0);

        let stats = arbiter.stats();
        assert_eq!(stats.wakes, 1);
        assert_eq!(stats.idle_wakes, 1);
        assert_eq!(stats.lines_drained, 0);
    }

    #[test]
    fn test_finish_without_begin() {
        let mut queue = LineQueue::<4>::new();
        let (mut producer, consumer) = queue.split();
        let mut arbiter = Arbiter::new(consumer);

        producer.publish(&Line::filled(1)).unwrap();
        assert_eq!(arbiter.finish_drain(), Err(ArbiterError::NotDraining));
        assert_eq!(arbiter.source().consumed(), 0);
    }

    #[test]
    fn test_draining_state_until_finished() {
        let mut queue = LineQueue::<4>::new();
        let (mut producer, consumer) = queue.split();
        let mut arbiter = Arbiter::new(consumer);

        producer.publish(&Line::filled(7)).unwrap();
        assert_eq!(arbiter.begin_drain(), Some(&Line::filled(7)));
        assert_eq!(arbiter.state(), ArbiterState::Draining);

        // Consumed counter only moves after the transmit finished
        assert_eq!(arbiter.source().consumed(), 0);
        assert_eq!(arbiter.begin_drain(), Some(&Line::filled(7)));

        assert_eq!(arbiter.finish_drain(), Ok(1));
        assert_eq!(arbiter.state(), ArbiterState::Idle);
        assert_eq!(arbiter.stats().lines_drained, 1);
    }

    /// Source that always shows a line but never lets it go
    struct StuckSource {
        line: Line,
    }

    impl LineSource for StuckSource {
        fn front(&self) -> Option<&Line> {
            Some(&self.line)
        }

        fn advance(&mut self) -> Result<u32, HandoffError> {
            Err(HandoffError::Empty)
        }

        fn produced(&self) -> u32 {
            1
        }

        fn consumed(&self) -> u32 {
            0
        }
    }

    #[test]
    fn test_refused_drain_is_counted() {
        let mut arbiter = Arbiter::new(StuckSource {
            line: Line::filled(9),
        });
        let mut printer = MockPrinter::new();

        assert_eq!(arbiter.service(WakeSource::Strobe, &mut printer), 0);
        assert_eq!(printer.printed, [Line::filled(9)]);

        let stats = arbiter.stats();
        assert_eq!(stats.drain_errors, 1);
        assert_eq!(stats.lines_drained, 0);
        assert_eq!(
            arbiter.finish_drain(),
            Err(ArbiterError::Handoff(HandoffError::Empty))
        );
    }

    #[test]
    fn test_publish_between_wakes() {
        let mut queue = LineQueue::<4>::new();
        let (mut producer, consumer) = queue.split();
        let mut arbiter = Arbiter::new(consumer);
        let mut printer = MockPrinter::new();

        for n in 1..=5u8 {
            producer.publish(&Line::filled(n)).unwrap();
            assert_eq!(arbiter.service(WakeSource::Strobe, &mut printer), 1);
        }

        let expected: Vec<Line> = (1..=5u8).map(Line::filled).collect();
        assert_eq!(printer.printed, expected);
        assert_eq!(arbiter.stats().wakes, 5);
        assert_eq!(arbiter.stats().idle_wakes, 0);
    }
}
