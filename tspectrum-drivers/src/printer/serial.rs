//! Blocking serial printer
//!
//! Implements the Arbiter's [`LinePrinter`] contract over a UART. A line is
//! only sent once the printer reports ready; the first ready printer gets
//! `ESC @` before any raster data. Failed writes are retried a few times and
//! then counted, the line is not re-queued.

use tspectrum_core::arbiter::LinePrinter;
use tspectrum_core::line::Line;
use tspectrum_hal::UartTx;

use super::raster::{raster_row, RESET};

/// Write attempts per line before it is given up
pub const WRITE_ATTEMPTS: u8 = 3;

/// Readiness signal the printer blocks on
pub trait Readiness {
    /// Check if the printer accepts data
    fn is_ready(&self) -> bool;

    /// Sleep until readiness may have changed
    fn wait(&mut self);
}

/// Printer counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrinterStats {
    /// Lines written to the link
    pub lines_printed: u32,
    /// Lines given up after every write attempt failed
    pub lines_failed: u32,
    /// Individual write failures
    pub write_errors: u32,
    /// Waits for the printer to become ready
    pub ready_waits: u32,
}

/// Thermal printer on a blocking serial link
pub struct SerialPrinter<T, R> {
    uart: T,
    readiness: R,
    reset_sent: bool,
    stats: PrinterStats,
}

impl<T: UartTx, R: Readiness> SerialPrinter<T, R> {
    /// Create a new printer
    pub fn new(uart: T, readiness: R) -> Self {
        Self {
            uart,
            readiness,
            reset_sent: false,
            stats: PrinterStats::default(),
        }
    }

    /// Counters since creation
    pub fn stats(&self) -> PrinterStats {
        self.stats
    }

    /// Check if the reset command went out
    pub fn reset_sent(&self) -> bool {
        self.reset_sent
    }

    /// Get access to the underlying UART
    pub fn uart(&self) -> &T {
        &self.uart
    }

    fn wait_ready(&mut self) {
        while !self.readiness.is_ready() {
            self.stats.ready_waits = self.stats.ready_waits.wrapping_add(1);
            self.readiness.wait();
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<(), T::Error> {
        let mut attempt = 1;
        loop {
            match self.uart.write_blocking(data).and_then(|_| self.uart.flush()) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    self.stats.write_errors = self.stats.write_errors.wrapping_add(1);
                    if attempt >= WRITE_ATTEMPTS {
                        return Err(e);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

impl<T: UartTx, R: Readiness> LinePrinter for SerialPrinter<T, R> {
    fn print_line(&mut self, line: &Line) {
        self.wait_ready();

        if !self.reset_sent {
            if self.send(&RESET).is_err() {
                self.stats.lines_failed = self.stats.lines_failed.wrapping_add(1);
                return;
            }
            self.reset_sent = true;
        }

        match self.send(&raster_row(line)) {
            Ok(()) => self.stats.lines_printed = self.stats.lines_printed.wrapping_add(1),
            Err(_) => self.stats.lines_failed = self.stats.lines_failed.wrapping_add(1),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::printer::raster::RASTER_ROW_LEN;

    /// UART that records writes and fails the first `fail_writes`
    struct MockUart {
        written: Vec<u8>,
        fail_writes: u32,
    }

    impl MockUart {
        fn new(fail_writes: u32) -> Self {
            Self {
                written: Vec::new(),
                fail_writes,
            }
        }
    }

    impl UartTx for MockUart {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            if self.fail_writes > 0 {
                self.fail_writes -= 1;
                return Err(());
            }
            self.written.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    /// Readiness that comes up after a number of waits
    struct MockReadiness {
        waits_until_ready: u32,
        waits: u32,
    }

    impl MockReadiness {
        fn after(waits_until_ready: u32) -> Self {
            Self {
                waits_until_ready,
                waits: 0,
            }
        }
    }

    impl Readiness for MockReadiness {
        fn is_ready(&self) -> bool {
            self.waits >= self.waits_until_ready
        }

        fn wait(&mut self) {
            self.waits += 1;
        }
    }

    #[test]
    fn test_reset_once_then_rows() {
        let mut printer = SerialPrinter::new(MockUart::new(0), MockReadiness::after(0));
        printer.print_line(&Line::filled(0xAA));
        printer.print_line(&Line::filled(0x55));

        let written = &printer.uart().written;
        assert_eq!(written.len(), 2 + 2 * RASTER_ROW_LEN);
        assert_eq!(&written[..2], &[0x1B, b'@']);
        assert_eq!(&written[2..6], &[0x12, b'*', 1, 48]);
        assert_eq!(written[6], 0xAA);
        assert_eq!(&written[2 + RASTER_ROW_LEN..6 + RASTER_ROW_LEN], &[0x12, b'*', 1, 48]);
        assert_eq!(written[6 + RASTER_ROW_LEN], 0x55);

        assert!(printer.reset_sent());
        assert_eq!(printer.stats().lines_printed, 2);
    }

    #[test]
    fn test_waits_for_ready() {
        let mut printer = SerialPrinter::new(MockUart::new(0), MockReadiness::after(3));
        printer.print_line(&Line::blank());

        assert_eq!(printer.stats().ready_waits, 3);
        assert_eq!(printer.stats().lines_printed, 1);
    }

    #[test]
    fn test_nothing_sent_before_first_line() {
        let printer = SerialPrinter::new(MockUart::new(0), MockReadiness::after(0));
        assert!(printer.uart().written.is_empty());
        assert!(!printer.reset_sent());
    }

    #[test]
    fn test_write_retried() {
        let mut printer = SerialPrinter::new(MockUart::new(2), MockReadiness::after(0));
        printer.print_line(&Line::blank());

        let stats = printer.stats();
        assert_eq!(stats.write_errors, 2);
        assert_eq!(stats.lines_printed, 1);
        assert_eq!(stats.lines_failed, 0);
        assert!(printer.reset_sent());
    }

    #[test]
    fn test_line_given_up_after_attempts() {
        // Reset goes through on its last attempt, the second row never does
        let mut printer = SerialPrinter::new(MockUart::new(2), MockReadiness::after(0));
        printer.print_line(&Line::blank());
        printer.uart.fail_writes = WRITE_ATTEMPTS as u32;
        printer.print_line(&Line::filled(1));

        let stats = printer.stats();
        assert_eq!(stats.lines_printed, 1);
        assert_eq!(stats.lines_failed, 1);
        assert_eq!(stats.write_errors, 2 + WRITE_ATTEMPTS as u32);
        assert_eq!(printer.uart().written.len(), 2 + RASTER_ROW_LEN);
    }

    #[test]
    fn test_failed_reset_is_retried_next_line() {
        let mut printer = SerialPrinter::new(
            MockUart::new(WRITE_ATTEMPTS as u32),
            MockReadiness::after(0),
        );
        printer.print_line(&Line::blank());
        assert!(!printer.reset_sent());
        assert_eq!(printer.stats().lines_failed, 1);

        printer.print_line(&Line::blank());
        assert!(printer.reset_sent());
        assert_eq!(&printer.uart().written[..2], &RESET);
    }
}
