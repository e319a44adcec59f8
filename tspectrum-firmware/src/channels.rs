//! Inter-task communication
//!
//! The interrupt-priority tasks and the Arbiter task share only these
//! statics and the line handoff itself.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, Ordering};

use tspectrum_core::WakeSource;
use tspectrum_drivers::printer::Readiness;

/// Latest wake for the Arbiter
///
/// Only the most recent source is kept. The Arbiter re-checks the handoff
/// counters on every wake, so a coalesced wake loses nothing.
pub static WAKE: Signal<CriticalSectionRawMutex, WakeSource> = Signal::new();

/// Printer readiness, written by the sense task
pub static PRINTER_READY: AtomicBool = AtomicBool::new(false);

/// Readiness as seen by the sense task
pub struct SensedReadiness;

impl Readiness for SensedReadiness {
    fn is_ready(&self) -> bool {
        PRINTER_READY.load(Ordering::Acquire)
    }

    fn wait(&mut self) {
        // Any interrupt wakes the core; the sense tick comes every 10 ms
        cortex_m::asm::wfe();
    }
}
