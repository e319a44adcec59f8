//! Arbiter task
//!
//! Waits for any wake, then drains every published line to the printer.
//! Printing blocks in thread mode; the capture and sense tasks preempt it
//! from the interrupt executor.

use defmt::*;

use tspectrum_core::Arbiter;
use tspectrum_drivers::printer::SerialPrinter;
use tspectrum_hal_stm32f1::BlockingSerial;

use super::Consumer;
use crate::channels::{SensedReadiness, WAKE};

/// Printer bound to the board's serial link and sense input
pub type BoardPrinter = SerialPrinter<BlockingSerial<'static>, SensedReadiness>;

/// Arbiter task - the foreground consumer of the line handoff
#[embassy_executor::task]
pub async fn arbiter_task(mut arbiter: Arbiter<Consumer>, mut printer: BoardPrinter) {
    info!("Arbiter task started");

    let mut dropped = 0;
    let mut failed = 0;
    let mut refused = 0;

    loop {
        let wake = WAKE.wait().await;
        let printed = arbiter.service(wake, &mut printer);
        if printed > 0 {
            trace!("{:?} wake printed {} lines", wake, printed);
        }

        let now_dropped = arbiter.source().dropped();
        if now_dropped != dropped {
            warn!("Handoff full, {} lines dropped so far", now_dropped);
            dropped = now_dropped;
        }

        let now_failed = printer.stats().lines_failed;
        if now_failed != failed {
            warn!("Printer write failed, {} lines lost so far", now_failed);
            failed = now_failed;
        }

        let now_refused = arbiter.stats().drain_errors;
        if now_refused != refused {
            error!("Handoff refused a drain, {} so far", now_refused);
            refused = now_refused;
        }
    }
}
