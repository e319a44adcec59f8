//! Legacy printer capture
//!
//! The strobe edge is serviced straight from its EXTI interrupt, which stays
//! armed for the whole run. The bit-timing tick runs as a task on the
//! interrupt executor. Both feed the same [`LineCapture`] through a
//! critical-section mutex.

use core::cell::RefCell;

use defmt::*;
use embassy_stm32::gpio::Input;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Ticker};

use tspectrum_core::WakeSource;
use tspectrum_drivers::capture::{LineCapture, StrobeOutcome};
use tspectrum_hal::InputPin;
use tspectrum_hal_stm32f1::{PinInput, StrobeLine};

use super::Producer;
use crate::channels::WAKE;

/// Capture state shared by the strobe interrupt and the tick task
pub struct Capture {
    capture: LineCapture<Producer>,
    data: PinInput<'static>,
    strobe: StrobeLine,
    // Held so the strobe pin stays an input
    _strobe_pin: Input<'static>,
}

impl Capture {
    pub fn new(
        producer: Producer,
        data: PinInput<'static>,
        strobe: StrobeLine,
        strobe_pin: Input<'static>,
    ) -> Self {
        Self {
            capture: LineCapture::new(producer),
            data,
            strobe,
            _strobe_pin: strobe_pin,
        }
    }
}

static CAPTURE: Mutex<CriticalSectionRawMutex, RefCell<Option<Capture>>> =
    Mutex::new(RefCell::new(None));

/// Hand the capture state to the interrupt handlers
///
/// Must run before the strobe line is unmasked.
pub fn install(capture: Capture) {
    CAPTURE.lock(|c| *c.borrow_mut() = Some(capture));
}

/// Strobe edge interrupt body
///
/// Latches one dot, then acknowledges the edge.
pub fn on_strobe() {
    let outcome = CAPTURE.lock(|c| {
        let mut c = c.borrow_mut();
        let c = c.as_mut()?;
        let black = c.data.is_high();
        let outcome = c.capture.on_strobe(black);
        c.strobe.clear_pending();
        Some((outcome, c.capture.stats().lines_lost))
    });

    match outcome {
        Some((StrobeOutcome::Published(produced), _)) => trace!("Line {} published", produced),
        Some((StrobeOutcome::Lost(e), lost)) => {
            warn!("Line lost ({:?}), {} lost so far", e, lost)
        }
        Some((StrobeOutcome::Latched, _)) => {}
        None => warn!("Strobe before capture installed"),
    }
    WAKE.signal(WakeSource::Strobe);
}

/// Capture tick task - discards partial rows after the bus goes quiet
#[embassy_executor::task]
pub async fn capture_tick_task(tick_us: u32) {
    info!("Capture tick task started");

    let mut ticker = Ticker::every(Duration::from_micros(tick_us as u64));

    loop {
        ticker.next().await;

        let resync = CAPTURE.lock(|c| {
            let mut c = c.borrow_mut();
            let c = c.as_mut()?;
            c.capture.on_tick().then(|| c.capture.stats().resyncs)
        });
        if let Some(resyncs) = resync {
            debug!("Partial line discarded, resync {}", resyncs);
        }
        WAKE.signal(WakeSource::CaptureTick);
    }
}
