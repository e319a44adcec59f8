//! Printer sense task
//!
//! Samples the printer supply on every sense tick, debounces it into a
//! ready state and mirrors that state on the status LED. The ADC is powered
//! only for the duration of each sample.

use defmt::*;
use embassy_stm32::gpio::Flex;
use embassy_time::{Duration, Ticker};
use portable_atomic::Ordering;

use tspectrum_core::config::DeviceConfig;
use tspectrum_core::WakeSource;
use tspectrum_drivers::printer::{ReadinessMonitor, SenseChannel, StatusLed};
use tspectrum_hal_stm32f1::{PinOutput, SenseAdc};

use crate::board::SENSE_POLL_LIMIT;
use crate::channels::{PRINTER_READY, WAKE};

/// Sense task - owns the ADC, the readiness monitor and the status LED
#[embassy_executor::task]
pub async fn sense_task(
    adc: SenseAdc,
    // Held so the pin stays in analog mode
    _sense_pin: Flex<'static>,
    mut led: StatusLed<PinOutput<'static>>,
    config: DeviceConfig,
) {
    info!("Sense task started on ADC channel {}", adc.channel());

    let mut sense = SenseChannel::new(adc, config.adc_settle_cycles(), SENSE_POLL_LIMIT);
    let mut monitor = ReadinessMonitor::new(config.sense);
    let mut ticker = Ticker::every(Duration::from_micros(config.sense.interval_us as u64));

    loop {
        ticker.next().await;
        WAKE.signal(WakeSource::PrinterTick);

        let raw = match sense.sample() {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Sense conversion failed: {:?}", e);
                continue;
            }
        };
        WAKE.signal(WakeSource::SampleReady);

        if let Some(ready) = monitor.on_sample(raw) {
            PRINTER_READY.store(ready, Ordering::Release);
            led.set(ready);
            if ready {
                info!("Printer ready (avg {})", monitor.average());
            } else {
                warn!("Printer not ready (avg {})", monitor.average());
            }
        }
    }
}
