//! Thermal Spectrum - ZX Printer to thermal printer bridge
//!
//! Firmware for STM32F103 (Blue Pill) boards. Captures raster lines from a
//! legacy ZX Printer bus and relays each one, in order, to a serial thermal
//! printer.
//!
//! Bring-up runs every step in order before anything is allowed to
//! interrupt: clocks, pins, serial, ADC calibration, timers, strobe edge,
//! and finally the interrupt executor. A failed step halts with the status
//! LED on.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32::gpio::{Flex, Input, Level, Output, Pull, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::usart::UartTx;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tspectrum_core::bringup::{BringUp, Step, CALIBRATION_POLL_LIMIT};
use tspectrum_core::config::DeviceConfig;
use tspectrum_core::{Arbiter, LineQueue};
use tspectrum_drivers::printer::{SerialPrinter, StatusLed};
use tspectrum_hal_stm32f1::{
    usart_config, BlockingSerial, PinInput, PinOutput, SenseAdc, StrobeLine,
};

use crate::board::{SENSE_ADC_CHANNEL, STROBE_LINE, STROBE_PORT};
use crate::channels::SensedReadiness;
use crate::tasks::capture::{self, Capture};
use crate::tasks::HANDOFF_CAPACITY;

mod board;
mod channels;
mod tasks;

/// Device configuration the firmware is built for
const CONFIG: DeviceConfig = DeviceConfig::DEFAULT;

/// Executor for the capture and sense tasks, preempting thread mode
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

// Line handoff storage (must live forever, split into producer and consumer)
static HANDOFF: StaticCell<LineQueue<HANDOFF_CAPACITY>> = StaticCell::new();

// USART3 is unused on this board and drives the interrupt executor
#[interrupt]
unsafe fn USART3() {
    EXECUTOR_HIGH.on_interrupt()
}

// ZX strobe, serviced on every edge for the whole run
#[interrupt]
fn EXTI0() {
    capture::on_strobe()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Thermal Spectrum firmware starting...");

    if let Err(e) = CONFIG.validate() {
        error!("Invalid device configuration: {:?}", e);
        halt();
    }
    if CONFIG.handoff_capacity != HANDOFF_CAPACITY {
        error!(
            "Handoff capacity {} does not match the built queue ({})",
            CONFIG.handoff_capacity, HANDOFF_CAPACITY
        );
        halt();
    }

    let mut bringup = BringUp::new();

    // Clocks
    let rcc = match board::rcc_config(&CONFIG) {
        Ok(rcc) => rcc,
        Err(e) => {
            error!("Clock configuration failed: {:?}", e);
            halt();
        }
    };
    let p = embassy_stm32::init(rcc);
    step_done(&mut bringup, Step::Clocks);
    info!(
        "Clocks: SYSCLK {} Hz, PCLK1 {} Hz, PCLK2 {} Hz, timers {} Hz",
        CONFIG.sysclk_hz, CONFIG.pclk1_hz, CONFIG.pclk2_hz, CONFIG.timer_clock_hz
    );

    // Pins: status LED starts off, sense input in analog mode
    let mut led = StatusLed::new(PinOutput::new(Output::new(p.PC13, Level::High, Speed::Low)));
    let mut sense_pin = Flex::new(p.PA0);
    sense_pin.set_as_analog();
    let data = PinInput::new(Input::new(p.PB1, Pull::None));
    step_done(&mut bringup, Step::Pins);

    // Serial link to the printer
    let tx = match UartTx::new_blocking(p.USART2, p.PA2, usart_config(&CONFIG.serial)) {
        Ok(tx) => tx,
        Err(e) => {
            error!("Printer serial setup failed: {:?}", e);
            fail_stop(&mut led);
        }
    };
    step_done(&mut bringup, Step::Serial);
    info!(
        "Printer link: {} baud, BRR 0x{:04x}",
        CONFIG.serial.baudrate,
        CONFIG.usart_divisor()
    );

    // ADC calibration, bounded
    let mut adc = SenseAdc::new(SENSE_ADC_CHANNEL);
    match bringup.calibrate(&mut adc, CONFIG.adc_settle_cycles(), CALIBRATION_POLL_LIMIT) {
        Ok(polls) => info!("ADC calibrated after {} polls", polls),
        Err(e) => {
            error!("ADC calibration failed: {:?}", e);
            fail_stop(&mut led);
        }
    }

    // Timers: the embassy time driver (TIM4) has run since init; the tickers
    // are created when their tasks spawn below
    step_done(&mut bringup, Step::Timers);
    info!(
        "Tick sources: sense every {} us, capture every {} us",
        CONFIG.sense.interval_us, CONFIG.capture_tick_us
    );

    // Strobe edge, configured but still masked
    let strobe_pin = Input::new(p.PB0, Pull::None);
    let strobe = StrobeLine::configure(STROBE_PORT, STROBE_LINE, board::strobe_trigger(&CONFIG));
    step_done(&mut bringup, Step::StrobeEdge);

    // Handoff and collaborators
    let (producer, consumer) = HANDOFF.init(LineQueue::new()).split();
    let arbiter = Arbiter::new(consumer);
    let printer = SerialPrinter::new(BlockingSerial::new(tx), SensedReadiness);
    capture::install(Capture::new(producer, data, strobe, strobe_pin));

    spawner.spawn(tasks::arbiter_task(arbiter, printer)).unwrap();

    // Interrupts last, and only once the tracker accepts them
    step_done(&mut bringup, Step::Interrupts);

    interrupt::USART3.set_priority(Priority::P6);
    let high = EXECUTOR_HIGH.start(interrupt::USART3);
    high.spawn(tasks::sense_task(adc, sense_pin, led, CONFIG)).unwrap();
    high.spawn(tasks::capture_tick_task(CONFIG.capture_tick_us)).unwrap();

    interrupt::EXTI0.set_priority(Priority::P6);
    strobe.unmask();
    // SAFETY: the handler only touches state installed above
    unsafe { interrupt::EXTI0.enable() };

    info!("Bring-up complete, interrupts armed");
}

/// Record a finished bring-up step, halting on a sequencing error
fn step_done(bringup: &mut BringUp, step: Step) {
    if let Err(e) = bringup.complete(step) {
        error!("Bring-up step {:?} refused: {:?}", step, e);
        halt();
    }
}

/// Stop with the status LED on
fn fail_stop(led: &mut StatusLed<PinOutput<'static>>) -> ! {
    led.set(true);
    halt()
}

/// Stop without arming anything
fn halt() -> ! {
    loop {
        cortex_m::asm::wfe();
    }
}
