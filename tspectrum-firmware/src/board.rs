//! Blue Pill board definition
//!
//! | Signal          | Pin  | Notes                              |
//! |-----------------|------|------------------------------------|
//! | Printer TX      | PA2  | USART2, 9600 8N1                   |
//! | Printer sense   | PA0  | ADC1 channel 0, divided supply     |
//! | Status LED      | PC13 | Active low                         |
//! | ZX strobe       | PB0  | EXTI0, armed once at bring-up      |
//! | ZX data         | PB1  | Sampled on each strobe             |

use embassy_stm32::rcc::{
    AHBPrescaler, APBPrescaler, ADCPrescaler, Hse, HseMode, Pll, PllMul, PllPreDiv, PllSource,
    Sysclk,
};
use embassy_stm32::time::Hertz;

use tspectrum_core::config::{ConfigError, DeviceConfig, StrobeEdge};
use tspectrum_hal_stm32f1::Edge;

/// ADC channel of the printer sense input
pub const SENSE_ADC_CHANNEL: u8 = 0;

/// Polls allowed for one sense conversion
pub const SENSE_POLL_LIMIT: u32 = 10_000;

/// EXTI line of the ZX strobe
pub const STROBE_LINE: u8 = 0;

/// GPIO port of the ZX strobe (A = 0, B = 1)
pub const STROBE_PORT: u8 = 1;

/// EXTI trigger for the configured strobe edge
pub fn strobe_trigger(config: &DeviceConfig) -> Edge {
    match config.strobe_edge {
        StrobeEdge::Rising => Edge::Rising,
        StrobeEdge::Falling => Edge::Falling,
    }
}

/// Clock tree for a validated configuration
///
/// HSE through the PLL to SYSCLK, AHB undivided, APB prescalers and the ADC
/// prescaler all taken from the configuration.
pub fn rcc_config(config: &DeviceConfig) -> Result<embassy_stm32::Config, ConfigError> {
    let mul = match config.pll_multiplier()? {
        2 => PllMul::MUL2,
        3 => PllMul::MUL3,
        4 => PllMul::MUL4,
        5 => PllMul::MUL5,
        6 => PllMul::MUL6,
        7 => PllMul::MUL7,
        8 => PllMul::MUL8,
        9 => PllMul::MUL9,
        10 => PllMul::MUL10,
        11 => PllMul::MUL11,
        12 => PllMul::MUL12,
        13 => PllMul::MUL13,
        14 => PllMul::MUL14,
        15 => PllMul::MUL15,
        16 => PllMul::MUL16,
        _ => return Err(ConfigError::SysclkUnreachable),
    };
    let adc_pre = match config.adc_prescaler()? {
        2 => ADCPrescaler::DIV2,
        4 => ADCPrescaler::DIV4,
        6 => ADCPrescaler::DIV6,
        8 => ADCPrescaler::DIV8,
        _ => return Err(ConfigError::AdcClockUnreachable),
    };

    let mut out = embassy_stm32::Config::default();
    out.rcc.hse = Some(Hse {
        freq: Hertz(config.hse_hz),
        mode: HseMode::Oscillator,
    });
    out.rcc.pll = Some(Pll {
        src: PllSource::HSE,
        prediv: PllPreDiv::DIV1,
        mul,
    });
    out.rcc.sys = Sysclk::PLL1_P;
    out.rcc.ahb_pre = AHBPrescaler::DIV1;
    out.rcc.apb1_pre = apb_prescaler(config.apb1_divider()?)?;
    out.rcc.apb2_pre = apb_prescaler(config.apb2_divider()?)?;
    out.rcc.adc_pre = adc_pre;
    Ok(out)
}

fn apb_prescaler(div: u8) -> Result<APBPrescaler, ConfigError> {
    Ok(match div {
        1 => APBPrescaler::DIV1,
        2 => APBPrescaler::DIV2,
        4 => APBPrescaler::DIV4,
        8 => APBPrescaler::DIV8,
        16 => APBPrescaler::DIV16,
        _ => return Err(ConfigError::PclkUnreachable),
    })
}
