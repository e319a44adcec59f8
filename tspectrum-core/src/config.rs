//! Device configuration
//!
//! Everything here is fixed by the board: a 72 MHz STM32F103 talking to a
//! 9600 baud thermal printer. The values live in one constant so that the
//! derived register values (USART divisor, ADC prescaler, settle delay) are
//! computed and validated in one place and tested on the host.

use tspectrum_hal::uart::{DataBits, Parity, StopBits, UartConfig};

use crate::handoff::DEFAULT_CAPACITY;
use crate::line::LINE_WIDTH;

/// Highest ADC clock the STM32F1 converter tolerates
pub const ADC_CLOCK_MAX_HZ: u32 = 14_000_000;

/// ADC prescalers available on the APB2 clock
pub const ADC_PRESCALERS: [u8; 4] = [2, 4, 6, 8];

/// Largest acceptable baud rate error, in permille
pub const MAX_BAUD_ERROR_PERMILLE: u32 = 20;

/// Highest core clock of the STM32F103
pub const SYSCLK_MAX_HZ: u32 = 72_000_000;

/// Highest APB1 clock
pub const PCLK1_MAX_HZ: u32 = 36_000_000;

/// PLL multipliers available from HSE
pub const PLL_MULTIPLIERS: core::ops::RangeInclusive<u8> = 2..=16;

/// APB prescalers
pub const APB_DIVIDERS: [u8; 5] = [1, 2, 4, 8, 16];

/// Edge that clocks the legacy strobe line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StrobeEdge {
    Rising,
    Falling,
}

/// Printer readiness detection thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SenseConfig {
    /// Interval between analog samples (µs)
    pub interval_us: u32,
    /// Raw ADC reading above which the printer is powered
    pub ready_threshold: u16,
    /// Readings must drop this far below the threshold to count as not ready
    pub hysteresis: u16,
    /// Consecutive agreeing samples before the state changes
    pub confirm_samples: u8,
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// External crystal (Hz)
    pub hse_hz: u32,
    /// Core clock, HSE through the PLL (Hz)
    pub sysclk_hz: u32,
    /// APB1 peripheral clock, feeds USART2 (Hz)
    pub pclk1_hz: u32,
    /// APB2 peripheral clock, feeds the ADC prescaler (Hz)
    pub pclk2_hz: u32,
    /// Timer input clock, APB1 doubled whenever APB1 is divided (Hz)
    pub timer_clock_hz: u32,
    /// Wanted ADC clock (Hz)
    pub adc_clock_hz: u32,
    /// Printer serial link
    pub serial: UartConfig,
    /// Raster line width in bytes
    pub line_width: usize,
    /// Strobe line edge
    pub strobe_edge: StrobeEdge,
    /// Handoff queue slots
    pub handoff_capacity: usize,
    /// Capture bit-timing tick (µs)
    pub capture_tick_us: u32,
    /// Printer readiness sensing
    pub sense: SenseConfig,
}

impl DeviceConfig {
    /// The configuration the firmware is built for
    pub const DEFAULT: Self = Self {
        hse_hz: 8_000_000,
        sysclk_hz: 72_000_000,
        pclk1_hz: 36_000_000,
        pclk2_hz: 72_000_000,
        timer_clock_hz: 72_000_000,
        adc_clock_hz: 12_000_000,
        serial: UartConfig {
            baudrate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        },
        line_width: LINE_WIDTH,
        strobe_edge: StrobeEdge::Rising,
        handoff_capacity: DEFAULT_CAPACITY,
        capture_tick_us: 1_000,
        sense: SenseConfig {
            interval_us: 10_000,
            ready_threshold: 2000,
            hysteresis: 100,
            confirm_samples: 3,
        },
    };

    /// Check every derived value is reachable on the hardware
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pll_multiplier()?;
        self.apb2_divider()?;
        self.apb1_divider()?;
        if self.timer_clock_hz != self.expected_timer_clock() {
            return Err(ConfigError::TimerClockMismatch);
        }

        if self.serial.baudrate == 0 {
            return Err(ConfigError::ZeroBaud);
        }
        let permille = baud_error_permille(self.pclk1_hz, self.serial.baudrate);
        if permille > MAX_BAUD_ERROR_PERMILLE {
            return Err(ConfigError::BaudErrorTooHigh { permille });
        }

        adc_prescaler(self.pclk2_hz, self.adc_clock_hz)?;

        if self.line_width != LINE_WIDTH {
            return Err(ConfigError::LineWidth);
        }
        if self.handoff_capacity < 2 || !self.handoff_capacity.is_power_of_two() {
            return Err(ConfigError::HandoffCapacity);
        }
        if self.capture_tick_us == 0 || self.sense.interval_us == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// PLL multiplier taking HSE to SYSCLK
    pub fn pll_multiplier(&self) -> Result<u8, ConfigError> {
        if self.hse_hz == 0
            || self.sysclk_hz > SYSCLK_MAX_HZ
            || self.sysclk_hz % self.hse_hz != 0
        {
            return Err(ConfigError::SysclkUnreachable);
        }
        match u8::try_from(self.sysclk_hz / self.hse_hz) {
            Ok(mul) if PLL_MULTIPLIERS.contains(&mul) => Ok(mul),
            _ => Err(ConfigError::SysclkUnreachable),
        }
    }

    /// APB1 prescaler giving `pclk1_hz`
    pub fn apb1_divider(&self) -> Result<u8, ConfigError> {
        if self.pclk1_hz > PCLK1_MAX_HZ {
            return Err(ConfigError::PclkUnreachable);
        }
        apb_divider(self.sysclk_hz, self.pclk1_hz)
    }

    /// APB2 prescaler giving `pclk2_hz`
    pub fn apb2_divider(&self) -> Result<u8, ConfigError> {
        apb_divider(self.sysclk_hz, self.pclk2_hz)
    }

    fn expected_timer_clock(&self) -> u32 {
        if self.pclk1_hz == self.sysclk_hz {
            self.pclk1_hz
        } else {
            2 * self.pclk1_hz
        }
    }

    /// USART BRR value for the printer link
    pub fn usart_divisor(&self) -> u32 {
        usart_divisor(self.pclk1_hz, self.serial.baudrate)
    }

    /// ADC prescaler for the wanted ADC clock
    pub fn adc_prescaler(&self) -> Result<u8, ConfigError> {
        adc_prescaler(self.pclk2_hz, self.adc_clock_hz)
    }

    /// Core cycles to wait between ADC power-on and calibration start
    pub fn adc_settle_cycles(&self) -> u32 {
        let adc_hz = match self.adc_prescaler() {
            Ok(div) => self.pclk2_hz / div as u32,
            Err(_) => self.adc_clock_hz,
        };
        adc_settle_cycles(self.sysclk_hz, adc_hz)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// SYSCLK is not an HSE multiple the PLL can produce
    SysclkUnreachable,
    /// An APB clock is not SYSCLK over an available prescaler, or is too fast
    PclkUnreachable,
    /// Timer clock does not follow the APB1 clock
    TimerClockMismatch,
    /// Baud rate of zero
    ZeroBaud,
    /// Closest reachable baud rate is too far off
    BaudErrorTooHigh { permille: u32 },
    /// No prescaler brings the ADC clock at or below the wanted rate
    AdcClockUnreachable,
    /// Wanted ADC clock exceeds the converter's limit
    AdcClockTooFast,
    /// Line width does not match the print head
    LineWidth,
    /// Handoff needs a power-of-two capacity of at least two slots
    HandoffCapacity,
    /// A tick interval of zero
    ZeroInterval,
}

/// APB prescaler dividing `sysclk_hz` down to exactly `pclk_hz`
pub fn apb_divider(sysclk_hz: u32, pclk_hz: u32) -> Result<u8, ConfigError> {
    APB_DIVIDERS
        .iter()
        .copied()
        .find(|&div| sysclk_hz == pclk_hz.saturating_mul(div as u32))
        .ok_or(ConfigError::PclkUnreachable)
}

/// USART BRR value (16x oversampling, 12.4 fixed point)
///
/// `USARTDIV = pclk / (16 * baud)`, and BRR holds `USARTDIV * 16`, which is
/// `pclk / baud` rounded to nearest.
pub const fn usart_divisor(pclk_hz: u32, baud: u32) -> u32 {
    if baud == 0 {
        return 0;
    }
    (pclk_hz + baud / 2) / baud
}

/// Baud rate error of the nearest BRR value, in permille
pub fn baud_error_permille(pclk_hz: u32, baud: u32) -> u32 {
    let divisor = usart_divisor(pclk_hz, baud);
    if divisor == 0 {
        return u32::MAX;
    }
    let actual = pclk_hz / divisor;
    let diff = actual.abs_diff(baud) as u64;
    (diff * 1000 / baud as u64) as u32
}

/// Smallest ADC prescaler giving an ADC clock at or below `target_hz`
pub fn adc_prescaler(pclk2_hz: u32, target_hz: u32) -> Result<u8, ConfigError> {
    if target_hz > ADC_CLOCK_MAX_HZ {
        return Err(ConfigError::AdcClockTooFast);
    }
    ADC_PRESCALERS
        .iter()
        .copied()
        .find(|&div| pclk2_hz / div as u32 <= target_hz)
        .ok_or(ConfigError::AdcClockUnreachable)
}

/// Core cycles covering both 1 µs and two ADC clock periods, rounded up
pub fn adc_settle_cycles(sysclk_hz: u32, adc_hz: u32) -> u32 {
    let one_us = sysclk_hz.div_ceil(1_000_000);
    let two_adc_clocks = (2 * sysclk_hz).div_ceil(adc_hz.max(1));
    one_us.max(two_adc_clocks)
}
