//! UART driver for STM32F1
//!
//! Blocking transmit-only link to the thermal printer.

use embassy_stm32::mode::Blocking;
use embassy_stm32::usart::{self, Error as UsartError};
use tspectrum_hal::uart::{DataBits, Parity, StopBits, UartConfig};

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// Framing error
    Framing,
    /// Noise error
    Noise,
    /// Overrun error
    Overrun,
    /// Parity error
    Parity,
    /// Buffer too long
    BufferTooLong,
    /// Other error
    Other,
}

impl From<UsartError> for UartBusError {
    fn from(e: UsartError) -> Self {
        match e {
            UsartError::Framing => UartBusError::Framing,
            UsartError::Noise => UartBusError::Noise,
            UsartError::Overrun => UartBusError::Overrun,
            UsartError::Parity => UartBusError::Parity,
            UsartError::BufferTooLong => UartBusError::BufferTooLong,
            _ => UartBusError::Other,
        }
    }
}

/// Convert the board-agnostic serial settings to embassy's
pub fn usart_config(config: &UartConfig) -> usart::Config {
    let mut out = usart::Config::default();
    out.baudrate = config.baudrate;
    out.data_bits = match config.data_bits {
        DataBits::Seven => usart::DataBits::DataBits7,
        DataBits::Eight => usart::DataBits::DataBits8,
        DataBits::Nine => usart::DataBits::DataBits9,
    };
    out.parity = match config.parity {
        Parity::None => usart::Parity::ParityNone,
        Parity::Even => usart::Parity::ParityEven,
        Parity::Odd => usart::Parity::ParityOdd,
    };
    out.stop_bits = match config.stop_bits {
        StopBits::One => usart::StopBits::STOP1,
        StopBits::Two => usart::StopBits::STOP2,
    };
    out
}

/// Blocking UART transmitter
pub struct BlockingSerial<'d> {
    tx: usart::UartTx<'d, Blocking>,
}

impl<'d> BlockingSerial<'d> {
    /// Wrap a blocking embassy transmitter
    pub fn new(tx: usart::UartTx<'d, Blocking>) -> Self {
        Self { tx }
    }
}

impl tspectrum_hal::UartTx for BlockingSerial<'_> {
    type Error = UartBusError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx.blocking_write(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.tx.blocking_flush()?;
        Ok(())
    }
}
