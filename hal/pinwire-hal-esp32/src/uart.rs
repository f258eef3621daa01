//! UART serial passthrough for ESP32
//!
//! The port is used in blocking mode. Inbound bytes wait in the hardware
//! FIFO until a client drains them with `GET /serial`.

use esp_hal::uart::{Config, DataBits, Parity, RxError, StopBits, TxError, Uart};
use esp_hal::Blocking;
use pinwire_hal::uart::{self as hal_uart, UartConfig};
use pinwire_hal::{UartRx, UartTx};

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Transmit failed
    Tx,
    /// Receive failed (overflow, framing, parity)
    Rx,
}

impl From<TxError> for SerialError {
    fn from(_: TxError) -> Self {
        SerialError::Tx
    }
}

impl From<RxError> for SerialError {
    fn from(_: RxError) -> Self {
        SerialError::Rx
    }
}

/// Translate the board-agnostic configuration into an `esp-hal` one
pub fn esp_config(config: &UartConfig) -> Config {
    Config::default()
        .with_baudrate(config.baudrate)
        .with_data_bits(match config.data_bits {
            hal_uart::DataBits::Seven => DataBits::_7,
            hal_uart::DataBits::Eight => DataBits::_8,
        })
        .with_parity(match config.parity {
            hal_uart::Parity::None => Parity::None,
            hal_uart::Parity::Even => Parity::Even,
            hal_uart::Parity::Odd => Parity::Odd,
        })
        .with_stop_bits(match config.stop_bits {
            hal_uart::StopBits::One => StopBits::_1,
            hal_uart::StopBits::Two => StopBits::_2,
        })
}

/// Serial passthrough port
pub struct SerialPort {
    uart: Uart<'static, Blocking>,
}

impl SerialPort {
    pub fn new(uart: Uart<'static, Blocking>) -> Self {
        Self { uart }
    }
}

impl UartTx for SerialPort {
    type Error = SerialError;

    fn write_blocking(&mut self, mut data: &[u8]) -> Result<(), Self::Error> {
        while !data.is_empty() {
            let n = self.uart.write(data)?;
            data = &data[n..];
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.uart.flush()?;
        Ok(())
    }
}

impl UartRx for SerialPort {
    type Error = SerialError;

    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.uart.read_ready() {
            return Ok(0);
        }
        Ok(self.uart.read_buffered(buf)?)
    }
}
