//! TCP client connection over `embassy-net`

use embassy_net::tcp::{Error as TcpError, TcpSocket};
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Write;
use pinwire_hal::Transport;

/// An accepted TCP connection
///
/// Borrows the socket so the accept loop can reuse its buffers for the
/// next client.
pub struct TcpTransport<'s, 'a> {
    socket: &'s mut TcpSocket<'a>,
}

impl<'s, 'a> TcpTransport<'s, 'a> {
    pub fn new(socket: &'s mut TcpSocket<'a>) -> Self {
        Self { socket }
    }
}

impl Transport for TcpTransport<'_, '_> {
    type Error = TcpError;

    async fn wait_readable(
        &mut self,
        timeout_ms: u32,
        tick_ms: u32,
        on_tick: &mut dyn FnMut(u32),
    ) -> Result<bool, Self::Error> {
        let tick_ms = tick_ms.max(1);
        let mut waited = 0u32;
        let mut ticks = 0u32;

        loop {
            if self.socket.recv_queue() > 0 {
                return Ok(true);
            }
            if waited >= timeout_ms {
                return Ok(false);
            }

            let slice = tick_ms.min(timeout_ms - waited);
            match with_timeout(
                Duration::from_millis(slice as u64),
                self.socket.wait_read_ready(),
            )
            .await
            {
                // Also resolves when the peer closed; the caller sees an
                // empty read in that case
                Ok(()) => return Ok(true),
                Err(_) => {
                    waited += slice;
                    ticks += 1;
                    on_tick(ticks);
                }
            }
        }
    }

    fn available(&self) -> usize {
        self.socket.recv_queue()
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.socket.read(buf).await
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.socket.write_all(data).await?;
        self.socket.flush().await
    }
}
