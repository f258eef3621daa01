//! Client connection abstraction
//!
//! A [`Transport`] is one accepted client connection. The request server
//! waits for the client to start talking, drains whatever it has sent, and
//! writes a single response back.

use core::future::Future;

/// One client connection of the request server
pub trait Transport {
    /// Error type for I/O on the connection
    type Error;

    /// Wait until the client has sent data, for at most `timeout_ms`
    ///
    /// `on_tick` is invoked every `tick_ms` while waiting, with the running
    /// tick count, so the caller can animate an indicator. Returns `false`
    /// if the timeout elapsed with nothing to read.
    fn wait_readable(
        &mut self,
        timeout_ms: u32,
        tick_ms: u32,
        on_tick: &mut dyn FnMut(u32),
    ) -> impl Future<Output = Result<bool, Self::Error>>;

    /// Number of bytes that can be read without waiting
    fn available(&self) -> usize;

    /// Read up to `buf.len()` bytes that are already available
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, Self::Error>>;

    /// Write the whole buffer to the client
    fn write_all(&mut self, data: &[u8]) -> impl Future<Output = Result<(), Self::Error>>;
}
