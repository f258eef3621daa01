//! Single-connection request server
//!
//! One accepted connection is served to completion before the next one:
//!
//! 1. Wait for the client to send something, blinking the status indicator.
//! 2. Drain everything it has sent into the request parser.
//! 3. Dispatch, encode and write back one response.
//!
//! The caller closes the connection afterwards, whatever the outcome.

use pinwire_hal::{GpioBank, NvMemory, OutputPin, Transport, UartRx, UartTx};
use pinwire_protocol::{EncodeError, RequestError, RequestParser, Response, Status};

use crate::device::Device;
use crate::log::LogSink;
use crate::router;

/// Read chunk size while draining a connection
const READ_CHUNK: usize = 64;

/// Server timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServerSettings {
    /// How long a client may stay silent before it is dropped
    pub client_timeout_ms: u32,
    /// Indicator toggle period while waiting
    pub blink_interval_ms: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            client_timeout_ms: 20_000,
            blink_interval_ms: 250,
        }
    }
}

/// How a connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServeOutcome {
    /// Client sent nothing within the timeout; no response
    TimedOut,
    /// Client sent no bytes at all; no response
    Dropped,
    /// A response with this status was written
    Responded(Status),
}

/// Errors that end a connection without a complete response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServeError<E> {
    /// Connection I/O failed
    Transport(E),
    /// Response did not fit the encode buffer
    Encode(EncodeError),
}

impl<E> From<EncodeError> for ServeError<E> {
    fn from(e: EncodeError) -> Self {
        ServeError::Encode(e)
    }
}

/// Serve one request on an accepted connection
pub async fn serve_connection<T, I, G, M, S, L>(
    transport: &mut T,
    indicator: &mut I,
    device: &mut Device<G, M, S, L>,
    settings: &ServerSettings,
) -> Result<ServeOutcome, ServeError<T::Error>>
where
    T: Transport,
    I: OutputPin,
    G: GpioBank,
    M: NvMemory,
    S: UartTx + UartRx,
    L: LogSink,
{
    let readable = transport
        .wait_readable(
            settings.client_timeout_ms,
            settings.blink_interval_ms,
            &mut |_tick: u32| indicator.toggle(),
        )
        .await
        .map_err(ServeError::Transport)?;
    indicator.set_high();

    if !readable {
        device.log.warn(format_args!(
            "client silent for {} ms, dropped",
            settings.client_timeout_ms
        ));
        return Ok(ServeOutcome::TimedOut);
    }

    let response = match read_request(transport).await? {
        Ok(request) => router::dispatch(device, &request),
        Err(RequestError::Empty) => return Ok(ServeOutcome::Dropped),
        Err(e) => {
            device.log.warn(format_args!("bad request: {:?}", e));
            Response::text(Status::BadRequest, request_error_text(e))
        }
    };

    let encoded = response.encode_to_vec()?;
    transport
        .write_all(&encoded)
        .await
        .map_err(ServeError::Transport)?;

    Ok(ServeOutcome::Responded(response.status))
}

/// Feed everything the client has sent into a fresh parser
async fn read_request<T: Transport>(
    transport: &mut T,
) -> Result<Result<pinwire_protocol::Request, RequestError>, ServeError<T::Error>> {
    let mut parser = RequestParser::new();
    let mut chunk = [0u8; READ_CHUNK];

    while transport.available() > 0 {
        let n = transport
            .read(&mut chunk)
            .await
            .map_err(ServeError::Transport)?;
        if n == 0 {
            break;
        }
        if let Err(e) = parser.feed_bytes(&chunk[..n]) {
            return Ok(Err(e));
        }
    }

    Ok(parser.finish())
}

fn request_error_text(error: RequestError) -> &'static str {
    match error {
        RequestError::Empty => "empty request",
        RequestError::Malformed => "malformed request line",
        RequestError::TooLong => "request field too long",
    }
}
