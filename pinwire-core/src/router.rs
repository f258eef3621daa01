//! Request router
//!
//! Maps a parsed [`Request`] onto device operations and always produces a
//! [`Response`]; no per-request error escapes this module.
//!
//! | Path               | GET           | POST          | PUT        | DELETE   |
//! |--------------------|---------------|---------------|------------|----------|
//! | `/`                | banner        | set node name | -          | -        |
//! | `/serial`          | drain input   | write line    | -          | -        |
//! | `/debug`           | drain log     | -             | -          | -        |
//! | `/digital/{pin}`   | snapshot      | set level     | initialize | un-init  |
//!
//! `OPTIONS` on any path answers 200 with an empty body. A method outside
//! the table on a known path is a 400; an unknown path is a 404.

use pinwire_hal::{GpioBank, NvMemory, PinMode, UartRx, UartTx};
use pinwire_protocol::{Method, Request, Response, Route, Status};

use crate::device::Device;
use crate::error::ErrorKind;
use crate::log::LogSink;
use crate::pins::{Level, PinError, PinIndex};

/// Version reported in the banner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serial lines written by `POST /serial` are terminated with this
const SERIAL_LINE_END: &[u8] = b"\r\n";

/// Route a request and build the response
pub fn dispatch<G, M, S, L>(device: &mut Device<G, M, S, L>, request: &Request) -> Response
where
    G: GpioBank,
    M: NvMemory,
    S: UartTx + UartRx,
    L: LogSink,
{
    let method = request.method();
    if method == Method::Options {
        return Response::new(Status::Ok);
    }

    // Serial payloads go out byte for byte; every other body is a token
    let body = request.body.trim();
    match Route::parse(&request.path) {
        Route::Root => root(device, method, body),
        Route::Serial => serial(device, method, &request.body),
        Route::Debug => debug(device, method),
        Route::Digital(token) => digital(device, method, token, body),
        Route::Unknown => {
            device
                .log
                .warn(format_args!("no route for {}", request.path.as_str()));
            Response::text(ErrorKind::NotFound.status(), "not found")
        }
    }
}

fn bad_method() -> Response {
    Response::text(Status::BadRequest, "method not allowed on this path")
}

fn root<G, M, S, L: LogSink>(
    device: &mut Device<G, M, S, L>,
    method: Method,
    body: &str,
) -> Response {
    match method {
        Method::Get => {
            let mut response = Response::new(Status::Ok);
            response.push_fmt(format_args!(
                "pinwire {}\nname={}\n",
                VERSION,
                device.node_name()
            ));
            response
        }
        Method::Post => match device.set_node_name(body) {
            Ok(()) => {
                device.log.info(format_args!("node renamed to {}", body));
                Response::text(Status::Ok, device.node_name())
            }
            Err(_) => Response::text(Status::BadRequest, "node name must be 1-32 characters"),
        },
        _ => bad_method(),
    }
}

fn serial<G, M, S: UartTx + UartRx, L: LogSink>(
    device: &mut Device<G, M, S, L>,
    method: Method,
    body: &str,
) -> Response {
    match method {
        Method::Get => {
            let mut response = Response::new(Status::Ok);
            let mut chunk = [0u8; 64];
            loop {
                let room = response.body.capacity() - response.body.len();
                if room == 0 {
                    break;
                }
                let len = room.min(chunk.len());
                let n = match device.serial.try_read(&mut chunk[..len]) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(_) => {
                        device.log.error(format_args!("serial read failed"));
                        return Response::text(Status::InternalServerError, "serial read failed");
                    }
                };
                for &byte in &chunk[..n] {
                    // Only ASCII goes into the text body
                    let ch = if byte.is_ascii() { byte as char } else { '?' };
                    let _ = response.body.push(ch);
                }
            }
            response
        }
        Method::Post => {
            let written = device
                .serial
                .write_blocking(body.as_bytes())
                .and_then(|()| device.serial.write_blocking(SERIAL_LINE_END))
                .and_then(|()| device.serial.flush());
            match written {
                Ok(()) => {
                    device
                        .log
                        .info(format_args!("serial wrote {} bytes", body.len()));
                    Response::new(Status::Ok)
                }
                Err(_) => {
                    device.log.error(format_args!("serial write failed"));
                    Response::text(Status::InternalServerError, "serial write failed")
                }
            }
        }
        _ => bad_method(),
    }
}

fn debug<G, M, S, L: LogSink>(device: &mut Device<G, M, S, L>, method: Method) -> Response {
    match method {
        Method::Get => {
            let mut response = Response::new(Status::Ok);
            match device.log.drain(&mut response.writer()) {
                Ok(()) => response,
                Err(_) => Response::text(Status::InternalServerError, "debug log unreadable"),
            }
        }
        _ => bad_method(),
    }
}

fn digital<G, M, S, L>(
    device: &mut Device<G, M, S, L>,
    method: Method,
    token: &str,
    body: &str,
) -> Response
where
    G: GpioBank,
    M: NvMemory,
    L: LogSink,
{
    let pin = match PinIndex::parse_token(token) {
        Ok(pin) => pin,
        Err(e) => return rejected(device, None, e),
    };

    let result = match method {
        Method::Get => Ok(()),
        Method::Post => set_level(device, pin, body),
        Method::Put => initialize(device, pin, body),
        Method::Delete => device.pins.unset_initialization(pin).map(|()| {
            device.log.info(format_args!("pin {} un-initialized", pin));
        }),
        _ => return bad_method(),
    };

    match result {
        Ok(()) => snapshot(device, pin),
        Err(e) => rejected(device, Some(pin), e),
    }
}

fn set_level<G: GpioBank, M: NvMemory, S, L: LogSink>(
    device: &mut Device<G, M, S, L>,
    pin: PinIndex,
    body: &str,
) -> Result<(), PinError> {
    if device.pins.is_locked(pin) {
        return Err(PinError::Locked);
    }
    if !device.pins.is_output(pin) {
        return Err(PinError::NotOutput);
    }
    let level = Level::from_token(body).ok_or(PinError::InvalidLevel)?;

    device.pins.set_state(pin, level)?;
    device.log.info(format_args!("pin {} set to {}", pin, level));
    Ok(())
}

fn initialize<G: GpioBank, M: NvMemory, S, L: LogSink>(
    device: &mut Device<G, M, S, L>,
    pin: PinIndex,
    body: &str,
) -> Result<(), PinError> {
    if device.pins.is_initialized(pin) {
        return Err(PinError::AlreadyInitialized);
    }
    if device.pins.is_locked(pin) {
        return Err(PinError::Locked);
    }
    let mode = PinMode::from_token(body).ok_or(PinError::InvalidMode)?;

    device.pins.initialize(pin, mode)?;
    device
        .log
        .info(format_args!("pin {} initialized as {}", pin, mode.as_str()));
    Ok(())
}

fn snapshot<G: GpioBank, M: NvMemory, S, L>(
    device: &mut Device<G, M, S, L>,
    pin: PinIndex,
) -> Response {
    let snapshot = device.pins.snapshot(pin);
    let mut response = Response::new(Status::Ok);
    response.push_fmt(format_args!("{}", snapshot));
    response
}

/// Log a failed pin request and turn it into a response
fn rejected<G, M, S, L: LogSink>(
    device: &mut Device<G, M, S, L>,
    pin: Option<PinIndex>,
    error: PinError,
) -> Response {
    let kind = error.kind();
    match (kind, pin) {
        (ErrorKind::Internal, Some(pin)) => {
            device.log.error(format_args!("pin {}: {}", pin, error))
        }
        (ErrorKind::Internal, None) => device.log.error(format_args!("{}", error)),
        (_, Some(pin)) => device.log.warn(format_args!("pin {}: {}", pin, error)),
        (_, None) => device.log.warn(format_args!("{}", error)),
    }

    let mut response = Response::new(kind.status());
    response.push_fmt(format_args!("{}", error));
    response
}
