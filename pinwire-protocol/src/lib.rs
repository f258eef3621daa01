//! Pinwire Wire Protocol
//!
//! This crate defines the text protocol spoken between a client and the
//! pinwire firmware over a raw TCP connection. It is a small subset of
//! HTTP/1.1: one request per connection, plain-text bodies, and the
//! connection is closed after the response.
//!
//! # Protocol Overview
//!
//! ```text
//! client                                   device
//!   │  PUT /digital/5 HTTP/1.1\r\n            │
//!   │  <headers>\r\n\r\n                      │
//!   │  output                                 │
//!   │ ──────────────────────────────────────▶ │
//!   │                                         │
//!   │  HTTP/1.1 200 OK\r\n                    │
//!   │  Content-Type: text/plain\r\n ...       │
//!   │ ◀────────────────────────────────────── │
//! ```
//!
//! The crate is transport-agnostic: [`RequestParser`] is fed bytes as they
//! arrive and [`Response::encode`] writes into a caller-provided buffer.

#![no_std]
#![deny(unsafe_code)]

pub mod request;
pub mod response;
pub mod route;

pub use request::{Method, Request, RequestError, RequestParser, MAX_BODY_LEN};
pub use response::{BodyWriter, EncodeError, Response, Status, MAX_BODY_SIZE, MAX_RESPONSE_SIZE};
pub use route::Route;
