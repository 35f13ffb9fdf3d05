//! Client side of the `blackd` wire contract.
//!
//! One file is one `POST` request: the body carries the raw file bytes and a
//! handful of `X-*` headers carry the formatting options. The answer is read
//! to completion and mapped onto a [`DaemonResult`] by status code:
//!
//! | status | meaning                               |
//! |--------|---------------------------------------|
//! | 204    | already formatted                     |
//! | 200    | body is new content (or a diff)       |
//! | 400    | body is a syntax error message        |
//! | 500    | body is an internal error message     |
//! | other  | protocol violation, fatal for the run |
//!
//! The network layer sits behind the [`Transport`] trait so the worker pool
//! can be driven by an in-memory fake in tests.

pub mod connection;
pub mod query;

pub use connection::{
    Endpoint, FormatRequest, HttpTransport, RawResponse, Transport, TransportFailure,
};
pub use query::{query, request_headers, DaemonFailure, DaemonResult};
