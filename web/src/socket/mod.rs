//! Websocket HTTP handler for the web layer.
//!
//! This module contains the Axum upgrade handler and the adapters that let a
//! websocket act as a session's connection. The session lifecycle itself
//! (Manager, ConnectionRegistry, Session) lives in the `hub` crate.

pub mod handler;
pub(crate) mod transport;
