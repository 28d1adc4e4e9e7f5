#![forbid(unsafe_code)]

//! Core protocol and event-pipeline library for a Synergy/Deskflow remote-
//! input client: wire codec, stream parser, key-code translation, the
//! client state machine, the single-worker dispatcher, and per-code
//! handlers. Concrete virtual-device backends are out of scope here; see
//! [`device`] for the contracts a backend must implement.

pub mod client;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod keymap;
pub mod parser;
pub mod wire;

pub use client::{Client, ClientState};
pub use config::Config;
pub use error::{ClientError, DeviceError, Result, StopReason, WireError};
