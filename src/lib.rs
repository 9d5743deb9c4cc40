//! pcbus - a bounded producer/consumer pipeline steered over one signal bus
//!
//! A single shared bus carries pause/resume requests for either side,
//! completion notices and termination. Every reader that pulls a signal meant
//! for someone else puts it back, so nothing on the bus is ever lost.

pub mod cli;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;
pub mod pipeline;

pub use error::{PcbusError, Result};
