//! Domain types for pcbus
//!
//! - Signal: the values multiplexed on the shared bus
//! - Recipient: which party a signal belongs to
//! - Envelope: a signal in transit, with its put-back count

pub mod signal;

pub use signal::{Envelope, Recipient, Signal};
