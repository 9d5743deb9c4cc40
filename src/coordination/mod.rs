//! Signal coordination
//!
//! The shared bus and the pause/resume discipline that every reader of the
//! bus follows.

pub mod bus;
pub mod pause;

pub use bus::{BusStats, SignalBus};
pub use pause::{PauseGate, Reaction, Side, SideState, react};
