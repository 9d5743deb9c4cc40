//! The producer/consumer pipeline and the parties that steer it
//!
//! - queue: bounded FIFO carrying the payload
//! - producer / consumer: the two ends, both pausable over the bus
//! - controller: external commands onto the bus
//! - coordinator: completion tracking and termination
//! - runner: one run, wired end to end
//! - baseline: the same pipeline with no bus at all

pub mod baseline;
pub mod consumer;
pub mod controller;
pub mod coordinator;
pub mod producer;
pub mod queue;
pub mod runner;

pub use baseline::run_baseline;
pub use consumer::Consumer;
pub use controller::{CommandSource, Controller, ScriptSource, StdinSource, parse_command};
pub use coordinator::{CompletionFlags, Coordinator, CoordinatorReport, ExitReason, Step};
pub use producer::Producer;
pub use queue::{Pop, QueueReader, QueueWriter, bounded};
pub use runner::{Pipeline, PipelineConfig, PipelineMonitor, RunReport};
