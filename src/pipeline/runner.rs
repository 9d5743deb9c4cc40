//! Pipeline runner - wires the four parties together for one run
//!
//! All shared state lives in the queue halves and the bus handed to each task
//! at spawn time. The queue's writer goes to the producer only, so it is the
//! only party that can close it.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::watch;

use crate::coordination::{BusStats, PauseGate, Side, SideState, SignalBus};
use crate::error::{PcbusError, Result};
use crate::pipeline::controller::{CommandSource, Controller};
use crate::pipeline::consumer::Consumer;
use crate::pipeline::coordinator::{CompletionFlags, Coordinator, ExitReason};
use crate::pipeline::producer::Producer;
use crate::pipeline::queue;

/// Parameters for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub capacity: usize,
    pub total: u64,
    /// Zero disables the consumer's idle observation timer
    pub idle_poll: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: 3,
            total: 10,
            idle_poll: Duration::ZERO,
        }
    }
}

impl PipelineConfig {
    pub fn new(capacity: usize, total: u64) -> Self {
        Self {
            capacity,
            total,
            ..Self::default()
        }
    }

    pub fn with_idle_poll(mut self, idle_poll: Duration) -> Self {
        self.idle_poll = idle_poll;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(PcbusError::InvalidConfig("capacity must be positive".to_string()));
        }
        if self.total == 0 {
            return Err(PcbusError::InvalidConfig("total must be positive".to_string()));
        }
        Ok(())
    }
}

/// Read-only views of a run in progress
#[derive(Debug, Clone)]
pub struct PipelineMonitor {
    pub producer: watch::Receiver<SideState>,
    pub consumer: watch::Receiver<SideState>,
    /// Number of items the producer has pushed so far
    pub produced: watch::Receiver<u64>,
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub exit: ExitReason,
    pub flags: CompletionFlags,
    pub produced: u64,
    /// Items in consumption order; `None` when the run was cut short
    pub consumed: Option<Vec<u64>>,
    pub bus: BusStats,
}

pub struct Pipeline {
    config: PipelineConfig,
    bus: Arc<SignalBus>,
    producer_state: watch::Sender<SideState>,
    consumer_state: watch::Sender<SideState>,
    progress: watch::Sender<u64>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, bus: Arc<SignalBus>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            bus,
            producer_state: watch::Sender::new(SideState::Idle),
            consumer_state: watch::Sender::new(SideState::Idle),
            progress: watch::Sender::new(0),
        })
    }

    pub fn bus(&self) -> Arc<SignalBus> {
        Arc::clone(&self.bus)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn monitor(&self) -> PipelineMonitor {
        PipelineMonitor {
            producer: self.producer_state.subscribe(),
            consumer: self.consumer_state.subscribe(),
            produced: self.progress.subscribe(),
        }
    }

    /// Run producer, consumer and controller as tasks and coordinate on this one.
    ///
    /// On a terminate/halt exit the remaining tasks are aborted rather than
    /// awaited.
    pub async fn run<S: CommandSource + 'static>(self, source: S) -> Result<RunReport> {
        let Self {
            config,
            bus,
            producer_state,
            consumer_state,
            progress,
        } = self;
        info!(
            "pipeline: capacity={} total={} idle_poll={:?}",
            config.capacity, config.total, config.idle_poll
        );

        let (writer, reader) = queue::bounded(config.capacity)?;
        let produced = progress.subscribe();

        let consumer = Consumer::new(
            reader,
            PauseGate::new(Side::Consumer, Arc::clone(&bus), consumer_state),
            config.idle_poll,
        )
        .spawn();
        let producer = Producer::new(
            config.total,
            writer,
            PauseGate::new(Side::Producer, Arc::clone(&bus), producer_state),
            progress,
        )
        .spawn();
        let controller = Controller::new(source, Arc::clone(&bus)).spawn();

        let report = Coordinator::new(Arc::clone(&bus)).run().await;
        controller.abort();

        let consumed = match report.exit {
            ExitReason::Completed => {
                producer.await??;
                Some(consumer.await??)
            }
            ExitReason::Terminated(signal) => {
                warn!("pipeline: {} received, abandoning producer and consumer", signal);
                producer.abort();
                consumer.abort();
                None
            }
        };

        let produced = *produced.borrow();
        Ok(RunReport {
            exit: report.exit,
            flags: report.flags,
            produced,
            consumed,
            bus: bus.stats(),
        })
    }
}
