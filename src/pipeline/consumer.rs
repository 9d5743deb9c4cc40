//! Consumer - drains the queue until it is closed
//!
//! Waits on the queue and the bus at the same time. Branch selection is
//! unbiased, so a steady stream of items cannot starve pause handling and a
//! chatty bus cannot starve draining. While paused, nothing is drained.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace};
use tokio::task::JoinHandle;

use crate::coordination::{PauseGate, SideState};
use crate::error::Result;
use crate::pipeline::queue::QueueReader;

pub struct Consumer {
    queue: QueueReader,
    gate: PauseGate,
    idle_poll: Duration,
    consumed: Vec<u64>,
}

impl Consumer {
    /// `idle_poll` of zero disables the idle observation timer
    pub fn new(queue: QueueReader, gate: PauseGate, idle_poll: Duration) -> Self {
        Self {
            queue,
            gate,
            idle_poll,
            consumed: Vec::new(),
        }
    }

    /// Consume until the queue is closed and drained, then publish the done signal.
    ///
    /// Returns every consumed item in arrival order.
    pub async fn run(mut self) -> Result<Vec<u64>> {
        info!("consumer: start consuming (idle poll {:?})", self.idle_poll);
        self.gate.set_state(SideState::Running);
        let bus = Arc::clone(self.gate.bus());
        let idle_enabled = !self.idle_poll.is_zero();

        loop {
            tokio::select! {
                envelope = bus.recv() => {
                    self.gate.on_signal(envelope).await;
                }
                item = self.queue.pop() => match item {
                    Some(num) => self.process(num),
                    None => {
                        info!("consumer: queue closed");
                        break;
                    }
                },
                _ = tokio::time::sleep(self.idle_poll), if idle_enabled => {
                    trace!("consumer: queue empty");
                }
            }
        }

        bus.publish(self.gate.side().done_signal());
        self.gate.set_state(SideState::Terminated);
        Ok(self.consumed)
    }

    fn process(&mut self, num: u64) {
        debug!("consumer: queue -> {}", num);
        self.consumed.push(num);
    }

    pub fn spawn(self) -> JoinHandle<Result<Vec<u64>>> {
        tokio::spawn(self.run())
    }
}
