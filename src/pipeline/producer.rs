//! Producer - publishes 1..=total onto the queue
//!
//! After every push the producer peeks at the bus without blocking, so an
//! empty bus never slows production down. Finishing closes the queue first
//! and only then announces completion.

use log::{debug, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::coordination::{PauseGate, SideState};
use crate::error::Result;
use crate::pipeline::queue::QueueWriter;

pub struct Producer {
    total: u64,
    queue: QueueWriter,
    gate: PauseGate,
    progress: watch::Sender<u64>,
}

impl Producer {
    pub fn new(total: u64, queue: QueueWriter, gate: PauseGate, progress: watch::Sender<u64>) -> Self {
        Self {
            total,
            queue,
            gate,
            progress,
        }
    }

    /// Produce every item, then close the queue and publish the done signal.
    ///
    /// Returns the number of items pushed.
    pub async fn run(mut self) -> Result<u64> {
        info!("producer: start producing {} numbers", self.total);
        self.gate.set_state(SideState::Running);

        for num in 1..=self.total {
            debug!("producer: {} -> queue", num);
            self.queue.push(num).await?;
            self.progress.send_replace(num);
            self.gate.check().await;
        }

        info!("producer: closing queue");
        self.queue.close();
        self.gate.bus().publish(self.gate.side().done_signal());
        self.gate.set_state(SideState::Terminated);
        Ok(self.total)
    }

    pub fn spawn(self) -> JoinHandle<Result<u64>> {
        tokio::spawn(self.run())
    }
}
