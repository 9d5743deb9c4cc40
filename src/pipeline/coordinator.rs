//! Coordinator - the single authority on when the run is over
//!
//! Owns the two completion flags. Exits once both sides reported done, or
//! immediately on terminate/halt. Signals it does not own go back on the bus,
//! since their recipient may be parked in a pause sub-loop waiting for them.

use std::sync::Arc;

use log::{debug, info};

use crate::coordination::SignalBus;
use crate::domain::{Envelope, Recipient, Signal};

/// Completion flags; each flips to true at most once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionFlags {
    pub producer_done: bool,
    pub consumer_done: bool,
}

impl CompletionFlags {
    pub fn all_done(&self) -> bool {
        self.producer_done && self.consumer_done
    }
}

/// Why the coordinator stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Both sides reported done
    Completed,
    /// A termination signal arrived first
    Terminated(Signal),
}

/// What to do after observing one envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    PutBack(Envelope),
    Exit(ExitReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorReport {
    pub exit: ExitReason,
    pub flags: CompletionFlags,
    /// Signals read off the bus, including ones put back
    pub observed: u64,
}

pub struct Coordinator {
    bus: Arc<SignalBus>,
    flags: CompletionFlags,
    observed: u64,
}

impl Coordinator {
    pub fn new(bus: Arc<SignalBus>) -> Self {
        Self {
            bus,
            flags: CompletionFlags::default(),
            observed: 0,
        }
    }

    pub fn flags(&self) -> CompletionFlags {
        self.flags
    }

    /// Apply one envelope to the completion flags
    pub fn observe(&mut self, envelope: Envelope) -> Step {
        self.observed += 1;
        debug!("coordinator: signal = {}", envelope.signal);
        if envelope.signal.is_termination() {
            return Step::Exit(ExitReason::Terminated(envelope.signal));
        }
        if envelope.recipient() != Recipient::Coordinator {
            return Step::PutBack(envelope);
        }
        match envelope.signal {
            Signal::ProducerDone => self.flags.producer_done = true,
            Signal::ConsumerDone => self.flags.consumer_done = true,
            _ => {}
        }
        if self.flags.all_done() {
            Step::Exit(ExitReason::Completed)
        } else {
            Step::Continue
        }
    }

    /// Read the bus until the run is over
    pub async fn run(mut self) -> CoordinatorReport {
        let exit = loop {
            let envelope = self.bus.recv().await;
            match self.observe(envelope) {
                Step::Continue => {}
                Step::PutBack(envelope) => self.bus.put_back(envelope).await,
                Step::Exit(reason) => break reason,
            }
        };
        info!("coordinator: exit {:?} with {:?}", exit, self.flags);
        CoordinatorReport {
            exit,
            flags: self.flags,
            observed: self.observed,
        }
    }
}
