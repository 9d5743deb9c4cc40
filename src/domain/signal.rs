//! Signal types carried on the shared bus
//!
//! One enum multiplexes pause control, completion notices and termination.
//! Each value has exactly one intended reader; anyone else who pulls it off
//! the bus must put it back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete control or completion signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Signal {
    /// Explicit no-op, published for unrecognized input
    None,
    /// Producer closed the queue and finished
    ProducerDone,
    /// Consumer drained the closed queue and finished
    ConsumerDone,
    /// Suspend the producer
    PauseProducer,
    /// Continue a paused producer
    ResumeProducer,
    /// Suspend the consumer
    PauseConsumer,
    /// Continue a paused consumer
    ResumeConsumer,
    /// Operator asked the run to end
    Terminate,
    /// Process interrupt asked the run to end
    Halt,
}

/// The party a signal is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recipient {
    Producer,
    Consumer,
    Coordinator,
}

impl Signal {
    /// Who is expected to consume this signal
    pub fn recipient(self) -> Recipient {
        match self {
            Signal::PauseProducer | Signal::ResumeProducer => Recipient::Producer,
            Signal::PauseConsumer | Signal::ResumeConsumer => Recipient::Consumer,
            Signal::None
            | Signal::ProducerDone
            | Signal::ConsumerDone
            | Signal::Terminate
            | Signal::Halt => Recipient::Coordinator,
        }
    }

    /// Check if this signal ends the run regardless of completion
    pub fn is_termination(self) -> bool {
        matches!(self, Signal::Terminate | Signal::Halt)
    }

    /// Kebab-case token for this signal
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::None => "none",
            Signal::ProducerDone => "producer-done",
            Signal::ConsumerDone => "consumer-done",
            Signal::PauseProducer => "pause-producer",
            Signal::ResumeProducer => "resume-producer",
            Signal::PauseConsumer => "pause-consumer",
            Signal::ResumeConsumer => "resume-consumer",
            Signal::Terminate => "terminate",
            Signal::Halt => "halt",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signal in transit on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub signal: Signal,
    /// Times this envelope was put back by a reader it was not meant for
    pub hops: u32,
}

impl Envelope {
    /// Wrap a freshly published signal
    pub fn new(signal: Signal) -> Self {
        Self { signal, hops: 0 }
    }

    /// Who should end up holding this envelope
    pub fn recipient(&self) -> Recipient {
        self.signal.recipient()
    }

    /// The envelope as it re-enters the bus after a put-back
    pub fn bounced(self) -> Self {
        Self {
            signal: self.signal,
            hops: self.hops.saturating_add(1),
        }
    }
}
