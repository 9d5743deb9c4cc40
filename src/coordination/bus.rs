//! The shared signal bus
//!
//! A single never-closed FIFO of envelopes read and written by every party.
//! Readers take whatever is at the head. A reader that pulls a signal meant
//! for someone else must hand it back with [`SignalBus::put_back`]; the bus
//! itself never drops anything.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use log::trace;
use tokio::sync::Notify;

use crate::domain::{Envelope, Signal};

/// Counters describing bus traffic since creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Fresh signals published
    pub published: u64,
    /// Envelopes handed back by a non-recipient
    pub put_back: u64,
    /// Highest hop count any envelope reached
    pub max_hops: u32,
}

#[derive(Debug, Default)]
struct BusInner {
    queue: VecDeque<Envelope>,
    stats: BusStats,
}

/// Multi-reader, multi-writer signal channel
#[derive(Debug, Default)]
pub struct SignalBus {
    inner: Mutex<BusInner>,
    notify: Notify,
    backoff: Duration,
}

impl SignalBus {
    /// Create a bus that yields to the scheduler after each put-back
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bus that sleeps `backoff` after each put-back
    pub fn with_backoff(backoff: Duration) -> Self {
        Self {
            backoff,
            ..Self::default()
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BusInner> {
        // The guarded section never panics, so a poisoned lock still holds a consistent queue.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enqueue(&self, envelope: Envelope) {
        self.lock().queue.push_back(envelope);
        self.notify.notify_one();
    }

    /// Publish a fresh signal. Never blocks.
    pub fn publish(&self, signal: Signal) {
        self.lock().stats.published += 1;
        self.enqueue(Envelope::new(signal));
    }

    /// Take the head envelope if one is pending
    pub fn try_recv(&self) -> Option<Envelope> {
        self.lock().queue.pop_front()
    }

    /// Wait for the next envelope.
    ///
    /// Cancel-safe: an envelope is only removed on the poll that returns it.
    pub async fn recv(&self) -> Envelope {
        loop {
            if let Some(envelope) = self.try_recv() {
                return envelope;
            }
            self.notify.notified().await;
        }
    }

    /// Return an envelope that the caller is not the recipient of.
    ///
    /// The envelope goes to the tail and one waiting reader is woken. The
    /// caller then steps aside (yield or backoff) so the woken reader gets a
    /// chance to claim it before the caller reads again.
    pub async fn put_back(&self, envelope: Envelope) {
        let bounced = envelope.bounced();
        {
            let mut inner = self.lock();
            inner.stats.put_back += 1;
            inner.stats.max_hops = inner.stats.max_hops.max(bounced.hops);
        }
        trace!("bus: put back {} (hops={})", bounced.signal, bounced.hops);
        self.enqueue(bounced);

        if self.backoff.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.backoff).await;
        }
    }

    /// Number of envelopes currently waiting
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn stats(&self) -> BusStats {
        self.lock().stats
    }
}
