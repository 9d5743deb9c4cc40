//! Bounded FIFO between the producer and the consumer
//!
//! The writing half is owned by the producer, which closes it exactly once.
//! The reading half can tell "empty but open" apart from "empty and closed".

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::error::{PcbusError, Result};

/// Outcome of a non-blocking pop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pop {
    /// A buffered value
    Value(u64),
    /// Nothing buffered, writer still open
    Empty,
    /// Nothing buffered and the writer closed
    Closed,
}

/// Create a queue holding at most `capacity` values
pub fn bounded(capacity: usize) -> Result<(QueueWriter, QueueReader)> {
    if capacity == 0 {
        return Err(PcbusError::InvalidConfig("queue capacity must be positive".to_string()));
    }
    let (tx, rx) = mpsc::channel(capacity);
    Ok((QueueWriter { tx: Some(tx) }, QueueReader { rx }))
}

/// Writing half, held by the producer
#[derive(Debug)]
pub struct QueueWriter {
    tx: Option<mpsc::Sender<u64>>,
}

impl QueueWriter {
    /// Append a value, waiting while the queue is full
    pub async fn push(&self, value: u64) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(PcbusError::QueueClosed)?;
        tx.send(value).await.map_err(|_| PcbusError::QueueDisconnected)
    }

    /// Mark the end of input. Buffered values stay drainable.
    ///
    /// Returns `true` on the call that actually closed the queue.
    pub fn close(&mut self) -> bool {
        self.tx.take().is_some()
    }
}

/// Reading half, held by the consumer
#[derive(Debug)]
pub struct QueueReader {
    rx: mpsc::Receiver<u64>,
}

impl QueueReader {
    /// Take a value without waiting
    pub fn try_pop(&mut self) -> Pop {
        match self.rx.try_recv() {
            Ok(value) => Pop::Value(value),
            Err(TryRecvError::Empty) => Pop::Empty,
            Err(TryRecvError::Disconnected) => Pop::Closed,
        }
    }

    /// Wait for a value. `None` once closed and drained.
    ///
    /// Cancel-safe, so it can sit in a `select!` branch.
    pub async fn pop(&mut self) -> Option<u64> {
        self.rx.recv().await
    }
}
