//! Pause/resume discipline shared by the producer and the consumer
//!
//! Both sides react to signals the same way, keyed to their own pair of
//! pause/resume values:
//! - own pause while running: enter a blocking sub-loop on the bus until the
//!   own resume arrives; repeated own pauses collapse into one
//! - own resume while running: stray, ignored
//! - anything else: not ours, put it back

use std::fmt;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::watch;

use crate::coordination::bus::SignalBus;
use crate::domain::{Envelope, Recipient, Signal};

/// Which end of the pipeline a gate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Producer,
    Consumer,
}

impl Side {
    /// Bus address of this side
    pub fn recipient(self) -> Recipient {
        match self {
            Side::Producer => Recipient::Producer,
            Side::Consumer => Recipient::Consumer,
        }
    }

    pub fn pause_signal(self) -> Signal {
        match self {
            Side::Producer => Signal::PauseProducer,
            Side::Consumer => Signal::PauseConsumer,
        }
    }

    pub fn resume_signal(self) -> Signal {
        match self {
            Side::Producer => Signal::ResumeProducer,
            Side::Consumer => Signal::ResumeConsumer,
        }
    }

    /// Completion notice this side publishes when it finishes
    pub fn done_signal(self) -> Signal {
        match self {
            Side::Producer => Signal::ProducerDone,
            Side::Consumer => Signal::ConsumerDone,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Producer => f.write_str("producer"),
            Side::Consumer => f.write_str("consumer"),
        }
    }
}

/// Observable lifecycle of one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SideState {
    /// Not started yet
    #[default]
    Idle,
    Running,
    /// Inside the pause sub-loop
    Paused,
    /// Finished and published its done signal
    Terminated,
}

/// What a running side should do with a signal it just read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Pause,
    Ignore,
    PutBack,
}

/// Decide how `side` reacts to `signal` while running
pub fn react(side: Side, signal: Signal) -> Reaction {
    if signal.recipient() != side.recipient() {
        Reaction::PutBack
    } else if signal == side.pause_signal() {
        Reaction::Pause
    } else {
        Reaction::Ignore
    }
}

/// Applies the pause discipline for one side and reports its state
pub struct PauseGate {
    side: Side,
    bus: Arc<SignalBus>,
    state: watch::Sender<SideState>,
}

impl PauseGate {
    pub fn new(side: Side, bus: Arc<SignalBus>, state: watch::Sender<SideState>) -> Self {
        Self { side, bus, state }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn bus(&self) -> &Arc<SignalBus> {
        &self.bus
    }

    /// Record a lifecycle transition
    pub fn set_state(&self, state: SideState) {
        self.state.send_replace(state);
    }

    pub fn state(&self) -> SideState {
        *self.state.borrow()
    }

    /// React to a signal read while running.
    ///
    /// Returns only when the side may continue its normal work.
    pub async fn on_signal(&self, envelope: Envelope) {
        debug!("{}: signal = {}", self.side, envelope.signal);
        match react(self.side, envelope.signal) {
            Reaction::Pause => self.hold().await,
            Reaction::Ignore => {}
            Reaction::PutBack => self.bus.put_back(envelope).await,
        }
    }

    /// Poll the bus once without blocking and react to whatever is there
    pub async fn check(&self) {
        if let Some(envelope) = self.bus.try_recv() {
            self.on_signal(envelope).await;
        }
    }

    /// The pause sub-loop: block on the bus until our resume arrives.
    async fn hold(&self) {
        info!("{}: paused", self.side);
        self.set_state(SideState::Paused);

        loop {
            let envelope = self.bus.recv().await;
            debug!("{}/paused: signal = {}", self.side, envelope.signal);
            if envelope.recipient() != self.side.recipient() {
                self.bus.put_back(envelope).await;
            } else if envelope.signal == self.side.resume_signal() {
                break;
            }
        }

        self.set_state(SideState::Running);
        info!("{}: resumed", self.side);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn gate(side: Side) -> (PauseGate, Arc<SignalBus>, watch::Receiver<SideState>) {
        let bus = Arc::new(SignalBus::new());
        let (tx, rx) = watch::channel(SideState::Running);
        (PauseGate::new(side, Arc::clone(&bus), tx), bus, rx)
    }

    #[test]
    fn test_side_signals() {
        assert_eq!(Side::Producer.pause_signal(), Signal::PauseProducer);
        assert_eq!(Side::Producer.resume_signal(), Signal::ResumeProducer);
        assert_eq!(Side::Producer.done_signal(), Signal::ProducerDone);
        assert_eq!(Side::Consumer.pause_signal(), Signal::PauseConsumer);
        assert_eq!(Side::Consumer.resume_signal(), Signal::ResumeConsumer);
        assert_eq!(Side::Consumer.done_signal(), Signal::ConsumerDone);
        assert_eq!(Side::Producer.recipient(), Signal::PauseProducer.recipient());
        assert_eq!(Side::Consumer.recipient(), Signal::ResumeConsumer.recipient());
    }

    #[test]
    fn test_react_table() {
        assert_eq!(react(Side::Producer, Signal::PauseProducer), Reaction::Pause);
        assert_eq!(react(Side::Producer, Signal::ResumeProducer), Reaction::Ignore);
        assert_eq!(react(Side::Producer, Signal::PauseConsumer), Reaction::PutBack);
        assert_eq!(react(Side::Producer, Signal::Terminate), Reaction::PutBack);
        assert_eq!(react(Side::Producer, Signal::None), Reaction::PutBack);
        assert_eq!(react(Side::Consumer, Signal::PauseConsumer), Reaction::Pause);
        assert_eq!(react(Side::Consumer, Signal::ResumeConsumer), Reaction::Ignore);
        assert_eq!(react(Side::Consumer, Signal::ProducerDone), Reaction::PutBack);
    }

    #[test]
    fn test_react_puts_back_everything_addressed_elsewhere() {
        let signals = [
            Signal::None,
            Signal::ProducerDone,
            Signal::ConsumerDone,
            Signal::PauseProducer,
            Signal::ResumeProducer,
            Signal::PauseConsumer,
            Signal::ResumeConsumer,
            Signal::Terminate,
            Signal::Halt,
        ];
        for side in [Side::Producer, Side::Consumer] {
            for signal in signals {
                let own = signal.recipient() == side.recipient();
                assert_eq!(react(side, signal) == Reaction::PutBack, !own, "{side} / {signal}");
            }
        }
    }

    #[tokio::test]
    async fn test_check_without_signal_does_not_block() {
        let (gate, bus, _rx) = gate(Side::Producer);
        timeout(Duration::from_millis(50), gate.check()).await.unwrap();
        assert_eq!(bus.stats().put_back, 0);
    }

    #[tokio::test]
    async fn test_stray_resume_is_consumed() {
        let (gate, bus, rx) = gate(Side::Producer);
        bus.publish(Signal::ResumeProducer);
        gate.check().await;
        assert_eq!(bus.pending(), 0);
        assert_eq!(*rx.borrow(), SideState::Running);
    }

    #[tokio::test]
    async fn test_foreign_signal_is_put_back() {
        let (gate, bus, _rx) = gate(Side::Producer);
        bus.publish(Signal::PauseConsumer);
        gate.check().await;

        let env = bus.try_recv().unwrap();
        assert_eq!(env.signal, Signal::PauseConsumer);
        assert_eq!(env.hops, 1);
    }

    #[tokio::test]
    async fn test_pause_blocks_until_resume() {
        let (gate, bus, mut rx) = gate(Side::Consumer);
        bus.publish(Signal::PauseConsumer);

        let task = tokio::spawn(async move {
            gate.check().await;
        });

        timeout(Duration::from_secs(1), rx.wait_for(|s| *s == SideState::Paused))
            .await
            .unwrap()
            .unwrap();
        assert!(!task.is_finished());

        bus.publish(Signal::ResumeConsumer);
        timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
        assert_eq!(*rx.borrow(), SideState::Running);
    }

    #[tokio::test]
    async fn test_double_pause_needs_single_resume() {
        let (gate, bus, _rx) = gate(Side::Producer);
        bus.publish(Signal::PauseProducer);
        bus.publish(Signal::PauseProducer);
        bus.publish(Signal::ResumeProducer);

        timeout(Duration::from_secs(1), gate.check()).await.unwrap();
        assert_eq!(gate.state(), SideState::Running);
        assert_eq!(bus.pending(), 0);
    }

    #[tokio::test]
    async fn test_paused_side_puts_back_foreign_signals() {
        let (gate, bus, _rx) = gate(Side::Producer);
        bus.publish(Signal::PauseProducer);
        bus.publish(Signal::Terminate);
        bus.publish(Signal::ResumeProducer);

        timeout(Duration::from_secs(1), gate.check()).await.unwrap();

        let env = bus.try_recv().unwrap();
        assert_eq!(env.signal, Signal::Terminate);
        assert_eq!(env.hops, 1);
        assert!(bus.try_recv().is_none());
    }
}
