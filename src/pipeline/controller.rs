//! Controller - turns external command lines into bus signals
//!
//! Accepted tokens (one per line):
//! - `pause-producer` / `p`
//! - `resume-producer` / `P`
//! - `pause-consumer` / `c`
//! - `resume-consumer` / `C`
//! - `terminate` / `b` / `B`
//!
//! Anything else publishes `Signal::None` so the operator can see the bus is
//! alive.

use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::coordination::SignalBus;
use crate::domain::Signal;
use crate::error::Result;

/// Map one command token to the signal it requests
pub fn parse_command(token: &str) -> Signal {
    let token = token.trim();
    match token {
        "p" => return Signal::PauseProducer,
        "P" => return Signal::ResumeProducer,
        "c" => return Signal::PauseConsumer,
        "C" => return Signal::ResumeConsumer,
        "b" | "B" => return Signal::Terminate,
        _ => {}
    }
    match token.to_ascii_lowercase().as_str() {
        "pause-producer" => Signal::PauseProducer,
        "resume-producer" => Signal::ResumeProducer,
        "pause-consumer" => Signal::PauseConsumer,
        "resume-consumer" => Signal::ResumeConsumer,
        "terminate" => Signal::Terminate,
        _ => Signal::None,
    }
}

/// A stream of raw command lines
#[async_trait]
pub trait CommandSource: Send {
    /// Next line, or `None` at end of input
    async fn next_line(&mut self) -> Result<Option<String>>;
}

/// Reads stdin lines on a dedicated thread.
///
/// A blocking stdin read inside the runtime would hold up shutdown, so the
/// thread is left detached and simply dies with the process.
pub struct StdinSource {
    rx: mpsc::UnboundedReceiver<std::io::Result<String>>,
}

impl StdinSource {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx }
    }
}

#[async_trait]
impl CommandSource for StdinSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        match self.rx.recv().await {
            Some(line) => Ok(Some(line?)),
            None => Ok(None),
        }
    }
}

/// A fixed list of command lines.
///
/// A line of the form `sleep <millis>` pauses the script instead of being
/// forwarded.
#[derive(Debug, Clone, Default)]
pub struct ScriptSource {
    lines: VecDeque<String>,
}

impl ScriptSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a script file, skipping blank lines and `#` comments
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string),
        ))
    }

    fn sleep_directive(line: &str) -> Option<Duration> {
        let rest = line.trim().strip_prefix("sleep")?;
        rest.trim().parse::<u64>().ok().map(Duration::from_millis)
    }
}

#[async_trait]
impl CommandSource for ScriptSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        while let Some(line) = self.lines.pop_front() {
            match Self::sleep_directive(&line) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Ok(Some(line)),
            }
        }
        Ok(None)
    }
}

/// Publishes one signal per input line until terminate or end of input
pub struct Controller<S: CommandSource> {
    source: S,
    bus: Arc<SignalBus>,
}

impl<S: CommandSource + 'static> Controller<S> {
    pub fn new(source: S, bus: Arc<SignalBus>) -> Self {
        Self { source, bus }
    }

    /// Returns how many signals were published
    pub async fn run(mut self) -> Result<u64> {
        let mut published = 0;
        while let Some(line) = self.source.next_line().await? {
            let signal = parse_command(&line);
            debug!("controller: {:?} -> {}", line, signal);
            self.bus.publish(signal);
            published += 1;
            if signal == Signal::Terminate {
                info!("controller: terminate requested");
                break;
            }
        }
        Ok(published)
    }

    pub fn spawn(self) -> JoinHandle<Result<u64>> {
        tokio::spawn(self.run())
    }
}
