use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

use crate::progress::ProgressEvent;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum CoachEvent {
    Key(KeyEvent),
    Resize,
    /// UI tick, produced when nothing else arrived within the tick interval
    Tick,
    /// One second of a session timer
    SessionTick { generation: u64 },
    Progress(ProgressEvent),
}

impl From<ProgressEvent> for CoachEvent {
    fn from(event: ProgressEvent) -> Self {
        CoachEvent::Progress(event)
    }
}

/// Source of application events
pub trait CoachEventSource {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<CoachEvent, RecvTimeoutError>;
}

/// The application event channel. Background producers (terminal reader,
/// session timers, progress worker) hold clones of `sender()`.
pub struct ChannelEventSource {
    tx: Sender<CoachEvent>,
    rx: Receiver<CoachEvent>,
}

impl ChannelEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<CoachEvent> {
        self.tx.clone()
    }

    /// Forward terminal input into the channel from a background thread
    pub fn spawn_terminal_reader(&self) -> std::io::Result<()> {
        let tx = self.sender();
        std::thread::Builder::new()
            .name("terminal-reader".to_string())
            .spawn(move || loop {
                let evt = match event::read() {
                    Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                        CoachEvent::Key(key)
                    }
                    Ok(CtEvent::Resize(_, _)) => CoachEvent::Resize,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::error!("terminal input failed: {e}");
                        break;
                    }
                };
                if tx.send(evt).is_err() {
                    break;
                }
            })?;
        Ok(())
    }
}

impl Default for ChannelEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CoachEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CoachEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: CoachEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: CoachEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn event_source(&self) -> &E {
        &self.event_source
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> CoachEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                CoachEvent::Tick
            }
        }
    }
}
