use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Everything the app loop reacts to
#[derive(Clone, Debug)]
pub enum TypingEvent {
    Key(KeyEvent),
    Resize,
    /// Redraw timeout with nothing else pending
    Tick,
    /// One wall-clock second of the session clock elapsed
    Second,
}

/// Source of terminal and timer events
pub trait TypingEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<TypingEvent, RecvTimeoutError>;

    /// Handle for producers other than the terminal, such as the session clock
    fn sender(&self) -> Sender<TypingEvent>;
}

/// Production event source: a reader thread forwarding crossterm events
pub struct CrosstermEventSource {
    tx: Sender<TypingEvent>,
    rx: Receiver<TypingEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader = tx.clone();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => reader.send(TypingEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => reader.send(TypingEvent::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    log::error!("terminal event reader stopped: {e}");
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TypingEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TypingEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<TypingEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
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

/// Channel-fed event source for headless runs
pub struct TestEventSource {
    tx: Sender<TypingEvent>,
    rx: Receiver<TypingEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TypingEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TypingEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<TypingEvent> {
        self.tx.clone()
    }
}

/// Periodic `Second` events for one session.
///
/// Stops on `cancel` or when dropped; cancelling more than once is harmless.
#[derive(Debug)]
pub struct ScheduledTick {
    cancelled: Arc<AtomicBool>,
}

impl ScheduledTick {
    pub fn start(tx: Sender<TypingEvent>, every: Duration) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        std::thread::spawn(move || loop {
            std::thread::sleep(every);
            if flag.load(Ordering::SeqCst) || tx.send(TypingEvent::Second).is_err() {
                break;
            }
        });

        Self { cancelled }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for ScheduledTick {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: TypingEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: TypingEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn sender(&self) -> Sender<TypingEvent> {
        self.event_source.sender()
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> TypingEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                TypingEvent::Tick
            }
        }
    }
}
