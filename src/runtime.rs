use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// How long an unarmed runner waits for input before waking the loop
pub const IDLE_POLL: Duration = Duration::from_millis(250);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// One countdown second has elapsed
    Tick,
    /// Nothing happened; lets the loop drain sync outcomes
    Wake,
}

/// What the event loop should do with its metronome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerCommand {
    Arm,
    Disarm,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "terminal event reader stopped");
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
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

    pub fn seconds() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time.
///
/// The countdown metronome is a single deadline: arming an armed runner
/// keeps the existing deadline, so there is never more than one tick source.
/// Deadlines advance by whole intervals, so input arriving between ticks
/// does not stretch the countdown.
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    idle_poll: Duration,
    next_tick: Option<Instant>,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            idle_poll: IDLE_POLL,
            next_tick: None,
        }
    }

    pub fn with_idle_poll(mut self, idle_poll: Duration) -> Self {
        self.idle_poll = idle_poll;
        self
    }

    pub fn arm(&mut self) {
        if self.next_tick.is_none() {
            self.next_tick = Some(Instant::now() + self.ticker.interval());
        }
    }

    pub fn disarm(&mut self) {
        self.next_tick = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn apply(&mut self, command: TickerCommand) {
        match command {
            TickerCommand::Arm => self.arm(),
            TickerCommand::Disarm => self.disarm(),
        }
    }

    /// Blocks until the next event or tick deadline. Returns Tick when an
    /// armed deadline passes and Wake when an unarmed wait times out.
    pub fn step(&mut self) -> AppEvent {
        let now = Instant::now();
        let timeout = match self.next_tick {
            Some(deadline) if deadline <= now => return self.expire(),
            Some(deadline) => deadline - now,
            None => self.idle_poll,
        };

        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.expire(),
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(timeout);
                self.expire()
            }
        }
    }

    fn expire(&mut self) -> AppEvent {
        match self.next_tick {
            Some(deadline) if Instant::now() >= deadline => {
                self.next_tick = Some(deadline + self.ticker.interval());
                AppEvent::Tick
            }
            _ => AppEvent::Wake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::mpsc;

    #[test]
    fn step_returns_wake_when_unarmed() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let mut runner = Runner::new(es, ticker).with_idle_poll(Duration::from_millis(1));

        match runner.step() {
            AppEvent::Wake => {}
            other => panic!("expected Wake while unarmed, got {other:?}"),
        }
    }

    #[test]
    fn step_returns_tick_when_armed() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let mut runner = Runner::new(es, ticker);
        runner.arm();

        match runner.step() {
            AppEvent::Tick => {}
            other => panic!("expected Tick on deadline, got {other:?}"),
        }
        assert!(runner.is_armed());
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let mut runner = Runner::new(es, ticker);

        match runner.step() {
            AppEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn arm_twice_keeps_one_deadline() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let mut runner = Runner::new(es, FixedTicker::new(Duration::from_secs(60)));
        runner.arm();
        let first = runner.next_tick;
        std::thread::sleep(Duration::from_millis(2));
        runner.arm();
        assert_eq!(runner.next_tick, first);
    }

    #[test]
    fn apply_maps_commands() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = Runner::new(TestEventSource::new(rx), FixedTicker::seconds());
        runner.apply(TickerCommand::Arm);
        assert!(runner.is_armed());
        runner.apply(TickerCommand::Disarm);
        assert!(!runner.is_armed());
    }

    #[test]
    fn disarm_stops_ticks() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let mut runner = Runner::new(es, ticker).with_idle_poll(Duration::from_millis(5));
        runner.arm();
        runner.disarm();
        assert!(!runner.is_armed());

        for _ in 0..3 {
            assert!(matches!(runner.step(), AppEvent::Wake));
        }
    }

    #[test]
    fn keys_do_not_delay_ticks() {
        let (tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let mut runner = Runner::new(es, FixedTicker::new(Duration::from_millis(30)));
        runner.arm();
        let deadline = runner.next_tick.unwrap();

        for _ in 0..3 {
            tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)))
                .unwrap();
            assert!(matches!(runner.step(), AppEvent::Key(_)));
        }
        assert_eq!(runner.next_tick, Some(deadline));

        loop {
            if let AppEvent::Tick = runner.step() {
                break;
            }
        }
        assert_eq!(runner.next_tick, Some(deadline + Duration::from_millis(30)));
    }
}
