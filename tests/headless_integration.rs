use std::sync::mpsc;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use lockin::app::{App, Control, Startup};
use lockin::clock::FixedClock;
use lockin::cue::SilentPlayer;
use lockin::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use lockin::settings::TimerConfiguration;
use lockin::store::{MemoryStore, SessionStore};
use lockin::timer::{TimerStatus, TimerVariant};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
}

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn app_with_lock_in(store: &MemoryStore, seconds: u64, variant: TimerVariant) -> App {
    store
        .write_settings(&TimerConfiguration {
            lock_in: seconds,
            small_break: 60,
            long_break: 120,
        })
        .unwrap();
    App::new(
        Startup::load(store),
        variant,
        Box::new(store.clone()),
        Box::new(SilentPlayer),
        Box::new(FixedClock(today())),
    )
}

/// Drive the loop the way the binary does until `done` holds or steps run out
fn drive<F: Fn(&App) -> bool>(
    app: &mut App,
    runner: &mut Runner<TestEventSource, FixedTicker>,
    done: F,
) -> bool {
    for _ in 0..2000u32 {
        match app.handle_event(runner.step()) {
            Control::Quit => return done(app),
            Control::Ticker(command) => runner.apply(command),
            Control::Continue => {}
        }
        if done(app) {
            return true;
        }
    }
    false
}

// A short StopAtZero countdown runs to zero on ticks alone and lands in history.
#[test]
fn headless_countdown_completes_and_saves() {
    let store = MemoryStore::new();
    let mut app = app_with_lock_in(&store, 3, TimerVariant::StopAtZero);

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(5)))
        .with_idle_poll(Duration::from_millis(5));
    tx.send(key(' ')).unwrap();

    assert!(drive(&mut app, &mut runner, |app| !app.history.sessions().is_empty()));
    assert!(!runner.is_armed());
    assert_eq!(app.timer.status(), TimerStatus::Idle);

    let saved = &app.history.sessions()[0];
    assert_eq!(saved.duration, 3);
    assert_eq!(saved.overtime, 0);
    assert!(!saved.is_partial_completion);
    assert_eq!(store.read_sessions_by_date(today()).unwrap().len(), 1);
}

// Overtime accrues after zero and is credited when completed by key.
#[test]
fn headless_overtime_then_complete() {
    let store = MemoryStore::new();
    let mut app = app_with_lock_in(&store, 2, TimerVariant::Overtime);

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(5)))
        .with_idle_poll(Duration::from_millis(5));
    tx.send(key(' ')).unwrap();

    assert!(drive(&mut app, &mut runner, |app| app.timer.state().overtime_seconds >= 3));
    assert!(runner.is_armed());

    tx.send(key('c')).unwrap();
    assert!(drive(&mut app, &mut runner, |app| !app.history.sessions().is_empty()));
    assert!(!runner.is_armed());

    let saved = &app.history.sessions()[0];
    assert_eq!(saved.duration, 2);
    assert!(saved.overtime >= 3);
    assert!(!saved.is_partial_completion);
}

// Pausing disarms the metronome; the remaining time stays put while paused.
#[test]
fn headless_pause_holds_remaining_time() {
    let store = MemoryStore::new();
    let mut app = app_with_lock_in(&store, 600, TimerVariant::Overtime);

    let (tx, rx) = mpsc::channel();
    let mut runner = Runner::new(TestEventSource::new(rx), FixedTicker::new(Duration::from_millis(5)))
        .with_idle_poll(Duration::from_millis(5));
    tx.send(key(' ')).unwrap();
    assert!(drive(&mut app, &mut runner, |app| app.timer.remaining_seconds() <= 597));

    tx.send(key(' ')).unwrap();
    assert!(drive(&mut app, &mut runner, |app| app.timer.status() == TimerStatus::Paused));
    let held = app.timer.remaining_seconds();
    assert!(!runner.is_armed());

    for _ in 0..5 {
        app.handle_event(runner.step());
    }
    assert_eq!(app.timer.remaining_seconds(), held);

    tx.send(key('q')).unwrap();
    let mut quit = false;
    for _ in 0..10 {
        if app.handle_event(runner.step()) == Control::Quit {
            quit = true;
            break;
        }
    }
    assert!(quit);
}
