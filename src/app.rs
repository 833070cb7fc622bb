use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::cue::{play_cue, CuePlayer};
use crate::preset::Preset;
use crate::report::{first_of_month, shift_month, History, MonthCalendar, PeriodStats, StatsPeriod};
use crate::runtime::{AppEvent, TickerCommand};
use crate::session::{NewSession, Session};
use crate::settings::TimerConfiguration;
use crate::store::SessionStore;
use crate::sync::{SyncJob, SyncOutcome, SyncWorker};
use crate::timer::{CompletedSession, Effect, TimerEvent, TimerMachine, TimerVariant};

/// Longest minutes value the settings form accepts per field
const MAX_MINUTE_DIGITS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Timer,
    Report,
    Stats,
}

/// Result of feeding one input to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Ticker(TickerCommand),
    Quit,
}

impl From<Option<TickerCommand>> for Control {
    fn from(command: Option<TickerCommand>) -> Self {
        command.map_or(Control::Continue, Control::Ticker)
    }
}

/// Editable copy of the three preset lengths, in whole minutes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub fields: [String; 3],
    pub selected: usize,
    pub error: Option<String>,
}

impl SettingsForm {
    pub fn from_config(config: &TimerConfiguration) -> Self {
        Self {
            fields: Preset::ALL.map(|p| config.minutes(p).to_string()),
            selected: 0,
            error: None,
        }
    }

    pub fn selected_preset(&self) -> Preset {
        Preset::ALL[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.fields.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + self.fields.len() - 1) % self.fields.len();
    }

    pub fn push_digit(&mut self, digit: char) {
        let field = &mut self.fields[self.selected];
        if digit.is_ascii_digit() && field.len() < MAX_MINUTE_DIGITS {
            field.push(digit);
            self.error = None;
        }
    }

    pub fn backspace(&mut self) {
        self.fields[self.selected].pop();
        self.error = None;
    }

    /// Build the configuration the form describes, or say which field is bad
    pub fn to_config(&self) -> Result<TimerConfiguration, String> {
        let mut config = TimerConfiguration::default();
        for (preset, field) in Preset::ALL.iter().zip(&self.fields) {
            match field.parse::<u64>() {
                Ok(minutes) if minutes > 0 => config.set_minutes(*preset, minutes),
                _ => return Err(format!("{preset} needs at least 1 minute")),
            }
        }
        Ok(config)
    }
}

/// What the store had at launch, with defaults filled in
#[derive(Debug, Clone, PartialEq)]
pub struct Startup {
    pub config: TimerConfiguration,
    pub sessions: Vec<Session>,
}

impl Startup {
    /// Read settings and history once. Missing settings are written back as
    /// defaults; read failures degrade to defaults and an empty history.
    pub fn load(store: &dyn SessionStore) -> Self {
        let config = match store.read_settings() {
            Ok(Some(config)) => config,
            Ok(None) => {
                let config = TimerConfiguration::default();
                if let Err(e) = store.write_settings(&config) {
                    tracing::warn!(error = %e, "could not store default timer settings");
                }
                config
            }
            Err(e) => {
                tracing::error!(error = %e, "could not read timer settings, using defaults");
                TimerConfiguration::default()
            }
        };

        let sessions = match store.read_all_sessions() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!(error = %e, "could not read session history");
                Vec::new()
            }
        };

        tracing::info!(?config, sessions = sessions.len(), "loaded startup state");
        Self { config, sessions }
    }
}

pub struct App {
    pub timer: TimerMachine,
    pub history: History,
    pub view: View,
    pub report_month: NaiveDate,
    pub stats_period: StatsPeriod,
    pub settings_form: Option<SettingsForm>,
    pending_syncs: usize,
    clock: Box<dyn Clock>,
    cues: Box<dyn CuePlayer>,
    sync: SyncWorker,
}

impl App {
    pub fn new(
        startup: Startup,
        variant: TimerVariant,
        store: Box<dyn SessionStore>,
        cues: Box<dyn CuePlayer>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let today = clock.today();
        Self {
            timer: TimerMachine::new(startup.config, variant),
            history: History::new(startup.sessions),
            view: View::Timer,
            report_month: first_of_month(today),
            stats_period: StatsPeriod::default(),
            settings_form: None,
            pending_syncs: 0,
            clock,
            cues,
            sync: SyncWorker::spawn(store),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Jobs handed to the sync worker whose outcome has not come back yet
    pub fn pending_syncs(&self) -> usize {
        self.pending_syncs
    }

    pub fn is_syncing(&self) -> bool {
        self.pending_syncs > 0
    }

    /// Number shown next to the timer for the Lock In about to run
    pub fn next_session_number(&self) -> usize {
        self.history.lock_in_count() + 1
    }

    pub fn period_stats(&self) -> PeriodStats {
        self.history.period_stats(self.stats_period, self.today())
    }

    pub fn month_calendar(&self) -> MonthCalendar {
        self.history.month_calendar(self.report_month)
    }

    /// Run one timer transition and carry out what it asks for
    pub fn dispatch(&mut self, event: TimerEvent) -> Option<TickerCommand> {
        let effects = self.timer.handle(event);
        let mut command = None;
        for effect in effects {
            match effect {
                Effect::ArmTicker => command = Some(TickerCommand::Arm),
                Effect::DisarmTicker => command = Some(TickerCommand::Disarm),
                Effect::Play(cue) => play_cue(self.cues.as_ref(), cue),
                Effect::Persist(done) => self.persist(done),
            }
        }
        command
    }

    pub fn on_tick(&mut self) -> Option<TickerCommand> {
        self.dispatch(TimerEvent::Tick)
    }

    /// Feed one runtime event, then pick up any finished sync jobs
    pub fn handle_event(&mut self, event: AppEvent) -> Control {
        let control = match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Tick => self.on_tick().into(),
            AppEvent::Resize | AppEvent::Wake => Control::Continue,
        };
        self.drain_sync();
        control
    }

    fn persist(&mut self, done: CompletedSession) {
        let session = NewSession::from_completion(self.today(), &done);
        tracing::info!(duration = session.duration, overtime = session.overtime,
            partial = session.is_partial_completion, "lock in finished");
        if self.sync.submit(SyncJob::SaveSession(session)) {
            self.pending_syncs += 1;
        }
    }

    fn save_settings(&mut self, config: TimerConfiguration) {
        if self.sync.submit(SyncJob::SaveSettings(config)) {
            self.pending_syncs += 1;
        }
    }

    /// Apply every sync outcome that has arrived. Returns whether anything changed.
    pub fn drain_sync(&mut self) -> bool {
        let mut changed = false;
        while let Some(outcome) = self.sync.try_recv() {
            self.apply_outcome(outcome);
            changed = true;
        }
        changed
    }

    /// Block until all submitted jobs have reported back or `timeout` passes
    pub fn wait_for_sync(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending_syncs > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return false;
            }
            match self.sync.recv_timeout(left) {
                Some(outcome) => self.apply_outcome(outcome),
                None => return false,
            }
        }
        true
    }

    fn apply_outcome(&mut self, outcome: SyncOutcome) {
        self.pending_syncs = self.pending_syncs.saturating_sub(1);
        match outcome {
            SyncOutcome::SessionSaved(session) => self.history.push(session),
            SyncOutcome::SessionFailed(session, e) => {
                tracing::warn!(error = %e, date = %session.date, duration = session.duration,
                    "dropping session that could not be saved");
            }
            SyncOutcome::SettingsSaved(config) => self.timer.apply_configuration(config),
            SyncOutcome::SettingsFailed(config, e) => {
                tracing::warn!(error = %e, ?config, "timer settings were not saved");
            }
        }
    }

    pub fn open_settings(&mut self) {
        self.settings_form = Some(SettingsForm::from_config(self.timer.config()));
    }

    /// Validate and queue the form. The form stays open on bad input.
    pub fn submit_settings(&mut self) {
        let Some(form) = self.settings_form.as_mut() else {
            return;
        };
        match form.to_config() {
            Ok(config) => {
                self.settings_form = None;
                self.save_settings(config);
            }
            Err(message) => form.error = Some(message),
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        if self.settings_form.is_some() {
            self.on_settings_key(key);
            return Control::Continue;
        }

        match self.view {
            View::Timer => self.on_timer_key(key),
            View::Report => {
                match key.code {
                    KeyCode::Left => self.report_month = shift_month(self.report_month, -1),
                    KeyCode::Right => self.report_month = shift_month(self.report_month, 1),
                    KeyCode::Char('q') => return Control::Quit,
                    KeyCode::Esc | KeyCode::Char('p') => self.view = View::Timer,
                    _ => {}
                }
                Control::Continue
            }
            View::Stats => {
                match key.code {
                    KeyCode::Char(c @ '1'..='3') => {
                        self.stats_period = StatsPeriod::ALL[c as usize - '1' as usize];
                    }
                    KeyCode::Char('q') => return Control::Quit,
                    KeyCode::Esc | KeyCode::Char('t') => self.view = View::Timer,
                    _ => {}
                }
                Control::Continue
            }
        }
    }

    fn on_timer_key(&mut self, key: KeyEvent) -> Control {
        let event = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char(' ') => TimerEvent::Toggle,
            KeyCode::Char('c') => TimerEvent::Complete,
            KeyCode::Char('r') => TimerEvent::Reset,
            KeyCode::Char(c @ '1'..='3') => TimerEvent::Select(Preset::ALL[c as usize - '1' as usize]),
            KeyCode::Char('p') => {
                self.report_month = first_of_month(self.today());
                self.view = View::Report;
                return Control::Continue;
            }
            KeyCode::Char('t') => {
                self.view = View::Stats;
                return Control::Continue;
            }
            KeyCode::Char('s') => {
                self.open_settings();
                return Control::Continue;
            }
            _ => return Control::Continue,
        };
        self.dispatch(event).into()
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.settings_form = None,
            KeyCode::Enter => self.submit_settings(),
            _ => {
                if let Some(form) = self.settings_form.as_mut() {
                    match key.code {
                        KeyCode::Up | KeyCode::BackTab => form.select_previous(),
                        KeyCode::Down | KeyCode::Tab => form.select_next(),
                        KeyCode::Backspace => form.backspace(),
                        KeyCode::Char(c) => form.push_digit(c),
                        _ => {}
                    }
                }
            }
        }
    }
}
