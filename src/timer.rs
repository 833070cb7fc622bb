use serde::{Deserialize, Serialize};

use crate::preset::Preset;
use crate::settings::TimerConfiguration;

/// Whether a Lock In countdown keeps running past zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerVariant {
    /// Lock In counts into negative time and accrues overtime until completed
    #[default]
    Overtime,
    /// Every preset stops and completes when it reaches zero
    StopAtZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Overtime,
    OvertimePaused,
}

/// Audible cue requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Cue {
    #[strum(serialize = "lock-in")]
    LockIn,
    #[strum(serialize = "timer-complete")]
    TimerComplete,
}

/// The accounting for a finished Lock In countdown, before it gets a date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedSession {
    pub preset: Preset,
    pub duration: u64,
    pub overtime: u64,
    pub is_partial_completion: bool,
}

/// Side effects a transition asks its owner to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ArmTicker,
    DisarmTicker,
    Play(Cue),
    Persist(CompletedSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Select(Preset),
    Start,
    Pause,
    Toggle,
    Tick,
    Complete,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub active_preset: Preset,
    pub remaining_seconds: i64,
    pub status: TimerStatus,
    pub overtime_seconds: u64,
    pub original_duration: u64,
}

/// Countdown/overtime state machine. Transitions never perform I/O; they
/// return the effects the caller must apply.
#[derive(Debug, Clone)]
pub struct TimerMachine {
    config: TimerConfiguration,
    variant: TimerVariant,
    state: TimerState,
}

impl TimerMachine {
    pub fn new(config: TimerConfiguration, variant: TimerVariant) -> Self {
        let preset = Preset::default();
        let duration = config.duration(preset);
        Self {
            config,
            variant,
            state: TimerState {
                active_preset: preset,
                remaining_seconds: signed(duration),
                status: TimerStatus::Idle,
                overtime_seconds: 0,
                original_duration: duration,
            },
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn config(&self) -> &TimerConfiguration {
        &self.config
    }

    pub fn active_preset(&self) -> Preset {
        self.state.active_preset
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.state.remaining_seconds
    }

    pub fn status(&self) -> TimerStatus {
        self.state.status
    }

    pub fn configured_duration(&self, preset: Preset) -> u64 {
        self.config.duration(preset)
    }

    /// True while the ticker should be armed
    pub fn is_running(&self) -> bool {
        matches!(self.state.status, TimerStatus::Running | TimerStatus::Overtime)
    }

    pub fn in_overtime(&self) -> bool {
        matches!(
            self.state.status,
            TimerStatus::Overtime | TimerStatus::OvertimePaused
        )
    }

    /// A countdown exists that complete/reset would act on
    pub fn has_progress(&self) -> bool {
        self.state.status != TimerStatus::Idle
    }

    /// Elapsed and original seconds of a paused countdown that has not hit
    /// overtime yet.
    pub fn partial_progress(&self) -> Option<(u64, u64)> {
        if self.state.status != TimerStatus::Paused {
            return None;
        }
        let original = self.state.original_duration;
        let elapsed = signed(original) - self.state.remaining_seconds;
        (elapsed > 0).then_some((elapsed as u64, original))
    }

    fn overtime_capable(&self) -> bool {
        self.variant == TimerVariant::Overtime && self.state.active_preset.is_lock_in()
    }

    pub fn handle(&mut self, event: TimerEvent) -> Vec<Effect> {
        match event {
            TimerEvent::Select(preset) => self.select(preset),
            TimerEvent::Start => self.start(),
            TimerEvent::Pause => self.pause(),
            TimerEvent::Toggle => self.toggle(),
            TimerEvent::Tick => self.tick(),
            TimerEvent::Complete => self.complete(),
            TimerEvent::Reset => self.reset(),
        }
    }

    pub fn select(&mut self, preset: Preset) -> Vec<Effect> {
        let effects = self.stop_effects();
        self.state.active_preset = preset;
        self.go_idle();
        effects
    }

    pub fn start(&mut self) -> Vec<Effect> {
        match self.state.status {
            TimerStatus::Idle => {
                let duration = self.config.duration(self.state.active_preset);
                self.state.original_duration = duration;
                self.state.remaining_seconds = signed(duration);
                self.state.status = TimerStatus::Running;

                let mut effects = vec![Effect::ArmTicker];
                if self.state.active_preset.is_lock_in() {
                    effects.push(Effect::Play(Cue::LockIn));
                }
                effects
            }
            TimerStatus::Paused => {
                self.state.status = TimerStatus::Running;
                vec![Effect::ArmTicker]
            }
            TimerStatus::OvertimePaused => {
                self.state.status = TimerStatus::Overtime;
                vec![Effect::ArmTicker]
            }
            TimerStatus::Running | TimerStatus::Overtime => vec![],
        }
    }

    pub fn pause(&mut self) -> Vec<Effect> {
        match self.state.status {
            TimerStatus::Running => {
                self.state.status = TimerStatus::Paused;
                vec![Effect::DisarmTicker]
            }
            TimerStatus::Overtime => {
                self.state.status = TimerStatus::OvertimePaused;
                vec![Effect::DisarmTicker]
            }
            _ => vec![],
        }
    }

    pub fn toggle(&mut self) -> Vec<Effect> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn tick(&mut self) -> Vec<Effect> {
        if !self.is_running() {
            return vec![];
        }

        self.state.remaining_seconds -= 1;
        let remaining = self.state.remaining_seconds;

        if self.state.status == TimerStatus::Overtime {
            self.state.overtime_seconds = remaining.unsigned_abs();
            return vec![];
        }

        if self.overtime_capable() {
            if remaining < 0 {
                self.state.status = TimerStatus::Overtime;
                self.state.overtime_seconds = remaining.unsigned_abs();
                return vec![Effect::Play(Cue::TimerComplete)];
            }
            return vec![];
        }

        if remaining > 0 {
            return vec![];
        }

        let mut effects = vec![Effect::DisarmTicker, Effect::Play(Cue::TimerComplete)];
        if self.state.active_preset.is_lock_in() {
            effects.push(Effect::Persist(CompletedSession {
                preset: self.state.active_preset,
                duration: self.state.original_duration,
                overtime: 0,
                is_partial_completion: false,
            }));
        }
        self.go_idle();
        effects
    }

    pub fn complete(&mut self) -> Vec<Effect> {
        if self.state.status == TimerStatus::Idle {
            return vec![];
        }

        let mut effects = self.stop_effects();
        if self.state.active_preset.is_lock_in() {
            effects.push(Effect::Persist(self.completion_record()));
        }
        self.go_idle();
        effects
    }

    pub fn reset(&mut self) -> Vec<Effect> {
        let effects = self.stop_effects();
        self.go_idle();
        effects
    }

    /// Swap in new configured durations. Only an idle timer picks up the new
    /// length; a started countdown keeps the anchor it captured.
    pub fn apply_configuration(&mut self, config: TimerConfiguration) {
        self.config = config;
        if self.state.status == TimerStatus::Idle {
            self.go_idle();
        }
    }

    fn completion_record(&self) -> CompletedSession {
        let original = self.state.original_duration;
        let remaining = self.state.remaining_seconds;
        let preset = self.state.active_preset;

        if self.in_overtime() {
            CompletedSession {
                preset,
                duration: original,
                overtime: self.state.overtime_seconds,
                is_partial_completion: false,
            }
        } else if remaining < signed(original) {
            CompletedSession {
                preset,
                duration: (signed(original) - remaining) as u64,
                overtime: 0,
                is_partial_completion: true,
            }
        } else {
            CompletedSession {
                preset,
                duration: original,
                overtime: 0,
                is_partial_completion: false,
            }
        }
    }

    fn stop_effects(&self) -> Vec<Effect> {
        if self.is_running() {
            vec![Effect::DisarmTicker]
        } else {
            vec![]
        }
    }

    fn go_idle(&mut self) {
        let duration = self.config.duration(self.state.active_preset);
        self.state.status = TimerStatus::Idle;
        self.state.remaining_seconds = signed(duration);
        self.state.original_duration = duration;
        self.state.overtime_seconds = 0;
    }
}

/// Durations past `i64::MAX` saturate instead of wrapping into overtime
fn signed(seconds: u64) -> i64 {
    i64::try_from(seconds).unwrap_or(i64::MAX)
}
