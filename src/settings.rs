use serde::{Deserialize, Serialize};

use crate::preset::Preset;

/// Configured countdown length for each preset, in whole seconds.
///
/// Serialized with the preset display names as keys, which is the shape the
/// settings document has always been stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfiguration {
    #[serde(rename = "Lock In")]
    pub lock_in: u64,
    #[serde(rename = "Small Break")]
    pub small_break: u64,
    #[serde(rename = "Long Break")]
    pub long_break: u64,
}

impl Default for TimerConfiguration {
    fn default() -> Self {
        Self {
            lock_in: 90 * 60,
            small_break: 20 * 60,
            long_break: 45 * 60,
        }
    }
}

impl TimerConfiguration {
    pub fn duration(&self, preset: Preset) -> u64 {
        match preset {
            Preset::LockIn => self.lock_in,
            Preset::SmallBreak => self.small_break,
            Preset::LongBreak => self.long_break,
        }
    }

    pub fn set_duration(&mut self, preset: Preset, seconds: u64) {
        match preset {
            Preset::LockIn => self.lock_in = seconds,
            Preset::SmallBreak => self.small_break = seconds,
            Preset::LongBreak => self.long_break = seconds,
        }
    }

    pub fn minutes(&self, preset: Preset) -> u64 {
        self.duration(preset) / 60
    }

    /// First preset whose length cannot be counted down in signed seconds
    pub fn out_of_range(&self) -> Option<Preset> {
        Preset::ALL
            .into_iter()
            .find(|p| i64::try_from(self.duration(*p)).is_err())
    }

    pub fn set_minutes(&mut self, preset: Preset, minutes: u64) {
        self.set_duration(preset, minutes.saturating_mul(60));
    }
}
