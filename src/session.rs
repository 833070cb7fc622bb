use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::preset::Preset;
use crate::timer::CompletedSession;

/// A session record before the store has assigned it an id and timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: Preset,
    pub duration: u64,
    pub completed: bool,
    #[serde(default)]
    pub overtime: u64,
    #[serde(default)]
    pub is_partial_completion: bool,
}

impl NewSession {
    pub fn from_completion(date: NaiveDate, completion: &CompletedSession) -> Self {
        Self {
            date,
            kind: completion.preset,
            duration: completion.duration,
            completed: true,
            overtime: completion.overtime,
            is_partial_completion: completion.is_partial_completion,
        }
    }
}

/// A persisted focus session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: Preset,
    pub duration: u64,
    pub completed: bool,
    #[serde(default)]
    pub overtime: u64,
    #[serde(default)]
    pub is_partial_completion: bool,
    pub timestamp: DateTime<Local>,
}

impl Session {
    pub fn from_new(id: String, new: NewSession, timestamp: DateTime<Local>) -> Self {
        Self {
            id,
            date: new.date,
            kind: new.kind,
            duration: new.duration,
            completed: new.completed,
            overtime: new.overtime,
            is_partial_completion: new.is_partial_completion,
            timestamp,
        }
    }

    /// Only completed Lock In sessions count towards reports
    pub fn counts_for_reporting(&self) -> bool {
        self.kind.is_lock_in() && self.completed
    }

    /// Seconds credited to the session's day
    pub fn credited_seconds(&self) -> u64 {
        self.duration + self.overtime
    }
}
