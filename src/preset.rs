use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the three named countdowns
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    strum_macros::Display,
)]
pub enum Preset {
    #[default]
    #[serde(rename = "Lock In")]
    #[strum(serialize = "Lock In")]
    LockIn,
    #[serde(rename = "Small Break")]
    #[strum(serialize = "Small Break")]
    SmallBreak,
    #[serde(rename = "Long Break")]
    #[strum(serialize = "Long Break")]
    LongBreak,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::LockIn, Preset::SmallBreak, Preset::LongBreak];

    pub fn is_lock_in(&self) -> bool {
        matches!(self, Preset::LockIn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset '{0}'")]
pub struct UnknownPreset(pub String);

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.to_string() == s)
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}
