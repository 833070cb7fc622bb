use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::config::CueSettings;
use crate::error::CueError;
use crate::timer::Cue;

/// Plays the audible cues. Implementations must not block the event loop.
pub trait CuePlayer: Send {
    fn play(&self, cue: Cue) -> Result<(), CueError>;
}

/// Play a cue, logging and swallowing any failure
pub fn play_cue(player: &dyn CuePlayer, cue: Cue) {
    match player.play(cue) {
        Ok(()) => tracing::debug!(%cue, "played cue"),
        Err(e) => tracing::warn!(%cue, error = %e, "cue playback failed"),
    }
}

/// Rings the terminal bell
#[derive(Debug, Default)]
pub struct BellPlayer;

impl CuePlayer for BellPlayer {
    fn play(&self, _cue: Cue) -> Result<(), CueError> {
        let mut out = std::io::stdout();
        out.write_all(b"\x07").map_err(CueError::Bell)?;
        out.flush().map_err(CueError::Bell)
    }
}

#[derive(Debug, Default)]
pub struct SilentPlayer;

impl CuePlayer for SilentPlayer {
    fn play(&self, _cue: Cue) -> Result<(), CueError> {
        Ok(())
    }
}

/// Hands a sound file to an external player program (e.g. `paplay`, `afplay`)
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    sounds: HashMap<Cue, PathBuf>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            sounds: HashMap::new(),
        }
    }

    pub fn with_sound(mut self, cue: Cue, path: impl Into<PathBuf>) -> Self {
        self.sounds.insert(cue, path.into());
        self
    }
}

impl CuePlayer for CommandPlayer {
    fn play(&self, cue: Cue) -> Result<(), CueError> {
        let sound = self.sounds.get(&cue).ok_or(CueError::NoSound(cue))?;

        let mut child = Command::new(&self.program)
            .arg(sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CueError::Spawn { cue, source })?;

        // reap in the background so the loop never waits on audio
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                tracing::warn!(error = %e, "cue player did not exit cleanly");
            }
        });
        Ok(())
    }
}

/// Build the player described by the config
pub fn player_from_settings(settings: &CueSettings) -> Box<dyn CuePlayer> {
    if settings.muted {
        return Box::new(SilentPlayer);
    }

    match &settings.command {
        Some(program) => {
            let mut player = CommandPlayer::new(program.clone());
            if let Some(path) = &settings.lock_in_sound {
                player = player.with_sound(Cue::LockIn, path.clone());
            }
            if let Some(path) = &settings.timer_complete_sound {
                player = player.with_sound(Cue::TimerComplete, path.clone());
            }
            Box::new(player)
        }
        None => Box::new(BellPlayer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn command_player_without_sound_fails() {
        let player = CommandPlayer::new("true");
        assert_matches!(player.play(Cue::LockIn), Err(CueError::NoSound(Cue::LockIn)));
    }

    #[test]
    fn command_player_missing_program_fails() {
        let player = CommandPlayer::new("lockin-definitely-not-a-real-player")
            .with_sound(Cue::TimerComplete, "/tmp/done.wav");
        assert_matches!(
            player.play(Cue::TimerComplete),
            Err(CueError::Spawn { cue: Cue::TimerComplete, .. })
        );
    }

    #[test]
    fn failures_are_swallowed() {
        let player = CommandPlayer::new("true");
        // must not panic
        play_cue(&player, Cue::LockIn);
    }

    #[test]
    fn muted_settings_are_silent() {
        let settings = CueSettings {
            muted: true,
            ..CueSettings::default()
        };
        let player = player_from_settings(&settings);
        assert!(player.play(Cue::LockIn).is_ok());
    }
}
