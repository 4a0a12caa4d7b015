//! Microphone capture and spoken instructions.
//!
//! A session acquires its devices when it is created and releases them when
//! it is dropped. Every handle is a trait object so sessions can run against
//! the in-memory doubles in `memory`.

pub mod capture;
pub mod memory;
pub mod narrator;

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;

pub use capture::NoMicrophone;
pub use memory::{DeviceCall, DeviceLog, MemoryDevices};
pub use narrator::{CaptionNarrator, CommandNarrator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Paused,
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("no input device available: {0}")]
    Unavailable(String),
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),
    #[error("audio stream error: {0}")]
    Stream(String),
    #[error("could not write recording: {0}")]
    Encode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Audio captured during a session
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// WAV file, when the samples were written to disk
    pub path: Option<PathBuf>,
    pub duration: Duration,
    pub samples: usize,
}

/// An acquired microphone. Dropping it releases the input stream.
pub trait Recorder {
    fn start(&mut self) -> Result<(), DeviceError>;
    fn pause(&mut self);
    fn resume(&mut self);
    /// Stop capturing and hand back what was recorded
    fn stop(&mut self) -> Result<Option<Recording>, DeviceError>;
}

/// Speaks instructions aloud, or at least shows them
pub trait Narrator {
    /// Replace whatever is being said with `text`
    fn speak(&mut self, text: &str);
    fn pause(&mut self);
    fn resume(&mut self);
    fn cancel(&mut self);
    /// The instruction currently being narrated
    fn caption(&self) -> Option<&str>;
}

/// Hands out the devices for one session
pub trait DeviceProvider {
    fn microphone(&self) -> Result<Box<dyn Recorder>, DeviceError>;
    fn narrator(&self) -> Box<dyn Narrator>;
}

/// Devices for the interactive app, chosen from the config
#[derive(Debug, Clone)]
pub struct SystemDevices {
    record_audio: bool,
    recordings_dir: PathBuf,
    speech_command: Option<String>,
    speech: crate::config::SpeechSettings,
}

impl SystemDevices {
    pub fn from_config(config: &Config, recordings_dir: PathBuf) -> Self {
        Self {
            record_audio: config.record_audio,
            recordings_dir,
            speech_command: config.speech_command.clone(),
            speech: config.speech,
        }
    }
}

impl DeviceProvider for SystemDevices {
    fn microphone(&self) -> Result<Box<dyn Recorder>, DeviceError> {
        if !self.record_audio {
            return NoMicrophone::new("recording disabled").open();
        }
        capture::default_microphone(&self.recordings_dir)
    }

    fn narrator(&self) -> Box<dyn Narrator> {
        match &self.speech_command {
            Some(program) => Box::new(CommandNarrator::new(program, self.speech)),
            None => Box::new(CaptionNarrator::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_disabled_recording_yields_no_microphone() {
        let config = Config {
            record_audio: false,
            ..Config::default()
        };
        let devices = SystemDevices::from_config(&config, PathBuf::from("/tmp"));
        assert_matches!(devices.microphone().err(), Some(DeviceError::Unavailable(_)));
    }

    #[test]
    fn test_narrator_defaults_to_captions() {
        let devices = SystemDevices::from_config(&Config::default(), PathBuf::from("/tmp"));
        let mut narrator = devices.narrator();
        narrator.speak("Take a deep breath");
        assert_eq!(narrator.caption(), Some("Take a deep breath"));
    }
}
