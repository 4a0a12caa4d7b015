use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{DeviceError, DeviceProvider, Narrator, Recorder, Recording};

/// What a device double was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    MicrophoneAcquired,
    RecordStart,
    RecordPause,
    RecordResume,
    RecordStop,
    MicrophoneReleased,
    Speak(String),
    SpeechPause,
    SpeechResume,
    SpeechCancel,
}

/// Shared, ordered record of device calls
#[derive(Debug, Clone, Default)]
pub struct DeviceLog(Arc<Mutex<Vec<DeviceCall>>>);

impl DeviceLog {
    pub fn push(&self, call: DeviceCall) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DeviceCall::Speak(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &DeviceCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

/// Device provider whose handles only write to a `DeviceLog`
#[derive(Debug, Clone, Default)]
pub struct MemoryDevices {
    pub log: DeviceLog,
    /// microphone cannot be acquired
    pub deny_microphone: bool,
    /// microphone is acquired but refuses to start
    pub fail_start: bool,
}

impl MemoryDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_microphone() -> Self {
        Self {
            deny_microphone: true,
            ..Self::default()
        }
    }
}

impl DeviceProvider for MemoryDevices {
    fn microphone(&self) -> Result<Box<dyn Recorder>, DeviceError> {
        if self.deny_microphone {
            return Err(DeviceError::PermissionDenied("denied by test".to_string()));
        }
        self.log.push(DeviceCall::MicrophoneAcquired);
        Ok(Box::new(MemoryRecorder {
            log: self.log.clone(),
            fail_start: self.fail_start,
            active: false,
        }))
    }

    fn narrator(&self) -> Box<dyn Narrator> {
        Box::new(MemoryNarrator {
            log: self.log.clone(),
            caption: None,
        })
    }
}

struct MemoryRecorder {
    log: DeviceLog,
    fail_start: bool,
    active: bool,
}

impl Recorder for MemoryRecorder {
    fn start(&mut self) -> Result<(), DeviceError> {
        if self.fail_start {
            return Err(DeviceError::Stream("start refused".to_string()));
        }
        self.active = true;
        self.log.push(DeviceCall::RecordStart);
        Ok(())
    }

    fn pause(&mut self) {
        self.log.push(DeviceCall::RecordPause);
    }

    fn resume(&mut self) {
        self.log.push(DeviceCall::RecordResume);
    }

    fn stop(&mut self) -> Result<Option<Recording>, DeviceError> {
        self.log.push(DeviceCall::RecordStop);
        if !std::mem::take(&mut self.active) {
            return Ok(None);
        }
        Ok(Some(Recording {
            path: None,
            duration: Duration::ZERO,
            samples: 0,
        }))
    }
}

impl Drop for MemoryRecorder {
    fn drop(&mut self) {
        self.log.push(DeviceCall::MicrophoneReleased);
    }
}

struct MemoryNarrator {
    log: DeviceLog,
    caption: Option<String>,
}

impl Narrator for MemoryNarrator {
    fn speak(&mut self, text: &str) {
        self.caption = Some(text.to_string());
        self.log.push(DeviceCall::Speak(text.to_string()));
    }

    fn pause(&mut self) {
        self.log.push(DeviceCall::SpeechPause);
    }

    fn resume(&mut self) {
        self.log.push(DeviceCall::SpeechResume);
    }

    fn cancel(&mut self) {
        self.caption = None;
        self.log.push(DeviceCall::SpeechCancel);
    }

    fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }
}
