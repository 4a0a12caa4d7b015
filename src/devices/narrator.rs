use std::path::Path;
use std::process::{Child, Command, Stdio};

use super::Narrator;
use crate::config::SpeechSettings;

/// Shows instructions as captions without producing sound
#[derive(Debug, Default)]
pub struct CaptionNarrator {
    caption: Option<String>,
}

impl Narrator for CaptionNarrator {
    fn speak(&mut self, text: &str) {
        tracing::debug!("caption: {text}");
        self.caption = Some(text.to_string());
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn cancel(&mut self) {
        self.caption = None;
    }

    fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }
}

/// Default speaking rate of espeak-ng and `say`, in words per minute
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Speaks through an external text-to-speech program such as `espeak-ng` or
/// `say`. Pausing stops the utterance; resuming starts it again from the top.
#[derive(Debug)]
pub struct CommandNarrator {
    program: String,
    settings: SpeechSettings,
    caption: Option<String>,
    child: Option<Child>,
    interrupted: bool,
}

impl CommandNarrator {
    pub fn new(program: &str, settings: SpeechSettings) -> Self {
        Self {
            program: program.to_string(),
            settings,
            caption: None,
            child: None,
            interrupted: false,
        }
    }

    /// Arguments for the program, voice settings mapped onto the flags it understands
    pub fn args_for(&self, text: &str) -> Vec<String> {
        let name = Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let wpm = (BASE_WORDS_PER_MINUTE * self.settings.rate).round() as u32;

        let mut args = match name {
            "espeak" | "espeak-ng" => vec![
                "-s".to_string(),
                wpm.to_string(),
                "-p".to_string(),
                ((50.0 * self.settings.pitch).round().clamp(0.0, 99.0) as u32).to_string(),
                "-a".to_string(),
                ((100.0 * self.settings.volume).round().clamp(0.0, 200.0) as u32).to_string(),
            ],
            "say" => vec!["-r".to_string(), wpm.to_string()],
            _ => Vec::new(),
        };
        args.push(text.to_string());
        args
    }

    fn launch(&mut self, text: &str) {
        self.stop_child();
        match Command::new(&self.program)
            .args(self.args_for(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => self.child = Some(child),
            Err(e) => tracing::warn!("could not run speech command {}: {e}", self.program),
        }
    }

    fn is_speaking(&mut self) -> bool {
        matches!(self.child.as_mut().map(|c| c.try_wait()), Some(Ok(None)))
    }

    fn stop_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Narrator for CommandNarrator {
    fn speak(&mut self, text: &str) {
        self.caption = Some(text.to_string());
        self.interrupted = false;
        self.launch(text);
    }

    fn pause(&mut self) {
        if self.is_speaking() {
            self.interrupted = true;
        }
        self.stop_child();
    }

    fn resume(&mut self) {
        if !self.interrupted {
            return;
        }
        self.interrupted = false;
        if let Some(text) = self.caption.clone() {
            self.launch(&text);
        }
    }

    fn cancel(&mut self) {
        self.interrupted = false;
        self.caption = None;
        self.stop_child();
    }

    fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }
}

impl Drop for CommandNarrator {
    fn drop(&mut self) {
        self.stop_child();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_espeak_args_follow_voice_settings() {
        let settings = SpeechSettings {
            rate: 1.2,
            pitch: 1.1,
            volume: 0.8,
        };
        let narrator = CommandNarrator::new("/usr/bin/espeak-ng", settings);
        assert_eq!(
            narrator.args_for("Hello"),
            vec!["-s", "210", "-p", "55", "-a", "80", "Hello"]
        );
    }

    #[test]
    fn test_say_and_unknown_programs() {
        let settings = SpeechSettings {
            rate: 1.0,
            ..SpeechSettings::default()
        };
        let say = CommandNarrator::new("say", settings);
        assert_eq!(say.args_for("Hi"), vec!["-r", "175", "Hi"]);

        let other = CommandNarrator::new("my-tts", SpeechSettings::default());
        assert_eq!(other.args_for("Hi"), vec!["Hi"]);
    }

    #[test]
    fn test_missing_program_still_captions() {
        let mut narrator =
            CommandNarrator::new("voicecoach-no-such-tts-program", SpeechSettings::default());
        narrator.speak("Breathe in");
        assert_eq!(narrator.caption(), Some("Breathe in"));
        narrator.pause();
        narrator.resume();
        narrator.cancel();
        assert_eq!(narrator.caption(), None);
    }

    #[test]
    fn test_caption_narrator_tracks_text() {
        let mut narrator = CaptionNarrator::default();
        assert_eq!(narrator.caption(), None);
        narrator.speak("Step one");
        narrator.speak("Step two");
        assert_eq!(narrator.caption(), Some("Step two"));
        narrator.cancel();
        assert_eq!(narrator.caption(), None);
    }
}
