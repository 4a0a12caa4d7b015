use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::catalog::Exercise;
use crate::devices::{DeviceProvider, Narrator, Recorder, Recording, RecordingState};
use crate::progress::{ExerciseData, ExerciseStatus, ProgressClient, ProgressEvent};
use crate::runtime::CoachEvent;
use crate::scoring::{completion_points, duration_minutes, exercise_session_score};
use crate::scripts::{script_for, ExerciseScript, PracticeContent};
use crate::timer::IntervalTimer;

/// Timer generations are unique across runners so a tick queued for an
/// unmounted session can never be mistaken for one of its successor's.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    Instructions,
    Running,
    Paused,
    Completed,
}

/// Summary handed to the owner once a session is completed
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReport {
    pub exercise: Exercise,
    pub duration_minutes: u64,
    pub score: f64,
    pub time_spent_secs: u64,
    pub progress_percent: f64,
    /// whether the backend accepted the completion update
    pub recorded: bool,
    pub recording: Option<Recording>,
}

impl CompletionReport {
    /// Body of the completion update
    pub fn exercise_data(&self) -> ExerciseData {
        ExerciseData {
            duration: Some(self.duration_minutes),
            score: Some(self.score),
            points: completion_points(self.score),
            exercise_type: Some(self.exercise.exercise_type),
            difficulty: Some(self.exercise.difficulty),
            time_spent: Some(self.time_spent_secs),
            progress: Some(self.progress_percent),
            ..ExerciseData::status_update(self.exercise.id, ExerciseStatus::Completed)
        }
    }
}

/// Drives one exercise: instructions, timed steps, recording and narration.
///
/// Devices are acquired when the runner is created and released when it is
/// dropped, whatever phase it is in.
pub struct SessionRunner {
    exercise: Exercise,
    script: &'static ExerciseScript,
    phase: SessionPhase,
    step_index: usize,
    elapsed_secs: u64,
    progress_percent: f64,
    recording_state: RecordingState,
    recorder: Option<Box<dyn Recorder>>,
    narrator: Box<dyn Narrator>,
    timer: Option<IntervalTimer>,
    generation: Option<u64>,
    tick: Duration,
    events: Sender<CoachEvent>,
    progress: ProgressClient,
    report: Option<CompletionReport>,
}

impl SessionRunner {
    pub fn new(
        exercise: Exercise,
        devices: &dyn DeviceProvider,
        progress: ProgressClient,
        events: Sender<CoachEvent>,
        tick: Duration,
    ) -> Self {
        let recorder = match devices.microphone() {
            Ok(recorder) => Some(recorder),
            Err(e) => {
                tracing::warn!("continuing without recording: {e}");
                None
            }
        };

        Self {
            script: script_for(exercise.exercise_type),
            exercise,
            phase: SessionPhase::Instructions,
            step_index: 0,
            elapsed_secs: 0,
            progress_percent: 0.0,
            recording_state: RecordingState::Idle,
            recorder,
            narrator: devices.narrator(),
            timer: None,
            generation: None,
            tick,
            events,
            progress,
            report: None,
        }
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn step_count(&self) -> usize {
        self.script.step_count()
    }

    pub fn steps(&self) -> &'static [&'static str] {
        self.script.steps
    }

    pub fn current_step(&self) -> &'static str {
        self.script.step(self.step_index).unwrap_or_default()
    }

    pub fn is_last_step(&self) -> bool {
        self.step_index + 1 >= self.step_count()
    }

    pub fn practice(&self) -> &'static PracticeContent {
        &self.script.practice
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    pub fn recording_state(&self) -> RecordingState {
        self.recording_state
    }

    pub fn has_microphone(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn caption(&self) -> Option<&str> {
        self.narrator.caption()
    }

    /// Score the session would get if completed now
    pub fn current_score(&self) -> f64 {
        exercise_session_score(&self.exercise, self.progress_percent, self.elapsed_secs)
    }

    pub fn report(&self) -> Option<&CompletionReport> {
        self.report.as_ref()
    }

    /// Generation of the running timer; ticks from any other generation are stale
    pub fn timer_generation(&self) -> Option<u64> {
        self.generation
    }

    pub fn start(&mut self) -> bool {
        if self.phase != SessionPhase::Instructions {
            return false;
        }

        self.phase = SessionPhase::Running;
        self.step_index = 0;
        self.elapsed_secs = 0;
        self.progress_percent = 0.0;
        self.start_timer();

        if let Some(recorder) = self.recorder.as_mut() {
            match recorder.start() {
                Ok(()) => self.recording_state = RecordingState::Recording,
                Err(e) => tracing::warn!("recording did not start: {e}"),
            }
        }

        let first = format!("Starting {}. {}", self.exercise.title, self.current_step());
        self.narrator.speak(&first);
        tracing::info!(exercise_id = self.exercise.id, "session started");
        true
    }

    /// Count one second if the tick belongs to the running timer
    pub fn on_tick(&mut self, generation: u64) -> bool {
        if self.phase != SessionPhase::Running || self.generation != Some(generation) {
            return false;
        }
        self.elapsed_secs += 1;
        true
    }

    /// Move to the next step, or complete after the last one
    pub fn advance_step(&mut self) -> Option<CompletionReport> {
        if self.phase != SessionPhase::Running {
            return None;
        }

        if self.is_last_step() {
            return self.complete();
        }

        self.step_index += 1;
        self.progress_percent = (self.step_index + 1) as f64 / self.step_count() as f64 * 100.0;
        let step = self.current_step();
        self.narrator.speak(step);
        None
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }

        self.stop_timer();
        if self.recording_state == RecordingState::Recording {
            if let Some(recorder) = self.recorder.as_mut() {
                recorder.pause();
            }
            self.recording_state = RecordingState::Paused;
        }
        self.narrator.pause();
        self.phase = SessionPhase::Paused;
        tracing::debug!(elapsed = self.elapsed_secs, "session paused");
        true
    }

    /// Continue counting from the preserved elapsed time
    pub fn resume(&mut self) -> bool {
        if self.phase != SessionPhase::Paused {
            return false;
        }

        self.phase = SessionPhase::Running;
        self.start_timer();
        if self.recording_state == RecordingState::Paused {
            if let Some(recorder) = self.recorder.as_mut() {
                recorder.resume();
            }
            self.recording_state = RecordingState::Recording;
        }
        self.narrator.resume();
        tracing::debug!(elapsed = self.elapsed_secs, "session resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            SessionPhase::Running => self.pause(),
            SessionPhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Finish the session and submit it. Only the first call from Running or
    /// Paused does anything; the report is also delivered later as a
    /// `ProgressEvent::CompletionRecorded` once the backend has answered.
    pub fn complete(&mut self) -> Option<CompletionReport> {
        if !matches!(self.phase, SessionPhase::Running | SessionPhase::Paused) {
            return None;
        }
        self.phase = SessionPhase::Completed;
        self.stop_timer();

        let recording = self.stop_recording();
        self.narrator.cancel();

        let report = CompletionReport {
            exercise: self.exercise.clone(),
            duration_minutes: duration_minutes(self.elapsed_secs),
            score: self.current_score(),
            time_spent_secs: self.elapsed_secs,
            progress_percent: self.progress_percent,
            recorded: false,
            recording,
        };
        tracing::info!(
            exercise_id = self.exercise.id,
            score = report.score,
            elapsed = report.time_spent_secs,
            "session completed"
        );

        if let Err(e) = self
            .progress
            .record_completion(report.exercise_data(), report.clone())
        {
            tracing::warn!("could not queue completion: {e}");
            let event = ProgressEvent::CompletionRecorded(report.clone());
            let _ = self.events.send(event.into());
        }

        self.report = Some(report.clone());
        Some(report)
    }

    fn start_timer(&mut self) {
        self.stop_timer();
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        match IntervalTimer::start(self.tick, self.events.clone(), move || {
            CoachEvent::SessionTick { generation }
        }) {
            Ok(timer) => {
                self.timer = Some(timer);
                self.generation = Some(generation);
            }
            Err(e) => tracing::error!("could not start session timer: {e}"),
        }
    }

    fn stop_timer(&mut self) {
        self.generation = None;
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn stop_recording(&mut self) -> Option<Recording> {
        if self.recording_state == RecordingState::Idle {
            return None;
        }
        self.recording_state = RecordingState::Idle;
        match self.recorder.as_mut()?.stop() {
            Ok(recording) => recording,
            Err(e) => {
                tracing::warn!("could not save recording: {e}");
                None
            }
        }
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        self.stop_timer();
        self.narrator.cancel();
        self.recorder.take();
    }
}
