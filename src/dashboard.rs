use std::sync::mpsc::Sender;
use std::time::Instant;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::catalog::{Catalog, CatalogFilter, Exercise};
use crate::config::Config;
use crate::devices::DeviceProvider;
use crate::progress::{
    AnalysisOutcome, ExerciseStatus, ProgressClient, ProgressEvent, ProgressSnapshot,
};
use crate::runtime::CoachEvent;
use crate::session::{CompletionReport, SessionPhase, SessionRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Session,
    Summary,
}

/// Blocking message; every other key is ignored until it is dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub report: CompletionReport,
    /// None while the analysis is outstanding
    pub analysis: Option<Result<AnalysisOutcome, String>>,
}

/// The application shell: progress overview, catalog browser and the
/// currently mounted exercise.
pub struct Dashboard {
    config: Config,
    catalog: Catalog,
    filter: CatalogFilter,
    visible: Vec<usize>,
    selected: usize,
    snapshot: Option<ProgressSnapshot>,
    fetch_error: Option<String>,
    updated_at: Option<DateTime<Local>>,
    last_refresh: Option<Instant>,
    progress: ProgressClient,
    events: Sender<CoachEvent>,
    devices: Box<dyn DeviceProvider>,
    runner: Option<SessionRunner>,
    summary: Option<SessionSummary>,
    alert: Option<Alert>,
    view: View,
    should_quit: bool,
}

impl Dashboard {
    pub fn new(
        config: Config,
        catalog: Catalog,
        progress: ProgressClient,
        events: Sender<CoachEvent>,
        devices: Box<dyn DeviceProvider>,
    ) -> Self {
        let filter = CatalogFilter::new(&config.default_difficulty, &config.default_type);
        let mut dashboard = Self {
            config,
            catalog,
            filter,
            visible: Vec::new(),
            selected: 0,
            snapshot: None,
            fetch_error: None,
            updated_at: None,
            last_refresh: None,
            progress,
            events,
            devices,
            runner: None,
            summary: None,
            alert: None,
            view: View::Dashboard,
            should_quit: false,
        };
        dashboard.update_visible();
        dashboard
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn snapshot(&self) -> Option<&ProgressSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    pub fn runner(&self) -> Option<&SessionRunner> {
        self.runner.as_ref()
    }

    pub fn runner_mut(&mut self) -> Option<&mut SessionRunner> {
        self.runner.as_mut()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Exercises passing the current filter, in catalog order
    pub fn visible_exercises(&self) -> impl Iterator<Item = &Exercise> + '_ {
        self.visible
            .iter()
            .filter_map(|&i| self.catalog.exercises().get(i))
    }

    pub fn selected_exercise(&self) -> Option<&Exercise> {
        self.visible
            .get(self.selected)
            .and_then(|&i| self.catalog.exercises().get(i))
    }

    /// Status from the latest snapshot; Locked until one has arrived
    pub fn status_of(&self, exercise_id: u32) -> ExerciseStatus {
        self.snapshot
            .as_ref()
            .map_or(ExerciseStatus::Locked, |s| s.status_of(exercise_id))
    }

    /// Fetch progress now; the next periodic refresh is scheduled from here
    pub fn refresh(&mut self, now: Instant) {
        self.last_refresh = Some(now);
        if let Err(e) = self.progress.fetch() {
            tracing::error!("progress refresh not queued: {e}");
        }
    }

    /// Periodic work on the UI tick
    pub fn on_tick(&mut self, now: Instant) {
        let due = self
            .last_refresh
            .map_or(true, |last| now.duration_since(last) >= self.config.refresh_interval());
        if due {
            tracing::debug!("periodic progress refresh");
            self.refresh(now);
        }
    }

    pub fn cycle_difficulty(&mut self) {
        self.filter.cycle_difficulty();
        self.update_visible();
    }

    pub fn cycle_exercise_type(&mut self) {
        self.filter.cycle_exercise_type();
        self.update_visible();
    }

    pub fn set_filter(&mut self, difficulty: &str, exercise_type: &str) {
        self.filter.set_difficulty(difficulty);
        self.filter.set_exercise_type(exercise_type);
        self.update_visible();
    }

    fn update_visible(&mut self) {
        let ids: Vec<u32> = self
            .filter
            .apply(&self.catalog)
            .into_iter()
            .map(|e| e.id)
            .collect();
        self.visible = ids
            .iter()
            .filter_map(|id| self.catalog.exercises().iter().position(|e| e.id == *id))
            .collect();
        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        if !self.visible.is_empty() {
            self.selected = (self.selected + 1) % self.visible.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.visible.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.visible.len() - 1);
        }
    }

    /// Report the exercise as in progress and mount a runner for it
    pub fn start_exercise(&mut self, exercise_id: u32) -> bool {
        let Some(exercise) = self.catalog.get(exercise_id).cloned() else {
            tracing::warn!(exercise_id, "unknown exercise");
            return false;
        };

        if let Err(e) = self
            .progress
            .update_status(exercise_id, ExerciseStatus::InProgress)
        {
            self.show_alert("Could not start exercise", &e.to_string());
        }

        tracing::info!(exercise_id, title = %exercise.title, "mounting exercise");
        self.runner = Some(SessionRunner::new(
            exercise,
            self.devices.as_ref(),
            self.progress.clone(),
            self.events.clone(),
            self.config.session_tick(),
        ));
        self.summary = None;
        self.view = View::Session;
        true
    }

    pub fn start_selected(&mut self) -> bool {
        match self.selected_exercise().map(|e| e.id) {
            Some(id) => self.start_exercise(id),
            None => false,
        }
    }

    /// Follow-up once the runner's completion has been answered by the backend
    pub fn complete_exercise(&mut self, report: CompletionReport) {
        let exercise_id = report.exercise.id;
        if !report.recorded {
            if let Err(e) = self
                .progress
                .update_status(exercise_id, ExerciseStatus::Completed)
            {
                self.show_alert("Could not complete exercise", &e.to_string());
            }
        }
        if let Err(e) = self.progress.analyze(report.exercise.clone()) {
            tracing::warn!(exercise_id, "analysis not queued: {e}");
        }
        if let Err(e) = self.progress.fetch() {
            tracing::warn!("progress refresh not queued: {e}");
        }

        let owns_view = match &self.runner {
            None => false,
            Some(runner) => {
                runner.phase() == SessionPhase::Completed
                    && runner.exercise().id == exercise_id
            }
        };
        self.summary = Some(SessionSummary {
            report,
            analysis: None,
        });
        if owns_view {
            self.runner = None;
            self.view = View::Summary;
        }
    }

    /// Unmount the runner, or leave the summary
    pub fn back(&mut self) {
        if self.runner.take().is_some() {
            tracing::debug!("exercise unmounted");
        }
        self.view = View::Dashboard;
    }

    pub fn show_alert(&mut self, title: &str, message: &str) {
        tracing::warn!("{title}: {message}");
        self.alert = Some(Alert {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn handle_event(&mut self, event: CoachEvent) {
        match event {
            CoachEvent::Key(key) => self.handle_key(key),
            CoachEvent::Resize => {}
            CoachEvent::Tick => self.on_tick(Instant::now()),
            CoachEvent::SessionTick { generation } => {
                if let Some(runner) = self.runner.as_mut() {
                    runner.on_tick(generation);
                }
            }
            CoachEvent::Progress(event) => self.handle_progress(event),
        }
    }

    pub fn handle_progress(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Snapshot(Ok(snapshot)) => {
                self.snapshot = Some(snapshot);
                self.fetch_error = None;
                self.updated_at = Some(Local::now());
            }
            ProgressEvent::Snapshot(Err(e)) => {
                self.fetch_error = Some(e);
            }
            ProgressEvent::StatusUpdated {
                status: ExerciseStatus::InProgress,
                result: Err(e),
                ..
            } => self.show_alert("Could not start exercise", &e),
            ProgressEvent::StatusUpdated {
                status: ExerciseStatus::Completed,
                result: Err(e),
                ..
            } => self.show_alert("Could not complete exercise", &e),
            ProgressEvent::StatusUpdated { .. } => {}
            ProgressEvent::CompletionRecorded(report) => self.complete_exercise(report),
            ProgressEvent::Analysis {
                exercise_id,
                result,
            } => {
                if let Some(summary) = self
                    .summary
                    .as_mut()
                    .filter(|s| s.report.exercise.id == exercise_id)
                {
                    summary.analysis = Some(result);
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.dismiss_alert();
            }
            return;
        }

        match self.view {
            View::Dashboard => self.dashboard_key(key.code),
            View::Session => self.session_key(key.code),
            View::Summary => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('b') => self.back(),
                KeyCode::Char('q') => self.quit(),
                _ => {}
            },
        }
    }

    fn dashboard_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char('d') => self.cycle_difficulty(),
            KeyCode::Char('t') => self.cycle_exercise_type(),
            KeyCode::Char('r') => self.refresh(Instant::now()),
            KeyCode::Enter => {
                self.start_selected();
            }
            KeyCode::Esc | KeyCode::Char('q') => self.quit(),
            _ => {}
        }
    }

    fn session_key(&mut self, code: KeyCode) {
        let Some(runner) = self.runner.as_mut() else {
            self.view = View::Dashboard;
            return;
        };

        match (runner.phase(), code) {
            (_, KeyCode::Esc) | (_, KeyCode::Char('b')) => self.back(),
            (SessionPhase::Instructions, KeyCode::Enter | KeyCode::Char(' ')) => {
                runner.start();
            }
            (SessionPhase::Running, KeyCode::Enter | KeyCode::Right | KeyCode::Char('n')) => {
                runner.advance_step();
            }
            (SessionPhase::Running | SessionPhase::Paused, KeyCode::Char(' ') | KeyCode::Char('p')) => {
                runner.toggle_pause();
            }
            (SessionPhase::Running | SessionPhase::Paused, KeyCode::Char('c')) => {
                runner.complete();
            }
            _ => {}
        }
    }
}
