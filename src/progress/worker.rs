use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use super::api::{AnalysisOutcome, ExerciseData, ExerciseStatus, ProgressApi, ProgressService};
use super::snapshot::ProgressSnapshot;
use super::ProgressError;
use crate::catalog::Exercise;
use crate::session::CompletionReport;

/// Work queued for the progress worker
#[derive(Debug)]
pub enum ProgressCommand {
    UpdateStatus {
        exercise_id: u32,
        status: ExerciseStatus,
    },
    RecordCompletion {
        data: ExerciseData,
        report: CompletionReport,
    },
    Fetch,
    Analyze(Exercise),
}

/// Results of progress work, delivered on the application event channel.
/// Errors are carried as display strings.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    StatusUpdated {
        exercise_id: u32,
        status: ExerciseStatus,
        result: Result<(), String>,
    },
    CompletionRecorded(CompletionReport),
    Snapshot(Result<ProgressSnapshot, String>),
    Analysis {
        exercise_id: u32,
        result: Result<AnalysisOutcome, String>,
    },
}

/// Handle for queueing work on the progress worker
#[derive(Debug, Clone)]
pub struct ProgressClient {
    tx: Sender<ProgressCommand>,
}

impl ProgressClient {
    /// Start the worker thread. It runs commands one at a time, in order, and
    /// exits once every client handle is dropped or the event receiver is gone.
    pub fn spawn<A, E>(service: ProgressService<A>, events: Sender<E>) -> std::io::Result<Self>
    where
        A: ProgressApi + 'static,
        E: From<ProgressEvent> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("progress-worker".to_string())
            .spawn(move || run(service, rx, events))?;
        Ok(Self { tx })
    }

    /// Client whose commands go to `rx`, for driving the worker by hand
    pub fn detached() -> (Self, Receiver<ProgressCommand>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, command: ProgressCommand) -> Result<(), ProgressError> {
        self.tx.send(command).map_err(|_| ProgressError::WorkerGone)
    }

    pub fn update_status(
        &self,
        exercise_id: u32,
        status: ExerciseStatus,
    ) -> Result<(), ProgressError> {
        self.send(ProgressCommand::UpdateStatus {
            exercise_id,
            status,
        })
    }

    pub fn record_completion(
        &self,
        data: ExerciseData,
        report: CompletionReport,
    ) -> Result<(), ProgressError> {
        self.send(ProgressCommand::RecordCompletion { data, report })
    }

    pub fn fetch(&self) -> Result<(), ProgressError> {
        self.send(ProgressCommand::Fetch)
    }

    pub fn analyze(&self, exercise: Exercise) -> Result<(), ProgressError> {
        self.send(ProgressCommand::Analyze(exercise))
    }
}

fn run<A, E>(service: ProgressService<A>, rx: Receiver<ProgressCommand>, events: Sender<E>)
where
    A: ProgressApi,
    E: From<ProgressEvent>,
{
    tracing::debug!(user_id = service.user_id(), "progress worker started");
    for command in rx {
        let event = execute(&service, command);
        if events.send(event.into()).is_err() {
            break;
        }
    }
    tracing::debug!("progress worker stopped");
}

/// Run one command against the service
pub fn execute<A: ProgressApi>(service: &ProgressService<A>, command: ProgressCommand) -> ProgressEvent {
    match command {
        ProgressCommand::UpdateStatus {
            exercise_id,
            status,
        } => {
            let result = service.update_exercise_progress(exercise_id, status);
            if let Err(e) = &result {
                tracing::warn!(exercise_id, %status, "progress update failed: {e}");
            }
            ProgressEvent::StatusUpdated {
                exercise_id,
                status,
                result: result.map_err(|e| e.to_string()),
            }
        }
        ProgressCommand::RecordCompletion { data, mut report } => {
            match service.record_completion(data) {
                Ok(()) => report.recorded = true,
                Err(e) => {
                    tracing::warn!(
                        exercise_id = report.exercise.id,
                        "failed to record completion: {e}"
                    );
                    report.recorded = false;
                }
            }
            ProgressEvent::CompletionRecorded(report)
        }
        ProgressCommand::Fetch => {
            let result = service.fetch_progress();
            if let Err(e) = &result {
                tracing::warn!("progress fetch failed: {e}");
            }
            ProgressEvent::Snapshot(result.map_err(|e| e.to_string()))
        }
        ProgressCommand::Analyze(exercise) => {
            let result = service.submit_for_analysis(&exercise);
            if let Err(e) = &result {
                tracing::warn!(exercise_id = exercise.id, "speech analysis failed: {e}");
            }
            ProgressEvent::Analysis {
                exercise_id: exercise.id,
                result: result.map_err(|e| e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::progress::memory::MemoryProgressApi;
    use assert_matches::assert_matches;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn spawn(api: &MemoryProgressApi) -> (ProgressClient, Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel();
        let client = ProgressClient::spawn(ProgressService::new(api.clone(), "teen"), tx).unwrap();
        (client, rx)
    }

    #[test]
    fn test_commands_run_in_order() {
        let api = MemoryProgressApi::default();
        let (client, rx) = spawn(&api);

        client.update_status(3, ExerciseStatus::InProgress).unwrap();
        client.fetch().unwrap();

        assert_matches!(
            rx.recv_timeout(WAIT).unwrap(),
            ProgressEvent::StatusUpdated {
                exercise_id: 3,
                status: ExerciseStatus::InProgress,
                result: Ok(())
            }
        );
        assert_matches!(rx.recv_timeout(WAIT).unwrap(), ProgressEvent::Snapshot(Ok(_)));
        assert_eq!(api.fetch_count(), 1);
    }

    #[test]
    fn test_failures_arrive_as_events() {
        let api = MemoryProgressApi::default();
        api.fail_fetch(true);
        let (client, rx) = spawn(&api);

        client.fetch().unwrap();
        assert_matches!(rx.recv_timeout(WAIT).unwrap(), ProgressEvent::Snapshot(Err(msg)) if msg.contains("500"));
    }

    #[test]
    fn test_analysis_event_carries_outcome() {
        let api = MemoryProgressApi::default();
        let (client, rx) = spawn(&api);
        let exercise = Catalog::builtin().get(1).unwrap().clone();

        client.analyze(exercise).unwrap();
        assert_matches!(
            rx.recv_timeout(WAIT).unwrap(),
            ProgressEvent::Analysis { exercise_id: 1, result: Ok(outcome) } if outcome.recorded
        );
    }

    #[test]
    fn test_detached_client_queues_commands() {
        let (client, rx) = ProgressClient::detached();
        client.fetch().unwrap();
        assert_matches!(rx.try_recv(), Ok(ProgressCommand::Fetch));

        drop(rx);
        assert_matches!(client.fetch(), Err(ProgressError::WorkerGone));
    }
}
