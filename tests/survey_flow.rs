use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::collections::VecDeque;

use quipu::analytics::MemorySink;
use quipu::controller::{ControllerError, Phase, SurveyController, UiEffect};
use quipu::storage::{MemoryStore, SnapshotStore, SqliteStore};
use quipu::submit::{EndpointResponse, SubmissionReceipt, SubmitError, Submitter};
use quipu::survey::{AnswerSet, StepForm, SurveyForms};

/// Plays back endpoint bodies in order and records what it was sent.
struct FakeEndpoint {
    responses: RefCell<VecDeque<&'static str>>,
    sent: RefCell<Vec<AnswerSet>>,
}

impl FakeEndpoint {
    fn new(responses: &[&'static str]) -> Self {
        Self {
            responses: RefCell::new(responses.iter().copied().collect()),
            sent: RefCell::new(Vec::new()),
        }
    }
}

impl Submitter for FakeEndpoint {
    fn submit(&self, answers: &AnswerSet) -> Result<SubmissionReceipt, SubmitError> {
        self.sent.borrow_mut().push(answers.clone());
        let body = self
            .responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| SubmitError::Transport("connection refused".to_string()))?;
        let parsed: EndpointResponse = serde_json::from_str(body)
            .map_err(|e| SubmitError::InvalidResponse(e.to_string()))?;
        parsed.into_receipt()
    }

    fn test_connection(&self) -> bool {
        true
    }
}

fn fixture_forms() -> SurveyForms {
    serde_json::from_str(include_str!("fixtures/answers.json")).expect("fixture")
}

fn fill_all_steps<S, A>(controller: &mut SurveyController<S, FakeEndpoint, A>) -> Phase
where
    S: quipu::storage::KeyValueStore,
    A: quipu::analytics::AnalyticsSink,
{
    let mut phase = controller.phase();
    for form in fixture_forms().into_steps() {
        phase = controller.submit_step(form).expect("valid step");
    }
    phase
}

#[test]
fn full_survey_succeeds_and_clears_snapshot() {
    let store = MemoryStore::new();
    let sink = MemorySink::new();
    let endpoint = FakeEndpoint::new(&[
        r#"{"success":true,"message":"Datos guardados correctamente","timestamp":"2024-01-01 10:00:00"}"#,
    ]);
    let mut controller = SurveyController::new(store.clone(), endpoint, sink.clone());

    controller.start().expect("start");
    assert_eq!(fill_all_steps(&mut controller), Phase::Submitting);
    assert!(SnapshotStore::new(store.clone()).exists());

    assert_eq!(controller.deliver().expect("deliver"), Phase::Success);
    assert!(!SnapshotStore::new(store).exists());
    assert_eq!(
        controller.receipt().and_then(|r| r.timestamp.as_deref()),
        Some("2024-01-01 10:00:00")
    );

    let names = sink.names();
    assert_eq!(names.first(), Some(&"survey_started"));
    assert_eq!(names.iter().filter(|n| **n == "step_completed").count(), 6);
    assert_eq!(names.last(), Some(&"survey_submitted"));

    let logged = serde_json::to_string(&sink.events()).expect("json");
    assert!(!logged.contains("1234567890"));
    assert!(logged.contains("\"used_gotagota\":true"));
}

#[test]
fn failed_submission_keeps_answers_and_retry_succeeds() {
    let store = MemoryStore::new();
    let endpoint = FakeEndpoint::new(&[
        r#"{"success":false,"error":"boom"}"#,
        r#"{"success":true,"timestamp":"2024-01-01 10:05:00"}"#,
    ]);
    let mut controller = SurveyController::new(store.clone(), endpoint, MemorySink::new());
    controller.start().expect("start");
    fill_all_steps(&mut controller);

    assert_eq!(controller.deliver().expect("deliver"), Phase::SubmissionError);
    assert_eq!(controller.error_banner(), Some("boom"));
    let before_retry = controller.answers().clone();
    assert!(before_retry.is_complete());
    assert!(SnapshotStore::new(store.clone()).exists());

    controller.retry().expect("retry");
    assert_eq!(controller.deliver().expect("deliver"), Phase::Success);

    let sent = controller.client().sent.borrow();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], before_retry);
    assert_eq!(sent[1], before_retry);
    assert!(!SnapshotStore::new(store).exists());
}

#[test]
fn reload_mid_survey_offers_resume() {
    let root = std::env::temp_dir().join(format!("quipu-flow-{}", uuid::Uuid::new_v4()));
    let db = root.join("survey.sqlite3");
    let steps = fixture_forms().into_steps();

    {
        let store = SqliteStore::open(&db).expect("open store");
        let mut controller =
            SurveyController::new(store, FakeEndpoint::new(&[]), MemorySink::new());
        controller.start().expect("start");
        for form in steps.iter().take(3).cloned() {
            controller.submit_step(form).expect("valid step");
        }
        assert_eq!(controller.phase(), Phase::FormStep(4));
    }

    let store = SqliteStore::open(&db).expect("reopen store");
    let mut controller = SurveyController::new(store, FakeEndpoint::new(&[]), MemorySink::new());
    assert_eq!(controller.phase(), Phase::RestorePrompt);
    assert!(matches!(
        controller.submit_step(steps[0].clone()),
        Err(ControllerError::NotAllowed { .. })
    ));
    assert_eq!(controller.resume().expect("resume"), Phase::FormStep(3));
    assert_eq!(controller.answers().completed_steps(), vec![1, 2, 3]);
    assert_eq!(controller.drain_effects(), vec![UiEffect::ShowIntro]);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn start_fresh_then_full_run() {
    let store = MemoryStore::new();
    SnapshotStore::new(store.clone()).save(2, &AnswerSet::default());
    let endpoint = FakeEndpoint::new(&[r#"{"success":true}"#]);
    let mut controller = SurveyController::new(store.clone(), endpoint, MemorySink::new());

    assert_eq!(controller.start_fresh().expect("fresh"), Phase::Landing);
    assert!(!SnapshotStore::new(store).exists());
    controller.start().expect("start");
    fill_all_steps(&mut controller);
    assert_eq!(controller.deliver().expect("deliver"), Phase::Success);
    assert_eq!(controller.reset().expect("reset"), Phase::Landing);
    assert_eq!(controller.current_step(), 1);
}

#[test]
fn transport_failure_is_recoverable() {
    let mut controller =
        SurveyController::new(MemoryStore::new(), FakeEndpoint::new(&[]), MemorySink::new());
    controller.start().expect("start");
    fill_all_steps(&mut controller);
    assert_eq!(controller.deliver().expect("deliver"), Phase::SubmissionError);
    assert_eq!(
        controller.error_banner(),
        Some("request failed: connection refused")
    );
    assert!(matches!(
        controller.deliver(),
        Err(ControllerError::NotAllowed { action: "deliver", .. })
    ));
    // The consent page can be resubmitted straight from the error banner.
    let step6 = fixture_forms().into_steps().pop().expect("step6");
    assert!(matches!(step6, StepForm::Step6(_)));
    assert_eq!(controller.submit_step(step6).expect("resubmit"), Phase::Submitting);
}
