use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::storage::{KeyValueStore, SnapshotStore};
use crate::submit::{SubmissionReceipt, Submitter};
use crate::survey::{AnswerSet, DocumentPair, FieldError, StepForm, ValidationErrors, TOTAL_STEPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A saved snapshot was found; resume or start fresh before anything else.
    RestorePrompt,
    Landing,
    FormStep(u8),
    Submitting,
    SubmissionError,
    Success,
}

/// Side effects the UI layer should perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEffect {
    ScrollToTop,
    ShowIntro,
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("a submission is already in flight")]
    Busy,
    #[error("expected step {expected}, got step {got}")]
    WrongStep { expected: u8, got: u8 },
    #[error("{action} is not allowed while {phase:?}")]
    NotAllowed { action: &'static str, phase: Phase },
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

/// Drives one respondent through landing, the six steps and submission.
pub struct SurveyController<S, C, A> {
    snapshots: SnapshotStore<S>,
    client: C,
    analytics: A,
    phase: Phase,
    current_step: u8,
    answers: AnswerSet,
    started: bool,
    error_banner: Option<String>,
    receipt: Option<SubmissionReceipt>,
    document: DocumentPair,
    effects: Vec<UiEffect>,
}

impl<S, C, A> SurveyController<S, C, A>
where
    S: KeyValueStore,
    C: Submitter,
    A: AnalyticsSink,
{
    pub fn new(store: S, client: C, analytics: A) -> Self {
        let snapshots = SnapshotStore::new(store);
        let phase = if snapshots.exists() {
            Phase::RestorePrompt
        } else {
            Phase::Landing
        };
        Self {
            snapshots,
            client,
            analytics,
            phase,
            current_step: 1,
            answers: AnswerSet::default(),
            started: false,
            error_banner: None,
            receipt: None,
            document: DocumentPair::default(),
            effects: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    pub fn document_error(&self) -> Option<&FieldError> {
        self.document.error()
    }

    pub fn snapshots(&self) -> &SnapshotStore<S> {
        &self.snapshots
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Effects queued since the last call, oldest first.
    pub fn drain_effects(&mut self) -> Vec<UiEffect> {
        std::mem::take(&mut self.effects)
    }

    fn require(&self, action: &'static str, expected: Phase) -> Result<(), ControllerError> {
        if self.phase == Phase::Submitting {
            return Err(ControllerError::Busy);
        }
        if self.phase != expected {
            return Err(ControllerError::NotAllowed {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// Hydrates answers and step from the snapshot. An unreadable snapshot is
    /// discarded and the survey starts over at the landing page.
    pub fn resume(&mut self) -> Result<Phase, ControllerError> {
        self.require("resume", Phase::RestorePrompt)?;
        match self.snapshots.load() {
            Some(snapshot) => {
                let step = snapshot.current_step.clamp(1, TOTAL_STEPS);
                log::info!(
                    "[survey] resuming at step {step} (saved {})",
                    snapshot.last_saved
                );
                self.answers = snapshot.data;
                self.current_step = step;
                self.sync_document_pair();
                self.phase = Phase::FormStep(step);
                self.effects.push(UiEffect::ShowIntro);
            }
            None => {
                log::warn!("[survey] saved data could not be restored, starting fresh");
                self.snapshots.clear();
                self.phase = Phase::Landing;
            }
        }
        Ok(self.phase)
    }

    pub fn start_fresh(&mut self) -> Result<Phase, ControllerError> {
        self.require("start fresh", Phase::RestorePrompt)?;
        self.snapshots.clear();
        self.phase = Phase::Landing;
        Ok(self.phase)
    }

    pub fn start(&mut self) -> Result<Phase, ControllerError> {
        self.require("start", Phase::Landing)?;
        self.current_step = 1;
        self.phase = Phase::FormStep(1);
        self.effects.push(UiEffect::ShowIntro);
        if !self.started {
            self.started = true;
            self.analytics.track(AnalyticsEvent::SurveyStarted);
        }
        Ok(self.phase)
    }

    /// Validates and records the payload for the step on screen. Step 6 moves
    /// to `Submitting`; call [`deliver`](Self::deliver) to perform the request.
    pub fn submit_step(&mut self, form: StepForm) -> Result<Phase, ControllerError> {
        let on_screen = match self.phase {
            Phase::FormStep(n) => n,
            Phase::Submitting => return Err(ControllerError::Busy),
            // Resubmitting the last page from the error banner.
            Phase::SubmissionError => TOTAL_STEPS,
            phase => {
                return Err(ControllerError::NotAllowed {
                    action: "submit step",
                    phase,
                })
            }
        };
        let step = form.step();
        if step != on_screen {
            return Err(ControllerError::WrongStep {
                expected: on_screen,
                got: step,
            });
        }
        let answer = form.validate()?;
        self.answers.insert(answer);
        self.analytics.track(AnalyticsEvent::StepCompleted { step });
        self.snapshots.save(step, &self.answers);

        if step < TOTAL_STEPS {
            self.current_step = step + 1;
            self.phase = Phase::FormStep(step + 1);
            self.effects.push(UiEffect::ScrollToTop);
        } else {
            self.analytics
                .track(AnalyticsEvent::survey_submitted(&self.answers));
            self.begin_submission();
        }
        Ok(self.phase)
    }

    fn begin_submission(&mut self) {
        self.error_banner = None;
        self.phase = Phase::Submitting;
    }

    /// Performs the one in-flight submission and settles on `Success` or `SubmissionError`.
    pub fn deliver(&mut self) -> Result<Phase, ControllerError> {
        if self.phase != Phase::Submitting {
            return Err(ControllerError::NotAllowed {
                action: "deliver",
                phase: self.phase,
            });
        }
        log::debug!("[survey] submitting answers: {:?}", self.answers);
        match self.client.submit(&self.answers) {
            Ok(receipt) => {
                log::info!("[survey] submission successful");
                self.snapshots.clear();
                self.receipt = Some(receipt);
                self.phase = Phase::Success;
                self.effects.push(UiEffect::ScrollToTop);
            }
            Err(e) => {
                log::error!("[survey] submission failed: {e}");
                self.error_banner = Some(e.user_message());
                self.phase = Phase::SubmissionError;
            }
        }
        Ok(self.phase)
    }

    /// Re-sends the same in-memory answers. No idempotency key is attached.
    pub fn retry(&mut self) -> Result<Phase, ControllerError> {
        self.require("retry", Phase::SubmissionError)?;
        self.begin_submission();
        Ok(self.phase)
    }

    pub fn dismiss_error(&mut self) -> Result<Phase, ControllerError> {
        self.require("dismiss error", Phase::SubmissionError)?;
        self.error_banner = None;
        Ok(self.phase)
    }

    pub fn back(&mut self) -> Result<Phase, ControllerError> {
        match self.phase {
            Phase::FormStep(n) if n > 1 => {
                self.current_step = n - 1;
                self.phase = Phase::FormStep(n - 1);
                self.effects.push(UiEffect::ScrollToTop);
                Ok(self.phase)
            }
            // The banner sits on the last page; leaving it drops the banner, not the answers.
            Phase::SubmissionError => {
                self.error_banner = None;
                self.current_step = TOTAL_STEPS - 1;
                self.phase = Phase::FormStep(TOTAL_STEPS - 1);
                self.effects.push(UiEffect::ScrollToTop);
                Ok(self.phase)
            }
            Phase::Submitting => Err(ControllerError::Busy),
            phase => Err(ControllerError::NotAllowed {
                action: "back",
                phase,
            }),
        }
    }

    /// Forgets everything in memory and returns to the landing page.
    pub fn reset(&mut self) -> Result<Phase, ControllerError> {
        self.require("reset", Phase::Success)?;
        self.answers = AnswerSet::default();
        self.current_step = 1;
        self.started = false;
        self.receipt = None;
        self.error_banner = None;
        self.document = DocumentPair::default();
        self.phase = Phase::Landing;
        Ok(self.phase)
    }

    pub fn set_document_type(&mut self, doc_type: &str) -> Option<&FieldError> {
        self.document.set_type(doc_type)
    }

    pub fn set_document_number(&mut self, number: &str) -> Option<&FieldError> {
        self.document.set_number(number)
    }

    fn sync_document_pair(&mut self) {
        self.document = match self.answers.step1.as_ref() {
            Some(s) => DocumentPair::new(
                Some(s.document_type.to_string().as_str()),
                Some(s.document_number.as_str()),
            ),
            None => DocumentPair::default(),
        };
    }
}
