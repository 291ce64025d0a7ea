use chrono::Utc;
use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::survey::options::GotaGotaUse;
use crate::survey::{AnswerSet, OptionSet};

/// Events pushed to the analytics sink. None of them carries a document number.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    SurveyStarted,
    StepCompleted {
        step: u8,
    },
    SurveySubmitted {
        city: String,
        #[serde(rename = "docType")]
        doc_type: String,
        used_gotagota: bool,
    },
    FieldInteraction {
        #[serde(rename = "fieldName")]
        field_name: String,
    },
    ValidationError {
        step: u8,
        errors: Vec<String>,
    },
}

impl AnalyticsEvent {
    pub fn survey_submitted(answers: &AnswerSet) -> Self {
        let step1 = answers.step1.as_ref();
        Self::SurveySubmitted {
            city: step1.map(|s| s.city.clone()).unwrap_or_default(),
            doc_type: step1
                .map(|s| s.document_type.label().to_string())
                .unwrap_or_default(),
            used_gotagota: answers
                .step5
                .as_ref()
                .map(|s| s.used_gota_gota == GotaGotaUse::Yes)
                .unwrap_or(false),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SurveyStarted => "survey_started",
            Self::StepCompleted { .. } => "step_completed",
            Self::SurveySubmitted { .. } => "survey_submitted",
            Self::FieldInteraction { .. } => "field_interaction",
            Self::ValidationError { .. } => "validation_error",
        }
    }
}

/// Event plus the time it was recorded, as appended to the sink.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TrackedEvent {
    #[serde(flatten)]
    pub event: AnalyticsEvent,
    pub timestamp: String,
}

impl TrackedEvent {
    pub fn now(event: AnalyticsEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Fire-and-forget, append-only event log.
pub trait AnalyticsSink {
    fn track(&self, event: AnalyticsEvent);
}

/// Writes each event as one JSON log line.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn track(&self, event: AnalyticsEvent) {
        match serde_json::to_string(&TrackedEvent::now(event)) {
            Ok(line) => log::info!("[analytics] {line}"),
            Err(e) => log::warn!("[analytics] unable to encode event: {e}"),
        }
    }
}

/// Keeps events in memory; clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<TrackedEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TrackedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.event.name()).collect()
    }
}

impl AnalyticsSink for MemorySink {
    fn track(&self, event: AnalyticsEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(TrackedEvent::now(event));
        }
    }
}
