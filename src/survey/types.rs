use serde::{Deserialize, Deserializer, Serialize};

use super::options::{
    ActiveBusinesses, CurrentEmployees, DocumentType, EmployeeChange, FinancingOption, Gender,
    GotaGotaFrequency, GotaGotaReason, GotaGotaUse, IncomeChange,
};

pub const TOTAL_STEPS: u8 = 6;

/// Identity document number. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentNumber(String);

impl DocumentNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for DocumentNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DocumentNumber([REDACTED])")
    }
}

// Raw per-step input, as the form hands it over. Every field may be missing.

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step1Form {
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub age: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub document_number: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step2Form {
    #[serde(default)]
    pub active_businesses: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step3Form {
    #[serde(default)]
    pub income_change: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step4Form {
    #[serde(default)]
    pub current_employees: Option<String>,
    #[serde(default)]
    pub employee_change: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step5Form {
    #[serde(default)]
    pub used_gota_gota: Option<String>,
    #[serde(default)]
    pub gota_gota_frequency: Option<String>,
    #[serde(default)]
    pub gota_gota_reasons: Vec<String>,
    #[serde(default)]
    pub gota_gota_reason_other: Option<String>,
    #[serde(default)]
    pub other_financing: Vec<String>,
    #[serde(default)]
    pub other_financing_other: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step6Form {
    #[serde(default)]
    pub privacy_consent: Option<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepForm {
    Step1(Step1Form),
    Step2(Step2Form),
    Step3(Step3Form),
    Step4(Step4Form),
    Step5(Step5Form),
    Step6(Step6Form),
}

impl StepForm {
    pub fn step(&self) -> u8 {
        match self {
            Self::Step1(_) => 1,
            Self::Step2(_) => 2,
            Self::Step3(_) => 3,
            Self::Step4(_) => 4,
            Self::Step5(_) => 5,
            Self::Step6(_) => 6,
        }
    }
}

/// All six forms at once, shaped like the submission body (`step1`..`step6`).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SurveyForms {
    #[serde(default)]
    pub step1: Step1Form,
    #[serde(default)]
    pub step2: Step2Form,
    #[serde(default)]
    pub step3: Step3Form,
    #[serde(default)]
    pub step4: Step4Form,
    #[serde(default)]
    pub step5: Step5Form,
    #[serde(default)]
    pub step6: Step6Form,
}

impl SurveyForms {
    pub fn into_steps(self) -> Vec<StepForm> {
        vec![
            StepForm::Step1(self.step1),
            StepForm::Step2(self.step2),
            StepForm::Step3(self.step3),
            StepForm::Step4(self.step4),
            StepForm::Step5(self.step5),
            StepForm::Step6(self.step6),
        ]
    }
}

// Validated payloads.

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step1 {
    pub gender: Gender,
    /// Whole ages are kept as integers so they serialize as `35`, not `35.0`.
    pub age: serde_json::Number,
    pub city: String,
    pub document_type: DocumentType,
    pub document_number: DocumentNumber,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step2 {
    pub active_businesses: ActiveBusinesses,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step3 {
    pub income_change: IncomeChange,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step4 {
    pub current_employees: CurrentEmployees,
    pub employee_change: EmployeeChange,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step5 {
    pub used_gota_gota: GotaGotaUse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gota_gota_frequency: Option<GotaGotaFrequency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gota_gota_reasons: Vec<GotaGotaReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gota_gota_reason_other: Option<String>,
    pub other_financing: Vec<FinancingOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_financing_other: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step6 {
    pub privacy_consent: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepAnswer {
    Step1(Step1),
    Step2(Step2),
    Step3(Step3),
    Step4(Step4),
    Step5(Step5),
    Step6(Step6),
}

impl StepAnswer {
    pub fn step(&self) -> u8 {
        match self {
            Self::Step1(_) => 1,
            Self::Step2(_) => 2,
            Self::Step3(_) => 3,
            Self::Step4(_) => 4,
            Self::Step5(_) => 5,
            Self::Step6(_) => 6,
        }
    }
}

/// Answers accumulated across completed steps. Serializes as the submission body.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AnswerSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step1: Option<Step1>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step2: Option<Step2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step3: Option<Step3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step4: Option<Step4>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step5: Option<Step5>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step6: Option<Step6>,
}

impl AnswerSet {
    /// Replaces whatever was stored for the answer's step.
    pub fn insert(&mut self, answer: StepAnswer) {
        match answer {
            StepAnswer::Step1(v) => self.step1 = Some(v),
            StepAnswer::Step2(v) => self.step2 = Some(v),
            StepAnswer::Step3(v) => self.step3 = Some(v),
            StepAnswer::Step4(v) => self.step4 = Some(v),
            StepAnswer::Step5(v) => self.step5 = Some(v),
            StepAnswer::Step6(v) => self.step6 = Some(v),
        }
    }

    pub fn completed_steps(&self) -> Vec<u8> {
        let present = [
            self.step1.is_some(),
            self.step2.is_some(),
            self.step3.is_some(),
            self.step4.is_some(),
            self.step5.is_some(),
            self.step6.is_some(),
        ];
        present
            .iter()
            .enumerate()
            .filter(|(_, p)| **p)
            .map(|(i, _)| i as u8 + 1)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.completed_steps().len() == TOTAL_STEPS as usize
    }
}

fn number_or_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_number_debug_is_masked() {
        let number = DocumentNumber::new("1234567890");
        let printed = format!("{number:?}");
        assert!(!printed.contains("1234567890"));
        assert_eq!(
            serde_json::to_string(&number).expect("json"),
            "\"1234567890\""
        );
    }

    #[test]
    fn step1_form_accepts_numeric_or_text_age() {
        let numeric: Step1Form = serde_json::from_str(r#"{"age": 35}"#).expect("parse");
        assert_eq!(numeric.age.as_deref(), Some("35"));
        let text: Step1Form = serde_json::from_str(r#"{"age": "41"}"#).expect("parse");
        assert_eq!(text.age.as_deref(), Some("41"));
        let missing: Step1Form = serde_json::from_str(r#"{}"#).expect("parse");
        assert_eq!(missing.age, None);
    }

    #[test]
    fn answer_set_tracks_completed_steps() {
        let mut answers = AnswerSet::default();
        assert!(answers.completed_steps().is_empty());
        answers.insert(StepAnswer::Step3(Step3 {
            income_change: IncomeChange::Unchanged,
        }));
        answers.insert(StepAnswer::Step6(Step6 {
            privacy_consent: true,
        }));
        assert_eq!(answers.completed_steps(), vec![3, 6]);
        assert!(!answers.is_complete());
    }

    #[test]
    fn answer_set_serializes_step_keys_only_when_present() {
        let mut answers = AnswerSet::default();
        answers.insert(StepAnswer::Step2(Step2 {
            active_businesses: ActiveBusinesses::One,
            business_name: None,
        }));
        let value = serde_json::to_value(&answers).expect("json");
        assert_eq!(
            value,
            serde_json::json!({"step2": {"activeBusinesses": "Uno"}})
        );
    }
}
