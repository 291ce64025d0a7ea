use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use super::options::{
    ActiveBusinesses, CurrentEmployees, DocumentType, EmployeeChange, FinancingOption, Gender,
    GotaGotaFrequency, GotaGotaReason, GotaGotaUse, IncomeChange, OptionSet,
};
use super::types::{
    AnswerSet, DocumentNumber, Step1, Step1Form, Step2, Step2Form, Step3, Step3Form, Step4,
    Step4Form, Step5, Step5Form, Step6, Step6Form, StepAnswer, StepForm, SurveyForms,
};

const SELECT_ONE: &str = "Por favor selecciona una opción";
const INVALID_OPTION: &str = "Por favor selecciona una opción válida";
const SELECT_AT_LEAST_ONE: &str = "Por favor selecciona al menos una opción";
const OTHER_TEXT_MAX: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Field-level errors for one step, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub step: u8,
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn for_step(step: u8) -> Self {
        Self {
            step,
            errors: Vec::new(),
        }
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.field).collect()
    }

    fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.is_empty() {
            return Err(self);
        }
        // Every required field was checked above, so `value` only sees complete input.
        value().ok_or(self)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>();
        write!(f, "step {} is invalid: {}", self.step, parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn national_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{6,12}$").expect("regex"))
}

fn alphanumeric_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9]{6,15}$").expect("regex"))
}

pub fn document_number_message(doc_type: Option<DocumentType>) -> &'static str {
    match doc_type {
        Some(t) if t.is_national_id() => "Ingresa solo números (6-12 dígitos)",
        Some(_) => "Ingresa números y letras (6-15 caracteres)",
        None => "Formato de documento inválido",
    }
}

/// Cross-field rule: the accepted number format depends on the document type.
pub fn check_document_number(doc_type: &str, number: &str) -> Result<(), FieldError> {
    let parsed = DocumentType::from_label(doc_type);
    let ok = match parsed {
        Some(t) if t.is_national_id() => national_id_pattern().is_match(number),
        Some(_) => alphanumeric_id_pattern().is_match(number),
        None => false,
    };
    if ok {
        Ok(())
    } else {
        Err(FieldError::new(
            "documentNumber",
            document_number_message(parsed),
        ))
    }
}

/// Document type and number as they are being edited.
///
/// The number error is recomputed on every change to either half and clears
/// as soon as the pair becomes valid. Nothing is reported until both are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPair {
    doc_type: Option<String>,
    number: Option<DocumentNumber>,
    error: Option<FieldError>,
}

impl DocumentPair {
    pub fn new(doc_type: Option<&str>, number: Option<&str>) -> Self {
        let mut pair = Self {
            doc_type: doc_type.map(str::to_string),
            number: number.map(DocumentNumber::new),
            error: None,
        };
        pair.recompute();
        pair
    }

    pub fn set_type(&mut self, doc_type: &str) -> Option<&FieldError> {
        self.doc_type = Some(doc_type.to_string());
        self.recompute();
        self.error.as_ref()
    }

    pub fn set_number(&mut self, number: &str) -> Option<&FieldError> {
        self.number = Some(DocumentNumber::new(number));
        self.recompute();
        self.error.as_ref()
    }

    pub fn error(&self) -> Option<&FieldError> {
        self.error.as_ref()
    }

    fn recompute(&mut self) {
        self.error = match (self.doc_type.as_deref(), self.number.as_ref()) {
            (Some(t), Some(n)) if !t.is_empty() && !n.as_str().is_empty() => {
                check_document_number(t, n.as_str()).err()
            }
            _ => None,
        };
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn choice<T: OptionSet>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&String>,
    required_message: &str,
) -> Option<T> {
    let Some(raw) = present(value) else {
        errors.push(field, required_message);
        return None;
    };
    let parsed = T::from_label(raw);
    if parsed.is_none() {
        errors.push(field, INVALID_OPTION);
    }
    parsed
}

fn optional_choice<T: OptionSet>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&String>,
) -> Option<T> {
    let raw = present(value)?;
    let parsed = T::from_label(raw);
    if parsed.is_none() {
        errors.push(field, INVALID_OPTION);
    }
    parsed
}

fn multi_choice<T: OptionSet + PartialEq>(
    errors: &mut ValidationErrors,
    field: &'static str,
    values: &[String],
    required: bool,
) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for raw in values {
        match T::from_label(raw.trim()) {
            Some(v) => {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
            None => {
                errors.push(field, INVALID_OPTION);
                return Vec::new();
            }
        }
    }
    if required && out.is_empty() {
        errors.push(field, SELECT_AT_LEAST_ONE);
    }
    out
}

fn optional_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&String>,
    max: usize,
) -> Option<String> {
    // Blank counts as unanswered; anything else is kept exactly as typed.
    present(value)?;
    let raw = value?;
    if raw.chars().count() > max {
        errors.push(field, format!("Máximo {max} caracteres"));
        return None;
    }
    Some(raw.clone())
}

fn age(errors: &mut ValidationErrors, value: Option<&String>) -> Option<serde_json::Number> {
    let Some(raw) = present(value) else {
        errors.push("age", "Por favor ingresa tu edad");
        return None;
    };
    let parsed = match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            errors.push("age", "Por favor ingresa un número válido");
            return None;
        }
    };
    if parsed < 14.0 {
        errors.push("age", "Debes tener al menos 14 años");
        return None;
    }
    if parsed > 100.0 {
        errors.push("age", "Por favor verifica tu edad");
        return None;
    }
    if parsed.fract() == 0.0 {
        Some(serde_json::Number::from(parsed as u64))
    } else {
        serde_json::Number::from_f64(parsed)
    }
}

impl Step1Form {
    pub fn validate(&self) -> Result<Step1, ValidationErrors> {
        let mut errors = ValidationErrors::for_step(1);
        let gender = choice::<Gender>(&mut errors, "gender", self.gender.as_ref(), SELECT_ONE);
        let age = age(&mut errors, self.age.as_ref());

        let city = match present(self.city.as_ref()) {
            Some(c) if c.chars().count() < 2 => {
                errors.push("city", "Por favor ingresa tu ciudad");
                None
            }
            Some(c) if c.chars().count() > 100 => {
                errors.push("city", "Máximo 100 caracteres");
                None
            }
            Some(c) => Some(c.to_string()),
            None => {
                errors.push("city", "Por favor ingresa tu ciudad");
                None
            }
        };

        let document_type = choice::<DocumentType>(
            &mut errors,
            "documentType",
            self.document_type.as_ref(),
            "Por favor selecciona el tipo de documento",
        );

        let document_number = match present(self.document_number.as_ref()) {
            None => {
                errors.push("documentNumber", "Por favor ingresa tu número de documento");
                None
            }
            Some(n) if n.chars().count() < 6 => {
                errors.push("documentNumber", "El número de documento es muy corto");
                None
            }
            Some(n) if n.chars().count() > 15 => {
                errors.push("documentNumber", "Máximo 15 caracteres");
                None
            }
            Some(n) => match document_type {
                Some(t) => match check_document_number(t.label(), n) {
                    Ok(()) => Some(DocumentNumber::new(n)),
                    Err(e) => {
                        errors.errors.push(e);
                        None
                    }
                },
                // The type itself is already reported; the number waits for it.
                None => None,
            },
        };

        errors.finish(|| {
            Some(Step1 {
                gender: gender?,
                age: age?,
                city: city?,
                document_type: document_type?,
                document_number: document_number?,
            })
        })
    }
}

impl Step2Form {
    pub fn validate(&self) -> Result<Step2, ValidationErrors> {
        let mut errors = ValidationErrors::for_step(2);
        let active_businesses = choice::<ActiveBusinesses>(
            &mut errors,
            "activeBusinesses",
            self.active_businesses.as_ref(),
            SELECT_ONE,
        );
        let business_name =
            optional_text(&mut errors, "businessName", self.business_name.as_ref(), 200);
        errors.finish(|| {
            Some(Step2 {
                active_businesses: active_businesses?,
                business_name,
            })
        })
    }
}

impl Step3Form {
    pub fn validate(&self) -> Result<Step3, ValidationErrors> {
        let mut errors = ValidationErrors::for_step(3);
        let income_change = choice::<IncomeChange>(
            &mut errors,
            "incomeChange",
            self.income_change.as_ref(),
            SELECT_ONE,
        );
        errors.finish(|| {
            Some(Step3 {
                income_change: income_change?,
            })
        })
    }
}

impl Step4Form {
    pub fn validate(&self) -> Result<Step4, ValidationErrors> {
        let mut errors = ValidationErrors::for_step(4);
        let current_employees = choice::<CurrentEmployees>(
            &mut errors,
            "currentEmployees",
            self.current_employees.as_ref(),
            SELECT_ONE,
        );
        let employee_change = choice::<EmployeeChange>(
            &mut errors,
            "employeeChange",
            self.employee_change.as_ref(),
            SELECT_ONE,
        );
        errors.finish(|| {
            Some(Step4 {
                current_employees: current_employees?,
                employee_change: employee_change?,
            })
        })
    }
}

impl Step5Form {
    pub fn validate(&self) -> Result<Step5, ValidationErrors> {
        let mut errors = ValidationErrors::for_step(5);
        let used_gota_gota = choice::<GotaGotaUse>(
            &mut errors,
            "usedGotaGota",
            self.used_gota_gota.as_ref(),
            SELECT_ONE,
        );
        let gota_gota_frequency = optional_choice::<GotaGotaFrequency>(
            &mut errors,
            "gotaGotaFrequency",
            self.gota_gota_frequency.as_ref(),
        );
        let gota_gota_reasons = multi_choice::<GotaGotaReason>(
            &mut errors,
            "gotaGotaReasons",
            &self.gota_gota_reasons,
            false,
        );
        let gota_gota_reason_other = optional_text(
            &mut errors,
            "gotaGotaReasonOther",
            self.gota_gota_reason_other.as_ref(),
            OTHER_TEXT_MAX,
        );
        let other_financing = multi_choice::<FinancingOption>(
            &mut errors,
            "otherFinancing",
            &self.other_financing,
            true,
        );
        let other_financing_other = optional_text(
            &mut errors,
            "otherFinancingOther",
            self.other_financing_other.as_ref(),
            OTHER_TEXT_MAX,
        );
        errors.finish(|| {
            Some(Step5 {
                used_gota_gota: used_gota_gota?,
                gota_gota_frequency,
                gota_gota_reasons,
                gota_gota_reason_other,
                other_financing,
                other_financing_other,
            })
        })
    }
}

impl Step6Form {
    pub fn validate(&self) -> Result<Step6, ValidationErrors> {
        let mut errors = ValidationErrors::for_step(6);
        if self.privacy_consent != Some(true) {
            errors.push(
                "privacyConsent",
                "Debes aceptar el tratamiento de datos para continuar",
            );
        }
        errors.finish(|| {
            Some(Step6 {
                privacy_consent: true,
            })
        })
    }
}

impl StepForm {
    pub fn validate(&self) -> Result<StepAnswer, ValidationErrors> {
        Ok(match self {
            Self::Step1(f) => StepAnswer::Step1(f.validate()?),
            Self::Step2(f) => StepAnswer::Step2(f.validate()?),
            Self::Step3(f) => StepAnswer::Step3(f.validate()?),
            Self::Step4(f) => StepAnswer::Step4(f.validate()?),
            Self::Step5(f) => StepAnswer::Step5(f.validate()?),
            Self::Step6(f) => StepAnswer::Step6(f.validate()?),
        })
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl SurveyForms {
    /// Validates every step, collecting the errors of each failing one.
    pub fn validate_all(&self) -> Result<AnswerSet, Vec<ValidationErrors>> {
        let mut answers = AnswerSet::default();
        let mut failures = Vec::new();
        for form in self.clone().into_steps() {
            match form.validate() {
                Ok(answer) => answers.insert(answer),
                Err(e) => failures.push(e),
            }
        }
        if failures.is_empty() {
            Ok(answers)
        } else {
            Err(failures)
        }
    }
}
