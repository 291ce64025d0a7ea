use chrono::{DateTime, Duration, Utc};

use crate::survey::{AnswerSet, OptionSet};

/// Header row of the backing sheet. Order and text are shared with the
/// spreadsheet script and must not change without a version bump.
pub const ROW_HEADERS: [&str; 18] = [
    "Fecha y Hora",
    "Género",
    "Edad",
    "Ciudad",
    "Tipo de Documento",
    "Número de Documento",
    "Negocios Activos",
    "Nombre del Negocio",
    "Cambio en Ingresos",
    "Empleados Actuales",
    "Cambio en Empleados",
    "Usó Gota a Gota",
    "Frecuencia Gota a Gota",
    "Razones Gota a Gota",
    "Razón Otra (Gota a Gota)",
    "Otros Financiamientos",
    "Otro Financiamiento (Especificar)",
    "Consentimiento Privacidad",
];

const MULTI_SELECT_SEPARATOR: &str = "; ";
const BOGOTA_UTC_OFFSET_HOURS: i64 = -5;

/// Row timestamp as the sheet writes it: Bogotá wall time (UTC-5, no DST).
pub fn row_timestamp(at: DateTime<Utc>) -> String {
    (at + Duration::hours(BOGOTA_UTC_OFFSET_HOURS))
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn label<T: OptionSet>(value: Option<T>) -> String {
    value.map(|v| v.label().to_string()).unwrap_or_default()
}

fn joined<T: OptionSet>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.label())
        .collect::<Vec<&str>>()
        .join(MULTI_SELECT_SEPARATOR)
}

/// One appended row per completed survey, in `ROW_HEADERS` order.
pub fn submission_row(answers: &AnswerSet, timestamp: &str) -> Vec<String> {
    let s1 = answers.step1.as_ref();
    let s2 = answers.step2.as_ref();
    let s3 = answers.step3.as_ref();
    let s4 = answers.step4.as_ref();
    let s5 = answers.step5.as_ref();
    let consent = answers
        .step6
        .as_ref()
        .map(|s| s.privacy_consent)
        .unwrap_or(false);

    vec![
        timestamp.to_string(),
        label(s1.map(|s| s.gender)),
        s1.map(|s| s.age.to_string()).unwrap_or_default(),
        s1.map(|s| s.city.clone()).unwrap_or_default(),
        label(s1.map(|s| s.document_type)),
        s1.map(|s| s.document_number.as_str().to_string())
            .unwrap_or_default(),
        label(s2.map(|s| s.active_businesses)),
        s2.and_then(|s| s.business_name.clone()).unwrap_or_default(),
        label(s3.map(|s| s.income_change)),
        label(s4.map(|s| s.current_employees)),
        label(s4.map(|s| s.employee_change)),
        label(s5.map(|s| s.used_gota_gota)),
        label(s5.and_then(|s| s.gota_gota_frequency)),
        s5.map(|s| joined(&s.gota_gota_reasons)).unwrap_or_default(),
        s5.and_then(|s| s.gota_gota_reason_other.clone())
            .unwrap_or_default(),
        s5.map(|s| joined(&s.other_financing)).unwrap_or_default(),
        s5.and_then(|s| s.other_financing_other.clone())
            .unwrap_or_default(),
        if consent { "TRUE" } else { "FALSE" }.to_string(),
    ]
}
