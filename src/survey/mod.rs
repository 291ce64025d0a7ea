pub mod cities;
pub mod options;
pub mod types;
pub mod validate;

pub use options::OptionSet;
pub use types::{AnswerSet, StepAnswer, StepForm, SurveyForms, TOTAL_STEPS};
pub use validate::{check_document_number, DocumentPair, FieldError, ValidationErrors};
