pub mod client;
pub mod row;
pub mod types;

pub use client::{SheetsClient, Submitter};
pub use row::{row_timestamp, submission_row, ROW_HEADERS};
pub use types::{EndpointResponse, HealthStatus, SubmissionReceipt, SubmitError};
