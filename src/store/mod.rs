pub mod json_store;
pub mod schema;

use crate::error::StoreError;
use crate::facts::{FactBank, MasteryIntent, Operation};
use crate::session::result::SessionResult;

/// Read-only snapshot of a student's facts at session start.
pub trait FactBankSupplier {
    fn load_fact_bank(&self, student_id: &str, target: Operation) -> Result<FactBank, StoreError>;
}

/// Applies mastery and skip intents to the student record.
pub trait MasterySink {
    fn emit(&self, student_id: &str, target: Operation, intent: &MasteryIntent) -> Result<(), StoreError>;
}

/// Receives a finished session as one atomic write.
pub trait ResultSink {
    fn persist(&self, student_id: &str, target: Operation, result: &SessionResult) -> Result<(), StoreError>;
}
