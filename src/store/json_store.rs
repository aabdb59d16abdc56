use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::facts::{FactBank, MasteryIntent, Operation};
use crate::generator::fact_set::standard_facts;
use crate::session::result::SessionResult;
use crate::store::schema::{FactLists, SessionHistoryData, StoredSession, StudentRecord};
use crate::store::{FactBankSupplier, MasterySink, ResultSink};

/// One JSON document per student under `students/`, one history document per
/// student under `history/`. Every write goes to a temp file that is renamed
/// over the original, so a document is either fully old or fully new.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(base_dir.join("students"))?;
        fs::create_dir_all(base_dir.join("history"))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn student_path(&self, student_id: &str) -> PathBuf {
        self.base_dir
            .join("students")
            .join(format!("{}.json", file_stem(student_id)))
    }

    fn history_path(&self, student_id: &str) -> PathBuf {
        self.base_dir
            .join("history")
            .join(format!("{}.json", file_stem(student_id)))
    }

    fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn load_student(&self, student_id: &str) -> Result<Option<StudentRecord>, StoreError> {
        Self::read(&self.student_path(student_id))
    }

    pub fn save_student(&self, record: &StudentRecord) -> Result<(), StoreError> {
        Self::write(&self.student_path(&record.student_id), record)
    }

    /// Seeds the standard fact set for `target` when the student has no record
    /// or no bank for that operation yet. A bank that exists but has been
    /// emptied is left alone.
    pub fn ensure_student(
        &self,
        student_id: &str,
        target: Operation,
        max_operand: u32,
    ) -> Result<StudentRecord, StoreError> {
        let mut record = match self.load_student(student_id)? {
            Some(record) if record.bank(target).is_some() => return Ok(record),
            Some(record) => record,
            None => StudentRecord::new(student_id),
        };
        *record.bank_mut(target) = FactLists::from_problems(&standard_facts(target, max_operand)?);
        self.save_student(&record)?;
        info!(student = student_id, %target, "seeded standard facts");
        Ok(record)
    }

    pub fn load_history(&self, student_id: &str) -> Result<SessionHistoryData, StoreError> {
        Ok(Self::read(&self.history_path(student_id))?.unwrap_or_default())
    }

    pub fn history_for(&self, student_id: &str, target: Operation) -> Result<Vec<SessionResult>, StoreError> {
        Ok(self.load_history(student_id)?.for_target(target))
    }
}

impl FactBankSupplier for JsonStore {
    fn load_fact_bank(&self, student_id: &str, target: Operation) -> Result<FactBank, StoreError> {
        let record = self
            .load_student(student_id)?
            .ok_or_else(|| StoreError::UnknownStudent(student_id.to_string()))?;
        match record.bank(target) {
            Some(lists) => Ok(lists.to_bank()?),
            None => Ok(FactBank::default()),
        }
    }
}

impl MasterySink for JsonStore {
    fn emit(&self, student_id: &str, target: Operation, intent: &MasteryIntent) -> Result<(), StoreError> {
        let mut record = self
            .load_student(student_id)?
            .ok_or_else(|| StoreError::UnknownStudent(student_id.to_string()))?;
        if record
            .bank_mut(target)
            .apply(&intent.problem_id, intent.transition)
        {
            self.save_student(&record)?;
            info!(student = student_id, problem = %intent.problem_id, transition = ?intent.transition, "fact moved");
        } else {
            debug!(student = student_id, problem = %intent.problem_id, "intent for fact not targeted");
        }
        Ok(())
    }
}

impl ResultSink for JsonStore {
    fn persist(&self, student_id: &str, target: Operation, result: &SessionResult) -> Result<(), StoreError> {
        let path = self.history_path(student_id);
        let mut history = self.load_history(student_id)?;
        history.sessions.push(StoredSession {
            target,
            result: result.clone(),
        });
        Self::write(&path, &history)?;
        info!(student = student_id, %target, sessions = history.sessions.len(), "session persisted");
        Ok(())
    }
}

/// Student ids become file names; anything outside `[A-Za-z0-9_-]` is replaced.
/// Letters, digits and `-` pass through; every other byte is written as
/// `_` plus two hex digits, so distinct ids never share a file.
fn file_stem(student_id: &str) -> String {
    let mut stem = String::with_capacity(student_id.len());
    for byte in student_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("_{byte:02x}"));
        }
    }
    stem
}
