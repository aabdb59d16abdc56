use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ProblemError;
use crate::facts::{FactBank, FactTransition, Operation, Problem};
use crate::session::result::SessionResult;

pub const SCHEMA_VERSION: u32 = 1;

/// Stored fact strings for one target. Strings are kept as authored; they are
/// parsed (and rejected if malformed) when a bank is loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactLists {
    #[serde(default)]
    pub targeted: Vec<String>,
    #[serde(default)]
    pub mastered: Vec<String>,
    #[serde(default)]
    pub skipped: Vec<String>,
}

impl FactLists {
    pub fn from_problems(problems: &[Problem]) -> Self {
        Self {
            targeted: problems.iter().map(Problem::canonical).collect(),
            ..Self::default()
        }
    }

    pub fn to_bank(&self) -> Result<FactBank, ProblemError> {
        FactBank::from_fact_strings(&self.targeted, &self.mastered, &self.skipped)
    }

    /// Moves `problem_id` out of `targeted`. Returns false when it was not
    /// targeted, leaving the lists untouched.
    pub fn apply(&mut self, problem_id: &str, transition: FactTransition) -> bool {
        let Some(pos) = self.targeted.iter().position(|fact| same_fact(fact, problem_id)) else {
            return false;
        };
        let fact = self.targeted.remove(pos);
        match transition {
            FactTransition::ToMastered => self.mastered.push(fact),
            FactTransition::ToSkipped => self.skipped.push(fact),
        }
        true
    }
}

fn same_fact(stored: &str, problem_id: &str) -> bool {
    stored == problem_id
        || stored
            .parse::<Problem>()
            .is_ok_and(|p| p.canonical() == problem_id)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StudentRecord {
    pub schema_version: u32,
    pub student_id: String,
    /// Keyed by `Operation::as_str`.
    #[serde(default)]
    pub banks: BTreeMap<String, FactLists>,
}

impl StudentRecord {
    pub fn new(student_id: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            student_id: student_id.to_string(),
            banks: BTreeMap::new(),
        }
    }

    pub fn bank(&self, target: Operation) -> Option<&FactLists> {
        self.banks.get(target.as_str())
    }

    pub fn bank_mut(&mut self, target: Operation) -> &mut FactLists {
        self.banks.entry(target.as_str().to_string()).or_default()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredSession {
    pub target: Operation,
    pub result: SessionResult,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionHistoryData {
    pub schema_version: u32,
    #[serde(default)]
    pub sessions: Vec<StoredSession>,
}

impl Default for SessionHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

impl SessionHistoryData {
    /// Results for `target`, oldest first.
    pub fn for_target(&self, target: Operation) -> Vec<SessionResult> {
        self.sessions
            .iter()
            .filter(|s| s.target == target)
            .map(|s| s.result.clone())
            .collect()
    }
}
