use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::session::entry::EntryMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionMode {
    CoverCopyCompare,
    ExplicitTiming,
    TapedProblems,
    Benchmark,
}

impl InterventionMode {
    pub const ALL: [InterventionMode; 4] = [
        InterventionMode::CoverCopyCompare,
        InterventionMode::ExplicitTiming,
        InterventionMode::TapedProblems,
        InterventionMode::Benchmark,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InterventionMode::CoverCopyCompare => "ccc",
            InterventionMode::ExplicitTiming => "explicit-timing",
            InterventionMode::TapedProblems => "taped-problems",
            InterventionMode::Benchmark => "benchmark",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InterventionMode::CoverCopyCompare => "Cover-Copy-Compare",
            InterventionMode::ExplicitTiming => "Explicit Timing",
            InterventionMode::TapedProblems => "Taped Problems",
            InterventionMode::Benchmark => "Benchmark",
        }
    }

    pub fn is_timed(self) -> bool {
        matches!(
            self,
            InterventionMode::ExplicitTiming | InterventionMode::Benchmark
        )
    }
}

impl fmt::Display for InterventionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterventionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "ccc" | "cover-copy-compare" => Ok(InterventionMode::CoverCopyCompare),
            "et" | "explicit-timing" => Ok(InterventionMode::ExplicitTiming),
            "tp" | "taped-problems" => Ok(InterventionMode::TapedProblems),
            "benchmark" | "bench" => Ok(InterventionMode::Benchmark),
            other => Err(format!("unknown intervention mode {other:?}")),
        }
    }
}

/// How a mode drives the session machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModePolicy {
    pub mode: InterventionMode,
    pub entry: EntryMode,
    /// Hide the stimulus while the learner copies it.
    pub covers: bool,
    /// Attempts allowed per problem before it is recorded as incorrect.
    pub max_attempts: u32,
    pub deadline: Option<Duration>,
    pub shuffle: bool,
}

impl ModePolicy {
    pub fn for_mode(mode: InterventionMode, config: &Config) -> Self {
        let minutes = |m: u32| Some(Duration::from_secs(u64::from(m) * 60));
        match mode {
            InterventionMode::CoverCopyCompare => Self {
                mode,
                entry: EntryMode::ProblemEntry,
                covers: true,
                max_attempts: config.ccc_max_attempts.max(1),
                deadline: None,
                shuffle: config.randomize,
            },
            InterventionMode::TapedProblems => Self {
                mode,
                entry: EntryMode::AnswerEntry,
                covers: false,
                max_attempts: config.taped_max_attempts.max(1),
                deadline: None,
                shuffle: config.randomize,
            },
            InterventionMode::ExplicitTiming => Self {
                mode,
                entry: EntryMode::AnswerEntry,
                covers: false,
                max_attempts: 1,
                deadline: minutes(config.timing_minutes),
                shuffle: config.randomize,
            },
            InterventionMode::Benchmark => Self {
                mode,
                entry: EntryMode::AnswerEntry,
                covers: false,
                max_attempts: 1,
                deadline: minutes(config.benchmark_minutes),
                shuffle: true,
            },
        }
    }
}
