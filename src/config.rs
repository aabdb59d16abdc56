use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::mastery::MasteryRule;
use crate::facts::Operation;
use crate::session::mode::InterventionMode;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_student_id")]
    pub student_id: String,
    #[serde(default = "default_target")]
    pub target: Operation,
    #[serde(default = "default_mode")]
    pub mode: InterventionMode,
    #[serde(default = "default_max_operand")]
    pub max_operand: u32,
    #[serde(default)]
    pub randomize: bool,
    #[serde(default = "default_ccc_max_attempts")]
    pub ccc_max_attempts: u32,
    #[serde(default = "default_taped_max_attempts")]
    pub taped_max_attempts: u32,
    #[serde(default = "default_minutes")]
    pub timing_minutes: u32,
    #[serde(default = "default_minutes")]
    pub benchmark_minutes: u32,
    #[serde(default = "default_benchmark_interval_days")]
    pub benchmark_interval_days: u32,
    #[serde(default = "default_mastery_streak")]
    pub mastery_streak: usize,
    #[serde(default = "default_mastery_fluency_ms")]
    pub mastery_fluency_ms: u64,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_student_id() -> String {
    "student".to_string()
}
fn default_target() -> Operation {
    Operation::Multiplication
}
fn default_mode() -> InterventionMode {
    InterventionMode::CoverCopyCompare
}
fn default_max_operand() -> u32 {
    10
}
fn default_ccc_max_attempts() -> u32 {
    3
}
fn default_taped_max_attempts() -> u32 {
    2
}
fn default_minutes() -> u32 {
    2
}
fn default_benchmark_interval_days() -> u32 {
    7
}
fn default_mastery_streak() -> usize {
    3
}
fn default_mastery_fluency_ms() -> u64 {
    4_000
}
fn default_theme() -> String {
    "chalkboard".to_string()
}
fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("factdrill")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            student_id: default_student_id(),
            target: default_target(),
            mode: default_mode(),
            max_operand: default_max_operand(),
            randomize: false,
            ccc_max_attempts: default_ccc_max_attempts(),
            taped_max_attempts: default_taped_max_attempts(),
            timing_minutes: default_minutes(),
            benchmark_minutes: default_minutes(),
            benchmark_interval_days: default_benchmark_interval_days(),
            mastery_streak: default_mastery_streak(),
            mastery_fluency_ms: default_mastery_fluency_ms(),
            theme: default_theme(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("factdrill")
            .join("config.toml")
    }

    /// Clamp numeric settings into ranges the session can work with.
    pub fn validate(&mut self) {
        self.max_operand = self.max_operand.clamp(1, 12);
        self.ccc_max_attempts = self.ccc_max_attempts.clamp(1, 10);
        self.taped_max_attempts = self.taped_max_attempts.clamp(1, 10);
        self.timing_minutes = self.timing_minutes.clamp(1, 10);
        self.benchmark_minutes = self.benchmark_minutes.clamp(1, 10);
        self.benchmark_interval_days = self.benchmark_interval_days.clamp(1, 90);
        self.mastery_streak = self.mastery_streak.clamp(1, 10);
        if self.student_id.trim().is_empty() {
            self.student_id = default_student_id();
        }
    }

    pub fn mastery_rule(&self) -> MasteryRule {
        MasteryRule {
            streak: self.mastery_streak,
            fluency_ms: self.mastery_fluency_ms,
        }
    }
}
