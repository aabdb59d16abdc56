//! Math-fact fluency practice: the session engine behind Cover-Copy-Compare,
//! Explicit Timing, Taped Problems and Benchmark drills, plus the file-backed
//! student store it reads facts from and writes results to.

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod facts;
pub mod generator;
pub mod session;
pub mod store;
