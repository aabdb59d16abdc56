pub mod benchmark;
pub mod mastery;
