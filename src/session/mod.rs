pub mod entry;
pub mod machine;
pub mod mode;
pub mod result;

pub use entry::{EntryBuffer, EntryMode, Rejected};
pub use machine::{Phase, SessionEvent, SessionMachine, SessionSignal, SessionState};
pub use mode::{InterventionMode, ModePolicy};
pub use result::{Outcome, ProblemRecord, SessionRecorder, SessionResult};
