pub mod frame;

pub use frame::{Frame, LineTone, compose, equals_line, layout, stimulus};
