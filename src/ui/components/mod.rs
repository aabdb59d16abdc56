pub mod fact_frame;
pub mod keypad;
pub mod menu;
pub mod progress_bar;
pub mod summary;
