mod engine;

pub use engine::{FocusTimer, TimerState, DEFAULT_FOCUS_MINUTES};
