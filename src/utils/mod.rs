//! Shared utilities

pub mod error;
pub mod time;
pub mod timer;

pub use error::{ErrorResponse, TrimmerError, TrimmerResult};
pub use time::{format_time, snap, TIME_PLACEHOLDER};
pub use timer::DelayedTask;
