//! Services the concept tree depends on
//!
//! The hierarchy source abstraction, plus the log setup used by the CLI.

pub mod source;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
#[cfg(feature = "runtime")]
pub mod warning_log;
