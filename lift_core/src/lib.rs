#![forbid(unsafe_code)]

//! Core domain model and session logic for the Lift interval timer.
//!
//! This crate provides:
//! - Domain types (exercises, plans, phases, steps)
//! - Queue building from a plan
//! - The session timer state machine and its observer interface
//! - Progress and summary statistics
//! - Configuration and plan files

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod queue;
pub mod timer;
pub mod summary;
pub mod plan;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, DisplayConfig, PlanDefaults, Theme, TimerConfig};
pub use queue::{build_queue, Queue};
pub use timer::{
    EventLog, PendingAdvance, SessionEvent, SessionObserver, SessionTimer, TimerState,
};
pub use summary::{format_clock, Progress, SessionSummary};
pub use plan::{sample_plan, template_plan};
