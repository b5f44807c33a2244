//! Progress snapshots and end-of-session statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of a finished session, handed to the host's `on_finished`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub plan_id: Uuid,
    pub plan_name: String,
    pub exercises_completed: usize,
    pub exercises_total: usize,
    pub elapsed_seconds: u64,
    /// True when the user ended the session before the queue ran out
    pub finished_early: bool,
    pub finished_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Completed exercises as a percentage of the total (0.0 for an empty total)
    pub fn completion_percent(&self) -> f64 {
        if self.exercises_total == 0 {
            return 0.0;
        }
        (self.exercises_completed as f64 / self.exercises_total as f64 * 100.0).min(100.0)
    }
}

/// Point-in-time view of a running session, for rendering
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    pub step_index: usize,
    pub step_count: usize,
    /// 1-based number of the current exercise ("Exercise 3 / 8").
    /// While resting this is the number of the exercise just done.
    pub exercise_number: usize,
    pub exercise_total: usize,
    pub remaining_seconds: u32,
    pub elapsed_seconds: u64,
    /// 0.0 .. 1.0 elapsed within the current step
    pub step_fraction: f64,
}

/// Format seconds as `m:ss`
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
