//! Core domain types for the Lift interval timer.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise entries and workout plans (host-supplied input)
//! - Phases and the steps a session walks through

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Rest between exercises when a plan file doesn't specify one
pub const DEFAULT_REST_SECONDS: u32 = 60;

/// Number of sets when a plan file doesn't specify one
pub const DEFAULT_SETS: u32 = 1;

/// Display name of every rest step
pub const REST_NAME: &str = "Rest";

// ============================================================================
// Plan Types
// ============================================================================

/// A single timed exercise entry as edited by the host
///
/// A blank (whitespace-only) name marks the entry as inactive; inactive
/// entries never reach the queue.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    #[serde(default)]
    pub name: String,
    pub duration: u32,
}

impl Exercise {
    pub fn new(name: impl Into<String>, duration: u32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }

    /// Whether this entry takes part in a session
    pub fn is_active(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// A complete workout plan: warm-up, main set(s), cool-down
///
/// A plan is immutable input to a session. Manual time adjustments during a
/// session only touch the derived queue.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    /// Rest between main-phase exercises and between sets, in seconds
    #[serde(default = "default_rest_time")]
    pub rest_time: u32,
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(default)]
    pub warmup: Vec<Exercise>,
    #[serde(default)]
    pub workout: Vec<Exercise>,
    #[serde(default)]
    pub cooldown: Vec<Exercise>,
}

fn default_rest_time() -> u32 {
    DEFAULT_REST_SECONDS
}

fn default_sets() -> u32 {
    DEFAULT_SETS
}

impl Plan {
    /// Create an empty plan with default rest and set count
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rest_time: DEFAULT_REST_SECONDS,
            sets: DEFAULT_SETS,
            warmup: Vec::new(),
            workout: Vec::new(),
            cooldown: Vec::new(),
        }
    }

    /// Name shown to the user; blank names fall back to "Workout N"
    pub fn display_name(&self, fallback_index: usize) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            format!("Workout {}", fallback_index)
        } else {
            trimmed.to_string()
        }
    }

    /// Validate plan contents, returning a list of problems
    ///
    /// Blank entries are ignored: they are filtered out before queue building.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let phases = [
            ("warmup", &self.warmup),
            ("workout", &self.workout),
            ("cooldown", &self.cooldown),
        ];
        for (label, entries) in phases {
            for entry in entries.iter().filter(|e| e.is_active()) {
                if entry.duration == 0 {
                    errors.push(format!(
                        "Exercise '{}' in {} has zero duration",
                        entry.name.trim(),
                        label
                    ));
                }
            }
        }

        if self.sets == 0 {
            errors.push("Plan must have at least one set".to_string());
        }

        errors
    }
}

// ============================================================================
// Step Types
// ============================================================================

/// Phase a step belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Phase {
    WarmUp,
    /// Main phase; `set` is 1-based
    Main { set: u32, sets: u32 },
    CoolDown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::WarmUp => write!(f, "Warm-up"),
            Phase::Main { sets, .. } if *sets <= 1 => write!(f, "Workout"),
            Phase::Main { set, sets } => write!(f, "Workout (set {}/{})", set, sets),
            Phase::CoolDown => write!(f, "Cool-down"),
        }
    }
}

/// One schedulable unit of a session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Exercise {
        name: String,
        duration: u32,
        phase: Phase,
    },
    /// `next_name` is `None` when no exercise follows this rest.
    Rest {
        duration: u32,
        phase: Phase,
        next_name: Option<String>,
    },
}

impl Step {
    pub fn name(&self) -> &str {
        match self {
            Step::Exercise { name, .. } => name,
            Step::Rest { .. } => REST_NAME,
        }
    }

    /// Current duration in seconds (reflects manual adjustments)
    pub fn duration(&self) -> u32 {
        match self {
            Step::Exercise { duration, .. } | Step::Rest { duration, .. } => *duration,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Step::Exercise { phase, .. } | Step::Rest { phase, .. } => *phase,
        }
    }

    pub fn is_exercise(&self) -> bool {
        matches!(self, Step::Exercise { .. })
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Step::Rest { .. })
    }

    /// Name of the upcoming exercise, for rest steps only
    pub fn next_name(&self) -> Option<&str> {
        match self {
            Step::Rest { next_name, .. } => next_name.as_deref(),
            Step::Exercise { .. } => None,
        }
    }

    pub(crate) fn set_duration(&mut self, seconds: u32) {
        match self {
            Step::Exercise { duration, .. } | Step::Rest { duration, .. } => *duration = seconds,
        }
    }
}
