//! Plan files and the built-in sample plan.
//!
//! Plans are read from TOML (or JSON, by extension) so the command-line host
//! has something to run. Storing and listing plans is left to the host.

use crate::queue::build_queue;
use crate::{Error, Exercise, Plan, PlanDefaults, Result};
use once_cell::sync::Lazy;
use std::path::Path;

/// Cached sample plan - built once and reused
static SAMPLE_PLAN: Lazy<Plan> = Lazy::new(build_sample_plan);

/// Get a reference to the built-in sample plan
pub fn sample_plan() -> &'static Plan {
    &SAMPLE_PLAN
}

fn build_sample_plan() -> Plan {
    let mut plan = Plan::new("Full body starter");
    plan.warmup = vec![
        Exercise::new("Jumping jacks", 60),
        Exercise::new("Arm circles", 30),
    ];
    plan.workout = vec![
        Exercise::new("Push-ups", 45),
        Exercise::new("Squats", 45),
        Exercise::new("Plank", 45),
    ];
    plan.cooldown = vec![
        Exercise::new("Hamstring stretch", 60),
        Exercise::new("Child's pose", 60),
    ];
    plan.rest_time = 30;
    plan.sets = 2;
    plan
}

/// Template for a new plan: one blank entry per phase with default timings
pub fn template_plan(name: &str, defaults: &PlanDefaults) -> Plan {
    let mut plan = Plan::new(name);
    plan.warmup = vec![Exercise::new("", 60)];
    plan.workout = vec![Exercise::new("", defaults.default_exercise_seconds)];
    plan.cooldown = vec![Exercise::new("", 60)];
    plan.rest_time = defaults.default_rest_seconds;
    plan.sets = defaults.default_sets;
    plan
}

impl Plan {
    /// Parse a plan from TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a plan file; `.json` files are parsed as JSON, anything else as TOML
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let plan = if is_json(path) {
            serde_json::from_str(&contents)?
        } else {
            Self::from_toml_str(&contents)?
        };

        let errors = plan.validate();
        if !errors.is_empty() {
            return Err(Error::PlanValidation(errors.join("; ")));
        }

        tracing::info!("Loaded plan '{}' from {:?}", plan.name, path);
        Ok(plan)
    }

    /// Write the plan as TOML (or pretty JSON for `.json` paths)
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };
        std::fs::write(path, contents)?;
        tracing::info!("Saved plan '{}' to {:?}", self.name, path);
        Ok(())
    }

    /// Total session length in seconds, rests included
    pub fn estimated_total_seconds(&self) -> u64 {
        build_queue(self).total_seconds()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
