//! Queue building: flattening a plan into an ordered list of timed steps.
//!
//! Ordering is warm-up, then every main-phase set in order, then cool-down.
//! Warm-up and cool-down never get rest steps. The main phase gets a rest
//! between consecutive exercises of a set and one between sets, both using
//! the plan's `rest_time`. With a `rest_time` of 0 the rests inside a set are
//! dropped, but the rest between sets is still emitted (zero length) so set
//! boundaries stay visible.

use crate::{Exercise, Phase, Plan, Step};

/// Ordered sequence of steps for one session
///
/// The length is fixed once built. Only step durations can change, through
/// manual adjustment by the session timer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Queue {
    steps: Vec<Step>,
}

impl Queue {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Number of exercise steps in the whole queue
    pub fn exercise_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_exercise()).count()
    }

    /// Number of exercise steps strictly before `index`
    pub fn exercises_before(&self, index: usize) -> usize {
        self.steps
            .iter()
            .take(index)
            .filter(|s| s.is_exercise())
            .count()
    }

    /// Sum of all step durations in seconds
    pub fn total_seconds(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.duration())).sum()
    }

    pub(crate) fn step_mut(&mut self, index: usize) -> Option<&mut Step> {
        self.steps.get_mut(index)
    }
}

impl From<Vec<Step>> for Queue {
    fn from(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}

/// Expand a plan into its session queue
///
/// Never fails: a plan with no active entries yields an empty queue, which
/// the host must present as "nothing to run".
pub fn build_queue(plan: &Plan) -> Queue {
    let mut steps = Vec::new();

    push_plain_phase(&mut steps, &plan.warmup, Phase::WarmUp);
    push_main_phase(&mut steps, &plan.workout, plan.rest_time, plan.sets);
    push_plain_phase(&mut steps, &plan.cooldown, Phase::CoolDown);

    tracing::debug!(
        "Built queue for plan {} with {} steps",
        plan.id,
        steps.len()
    );

    Queue { steps }
}

fn active_entries(entries: &[Exercise]) -> Vec<&Exercise> {
    entries.iter().filter(|e| e.is_active()).collect()
}

/// Warm-up and cool-down: exercises only, in order
fn push_plain_phase(steps: &mut Vec<Step>, entries: &[Exercise], phase: Phase) {
    for entry in active_entries(entries) {
        steps.push(Step::Exercise {
            name: entry.name.clone(),
            duration: entry.duration,
            phase,
        });
    }
}

fn push_main_phase(steps: &mut Vec<Step>, entries: &[Exercise], rest_time: u32, sets: u32) {
    let valid = active_entries(entries);
    let Some(first) = valid.first() else {
        return;
    };

    // A zero set count is rejected by Plan::validate; run it once anyway.
    let sets = sets.max(1);

    for set in 1..=sets {
        let phase = Phase::Main { set, sets };

        if set > 1 {
            steps.push(Step::Rest {
                duration: rest_time,
                phase,
                next_name: Some(first.name.clone()),
            });
        }

        for (i, entry) in valid.iter().enumerate() {
            steps.push(Step::Exercise {
                name: entry.name.clone(),
                duration: entry.duration,
                phase,
            });

            if rest_time > 0 {
                if let Some(next) = valid.get(i + 1) {
                    steps.push(Step::Rest {
                        duration: rest_time,
                        phase,
                        next_name: Some(next.name.clone()),
                    });
                }
            }
        }
    }
}
