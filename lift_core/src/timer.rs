//! Session timer: the state machine that walks a queue step by step.
//!
//! The timer does not own a clock or a thread. The host drives it:
//! - a periodic tick source calls [`SessionTimer::tick`] once per second
//!   while the session is running
//! - when a step's countdown reaches zero the timer records a
//!   [`PendingAdvance`]; the host waits `delay` (so the completion cue can
//!   play) and then calls [`SessionTimer::complete_pending`] with its ticket
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Paused <-> Running -> Finished
//!   \                  \
//!    -> Empty           -> Stopped
//! ```
//!
//! Operations that make no sense in the current state are silent no-ops.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::queue::{build_queue, Queue};
use crate::summary::{Progress, SessionSummary};
use crate::{Plan, Step, TimerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Created, `start()` not called yet
    Idle,
    /// Started with a queue that has no steps
    Empty,
    /// Positioned on a step, countdown halted
    Paused,
    Running,
    /// Queue exhausted or user finished early; a summary exists
    Finished,
    /// Abandoned without recording completion
    Stopped,
}

/// Deferred advance scheduled after a step completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAdvance {
    pub ticket: u64,
    pub delay: Duration,
}

/// Receiver for session lifecycle events
///
/// All methods default to no-ops so hosts only implement what they render.
pub trait SessionObserver {
    /// Low-time warning for `seconds_remaining` in `1..=warning_seconds`
    fn on_warning(&mut self, _seconds_remaining: u32) {}

    /// Countdown of the step at `index` reached zero
    fn on_step_complete(&mut self, _index: usize, _step: &Step) {}

    /// The session moved onto the step at `index`
    fn on_phase_changed(&mut self, _index: usize, _step: &Step) {}

    fn on_finished(&mut self, _summary: &SessionSummary) {}

    /// `start()` found nothing to run
    fn on_empty(&mut self) {}
}

/// Event as recorded by [`EventLog`]
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Warning(u32),
    StepComplete { index: usize },
    PhaseChanged { index: usize, step: Step },
    Finished(SessionSummary),
    Empty,
}

/// Observer that records every event in order
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<SessionEvent>,
}

impl EventLog {
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// Drain recorded events
    pub fn take(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Warning values in the order they fired
    pub fn warnings(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Warning(s) => Some(*s),
                _ => None,
            })
            .collect()
    }
}

impl SessionObserver for EventLog {
    fn on_warning(&mut self, seconds_remaining: u32) {
        self.events.push(SessionEvent::Warning(seconds_remaining));
    }

    fn on_step_complete(&mut self, index: usize, _step: &Step) {
        self.events.push(SessionEvent::StepComplete { index });
    }

    fn on_phase_changed(&mut self, index: usize, step: &Step) {
        self.events.push(SessionEvent::PhaseChanged {
            index,
            step: step.clone(),
        });
    }

    fn on_finished(&mut self, summary: &SessionSummary) {
        self.events.push(SessionEvent::Finished(summary.clone()));
    }

    fn on_empty(&mut self) {
        self.events.push(SessionEvent::Empty);
    }
}

/// Interval timer for one session
///
/// Owns the session's queue (the plan itself is never touched), a cursor
/// into it and the countdown for the current step.
#[derive(Debug)]
pub struct SessionTimer<O = EventLog> {
    plan_id: Uuid,
    plan_name: String,
    queue: Queue,
    config: TimerConfig,
    state: TimerState,
    current_index: usize,
    remaining_seconds: u32,
    elapsed_seconds: u64,
    /// Warning values already emitted for the current step
    warned: BTreeSet<u32>,
    pending: Option<PendingAdvance>,
    next_ticket: u64,
    summary: Option<SessionSummary>,
    observer: O,
}

impl<O: SessionObserver> SessionTimer<O> {
    /// Create a timer over an already built queue
    pub fn new(plan: &Plan, queue: Queue, config: TimerConfig, observer: O) -> Self {
        Self {
            plan_id: plan.id,
            plan_name: plan.name.clone(),
            queue,
            config,
            state: TimerState::Idle,
            current_index: 0,
            remaining_seconds: 0,
            elapsed_seconds: 0,
            warned: BTreeSet::new(),
            pending: None,
            next_ticket: 0,
            summary: None,
            observer,
        }
    }

    /// Build the plan's queue and create a timer over it
    pub fn for_plan(plan: &Plan, config: TimerConfig, observer: O) -> Self {
        let queue = build_queue(plan);
        Self::new(plan, queue, config, observer)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == TimerState::Finished
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Step under the cursor; `None` before start or for an empty queue
    pub fn current_step(&self) -> Option<&Step> {
        match self.state {
            TimerState::Idle | TimerState::Empty => None,
            _ => self.queue.get(self.current_index),
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn pending_advance(&self) -> Option<PendingAdvance> {
        self.pending
    }

    /// Summary of a finished session
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Rendering snapshot of the current position
    pub fn progress(&self) -> Option<Progress> {
        let step = self.current_step()?;
        let duration = step.duration();
        let step_fraction = if duration == 0 {
            0.0
        } else {
            (1.0 - f64::from(self.remaining_seconds) / f64::from(duration)).clamp(0.0, 1.0)
        };

        Some(Progress {
            step_index: self.current_index,
            step_count: self.queue.len(),
            exercise_number: self.queue.exercises_before(self.current_index + 1),
            exercise_total: self.queue.exercise_count(),
            remaining_seconds: self.remaining_seconds,
            elapsed_seconds: self.elapsed_seconds,
            step_fraction,
        })
    }

    fn is_active(&self) -> bool {
        matches!(self.state, TimerState::Running | TimerState::Paused)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Position on the first step without starting the countdown
    ///
    /// With an empty queue the timer enters `Empty` and notifies `on_empty`;
    /// the host shows guidance instead of running anything.
    pub fn start(&mut self) {
        if !matches!(self.state, TimerState::Idle | TimerState::Empty) {
            return;
        }

        let Some(first) = self.queue.get(0) else {
            tracing::info!("Plan '{}' has no steps to run", self.plan_name);
            self.state = TimerState::Empty;
            self.observer.on_empty();
            return;
        };

        self.current_index = 0;
        self.remaining_seconds = first.duration();
        self.warned.clear();
        self.pending = None;
        self.state = TimerState::Paused;

        tracing::debug!(
            "Session started for '{}' with {} steps",
            self.plan_name,
            self.queue.len()
        );
        self.observer.on_phase_changed(0, first);
    }

    pub fn resume(&mut self) {
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
            tracing::debug!("Resumed at step {}", self.current_index);
        }
    }

    /// Halt the countdown. A pending advance stays scheduled.
    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
            tracing::debug!(
                "Paused at step {} with {}s remaining",
                self.current_index,
                self.remaining_seconds
            );
        }
    }

    /// Flip between running and paused
    pub fn toggle(&mut self) {
        match self.state {
            TimerState::Running => self.pause(),
            TimerState::Paused => self.resume(),
            _ => {}
        }
    }

    /// One elapsed second. Ignored unless running.
    pub fn tick(&mut self) {
        if self.state != TimerState::Running {
            return;
        }

        self.elapsed_seconds += 1;

        // Countdown is over; waiting for the host to fire the advance.
        if self.pending.is_some() {
            return;
        }

        let remaining = self.remaining_seconds.saturating_sub(1);
        self.remaining_seconds = remaining;

        if (1..=self.config.warning_seconds).contains(&remaining) && self.warned.insert(remaining)
        {
            self.observer.on_warning(remaining);
        }

        if remaining == 0 {
            self.next_ticket += 1;
            let pending = PendingAdvance {
                ticket: self.next_ticket,
                delay: Duration::from_millis(self.config.grace_ms),
            };
            self.pending = Some(pending);

            tracing::debug!(
                "Step {} complete, advance scheduled (ticket {})",
                self.current_index,
                pending.ticket
            );
            if let Some(step) = self.queue.get(self.current_index) {
                self.observer.on_step_complete(self.current_index, step);
            }
        }
    }

    /// Fire the deferred advance identified by `ticket`
    ///
    /// Returns false when the ticket was cancelled or superseded (the session
    /// was stopped, skipped, rewound or adjusted in the meantime).
    pub fn complete_pending(&mut self, ticket: u64) -> bool {
        match self.pending {
            Some(pending) if pending.ticket == ticket => {
                self.pending = None;
                self.advance();
                true
            }
            _ => {
                tracing::debug!("Ignoring stale advance ticket {}", ticket);
                false
            }
        }
    }

    /// Fire whatever advance is pending, without waiting
    pub fn fire_pending(&mut self) -> bool {
        match self.pending {
            Some(pending) => self.complete_pending(pending.ticket),
            None => false,
        }
    }

    /// Cancel the pending advance, if any
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!("Cancelled advance ticket {}", pending.ticket);
        }
    }

    /// Jump to the next step immediately, with no completion cue
    pub fn skip(&mut self) {
        if !self.is_active() {
            return;
        }
        tracing::debug!("Skipping step {}", self.current_index);
        self.cancel_pending();
        self.remaining_seconds = 0;
        self.advance();
    }

    /// Go back one step, restoring its (possibly adjusted) duration
    pub fn previous(&mut self) {
        if !self.is_active() || self.current_index == 0 {
            return;
        }
        self.cancel_pending();
        self.current_index -= 1;
        self.enter_current_step();
        tracing::debug!("Went back to step {}", self.current_index);
    }

    /// Add `delta_seconds` to the current step and its countdown
    ///
    /// Both are floored at 1 second, so manual adjustment can never end a
    /// step. Adjusting during the post-completion grace period cancels the
    /// pending advance and the countdown resumes.
    pub fn adjust_duration(&mut self, delta_seconds: i32) {
        if !self.is_active() {
            return;
        }

        self.remaining_seconds = offset_floored(self.remaining_seconds, delta_seconds);
        if let Some(step) = self.queue.step_mut(self.current_index) {
            let adjusted = offset_floored(step.duration(), delta_seconds);
            step.set_duration(adjusted);
        }
        self.cancel_pending();

        tracing::debug!(
            "Adjusted step {} by {}s, {}s remaining",
            self.current_index,
            delta_seconds,
            self.remaining_seconds
        );
    }

    /// Abandon the session without recording completion
    pub fn stop(&mut self) {
        if !self.is_active() {
            return;
        }
        self.cancel_pending();
        self.state = TimerState::Stopped;
        tracing::info!(
            "Session '{}' stopped at step {}",
            self.plan_name,
            self.current_index
        );
    }

    /// Finish before the queue runs out
    ///
    /// Counts exercises strictly before the current step. The current step
    /// counts only if its countdown already reached zero.
    pub fn finish_early(&mut self) {
        if !self.is_active() {
            return;
        }

        let current_done = self.remaining_seconds == 0
            && self
                .queue
                .get(self.current_index)
                .is_some_and(|s| s.is_exercise());
        let completed = self.queue.exercises_before(self.current_index) + usize::from(current_done);

        self.finish(completed, true);
    }

    // ── Internals ────────────────────────────────────────────────────

    fn advance(&mut self) {
        let next = self.current_index + 1;
        if next < self.queue.len() {
            self.current_index = next;
            self.enter_current_step();
        } else {
            let total = self.queue.exercise_count();
            self.finish(total, false);
        }
    }

    fn enter_current_step(&mut self) {
        self.warned.clear();
        if let Some(step) = self.queue.get(self.current_index) {
            self.remaining_seconds = step.duration();
            self.observer.on_phase_changed(self.current_index, step);
        }
    }

    fn finish(&mut self, exercises_completed: usize, finished_early: bool) {
        self.cancel_pending();
        self.state = TimerState::Finished;

        let summary = SessionSummary {
            plan_id: self.plan_id,
            plan_name: self.plan_name.clone(),
            exercises_completed,
            exercises_total: self.queue.exercise_count(),
            elapsed_seconds: self.elapsed_seconds,
            finished_early,
            finished_at: chrono::Utc::now(),
        };

        tracing::info!(
            "Session '{}' finished: {}/{} exercises in {}s{}",
            summary.plan_name,
            summary.exercises_completed,
            summary.exercises_total,
            summary.elapsed_seconds,
            if finished_early { " (early)" } else { "" }
        );

        self.observer.on_finished(&summary);
        self.summary = Some(summary);
    }
}

/// `value + delta`, never below 1
fn offset_floored(value: u32, delta: i32) -> u32 {
    let adjusted = i64::from(value) + i64::from(delta);
    adjusted.clamp(1, i64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Exercise;

    fn plan(workout: Vec<Exercise>, rest_time: u32, sets: u32) -> Plan {
        let mut plan = Plan::new("Test plan");
        plan.workout = workout;
        plan.rest_time = rest_time;
        plan.sets = sets;
        plan
    }

    fn push_ups_and_squats(sets: u32) -> Plan {
        plan(
            vec![
                Exercise::new("Push-ups", 30),
                Exercise::new("Squats", 30),
            ],
            15,
            sets,
        )
    }

    fn started(plan: &Plan) -> SessionTimer {
        let mut timer = SessionTimer::for_plan(plan, TimerConfig::default(), EventLog::default());
        timer.start();
        timer.resume();
        timer
    }

    /// One tick, then fire any advance as if the grace delay had elapsed
    fn tick_and_settle(timer: &mut SessionTimer) {
        timer.tick();
        timer.fire_pending();
    }

    fn step_completes(timer: &SessionTimer) -> usize {
        timer
            .observer()
            .events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::StepComplete { .. }))
            .count()
    }

    #[test]
    fn test_start_positions_paused_on_first_step() {
        crate::logging::init_test();
        let plan = push_ups_and_squats(1);
        let mut timer = SessionTimer::for_plan(&plan, TimerConfig::default(), EventLog::default());
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.current_step().is_none());

        timer.start();
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.current_index(), 0);
        assert_eq!(timer.remaining_seconds(), 30);
        assert!(matches!(
            timer.observer().events(),
            [SessionEvent::PhaseChanged { index: 0, .. }]
        ));

        // Not running yet: ticks do nothing
        timer.tick();
        assert_eq!(timer.remaining_seconds(), 30);
        assert_eq!(timer.elapsed_seconds(), 0);
    }

    #[test]
    fn test_empty_queue_signals_empty() {
        let plan = plan(vec![Exercise::new("  ", 30)], 15, 2);
        let mut timer = SessionTimer::for_plan(&plan, TimerConfig::default(), EventLog::default());

        timer.start();
        timer.resume();
        timer.tick();

        assert_eq!(timer.state(), TimerState::Empty);
        assert_eq!(timer.observer().events(), &[SessionEvent::Empty]);
        assert!(timer.current_step().is_none());
        assert!(timer.progress().is_none());
        assert_eq!(timer.elapsed_seconds(), 0);
    }

    #[test]
    fn test_operations_before_start_are_noops() {
        let plan = push_ups_and_squats(1);
        let mut timer = SessionTimer::for_plan(&plan, TimerConfig::default(), EventLog::default());

        timer.resume();
        timer.tick();
        timer.skip();
        timer.previous();
        timer.adjust_duration(10);
        timer.finish_early();
        timer.stop();

        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.observer().events().is_empty());
        assert!(timer.summary().is_none());
    }

    #[test]
    fn test_countdown_reaches_zero_after_duration_ticks() {
        let plan = plan(vec![Exercise::new("Plank", 10)], 0, 1);
        let mut timer = started(&plan);

        for _ in 0..9 {
            timer.tick();
        }
        assert_eq!(step_completes(&timer), 0);
        assert_eq!(timer.remaining_seconds(), 1);

        timer.tick();
        assert_eq!(step_completes(&timer), 1);
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(
            timer.pending_advance().map(|p| p.delay),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn test_warnings_fire_once_each_for_three_two_one() {
        let plan = plan(vec![Exercise::new("Plank", 10)], 0, 1);
        let mut timer = started(&plan);

        for _ in 0..10 {
            timer.tick();
        }
        assert_eq!(timer.observer().warnings(), vec![3, 2, 1]);
    }

    #[test]
    fn test_warning_not_repeated_after_adjusting_up() {
        let plan = plan(vec![Exercise::new("Plank", 10)], 0, 1);
        let mut timer = started(&plan);

        for _ in 0..8 {
            timer.tick();
        }
        assert_eq!(timer.observer().warnings(), vec![3, 2]);

        timer.adjust_duration(5);
        assert_eq!(timer.remaining_seconds(), 7);
        for _ in 0..7 {
            timer.tick();
        }
        assert_eq!(timer.observer().warnings(), vec![3, 2, 1]);
        assert_eq!(step_completes(&timer), 1);
    }

    #[test]
    fn test_warnings_reset_on_step_change() {
        let plan = plan(
            vec![Exercise::new("A", 5), Exercise::new("B", 5)],
            0,
            1,
        );
        let mut timer = started(&plan);

        for _ in 0..10 {
            tick_and_settle(&mut timer);
        }
        assert_eq!(timer.observer().warnings(), vec![3, 2, 1, 3, 2, 1]);
        assert!(timer.is_finished());
    }

    #[test]
    fn test_custom_warning_window() {
        let plan = plan(vec![Exercise::new("Plank", 8)], 0, 1);
        let config = TimerConfig {
            warning_seconds: 5,
            ..TimerConfig::default()
        };
        let mut timer = SessionTimer::for_plan(&plan, config, EventLog::default());
        timer.start();
        timer.resume();

        for _ in 0..8 {
            timer.tick();
        }
        assert_eq!(timer.observer().warnings(), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_full_session_without_intervention() {
        let plan = push_ups_and_squats(1);
        let mut timer = started(&plan);

        for _ in 0..74 {
            tick_and_settle(&mut timer);
        }
        assert!(!timer.is_finished());
        assert_eq!(timer.current_index(), 2);

        tick_and_settle(&mut timer);
        assert!(timer.is_finished());
        assert!(!timer.is_running());

        let summary = timer.summary().unwrap();
        assert_eq!(summary.exercises_completed, 2);
        assert_eq!(summary.exercises_total, 2);
        assert_eq!(summary.elapsed_seconds, 75);
        assert_eq!(summary.plan_id, plan.id);
        assert!(!summary.finished_early);
        assert!(matches!(
            timer.observer().events().last(),
            Some(SessionEvent::Finished(_))
        ));
    }

    #[test]
    fn test_two_set_session_visits_inter_set_rest() {
        let plan = push_ups_and_squats(2);
        let mut timer = started(&plan);

        let mut visited = vec![timer.current_step().unwrap().name().to_string()];
        while !timer.is_finished() {
            let before = timer.current_index();
            tick_and_settle(&mut timer);
            if timer.current_index() != before {
                visited.push(timer.current_step().unwrap().name().to_string());
            }
        }

        assert_eq!(
            visited,
            vec!["Push-ups", "Rest", "Squats", "Rest", "Push-ups", "Rest", "Squats"]
        );
        assert_eq!(timer.elapsed_seconds(), 4 * 30 + 3 * 15);
        assert_eq!(timer.summary().unwrap().exercises_total, 4);
    }

    #[test]
    fn test_zero_length_inter_set_rest_passes_in_one_tick() {
        let plan = plan(
            vec![
                Exercise::new("Push-ups", 30),
                Exercise::new("Squats", 30),
            ],
            0,
            2,
        );
        let mut timer = started(&plan);

        for _ in 0..60 {
            tick_and_settle(&mut timer);
        }
        assert_eq!(timer.current_step().map(Step::is_rest), Some(true));
        assert_eq!(timer.remaining_seconds(), 0);

        tick_and_settle(&mut timer);
        assert_eq!(timer.current_step().map(Step::name), Some("Push-ups"));

        while !timer.is_finished() {
            tick_and_settle(&mut timer);
        }
        let summary = timer.summary().unwrap();
        assert_eq!(summary.exercises_completed, 4);
        assert_eq!(summary.elapsed_seconds, 4 * 30 + 1);
    }

    #[test]
    fn test_skip_on_final_step_finishes_with_full_completion() {
        let plan = push_ups_and_squats(1);
        let mut timer = started(&plan);

        timer.skip();
        timer.skip();
        assert_eq!(timer.current_index(), 2);
        timer.skip();

        assert!(timer.is_finished());
        let summary = timer.summary().unwrap();
        assert_eq!(summary.exercises_completed, summary.exercises_total);
        assert_eq!(step_completes(&timer), 0);
    }

    #[test]
    fn test_skip_while_paused_stays_paused() {
        let plan = push_ups_and_squats(1);
        let mut timer = started(&plan);
        timer.pause();

        timer.skip();
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.current_index(), 1);
        assert_eq!(timer.remaining_seconds(), 15);
    }

    #[test]
    fn test_previous_at_first_step_is_noop() {
        let plan = push_ups_and_squats(1);
        let mut timer = started(&plan);
        timer.tick();

        let events_before = timer.observer().events().len();
        timer.previous();

        assert_eq!(timer.current_index(), 0);
        assert_eq!(timer.remaining_seconds(), 29);
        assert_eq!(timer.observer().events().len(), events_before);
    }

    #[test]
    fn test_previous_restores_adjusted_duration() {
        let plan = push_ups_and_squats(1);
        let mut timer = started(&plan);

        timer.adjust_duration(10);
        assert_eq!(timer.remaining_seconds(), 40);
        timer.skip();
        timer.previous();

        assert_eq!(timer.current_index(), 0);
        assert_eq!(timer.remaining_seconds(), 40);
        assert_eq!(timer.queue().get(0).unwrap().duration(), 40);
        // The plan itself is untouched
        assert_eq!(plan.workout[0].duration, 30);
    }

    #[test]
    fn test_adjust_never_drops_below_one() {
        let plan = push_ups_and_squats(1);
        let mut timer = started(&plan);

        timer.adjust_duration(-1000);
        assert_eq!(timer.remaining_seconds(), 1);
        assert_eq!(timer.current_step().unwrap().duration(), 1);
        assert!(timer.pending_advance().is_none());

        timer.tick();
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(step_completes(&timer), 1);
    }

    #[test]
    fn test_adjust_during_grace_cancels_advance() {
        let plan = plan(vec![Exercise::new("A", 2), Exercise::new("B", 2)], 0, 1);
        let mut timer = started(&plan);
        timer.tick();
        timer.tick();
        let pending = timer.pending_advance().unwrap();

        timer.adjust_duration(5);
        assert_eq!(timer.remaining_seconds(), 5);
        assert!(!timer.complete_pending(pending.ticket));
        assert_eq!(timer.current_index(), 0);
    }

    #[test]
    fn test_pause_freezes_countdown_and_elapsed() {
        let plan = push_ups_and_squats(1);
        let mut timer = started(&plan);
        timer.tick();
        timer.tick();

        timer.pause();
        for _ in 0..5 {
            timer.tick();
        }
        assert_eq!(timer.remaining_seconds(), 28);
        assert_eq!(timer.elapsed_seconds(), 2);

        timer.toggle();
        timer.tick();
        assert!(timer.is_running());
        assert_eq!(timer.remaining_seconds(), 27);
        assert_eq!(timer.elapsed_seconds(), 3);
    }

    #[test]
    fn test_elapsed_keeps_counting_during_grace() {
        let plan = plan(vec![Exercise::new("A", 2), Exercise::new("B", 2)], 0, 1);
        let mut timer = started(&plan);
        timer.tick();
        timer.tick();
        timer.tick();

        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(timer.elapsed_seconds(), 3);
        assert_eq!(step_completes(&timer), 1);
    }

    #[test]
    fn test_stop_during_grace_cancels_advance() {
        let plan = push_ups_and_squats(1);
        let mut timer = started(&plan);
        for _ in 0..30 {
            timer.tick();
        }
        let pending = timer.pending_advance().expect("advance scheduled");

        timer.stop();
        assert_eq!(timer.state(), TimerState::Stopped);
        assert!(timer.pending_advance().is_none());

        // Late callback and leaked ticks must not touch the discarded session
        assert!(!timer.complete_pending(pending.ticket));
        timer.tick();
        assert_eq!(timer.current_index(), 0);
        assert_eq!(timer.elapsed_seconds(), 30);
        assert!(timer.summary().is_none());
        assert!(!timer
            .observer()
            .events()
            .iter()
            .any(|e| matches!(e, SessionEvent::Finished(_))));
    }

    #[test]
    fn test_skip_during_grace_does_not_double_advance() {
        let plan = plan(
            vec![
                Exercise::new("A", 1),
                Exercise::new("B", 5),
                Exercise::new("C", 5),
            ],
            0,
            1,
        );
        let mut timer = started(&plan);
        timer.tick();
        let stale = timer.pending_advance().unwrap();

        timer.skip();
        assert_eq!(timer.current_index(), 1);
        assert!(!timer.complete_pending(stale.ticket));
        assert_eq!(timer.current_index(), 1);
    }

    #[test]
    fn test_pending_advance_survives_pause() {
        let plan = plan(vec![Exercise::new("A", 1), Exercise::new("B", 5)], 0, 1);
        let mut timer = started(&plan);
        timer.tick();
        timer.pause();

        assert!(timer.fire_pending());
        assert_eq!(timer.current_index(), 1);
        assert_eq!(timer.state(), TimerState::Paused);
    }

    #[test]
    fn test_finish_early_counts_passed_exercises() {
        let plan = push_ups_and_squats(2);
        let mut timer = started(&plan);

        // Push-ups, Rest -> now on Squats (index 2)
        timer.skip();
        timer.skip();
        for _ in 0..10 {
            timer.tick();
        }
        timer.finish_early();

        assert!(timer.is_finished());
        let summary = timer.summary().unwrap();
        assert_eq!(summary.exercises_completed, 1);
        assert_eq!(summary.exercises_total, 4);
        assert_eq!(summary.elapsed_seconds, 10);
        assert!(summary.finished_early);
        assert_eq!(summary.completion_percent(), 25.0);
    }

    #[test]
    fn test_finish_early_counts_exercise_that_just_completed() {
        let plan = push_ups_and_squats(1);
        let mut timer = started(&plan);
        for _ in 0..30 {
            timer.tick();
        }
        assert!(timer.pending_advance().is_some());

        timer.finish_early();
        assert_eq!(timer.summary().unwrap().exercises_completed, 1);
        assert!(timer.pending_advance().is_none());
    }

    #[test]
    fn test_finished_session_ignores_everything() {
        let plan = plan(vec![Exercise::new("A", 1)], 0, 1);
        let mut timer = started(&plan);
        tick_and_settle(&mut timer);
        assert!(timer.is_finished());
        let events = timer.observer().events().len();

        timer.tick();
        timer.skip();
        timer.previous();
        timer.pause();
        timer.resume();
        timer.adjust_duration(30);
        timer.finish_early();
        timer.stop();

        assert_eq!(timer.state(), TimerState::Finished);
        assert_eq!(timer.elapsed_seconds(), 1);
        assert_eq!(timer.observer().events().len(), events);
        assert!(!timer.summary().unwrap().finished_early);
    }

    #[test]
    fn test_progress_counts_exercises() {
        let plan = push_ups_and_squats(1);
        let mut timer = started(&plan);
        for _ in 0..15 {
            timer.tick();
        }

        let progress = timer.progress().unwrap();
        assert_eq!(progress.exercise_number, 1);
        assert_eq!(progress.exercise_total, 2);
        assert_eq!(progress.step_count, 3);
        assert_eq!(progress.step_fraction, 0.5);

        timer.skip();
        timer.skip();
        let progress = timer.progress().unwrap();
        assert_eq!(progress.exercise_number, 2);
        assert_eq!(progress.step_fraction, 0.0);
    }

    #[test]
    fn test_phase_changed_reports_each_step() {
        let plan = push_ups_and_squats(1);
        let mut timer = started(&plan);
        timer.skip();
        timer.skip();

        let indices: Vec<_> = timer
            .observer()
            .events()
            .iter()
            .filter_map(|e| match e {
                SessionEvent::PhaseChanged { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);

        match &timer.observer().events()[1] {
            SessionEvent::PhaseChanged { step, .. } => {
                assert_eq!(step.next_name(), Some("Squats"))
            }
            other => panic!("Expected PhaseChanged, got {:?}", other),
        }
    }
}
