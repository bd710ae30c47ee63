//! Progress reporting and cooperative cancellation for long computations.
//!
//! Purpose
//! - Let a reader thread watch an enumeration (stage text, percentage or step
//!   count) and ask it to stop. The computing thread polls; nothing is
//!   interrupted.
//!
//! Why this design
//! - Each tracker keeps its whole state behind one `parking_lot::Mutex`, and
//!   every method holds the lock for its full duration. The writer polls at
//!   most once per poll interval, so contention is negligible.
//! - "Changed" flags are cleared by the matching reader accessor, so a UI can
//!   redraw only when something moved.
//! - Algorithms only see the [`Progress`] trait and do not care which variant
//!   they were handed.

use parking_lot::Mutex;

/// What an algorithm needs from a tracker.
pub trait Progress: Send + Sync {
    /// Starts a new stage. `weight` is the share of the whole job this stage
    /// represents; trackers that count steps ignore it.
    fn new_stage(&self, description: &str, weight: f64);

    /// Records that `done` of `total` units of the current stage are complete.
    /// Returns false iff cancellation has been requested.
    fn report(&self, done: usize, total: usize) -> bool;

    fn is_cancelled(&self) -> bool;

    fn set_finished(&self);
}

#[derive(Debug, Default)]
struct PercentState {
    description: String,
    description_changed: bool,
    percent: f64,
    percent_changed: bool,
    /// Percent accounted for by completed stages.
    completed: f64,
    stage_weight: f64,
    cancelled: bool,
    finished: bool,
}

/// Tracker for bounded work, reported as a percentage split into weighted stages.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    state: Mutex<PercentState>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overall percentage directly. Returns false iff cancelled.
    pub fn set_percent(&self, percent: f64) -> bool {
        let mut s = self.state.lock();
        s.percent = percent.clamp(0.0, 100.0);
        s.percent_changed = true;
        !s.cancelled
    }

    pub fn description_changed(&self) -> bool {
        self.state.lock().description_changed
    }

    /// Current stage text; clears the changed flag.
    pub fn description(&self) -> String {
        let mut s = self.state.lock();
        s.description_changed = false;
        s.description.clone()
    }

    pub fn percent_changed(&self) -> bool {
        self.state.lock().percent_changed
    }

    /// Current percentage; clears the changed flag.
    pub fn percent(&self) -> f64 {
        let mut s = self.state.lock();
        s.percent_changed = false;
        s.percent
    }

    pub fn cancel(&self) {
        self.state.lock().cancelled = true;
    }

    pub fn is_finished(&self) -> bool {
        self.state.lock().finished
    }
}

impl Progress for ProgressTracker {
    fn new_stage(&self, description: &str, weight: f64) {
        let mut s = self.state.lock();
        s.completed = (s.completed + 100.0 * s.stage_weight).min(100.0);
        s.stage_weight = weight.max(0.0);
        s.percent = s.completed;
        s.percent_changed = true;
        s.description = description.to_owned();
        s.description_changed = true;
    }

    fn report(&self, done: usize, total: usize) -> bool {
        let mut s = self.state.lock();
        let frac = if total == 0 {
            1.0
        } else {
            (done as f64 / total as f64).min(1.0)
        };
        s.percent = (s.completed + 100.0 * s.stage_weight * frac).min(100.0);
        s.percent_changed = true;
        !s.cancelled
    }

    fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    fn set_finished(&self) {
        let mut s = self.state.lock();
        s.percent = 100.0;
        s.percent_changed = true;
        s.finished = true;
    }
}

#[derive(Debug, Default)]
struct OpenState {
    description: String,
    description_changed: bool,
    steps: u64,
    steps_changed: bool,
    cancelled: bool,
    finished: bool,
}

/// Tracker for open-ended work: counts steps instead of a percentage.
#[derive(Debug, Default)]
pub struct ProgressTrackerOpen {
    state: Mutex<OpenState>,
}

impl ProgressTrackerOpen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `k` completed steps. Returns false iff cancelled.
    pub fn inc_steps(&self, k: u64) -> bool {
        let mut s = self.state.lock();
        s.steps += k;
        s.steps_changed = true;
        !s.cancelled
    }

    pub fn description_changed(&self) -> bool {
        self.state.lock().description_changed
    }

    /// Current stage text; clears the changed flag.
    pub fn description(&self) -> String {
        let mut s = self.state.lock();
        s.description_changed = false;
        s.description.clone()
    }

    pub fn steps_changed(&self) -> bool {
        self.state.lock().steps_changed
    }

    /// Steps so far; clears the changed flag.
    pub fn steps(&self) -> u64 {
        let mut s = self.state.lock();
        s.steps_changed = false;
        s.steps
    }

    pub fn cancel(&self) {
        self.state.lock().cancelled = true;
    }

    pub fn is_finished(&self) -> bool {
        self.state.lock().finished
    }
}

impl Progress for ProgressTrackerOpen {
    fn new_stage(&self, description: &str, _weight: f64) {
        let mut s = self.state.lock();
        s.description = description.to_owned();
        s.description_changed = true;
    }

    /// Each report counts as one step.
    fn report(&self, _done: usize, _total: usize) -> bool {
        self.inc_steps(1)
    }

    fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    fn set_finished(&self) {
        self.state.lock().finished = true;
    }
}
