//! The contract every resumable engine satisfies, and the run configuration they are started with.
//!
//! An engine holds plain data only: its input points, a state value and a [HistoryStore](crate::history::HistoryStore)
//! of previous states. `step` performs one unit of work, `fast_forward` runs to the end,
//! `step_back` restores the state recorded before the last `step` (or `fast_forward`).
//! Misuse (stepping a finished engine, stepping back with no history) is reported by a [StepOutcome],
//! never by a panic.

pub mod config;

pub use config::*;

use serde::Serialize;
use std::fmt::Debug;

use crate::geom::Point;

/// What a call to `step`, `step_back` or `fast_forward` did.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum StepOutcome {
    /// one unit of work done (or undone), more to do
    Advanced,
    /// the call brought the engine to its terminal state
    Finished,
    /// engine was already terminal, nothing changed
    AlreadyTerminal,
    /// step_back asked with no recorded state, nothing changed
    HistoryEmpty,
}

impl StepOutcome {
    /// true if the call changed the engine
    pub fn changed(&self) -> bool {
        matches!(self, StepOutcome::Advanced | StepOutcome::Finished)
    }
}

/// mutable part of an engine, the unit stored in history
pub trait EngineState: Clone + PartialEq + Debug + Serialize {
    /// message describing the last performed action
    fn status(&self) -> &str;
    /// no more step possible
    fn is_terminal(&self) -> bool;
    /// progress counter : queue length for dbscan, iterations for kmeans,
    /// merges for hierarchical clustering, stage for pca
    fn counter(&self) -> usize;
}

/// An independent copy of an engine at a given time, handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<S> {
    pub points: Vec<Point>,
    pub state: S,
}

impl<S: EngineState> Snapshot<S> {
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn status(&self) -> &str {
        self.state.status()
    }

    pub fn counter(&self) -> usize {
        self.state.counter()
    }
}

/// A resumable algorithm.
pub trait StepEngine {
    type State: EngineState;

    /// the points the engine was started on
    fn get_points(&self) -> &[Point];

    /// current state
    fn get_state(&self) -> &Self::State;

    /// one unit of progress
    fn step(&mut self) -> StepOutcome;

    /// restore state preceding last step
    fn step_back(&mut self) -> StepOutcome;

    /// run to the terminal state without intermediate snapshots
    fn fast_forward(&mut self) -> StepOutcome;

    /// number of states that can be restored
    fn history_len(&self) -> usize;

    fn is_terminal(&self) -> bool {
        self.get_state().is_terminal()
    }

    fn status(&self) -> &str {
        self.get_state().status()
    }

    /// deep copy of points and state
    fn snapshot(&self) -> Snapshot<Self::State> {
        Snapshot {
            points: self.get_points().to_vec(),
            state: self.get_state().clone(),
        }
    }
} // end of trait StepEngine
