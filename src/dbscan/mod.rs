//! DBSCAN as a resumable state machine.
//!
//! The textbook algorithm expands a cluster recursively from each core point. Here the expansion
//! is an explicit FIFO queue kept in the engine state, so the run can be suspended between any
//! two dequeues, rendered, and rewound.
//!
//! Each [DbscanEngine::step](crate::engine::StepEngine::step) does exactly one of:
//! - dequeue one index from the expansion queue and evaluate it for the cluster being grown,
//! - when the queue is empty, move the scan cursor to the next unvisited point and evaluate it,
//!   possibly starting a new cluster whose expansion begins at the next step.
//!
//! A point is core when its ε-neighbourhood (strict `< ε`, the point itself excluded) has at least
//! `min_pts` members. Noise is provisional: a later expansion can reclaim a noise point as border.
//! A border point keeps the first cluster that claimed it.

mod engine;
mod state;

pub use engine::DbscanEngine;
pub use state::{DbscanState, PointState};
