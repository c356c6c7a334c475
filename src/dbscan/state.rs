//! mutable part of dbscan

use serde::Serialize;
use std::collections::VecDeque;

use crate::engine::EngineState;

/// label of a point during the run
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum PointState {
    Unvisited,
    Core,
    Border,
    Noise,
}

/// Everything dbscan mutates. Cloning gives a fully independent copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbscanState {
    pub(crate) point_states: Vec<PointState>,
    // cluster id by point, 0 means unassigned or noise
    pub(crate) assignment: Vec<usize>,
    pub(crate) visited: Vec<bool>,
    pub(crate) scan_cursor: usize,
    // indices waiting to be evaluated for cluster `cluster_counter`
    pub(crate) queue: VecDeque<usize>,
    pub(crate) cluster_counter: usize,
    pub(crate) finished: bool,
    pub(crate) status: String,
}

impl DbscanState {
    pub(crate) fn new(nb_points: usize) -> Self {
        DbscanState {
            point_states: vec![PointState::Unvisited; nb_points],
            assignment: vec![0; nb_points],
            visited: vec![false; nb_points],
            scan_cursor: 0,
            queue: VecDeque::new(),
            cluster_counter: 0,
            finished: false,
            status: String::new(),
        }
    }

    pub fn get_point_states(&self) -> &[PointState] {
        &self.point_states
    }

    /// cluster id of each point, clusters are numbered from 1, 0 is noise or not yet assigned
    pub fn get_assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// expansion queue, head first
    pub fn get_queue(&self) -> &VecDeque<usize> {
        &self.queue
    }

    /// number of clusters started so far
    pub fn get_cluster_count(&self) -> usize {
        self.cluster_counter
    }

    pub fn get_scan_cursor(&self) -> usize {
        self.scan_cursor
    }

    /// None when idx is not a point rank
    pub fn is_visited(&self, idx: usize) -> Option<bool> {
        self.visited.get(idx).copied()
    }

    /// number of points currently labelled noise
    pub fn get_nb_noise(&self) -> usize {
        self.point_states
            .iter()
            .filter(|s| **s == PointState::Noise)
            .count()
    }
} // end of impl DbscanState

impl EngineState for DbscanState {
    fn status(&self) -> &str {
        &self.status
    }

    fn is_terminal(&self) -> bool {
        self.finished
    }

    fn counter(&self) -> usize {
        self.queue.len()
    }
}
