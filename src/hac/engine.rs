//! the agglomerative clustering engine

use serde::Serialize;

use crate::engine::{EngineState, Linkage, RunConfig, StepEngine, StepOutcome};
use crate::geom::Point;
use crate::history::HistoryStore;

use super::node::{ClusterNode, NodeId, connection_points, linkage_distance};

/// what the last step merged, for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeRecord {
    pub left: NodeId,
    pub right: NodeId,
    pub merged: NodeId,
    pub distance: f64,
    /// pair of points illustrating the linkage
    pub link: (Point, Point),
}

/// Forest of clusters and merge bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HacState {
    // ordered by increasing node id
    forest: Vec<ClusterNode>,
    nb_points: usize,
    merge_count: usize,
    next_color_id: usize,
    last_merge: Option<MergeRecord>,
    status: String,
}

impl HacState {
    fn new(nb_points: usize) -> Self {
        HacState {
            forest: (0..nb_points).map(ClusterNode::leaf).collect(),
            nb_points,
            merge_count: 0,
            next_color_id: 0,
            last_merge: None,
            status: format!("Ready: {} singleton clusters.", nb_points),
        }
    }

    /// current roots
    pub fn get_forest(&self) -> &[ClusterNode] {
        &self.forest
    }

    pub fn get_merge_count(&self) -> usize {
        self.merge_count
    }

    /// id the next merged node will get
    pub fn get_next_merge_id(&self) -> NodeId {
        self.nb_points + self.merge_count
    }

    pub fn get_next_color_id(&self) -> usize {
        self.next_color_id
    }

    pub fn get_last_merge(&self) -> Option<&MergeRecord> {
        self.last_merge.as_ref()
    }

    /// root containing point
    pub fn find_root(&self, point: usize) -> Option<&ClusterNode> {
        self.forest
            .iter()
            .find(|node| node.get_members().contains(&point))
    }

    /// color of each point, taken from the root holding it. None while in an uncolored singleton
    pub fn get_point_colors(&self) -> Vec<Option<usize>> {
        let mut colors = vec![None; self.nb_points];
        for node in &self.forest {
            for m in node.get_members() {
                colors[*m] = node.get_color_id();
            }
        }
        colors
    }

    /// dendrogram leaf order : roots sorted by their smallest point, leaves collected depth first
    pub fn get_leaf_order(&self) -> Vec<NodeId> {
        let mut roots: Vec<&ClusterNode> = self.forest.iter().collect();
        roots.sort_by_key(|node| node.get_min_member());
        let mut leaves = Vec::with_capacity(self.nb_points);
        for root in roots {
            root.collect_leaves(&mut leaves);
        }
        leaves
    }
} // end of impl HacState

impl EngineState for HacState {
    fn status(&self) -> &str {
        &self.status
    }

    fn is_terminal(&self) -> bool {
        self.forest.len() <= 1
    }

    fn counter(&self) -> usize {
        self.merge_count
    }
}

//=========================================================

/// Step by step agglomerative clustering.
pub struct HacEngine {
    data: Vec<Point>,
    linkage: Linkage,
    state: HacState,
    history: HistoryStore<HacState>,
}

impl HacEngine {
    /// one leaf per point, no color
    pub fn start(points: Vec<Point>, config: &RunConfig) -> Self {
        log::info!(
            "hierarchical clustering start, nb points : {}, linkage : {:?}",
            points.len(),
            config.linkage
        );
        let state = HacState::new(points.len());
        HacEngine {
            data: points,
            linkage: config.linkage,
            state,
            history: HistoryStore::new(),
        }
    }

    pub fn get_linkage(&self) -> Linkage {
        self.linkage
    }

    // ranks in forest of the pair at smallest linkage distance, first found kept on ties
    fn find_closest(&self) -> Option<(usize, usize, f64)> {
        let forest = &self.state.forest;
        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..forest.len() {
            for j in (i + 1)..forest.len() {
                let d = linkage_distance(&self.data, &forest[i], &forest[j], self.linkage);
                let closer = match best {
                    None => true,
                    Some((_, _, best_d)) => d < best_d,
                };
                if closer {
                    best = Some((i, j, d));
                }
            }
        }
        best
    } // end of find_closest

    // one merge, no history
    fn merge_closest(&mut self) -> bool {
        let Some((i, j, distance)) = self.find_closest() else {
            return false;
        };
        let link = connection_points(
            &self.data,
            &self.state.forest[i],
            &self.state.forest[j],
            self.linkage,
        );
        let state = &mut self.state;
        // j > i, remove j first so i stays valid. Order of the others is kept
        let right = state.forest.remove(j);
        let left = state.forest.remove(i);
        let color_id = match (left.is_singleton(), right.is_singleton()) {
            (true, false) => right.get_color_id(),
            (false, true) => left.get_color_id(),
            _ => {
                let fresh = state.next_color_id;
                state.next_color_id += 1;
                Some(fresh)
            }
        };
        let merged_id = state.nb_points + state.merge_count;
        let record = MergeRecord {
            left: left.get_id(),
            right: right.get_id(),
            merged: merged_id,
            distance,
            link,
        };
        state.status = format!(
            "Merged clusters {} and {} at distance {:.3}, {} clusters left.",
            left.get_id(),
            right.get_id(),
            distance,
            state.forest.len() + 1
        );
        state
            .forest
            .push(ClusterNode::merge(merged_id, left, right, distance, color_id));
        state.merge_count += 1;
        state.last_merge = Some(record);
        true
    } // end of merge_closest

    fn set_complete_status(&mut self) {
        self.state.status = "Hierarchical clustering complete.".to_string();
        log::info!(
            "hierarchical clustering complete after {} merges",
            self.state.merge_count
        );
    }
} // end of impl HacEngine

impl StepEngine for HacEngine {
    type State = HacState;

    fn get_points(&self) -> &[Point] {
        &self.data
    }

    fn get_state(&self) -> &HacState {
        &self.state
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }

    fn step(&mut self) -> StepOutcome {
        if self.state.is_terminal() {
            return StepOutcome::AlreadyTerminal;
        }
        self.history.push(self.state.clone());
        self.merge_closest();
        log::debug!("hierarchical step : {}", self.state.status);
        if self.state.is_terminal() {
            self.set_complete_status();
            StepOutcome::Finished
        } else {
            StepOutcome::Advanced
        }
    }

    /// full snapshot restore, color bookkeeping is not invertible
    fn step_back(&mut self) -> StepOutcome {
        match self.history.pop() {
            Some(previous) => {
                self.state = previous;
                StepOutcome::Advanced
            }
            None => StepOutcome::HistoryEmpty,
        }
    }

    fn fast_forward(&mut self) -> StepOutcome {
        if self.state.is_terminal() {
            return StepOutcome::AlreadyTerminal;
        }
        self.history.push(self.state.clone());
        while !self.state.is_terminal() {
            if !self.merge_closest() {
                break;
            }
        }
        self.set_complete_status();
        StepOutcome::Finished
    }
} // end of impl StepEngine for HacEngine

//========================================================

// end of mod tests
