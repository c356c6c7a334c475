//! Agglomerative hierarchical clustering, one merge per step.
//!
//! The state is a forest of [ClusterNode]: it starts with one leaf per point and each step merges
//! the two nodes at smallest linkage distance, so N points need N-1 steps.
//! Merged nodes keep their two children, the root of the last step is the full merge tree
//! (the dendrogram).
//!
//! The forest is kept ordered by node id (leaves `0..N`, merge nodes `N + merge index` appended at
//! the end) and pairs are scanned in that order with a strict comparison, so among pairs at equal
//! distance the lowest pair of ids wins.

mod engine;
mod node;

pub use engine::{HacEngine, HacState, MergeRecord};
pub use node::{ClusterNode, NodeId, connection_points, linkage_distance};
