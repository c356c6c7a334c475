//! merge tree nodes and linkage distances

use serde::Serialize;
use std::collections::BTreeSet;

use crate::engine::Linkage;
use crate::geom::{Point, PointId, euclidean};

/// node identifier. Leaves have the id of their point
pub type NodeId = usize;

/// A node of the merge tree. A leaf holds one point, an inner node exactly two children whose
/// member sets partition its own. Children are owned, cloning a node copies the whole subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterNode {
    id: NodeId,
    members: BTreeSet<PointId>,
    children: Vec<ClusterNode>,
    merge_distance: Option<f64>,
    is_leaf: bool,
    color_id: Option<usize>,
}

impl ClusterNode {
    /// a singleton for point id
    pub fn leaf(id: PointId) -> Self {
        ClusterNode {
            id,
            members: BTreeSet::from([id]),
            children: Vec::new(),
            merge_distance: None,
            is_leaf: true,
            color_id: None,
        }
    }

    /// union of left and right, which become children
    pub fn merge(
        id: NodeId,
        left: ClusterNode,
        right: ClusterNode,
        distance: f64,
        color_id: Option<usize>,
    ) -> Self {
        let members = left.members.union(&right.members).copied().collect();
        ClusterNode {
            id,
            members,
            children: vec![left, right],
            merge_distance: Some(distance),
            is_leaf: false,
            color_id,
        }
    }

    pub fn get_id(&self) -> NodeId {
        self.id
    }

    pub fn get_members(&self) -> &BTreeSet<PointId> {
        &self.members
    }

    pub fn get_nb_members(&self) -> usize {
        self.members.len()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// empty for a leaf, 2 nodes otherwise
    pub fn get_children(&self) -> &[ClusterNode] {
        &self.children
    }

    /// linkage distance at which the children were merged, None for a leaf
    pub fn get_merge_distance(&self) -> Option<f64> {
        self.merge_distance
    }

    pub fn get_color_id(&self) -> Option<usize> {
        self.color_id
    }

    /// smallest point id in the node, used to order dendrogram leaves
    pub fn get_min_member(&self) -> Option<PointId> {
        self.members.first().copied()
    }

    /// leaves ids in depth first order, left child first
    pub fn collect_leaves(&self, leaves: &mut Vec<NodeId>) {
        if self.is_leaf {
            leaves.push(self.id);
        } else {
            for child in &self.children {
                child.collect_leaves(leaves);
            }
        }
    }

    /// centroid of members
    pub fn center(&self, data: &[Point]) -> Point {
        let n = self.members.len().max(1) as f64;
        let (sx, sy) = self.members.iter().fold((0., 0.), |acc, m| {
            (acc.0 + data[*m].get_x(), acc.1 + data[*m].get_y())
        });
        Point::new(self.id, sx / n, sy / n)
    }
} // end of impl ClusterNode

/// Distance between 2 clusters. O(|a|.|b|).
/// single : nearest members, complete : farthest members, average : mean over all cross pairs
pub fn linkage_distance(data: &[Point], a: &ClusterNode, b: &ClusterNode, linkage: Linkage) -> f64 {
    let pairs = a
        .members
        .iter()
        .flat_map(|i| b.members.iter().map(move |j| euclidean(&data[*i], &data[*j])));
    match linkage {
        Linkage::Single => pairs.fold(f64::INFINITY, f64::min),
        Linkage::Complete => pairs.fold(f64::NEG_INFINITY, f64::max),
        Linkage::Average => {
            let (sum, count) = pairs.fold((0., 0usize), |acc, d| (acc.0 + d, acc.1 + 1));
            if count == 0 { f64::INFINITY } else { sum / count as f64 }
        }
    }
} // end of linkage_distance

/// The 2 points a renderer joins to show a merge : the closest pair for single linkage,
/// the farthest pair for complete linkage, the cluster centers for average linkage.
pub fn connection_points(
    data: &[Point],
    a: &ClusterNode,
    b: &ClusterNode,
    linkage: Linkage,
) -> (Point, Point) {
    if linkage == Linkage::Average {
        return (a.center(data), b.center(data));
    }
    let mut best: Option<(f64, PointId, PointId)> = None;
    for i in &a.members {
        for j in &b.members {
            let d = euclidean(&data[*i], &data[*j]);
            let better = match best {
                None => true,
                Some((best_d, _, _)) => {
                    if linkage == Linkage::Single {
                        d < best_d
                    } else {
                        d > best_d
                    }
                }
            };
            if better {
                best = Some((d, *i, *j));
            }
        }
    }
    match best {
        Some((_, i, j)) => (data[i], data[j]),
        None => (a.center(data), b.center(data)),
    }
} // end of connection_points

//========================================================

#[cfg(test)]
mod tests {

    use super::*;

    fn line(xs: &[f64]) -> Vec<Point> {
        xs.iter()
            .enumerate()
            .map(|(i, x)| Point::new(i, *x, 0.))
            .collect()
    }

    #[test]
    fn linkages() {
        let data = line(&[0., 1., 3., 7.]);
        let left = ClusterNode::merge(4, ClusterNode::leaf(0), ClusterNode::leaf(1), 1., Some(0));
        let right = ClusterNode::merge(5, ClusterNode::leaf(2), ClusterNode::leaf(3), 4., Some(1));
        assert_eq!(linkage_distance(&data, &left, &right, Linkage::Single), 2.);
        assert_eq!(linkage_distance(&data, &left, &right, Linkage::Complete), 7.);
        // (3 + 7 + 2 + 6) / 4
        assert_eq!(linkage_distance(&data, &left, &right, Linkage::Average), 4.5);
    }

    #[test]
    fn merge_partitions_members() {
        let node = ClusterNode::merge(3, ClusterNode::leaf(0), ClusterNode::leaf(2), 1.5, None);
        assert!(!node.is_leaf());
        assert_eq!(node.get_children().len(), 2);
        assert_eq!(
            node.get_members().iter().copied().collect::<Vec<usize>>(),
            vec![0, 2]
        );
        let mut leaves = Vec::new();
        node.collect_leaves(&mut leaves);
        assert_eq!(leaves, vec![0, 2]);
        let leaf = ClusterNode::leaf(1);
        assert!(leaf.get_merge_distance().is_none());
        assert!(leaf.get_children().is_empty());
    }

    #[test]
    fn connection() {
        let data = line(&[0., 1., 3., 7.]);
        let left = ClusterNode::merge(4, ClusterNode::leaf(0), ClusterNode::leaf(1), 1., Some(0));
        let right = ClusterNode::merge(5, ClusterNode::leaf(2), ClusterNode::leaf(3), 4., Some(1));
        let (p, q) = connection_points(&data, &left, &right, Linkage::Single);
        assert_eq!((p.get_id(), q.get_id()), (1, 2));
        let (p, q) = connection_points(&data, &left, &right, Linkage::Complete);
        assert_eq!((p.get_id(), q.get_id()), (0, 3));
        let (p, q) = connection_points(&data, &left, &right, Linkage::Average);
        assert_eq!((p.get_x(), q.get_x()), (0.5, 5.));
    }
} // end of mod tests
