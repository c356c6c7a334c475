//! Lloyd's kmeans, one full iteration per step.
//!
//! A step assigns every point to its nearest centroid (ties go to the lowest centroid index),
//! then moves each centroid to the mean of its points. A cluster left empty gets its centroid
//! reseeded at a random position of the domain, so there are always exactly k centroids.
//! The run has converged when an iteration leaves every centroid coordinate exactly unchanged.
//! There is no tolerance: the comparison is an exact floating point equality.
//!
//! Initialization is Forgy, random partition or kmeans++, all drawing from the engine's
//! [RandomSource](crate::random::RandomSource) reseeded at start.

mod centroids;
mod engine;

pub use centroids::{
    forgy, initialize, kmeans_plus_plus, nearest_centroid, random_partition, update_centroids,
};
pub use engine::{KmeansEngine, KmeansState};
