//! run configuration, passed once at start

use serde::{Deserialize, Serialize};

use std::str::FromStr;

use crate::error::{Result, VizError};
pub use crate::geom::DistanceMetric;

/// rule giving the distance between 2 clusters
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Linkage {
    /// nearest members
    #[default]
    Single,
    /// farthest members
    Complete,
    /// mean over all cross pairs
    Average,
}

impl FromStr for Linkage {
    type Err = VizError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Linkage::Single),
            "complete" => Ok(Linkage::Complete),
            "average" => Ok(Linkage::Average),
            _ => Err(VizError::UnknownOption {
                option: "linkage",
                value: s.to_string(),
            }),
        }
    }
}

/// kmeans centroid initialization
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitMethod {
    /// k first points of a shuffled copy of data
    #[default]
    Forgy,
    /// means of a random affectation of points
    RandomPartition,
    /// D² weighted sampling
    KmeansPlusPlus,
}

impl FromStr for InitMethod {
    type Err = VizError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forgy" => Ok(InitMethod::Forgy),
            "random_partition" => Ok(InitMethod::RandomPartition),
            "kmeans++" => Ok(InitMethod::KmeansPlusPlus),
            _ => Err(VizError::UnknownOption {
                option: "init method",
                value: s.to_string(),
            }),
        }
    }
}

/// principal axis used by the pca projection
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    #[default]
    Pc1,
    Pc2,
}

impl FromStr for Component {
    type Err = VizError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pc1" => Ok(Component::Pc1),
            "pc2" => Ok(Component::Pc2),
            _ => Err(VizError::UnknownOption {
                option: "component",
                value: s.to_string(),
            }),
        }
    }
}

//==============================================================

/// All options of a run. Each engine reads only the fields it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// dbscan neighbourhood radius
    pub epsilon: f64,
    /// dbscan minimum number of neighbours (self excluded) of a core point
    pub min_pts: usize,
    /// kmeans number of clusters
    pub k: usize,
    pub linkage: Linkage,
    pub metric: DistanceMetric,
    pub init: InitMethod,
    pub component: Component,
    /// edge of the square [0, domain)² in which empty kmeans clusters are reseeded
    pub domain: f64,
    /// kmeans fast forward stops after this number of iterations if not converged
    pub max_iterations: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            epsilon: 10.,
            min_pts: 3,
            k: 3,
            linkage: Linkage::Single,
            metric: DistanceMetric::Euclidean,
            init: InitMethod::Forgy,
            component: Component::Pc1,
            domain: 100.,
            max_iterations: 1000,
        }
    }
}

impl RunConfig {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_init(mut self, init: InitMethod) -> Self {
        self.init = init;
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.component = component;
        self
    }

    pub fn with_domain(mut self, domain: f64) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// checks options needed by dbscan. epsilon <= 0 is accepted, all points will be noise.
    pub fn check_dbscan(&self) -> Result<()> {
        if self.min_pts < 1 {
            return Err(VizError::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1",
            });
        }
        if self.epsilon.is_nan() {
            return Err(VizError::InvalidParameter {
                name: "epsilon",
                message: "must be a number",
            });
        }
        if self.epsilon <= 0. {
            log::warn!(
                "epsilon {:.3e} <= 0, every neighbourhood is empty, all points will be noise",
                self.epsilon
            );
        }
        Ok(())
    }

    /// checks options needed by kmeans. k > nb_points is accepted, some centroids will be reseeded at each iteration
    pub fn check_kmeans(&self, nb_points: usize) -> Result<()> {
        if self.k == 0 {
            return Err(VizError::InvalidClusterCount {
                requested: self.k,
                n_items: nb_points,
            });
        }
        if self.domain.is_nan() || self.domain <= 0. {
            return Err(VizError::InvalidParameter {
                name: "domain",
                message: "must be positive",
            });
        }
        if self.k > nb_points {
            log::warn!(
                "k = {} greater than nb points {}, some clusters will stay empty and be reseeded",
                self.k,
                nb_points
            );
        }
        Ok(())
    }
} // end of impl RunConfig

//==============================================================

// end of mod tests
