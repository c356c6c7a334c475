//! defines data description

use serde::{Deserialize, Serialize};

use std::str::FromStr;

use crate::error::VizError;

/// data to cluster identifier
pub type PointId = usize;

/// A 2d point. It is never mutated once generated, derived quantities (centered, projected points)
/// are new points carrying the same id.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    // id to identify points as coming from external client (in fact a rank)
    id: PointId,
    x: f64,
    y: f64,
}

impl Point {
    ///a point is characterized by its Id (in fact a rank) and its coordinates
    pub fn new(id: PointId, x: f64, y: f64) -> Self {
        Point { id, x, y }
    }

    /// get id
    pub fn get_id(&self) -> PointId {
        self.id
    }

    pub fn get_x(&self) -> f64 {
        self.x
    }

    pub fn get_y(&self) -> f64 {
        self.y
    }

    /// returns a point with same id translated by -origin
    pub fn centered_on(&self, origin: &Point) -> Point {
        Point::new(self.id, self.x - origin.x, self.y - origin.y)
    }

    /// scalar product, points seen as vectors
    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// euclidean norm, point seen as a vector
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// coordinates compared exactly, ids ignored
    pub fn same_position(&self, other: &Point) -> bool {
        self.x == other.x && self.y == other.y
    }
} // end of impl Point

/// euclidean distance between 2 points
#[inline]
pub fn euclidean(a: &Point, b: &Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// L1 distance between 2 points
#[inline]
pub fn manhattan(a: &Point, b: &Point) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// coordinate wise average. None if points is empty
pub fn mean(points: &[&Point]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let (sx, sy) = points
        .iter()
        .fold((0., 0.), |acc, p| (acc.0 + p.x, acc.1 + p.y));
    let n = points.len() as f64;
    Some((sx / n, sy / n))
}

//=========================================================

/// distance used by kmeans
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
}

impl DistanceMetric {
    pub fn distance(&self, a: &Point, b: &Point) -> f64 {
        match self {
            DistanceMetric::Euclidean => euclidean(a, b),
            DistanceMetric::Manhattan => manhattan(a, b),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "manhattan" => Ok(DistanceMetric::Manhattan),
            _ => Err(VizError::UnknownOption {
                option: "distance metric",
                value: s.to_string(),
            }),
        }
    }
}

//========================================================

// end of mod tests
