//! centroid initialization and update

use crate::engine::{DistanceMetric, InitMethod};
use crate::geom::{Point, mean};
use crate::random::RandomSource;

// a uniform position in [0, domain)², x drawn first
fn random_position(index: usize, rng: &mut RandomSource, domain: f64) -> Point {
    let x = rng.next_f64() * domain;
    let y = rng.next_f64() * domain;
    Point::new(index, x, y)
}

/// Mean of each cluster. An empty cluster gets a random position in the domain.
/// Centroid ids are cluster indexes.
pub fn update_centroids(clusters: &[Vec<&Point>], rng: &mut RandomSource, domain: f64) -> Vec<Point> {
    clusters
        .iter()
        .enumerate()
        .map(|(c, members)| match mean(members) {
            Some((x, y)) => Point::new(c, x, y),
            None => {
                log::debug!("cluster {} empty, reseeding its centroid", c);
                random_position(c, rng, domain)
            }
        })
        .collect()
}

/// index of nearest centroid, the first one encountered wins ties
pub fn nearest_centroid(point: &Point, centroids: &[Point], metric: DistanceMetric) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let dist = metric.distance(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    best
}

/// Shuffle a copy of data (Fisher-Yates) and take the first k points.
/// If k exceeds the number of points, the missing centroids are random positions.
pub fn forgy(data: &[Point], k: usize, rng: &mut RandomSource, domain: f64) -> Vec<Point> {
    let mut shuffled = data.to_vec();
    rng.shuffle(&mut shuffled);
    let mut centroids: Vec<Point> = shuffled
        .iter()
        .take(k)
        .enumerate()
        .map(|(c, p)| Point::new(c, p.get_x(), p.get_y()))
        .collect();
    for c in centroids.len()..k {
        centroids.push(random_position(c, rng, domain));
    }
    centroids
}

/// Each point goes to a uniformly drawn cluster, centroids are the means.
pub fn random_partition(data: &[Point], k: usize, rng: &mut RandomSource, domain: f64) -> Vec<Point> {
    if k == 0 {
        return Vec::new();
    }
    let mut clusters: Vec<Vec<&Point>> = vec![Vec::new(); k];
    for point in data {
        clusters[rng.index_below(k)].push(point);
    }
    update_centroids(&clusters, rng, domain)
}

/// First centroid uniform among points, each next one drawn with probability proportional to
/// the squared distance to the nearest centroid already chosen (roulette wheel, first index whose
/// cumulative weight reaches the drawn threshold).
pub fn kmeans_plus_plus(
    data: &[Point],
    k: usize,
    metric: DistanceMetric,
    rng: &mut RandomSource,
    domain: f64,
) -> Vec<Point> {
    if k == 0 {
        return Vec::new();
    }
    if data.is_empty() {
        return (0..k).map(|c| random_position(c, rng, domain)).collect();
    }
    let mut centroids = Vec::<Point>::with_capacity(k);
    let first = &data[rng.index_below(data.len())];
    centroids.push(Point::new(0, first.get_x(), first.get_y()));
    let mut distances = vec![f64::INFINITY; data.len()];
    for c in 1..k {
        let last = &centroids[c - 1];
        for (d, point) in distances.iter_mut().zip(data.iter()) {
            *d = d.min(metric.distance(point, last));
        }
        let total: f64 = distances.iter().map(|d| d * d).sum();
        let threshold = rng.next_f64() * total;
        let mut cumulative = 0.;
        let mut chosen = data.len() - 1;
        for (j, d) in distances.iter().enumerate() {
            cumulative += d * d;
            if cumulative >= threshold {
                chosen = j;
                break;
            }
        }
        let p = &data[chosen];
        centroids.push(Point::new(c, p.get_x(), p.get_y()));
    }
    centroids
} // end of kmeans_plus_plus

/// dispatch on init method
pub fn initialize(
    data: &[Point],
    k: usize,
    method: InitMethod,
    metric: DistanceMetric,
    rng: &mut RandomSource,
    domain: f64,
) -> Vec<Point> {
    match method {
        InitMethod::Forgy => forgy(data, k, rng, domain),
        InitMethod::RandomPartition => random_partition(data, k, rng, domain),
        InitMethod::KmeansPlusPlus => kmeans_plus_plus(data, k, metric, rng, domain),
    }
}

//========================================================

// end of mod tests
