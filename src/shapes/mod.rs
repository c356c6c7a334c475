//! Synthetic 2d point sets in the [0,100]² domain.
//!
//! Every draw comes from the [RandomSource] passed in, so a set is a function of the source state,
//! the shape and the count. Point ids are ranks in the returned vector.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

use crate::error::VizError;
use crate::geom::Point;
use crate::random::RandomSource;

/// side of the square domain
pub const DOMAIN: f64 = 100.;

// rejection sampling of blob centers gives up after this many draws
const MAX_CENTER_ATTEMPTS: usize = 10_000;

/// available point sets
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    /// uniform in the domain
    #[default]
    Random,
    /// 3 concentric rings
    Circle,
    /// 2 interleaved half rings
    Moons,
    /// 2 turn spiral, no randomness
    Spiral,
    /// 4 well separated isotropic blobs
    Gaussian,
    /// one gaussian cloud stretched along the diagonal
    Elongated,
    /// 2 gaussian clusters on the anti diagonal
    Diagonal,
    /// thin noisy sine curve
    Scurve,
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Random => "random",
            Shape::Circle => "circle",
            Shape::Moons => "moons",
            Shape::Spiral => "spiral",
            Shape::Gaussian => "gaussian",
            Shape::Elongated => "elongated",
            Shape::Diagonal => "diagonal",
            Shape::Scurve => "scurve",
        }
    }

    /// lenient parsing : an unknown name gives Random
    pub fn from_name(name: &str) -> Shape {
        name.parse::<Shape>().unwrap_or_else(|_| {
            log::warn!("unknown shape {:?}, using random points", name);
            Shape::Random
        })
    }

    /// number of points used when none is asked
    pub fn default_count(&self) -> usize {
        match self {
            Shape::Circle => 400,
            _ => 75,
        }
    }
} // end of impl Shape

impl FromStr for Shape {
    type Err = VizError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let shape = match s.to_ascii_lowercase().as_str() {
            "random" => Shape::Random,
            "circle" => Shape::Circle,
            "moons" => Shape::Moons,
            "spiral" => Shape::Spiral,
            "gaussian" => Shape::Gaussian,
            "elongated" => Shape::Elongated,
            "diagonal" => Shape::Diagonal,
            "scurve" => Shape::Scurve,
            _ => {
                return Err(VizError::UnknownOption {
                    option: "shape",
                    value: s.to_string(),
                });
            }
        };
        Ok(shape)
    }
}

//==================================================================

/// generates count points of shape
pub fn generate(shape: Shape, count: usize, rng: &mut RandomSource) -> Vec<Point> {
    log::debug!("generating {} points, shape {}", count, shape.name());
    let coords = match shape {
        Shape::Random => random_coords(count, rng),
        Shape::Circle => circle_coords(count, rng),
        Shape::Moons => moons_coords(count, rng),
        Shape::Spiral => spiral_coords(count),
        Shape::Gaussian => gaussian_coords(count, rng),
        Shape::Elongated => elongated_coords(count, rng),
        Shape::Diagonal => diagonal_coords(count, rng),
        Shape::Scurve => scurve_coords(count, rng),
    };
    coords
        .into_iter()
        .enumerate()
        .map(|(id, (x, y))| Point::new(id, x, y))
        .collect()
}

fn clamp(v: f64) -> f64 {
    v.clamp(0., DOMAIN)
}

// i/(n-1), 0 when there is a single point
fn arc_fraction(i: usize, n: usize) -> f64 {
    if n > 1 {
        i as f64 / (n - 1) as f64
    } else {
        0.
    }
}

fn random_coords(count: usize, rng: &mut RandomSource) -> Vec<(f64, f64)> {
    (0..count)
        .map(|_| {
            let x = rng.next_f64() * DOMAIN;
            let y = rng.next_f64() * DOMAIN;
            (x, y)
        })
        .collect()
}

fn circle_coords(count: usize, rng: &mut RandomSource) -> Vec<(f64, f64)> {
    let radii = [10., 28., 46.];
    let noise = 0.3;
    let per_circle = count / radii.len();
    let mut coords = Vec::with_capacity(count);
    for (rank, radius) in radii.iter().enumerate() {
        // last ring takes the remainder
        let nb = if rank == radii.len() - 1 {
            count - per_circle * (radii.len() - 1)
        } else {
            per_circle
        };
        for i in 0..nb {
            let angle = 2. * PI * i as f64 / nb as f64;
            let r = radius + rng.next_f64() * noise - noise / 2.;
            coords.push((50. + r * angle.cos(), 50. + r * angle.sin()));
        }
    }
    coords
}

fn moons_coords(count: usize, rng: &mut RandomSource) -> Vec<(f64, f64)> {
    let radius = 20.;
    let thickness = 3.;
    let separation = -5.;
    let n_half = count / 2;
    let mut coords = Vec::with_capacity(count);
    for i in 0..n_half {
        let angle = arc_fraction(i, n_half) * PI;
        let r = radius + (rng.next_f64() - 0.5) * thickness;
        coords.push((r * angle.cos(), r * angle.sin()));
    }
    let n_other = count - n_half;
    for i in 0..n_other {
        let angle = arc_fraction(i, n_other) * PI;
        let r = radius + (rng.next_f64() - 0.5) * thickness;
        coords.push((r * angle.cos() - radius + separation, -r * angle.sin() - separation));
    }
    coords.into_iter().map(|(x, y)| (x + 50., y + 45.)).collect()
}

fn spiral_coords(count: usize) -> Vec<(f64, f64)> {
    let max_radius = 40.;
    let max_angle = 4. * PI;
    (0..count)
        .map(|i| {
            let t = i as f64 / count as f64;
            let (angle, r) = (t * max_angle, t * max_radius);
            (50. + r * angle.cos(), 50. + r * angle.sin())
        })
        .collect()
}

fn gaussian_coords(count: usize, rng: &mut RandomSource) -> Vec<(f64, f64)> {
    let nb_blobs = 4;
    let min_distance = 35.;
    let std_dev = 4.5;
    let mut centers: Vec<(f64, f64)> = Vec::with_capacity(nb_blobs);
    let mut attempts = 0;
    while centers.len() < nb_blobs {
        let x = 15. + rng.next_f64() * 70.;
        let y = 15. + rng.next_f64() * 70.;
        attempts += 1;
        let far_enough = centers
            .iter()
            .all(|c| (c.0 - x).hypot(c.1 - y) >= min_distance);
        if far_enough || attempts > MAX_CENTER_ATTEMPTS {
            if !far_enough {
                log::warn!("gaussian blobs : center accepted closer than {}", min_distance);
            }
            centers.push((x, y));
        }
    }
    log::debug!("gaussian blob centers : {:?}", centers);
    (0..count)
        .map(|i| {
            let c = centers[i % nb_blobs];
            let x = c.0 + rng.standard_normal() * std_dev;
            let y = c.1 + rng.standard_normal() * std_dev;
            (x, y)
        })
        .collect()
}

fn elongated_coords(count: usize, rng: &mut RandomSource) -> Vec<(f64, f64)> {
    let (sin, cos) = (PI / 4.).sin_cos();
    (0..count)
        .map(|_| {
            let long = rng.standard_normal() * 25.;
            let short = rng.standard_normal() * 5.;
            let x = long * cos - short * sin;
            let y = long * sin + short * cos;
            (clamp(50. + x), clamp(50. + y))
        })
        .collect()
}

fn diagonal_coords(count: usize, rng: &mut RandomSource) -> Vec<(f64, f64)> {
    let first = count / 2;
    (0..count)
        .map(|i| {
            let (cx, cy) = if i < first { (25., 75.) } else { (75., 25.) };
            let x = cx + rng.standard_normal() * 6.;
            let y = cy + rng.standard_normal() * 6.;
            (clamp(x), clamp(y))
        })
        .collect()
}

fn scurve_coords(count: usize, rng: &mut RandomSource) -> Vec<(f64, f64)> {
    (0..count)
        .map(|_| {
            let t = rng.next_f64();
            let x = 20. + t * 60.;
            let y = 50. + 30. * ((t - 0.5) * PI * 1.5).sin();
            let noise_x = (rng.next_f64() - 0.5) * 4.;
            let noise_y = (rng.next_f64() - 0.5) * 4.;
            (clamp(x + noise_x), clamp(y + noise_y))
        })
        .collect()
}

//========================================================

// end of mod tests
