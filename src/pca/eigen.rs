//! closed form covariance and eigen decomposition of 2x2 symmetric matrices

use serde::Serialize;

use crate::geom::Point;

/// below this magnitude the off diagonal term is taken as 0 and the first axis is (1,0)
pub const OFF_DIAGONAL_THRESHOLD: f64 = 1.0e-6;

#[cfg_attr(doc, katexit::katexit)]
/// Sample covariance of centered points, unbiased divisor:
/// $$ c_{xx} = \frac{1}{n-1} \sum_i x_i^2, \quad c_{yy} = \frac{1}{n-1} \sum_i y_i^2, \quad c_{xy} = \frac{1}{n-1} \sum_i x_i y_i $$
/// With less than 2 points the matrix is 0.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Covariance {
    pub xx: f64,
    pub yy: f64,
    pub xy: f64,
}

impl Covariance {
    /// points must be centered
    pub fn from_centered(points: &[Point]) -> Self {
        if points.len() < 2 {
            log::debug!("covariance of {} points set to 0", points.len());
            return Covariance {
                xx: 0.,
                yy: 0.,
                xy: 0.,
            };
        }
        let (sxx, syy, sxy) = points.iter().fold((0., 0., 0.), |acc, p| {
            (
                acc.0 + p.get_x() * p.get_x(),
                acc.1 + p.get_y() * p.get_y(),
                acc.2 + p.get_x() * p.get_y(),
            )
        });
        let denom = (points.len() - 1) as f64;
        Covariance {
            xx: sxx / denom,
            yy: syy / denom,
            xy: sxy / denom,
        }
    }

    pub fn trace(&self) -> f64 {
        self.xx + self.yy
    }

    pub fn determinant(&self) -> f64 {
        self.xx * self.yy - self.xy * self.xy
    }
} // end of impl Covariance

/// eigenvalues in decreasing order and the associated unit vectors.
/// vector i is stored as a Point of id i
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct EigenPair {
    values: [f64; 2],
    vectors: [Point; 2],
}

impl EigenPair {
    /// decreasing order
    pub fn get_values(&self) -> [f64; 2] {
        self.values
    }

    pub fn get_vectors(&self) -> &[Point; 2] {
        &self.vectors
    }

    /// fraction of total variance carried by each axis, 0 for a null matrix
    pub fn get_explained_ratio(&self) -> [f64; 2] {
        let total = self.values[0] + self.values[1];
        if total <= 0. {
            return [0., 0.];
        }
        [self.values[0] / total, self.values[1] / total]
    }
}

#[cfg_attr(doc, katexit::katexit)]
/// Eigen decomposition by the characteristic polynomial
/// $$ \lambda^2 - tr \lambda + det = 0, \quad \lambda_{1,2} = \frac{tr \pm \sqrt{tr^2 - 4 det}}{2} $$
/// The first vector solves $(c_{xx} - \lambda_1) v_x + c_{xy} v_y = 0$ with $v_x = 1$, then is normalized.
/// When $|c_{xy}|$ is negligible it is $(1,0)$.
/// The second vector is the first one rotated by $\pi/2$, so the pair is orthonormal.
pub fn eigen_decomposition(cov: &Covariance) -> EigenPair {
    let trace = cov.trace();
    // rounding can make it slightly negative on a multiple of identity
    let discriminant = (trace * trace - 4. * cov.determinant()).max(0.).sqrt();
    let l1 = (trace + discriminant) / 2.;
    let l2 = (trace - discriminant) / 2.;
    let (vx, vy) = if cov.xy.abs() > OFF_DIAGONAL_THRESHOLD {
        let vy = -(cov.xx - l1) / cov.xy;
        let norm = (1. + vy * vy).sqrt();
        (1. / norm, vy / norm)
    } else {
        (1., 0.)
    };
    EigenPair {
        values: [l1, l2],
        vectors: [Point::new(0, vx, vy), Point::new(1, -vy, vx)],
    }
} // end of eigen_decomposition

//========================================================

// end of mod tests
