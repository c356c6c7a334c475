//! Principal component analysis of 2d points, as a fixed sequence of stages.
//!
//! Loaded, Mean, Centered, Covariance (eigen decomposition included), Ellipse, Eigenvectors, Projected.
//! Ellipse and Eigenvectors add no numeric work beyond what the renderer needs, they mark what is shown.
//! The last stage projects centered points on the selected principal axis.
//!
//! Every derived quantity is a pure function of the raw points and the stage, so the engine
//! does not store past states: stepping back recomputes from scratch.

mod eigen;
mod engine;

pub use eigen::{Covariance, EigenPair, OFF_DIAGONAL_THRESHOLD, eigen_decomposition};
pub use engine::{AXIS_SCALE, Ellipse, PcaEngine, PcaStage, PcaState};
