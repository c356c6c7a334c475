//! Resumable, step by step execution of kmeans, dbscan, agglomerative clustering and pca on 2d points.
//!
//! Each algorithm is an explicit state machine: a call to `step` does one unit of work and returns,
//! `fast_forward` runs to the end, `step_back` restores the state recorded before the last step.
//! The [controller::StepController] drives one engine at a time.

use lazy_static::lazy_static;

lazy_static! {
    static ref LOG: u64 = init_log();
}

// install a logger facility
fn init_log() -> u64 {
    let _res = env_logger::try_init();
    println!("\n ************** initializing logger *****************\n");
    1
}

pub mod controller;
pub mod dbscan;
pub mod engine;
pub mod error;
pub mod geom;
pub mod hac;
pub mod history;
pub mod kmeans;
pub mod pca;
pub mod random;
pub mod shapes;

pub use error::{Result, VizError};
