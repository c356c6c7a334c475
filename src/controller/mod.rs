//! Drives one engine at a time : manual steps, step back, fast forward and timed autoplay.
//!
//! Starting an algorithm replaces the active engine and its history.
//! Every call hands back a [Frame], an owned copy of what a renderer needs.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::dbscan::{DbscanEngine, DbscanState};
use crate::engine::{RunConfig, Snapshot, StepEngine, StepOutcome};
use crate::error::{Result, VizError};
use crate::geom::Point;
use crate::hac::{HacEngine, HacState};
use crate::kmeans::{KmeansEngine, KmeansState};
use crate::pca::{PcaEngine, PcaState};

/// cadence of autoplay when none is given
pub const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_secs(1);

/// algorithms the controller can run
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    Kmeans,
    Dbscan,
    Hierarchical,
    Pca,
}

impl FromStr for Algorithm {
    type Err = VizError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kmeans" => Ok(Algorithm::Kmeans),
            "dbscan" => Ok(Algorithm::Dbscan),
            "hierarchical" | "hac" => Ok(Algorithm::Hierarchical),
            "pca" => Ok(Algorithm::Pca),
            _ => Err(VizError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// What the renderer gets after each call, one variant per algorithm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Frame {
    Kmeans(Snapshot<KmeansState>),
    Dbscan(Snapshot<DbscanState>),
    Hierarchical(Snapshot<HacState>),
    Pca(Snapshot<PcaState>),
}

impl Frame {
    pub fn get_algorithm(&self) -> Algorithm {
        match self {
            Frame::Kmeans(_) => Algorithm::Kmeans,
            Frame::Dbscan(_) => Algorithm::Dbscan,
            Frame::Hierarchical(_) => Algorithm::Hierarchical,
            Frame::Pca(_) => Algorithm::Pca,
        }
    }

    pub fn get_points(&self) -> &[Point] {
        match self {
            Frame::Kmeans(s) => &s.points,
            Frame::Dbscan(s) => &s.points,
            Frame::Hierarchical(s) => &s.points,
            Frame::Pca(s) => &s.points,
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Frame::Kmeans(s) => s.is_terminal(),
            Frame::Dbscan(s) => s.is_terminal(),
            Frame::Hierarchical(s) => s.is_terminal(),
            Frame::Pca(s) => s.is_terminal(),
        }
    }

    pub fn status(&self) -> &str {
        match self {
            Frame::Kmeans(s) => s.status(),
            Frame::Dbscan(s) => s.status(),
            Frame::Hierarchical(s) => s.status(),
            Frame::Pca(s) => s.status(),
        }
    }

    /// iterations, queue length, merges or stage depending on the algorithm
    pub fn counter(&self) -> usize {
        match self {
            Frame::Kmeans(s) => s.counter(),
            Frame::Dbscan(s) => s.counter(),
            Frame::Hierarchical(s) => s.counter(),
            Frame::Pca(s) => s.counter(),
        }
    }
} // end of impl Frame

//==================================================================

/// the engine currently driven
pub enum ActiveEngine {
    Kmeans(KmeansEngine),
    Dbscan(DbscanEngine),
    Hierarchical(HacEngine),
    Pca(PcaEngine),
}

impl ActiveEngine {
    /// builds the engine for algorithm on points
    pub fn start(algorithm: Algorithm, points: Vec<Point>, config: &RunConfig) -> Result<Self> {
        let engine = match algorithm {
            Algorithm::Kmeans => ActiveEngine::Kmeans(KmeansEngine::start(points, config)?),
            Algorithm::Dbscan => ActiveEngine::Dbscan(DbscanEngine::start(points, config)?),
            Algorithm::Hierarchical => ActiveEngine::Hierarchical(HacEngine::start(points, config)),
            Algorithm::Pca => ActiveEngine::Pca(PcaEngine::start(points, config)),
        };
        Ok(engine)
    }

    pub fn get_algorithm(&self) -> Algorithm {
        match self {
            ActiveEngine::Kmeans(_) => Algorithm::Kmeans,
            ActiveEngine::Dbscan(_) => Algorithm::Dbscan,
            ActiveEngine::Hierarchical(_) => Algorithm::Hierarchical,
            ActiveEngine::Pca(_) => Algorithm::Pca,
        }
    }

    pub fn step(&mut self) -> StepOutcome {
        match self {
            ActiveEngine::Kmeans(e) => e.step(),
            ActiveEngine::Dbscan(e) => e.step(),
            ActiveEngine::Hierarchical(e) => e.step(),
            ActiveEngine::Pca(e) => e.step(),
        }
    }

    pub fn step_back(&mut self) -> StepOutcome {
        match self {
            ActiveEngine::Kmeans(e) => e.step_back(),
            ActiveEngine::Dbscan(e) => e.step_back(),
            ActiveEngine::Hierarchical(e) => e.step_back(),
            ActiveEngine::Pca(e) => e.step_back(),
        }
    }

    pub fn fast_forward(&mut self) -> StepOutcome {
        match self {
            ActiveEngine::Kmeans(e) => e.fast_forward(),
            ActiveEngine::Dbscan(e) => e.fast_forward(),
            ActiveEngine::Hierarchical(e) => e.fast_forward(),
            ActiveEngine::Pca(e) => e.fast_forward(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            ActiveEngine::Kmeans(e) => e.is_terminal(),
            ActiveEngine::Dbscan(e) => e.is_terminal(),
            ActiveEngine::Hierarchical(e) => e.is_terminal(),
            ActiveEngine::Pca(e) => e.is_terminal(),
        }
    }

    pub fn history_len(&self) -> usize {
        match self {
            ActiveEngine::Kmeans(e) => e.history_len(),
            ActiveEngine::Dbscan(e) => e.history_len(),
            ActiveEngine::Hierarchical(e) => e.history_len(),
            ActiveEngine::Pca(e) => e.history_len(),
        }
    }

    pub fn frame(&self) -> Frame {
        match self {
            ActiveEngine::Kmeans(e) => Frame::Kmeans(e.snapshot()),
            ActiveEngine::Dbscan(e) => Frame::Dbscan(e.snapshot()),
            ActiveEngine::Hierarchical(e) => Frame::Hierarchical(e.snapshot()),
            ActiveEngine::Pca(e) => Frame::Pca(e.snapshot()),
        }
    }
} // end of impl ActiveEngine

//==================================================================

/// Holds at most one engine and forwards user actions to it.
pub struct StepController {
    engine: Option<ActiveEngine>,
}

impl StepController {
    /// installs the logger on first use
    pub fn new() -> Self {
        lazy_static::initialize(&crate::LOG);
        StepController { engine: None }
    }

    /// replaces the active engine by a fresh one, the previous engine and its history are dropped
    pub fn start(&mut self, algorithm: Algorithm, points: Vec<Point>, config: &RunConfig) -> Result<Frame> {
        if let Some(previous) = &self.engine {
            log::debug!("dropping active {:?} engine", previous.get_algorithm());
        }
        // a failed start leaves no engine
        self.engine = None;
        let engine = ActiveEngine::start(algorithm, points, config)?;
        let frame = engine.frame();
        self.engine = Some(engine);
        Ok(frame)
    }

    /// drops the active engine
    pub fn reset(&mut self) {
        self.engine = None;
    }

    pub fn get_engine(&self) -> Option<&ActiveEngine> {
        self.engine.as_ref()
    }

    pub fn get_algorithm(&self) -> Option<Algorithm> {
        self.engine.as_ref().map(|e| e.get_algorithm())
    }

    fn active(&mut self) -> Result<&mut ActiveEngine> {
        self.engine.as_mut().ok_or(VizError::NoActiveEngine)
    }

    pub fn step(&mut self) -> Result<(StepOutcome, Frame)> {
        let engine = self.active()?;
        let outcome = engine.step();
        Ok((outcome, engine.frame()))
    }

    pub fn step_back(&mut self) -> Result<(StepOutcome, Frame)> {
        let engine = self.active()?;
        let outcome = engine.step_back();
        Ok((outcome, engine.frame()))
    }

    pub fn fast_forward(&mut self) -> Result<(StepOutcome, Frame)> {
        let engine = self.active()?;
        let outcome = engine.fast_forward();
        log::info!("fast forward : {:?}", outcome);
        Ok((outcome, engine.frame()))
    }

    /// current frame
    pub fn frame(&self) -> Result<Frame> {
        self.engine
            .as_ref()
            .map(|e| e.frame())
            .ok_or(VizError::NoActiveEngine)
    }

    /// Steps every interval until the engine is terminal, on_frame returns false,
    /// or max_ticks steps were done. Blocks the calling thread.
    /// Returns the number of steps performed.
    pub fn autoplay<F>(&mut self, interval: Duration, max_ticks: Option<usize>, mut on_frame: F) -> Result<usize>
    where
        F: FnMut(&Frame) -> bool,
    {
        let engine = self.active()?;
        let mut nb_ticks = 0;
        log::info!("autoplay start, interval : {:?}", interval);
        loop {
            if engine.is_terminal() {
                break;
            }
            if let Some(max) = max_ticks {
                if nb_ticks >= max {
                    break;
                }
            }
            std::thread::sleep(interval);
            let outcome = engine.step();
            nb_ticks += 1;
            if !on_frame(&engine.frame()) || !outcome.changed() {
                break;
            }
        }
        log::info!("autoplay stopped after {} ticks", nb_ticks);
        Ok(nb_ticks)
    } // end of autoplay
} // end of impl StepController

impl Default for StepController {
    fn default() -> Self {
        StepController::new()
    }
}

//========================================================

// end of mod tests
