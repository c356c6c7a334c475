//! the pca stage engine

use serde::Serialize;

use crate::engine::{Component, EngineState, RunConfig, StepEngine, StepOutcome};
use crate::geom::{Point, mean};
use crate::history::HistoryStore;

use super::eigen::{Covariance, EigenPair, OFF_DIAGONAL_THRESHOLD, eigen_decomposition};

/// length factor applied to the square root of the eigenvalue when drawing an axis
pub const AXIS_SCALE: f64 = 2.5;

/// Stages of the run, in order. Each step moves to the next one.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PcaStage {
    #[default]
    Loaded,
    Mean,
    Centered,
    Covariance,
    Ellipse,
    Eigenvectors,
    Projected,
}

impl PcaStage {
    /// rank in the sequence, 0 for Loaded
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// None after Projected
    pub fn next(&self) -> Option<PcaStage> {
        match self {
            PcaStage::Loaded => Some(PcaStage::Mean),
            PcaStage::Mean => Some(PcaStage::Centered),
            PcaStage::Centered => Some(PcaStage::Covariance),
            PcaStage::Covariance => Some(PcaStage::Ellipse),
            PcaStage::Ellipse => Some(PcaStage::Eigenvectors),
            PcaStage::Eigenvectors => Some(PcaStage::Projected),
            PcaStage::Projected => None,
        }
    }
}

/// Covariance ellipse : semi axes are square roots of the eigenvalues, angle is the rotation of the first axis in degrees
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Ellipse {
    pub rx: f64,
    pub ry: f64,
    pub angle_deg: f64,
}

/// Quantities derived so far. All are functions of the raw points, the component and the stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PcaState {
    stage: PcaStage,
    mean: Option<Point>,
    centered: Vec<Point>,
    covariance: Option<Covariance>,
    eigen: Option<EigenPair>,
    ellipse: Option<Ellipse>,
    // coordinate of each centered point along the selected axis
    scores: Vec<f64>,
    projected: Vec<Point>,
    status: String,
}

impl PcaState {
    fn new(nb_points: usize) -> Self {
        PcaState {
            stage: PcaStage::Loaded,
            mean: None,
            centered: Vec::new(),
            covariance: None,
            eigen: None,
            ellipse: None,
            scores: Vec::new(),
            projected: Vec::new(),
            status: format!("Ready: {} points loaded.", nb_points),
        }
    }

    pub fn get_stage(&self) -> PcaStage {
        self.stage
    }

    pub fn get_mean(&self) -> Option<&Point> {
        self.mean.as_ref()
    }

    /// empty before stage Centered
    pub fn get_centered(&self) -> &[Point] {
        &self.centered
    }

    pub fn get_covariance(&self) -> Option<&Covariance> {
        self.covariance.as_ref()
    }

    /// computed with the covariance
    pub fn get_eigen(&self) -> Option<&EigenPair> {
        self.eigen.as_ref()
    }

    pub fn get_ellipse(&self) -> Option<&Ellipse> {
        self.ellipse.as_ref()
    }

    /// tips of the 2 axis arrows drawn from the origin of centered data, once eigenvectors are shown
    pub fn get_axis_tips(&self) -> Option<[Point; 2]> {
        if self.stage < PcaStage::Eigenvectors {
            return None;
        }
        let eigen = self.eigen.as_ref()?;
        let values = eigen.get_values();
        let tips = (*eigen.get_vectors()).map(|v| {
            let length = values[v.get_id()].max(0.).sqrt() * AXIS_SCALE;
            Point::new(v.get_id(), v.get_x() * length, v.get_y() * length)
        });
        Some(tips)
    }

    /// 1d coordinates along the selected axis, empty until projection
    pub fn get_scores(&self) -> &[f64] {
        &self.scores
    }

    /// projections of centered points on the selected axis, empty until projection
    pub fn get_projected(&self) -> &[Point] {
        &self.projected
    }
} // end of impl PcaState

impl EngineState for PcaState {
    fn status(&self) -> &str {
        &self.status
    }

    fn is_terminal(&self) -> bool {
        self.stage == PcaStage::Projected
    }

    fn counter(&self) -> usize {
        self.stage.index()
    }
}

//=========================================================

/// Step by step pca.
///
/// History holds stages only: stepping back replays the computation from the raw points
/// up to the recorded stage.
pub struct PcaEngine {
    data: Vec<Point>,
    component: Component,
    state: PcaState,
    history: HistoryStore<PcaStage>,
}

impl PcaEngine {
    pub fn start(points: Vec<Point>, config: &RunConfig) -> Self {
        log::info!(
            "pca start, nb points : {}, component : {:?}",
            points.len(),
            config.component
        );
        let state = PcaState::new(points.len());
        PcaEngine {
            data: points,
            component: config.component,
            state,
            history: HistoryStore::new(),
        }
    }

    pub fn get_component(&self) -> Component {
        self.component
    }

    // performs the work of the next stage, no history. false if already projected
    fn advance(&mut self) -> bool {
        let Some(next) = self.state.stage.next() else {
            return false;
        };
        let state = &mut self.state;
        match next {
            PcaStage::Loaded => {}
            PcaStage::Mean => {
                let refs: Vec<&Point> = self.data.iter().collect();
                let (mx, my) = mean(&refs).unwrap_or((0., 0.));
                state.mean = Some(Point::new(0, mx, my));
                state.status = format!("Mean computed at ({:.2}, {:.2}).", mx, my);
            }
            PcaStage::Centered => {
                let origin = state.mean.unwrap_or(Point::new(0, 0., 0.));
                state.centered = self.data.iter().map(|p| p.centered_on(&origin)).collect();
                state.status = "Data centered on the mean, which is now the origin.".to_string();
            }
            PcaStage::Covariance => {
                let cov = Covariance::from_centered(&state.centered);
                let eigen = eigen_decomposition(&cov);
                if cov.xy.abs() <= OFF_DIAGONAL_THRESHOLD {
                    log::warn!("pca : negligible covariance between x and y, first axis set to (1,0)");
                }
                let [l1, l2] = eigen.get_values();
                state.status = format!(
                    "Covariance computed (xx {:.2}, yy {:.2}, xy {:.2}), eigenvalues {:.2} and {:.2}.",
                    cov.xx, cov.yy, cov.xy, l1, l2
                );
                state.covariance = Some(cov);
                state.eigen = Some(eigen);
            }
            PcaStage::Ellipse => {
                if let Some(eigen) = &state.eigen {
                    let [l1, l2] = eigen.get_values();
                    let v1 = &eigen.get_vectors()[0];
                    state.ellipse = Some(Ellipse {
                        rx: l1.max(0.).sqrt(),
                        ry: l2.max(0.).sqrt(),
                        angle_deg: v1.get_y().atan2(v1.get_x()).to_degrees(),
                    });
                }
                state.status = "Covariance ellipse shown.".to_string();
            }
            PcaStage::Eigenvectors => {
                state.status = "Principal axes PC1 and PC2 shown.".to_string();
            }
            PcaStage::Projected => {
                if let Some(eigen) = &state.eigen {
                    let axis = match self.component {
                        Component::Pc1 => eigen.get_vectors()[0],
                        Component::Pc2 => eigen.get_vectors()[1],
                    };
                    state.scores = state.centered.iter().map(|p| p.dot(&axis)).collect();
                    state.projected = state
                        .centered
                        .iter()
                        .zip(state.scores.iter())
                        .map(|(p, s)| Point::new(p.get_id(), s * axis.get_x(), s * axis.get_y()))
                        .collect();
                }
                state.status = "PCA Visualization Completed".to_string();
                log::info!("pca projection done on {:?}", self.component);
            }
        }
        state.stage = next;
        true
    } // end of advance

    // recompute from raw points up to stage
    fn replay_to(&mut self, stage: PcaStage) {
        self.state = PcaState::new(self.data.len());
        while self.state.stage < stage {
            if !self.advance() {
                break;
            }
        }
    }
} // end of impl PcaEngine

impl StepEngine for PcaEngine {
    type State = PcaState;

    fn get_points(&self) -> &[Point] {
        &self.data
    }

    fn get_state(&self) -> &PcaState {
        &self.state
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }

    fn step(&mut self) -> StepOutcome {
        if self.state.is_terminal() {
            return StepOutcome::AlreadyTerminal;
        }
        self.history.push(self.state.stage);
        self.advance();
        log::debug!("pca step : {}", self.state.status);
        if self.state.is_terminal() {
            StepOutcome::Finished
        } else {
            StepOutcome::Advanced
        }
    }

    fn step_back(&mut self) -> StepOutcome {
        match self.history.pop() {
            Some(stage) => {
                self.replay_to(stage);
                StepOutcome::Advanced
            }
            None => StepOutcome::HistoryEmpty,
        }
    }

    fn fast_forward(&mut self) -> StepOutcome {
        if self.state.is_terminal() {
            return StepOutcome::AlreadyTerminal;
        }
        self.history.push(self.state.stage);
        while self.advance() {}
        StepOutcome::Finished
    }
} // end of impl StepEngine for PcaEngine

//========================================================

// end of mod tests
