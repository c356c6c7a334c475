//! the kmeans engine

use serde::Serialize;

use crate::engine::{DistanceMetric, EngineState, InitMethod, RunConfig, StepEngine, StepOutcome};
use crate::error::Result;
use crate::geom::Point;
use crate::history::HistoryStore;
use crate::random::{DEFAULT_SEED, RandomSource};

use super::centroids::{initialize, nearest_centroid, update_centroids};

/// Centroids, last assignment and iteration count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KmeansState {
    centroids: Vec<Point>,
    // None before the first iteration
    assignment: Vec<Option<usize>>,
    iteration_count: usize,
    converged: bool,
    status: String,
}

impl KmeansState {
    /// centroid c has id c
    pub fn get_centroids(&self) -> &[Point] {
        &self.centroids
    }

    /// cluster of each point, None until the first step
    pub fn get_assignment(&self) -> &[Option<usize>] {
        &self.assignment
    }

    pub fn get_iteration_count(&self) -> usize {
        self.iteration_count
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// number of points assigned to each centroid
    pub fn get_cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for c in self.assignment.iter().flatten() {
            sizes[*c] += 1;
        }
        sizes
    }
} // end of impl KmeansState

impl EngineState for KmeansState {
    fn status(&self) -> &str {
        &self.status
    }

    fn is_terminal(&self) -> bool {
        self.converged
    }

    fn counter(&self) -> usize {
        self.iteration_count
    }
}

//=========================================================

/// Step by step kmeans.
///
/// The random source is part of what a step changes (empty clusters draw new centroids),
/// so history records it along with the state and stepping again after a step back
/// replays the same draws.
pub struct KmeansEngine {
    data: Vec<Point>,
    k: usize,
    metric: DistanceMetric,
    init: InitMethod,
    domain: f64,
    max_iterations: usize,
    rng: RandomSource,
    state: KmeansState,
    history: HistoryStore<(KmeansState, RandomSource)>,
}

impl KmeansEngine {
    /// reseeds the random source and initializes k centroids.
    /// Fails if k is 0, k greater than the number of points is accepted.
    pub fn start(points: Vec<Point>, config: &RunConfig) -> Result<Self> {
        config.check_kmeans(points.len())?;
        log::info!(
            "kmeans start, nb points : {}, k : {}, init : {:?}, metric : {:?}",
            points.len(),
            config.k,
            config.init,
            config.metric
        );
        let mut rng = RandomSource::new(DEFAULT_SEED);
        let centroids = initialize(
            &points,
            config.k,
            config.init,
            config.metric,
            &mut rng,
            config.domain,
        );
        let state = KmeansState {
            centroids,
            assignment: vec![None; points.len()],
            iteration_count: 0,
            converged: false,
            status: format!("Initialized {} centroids with {:?}.", config.k, config.init),
        };
        Ok(KmeansEngine {
            data: points,
            k: config.k,
            metric: config.metric,
            init: config.init,
            domain: config.domain,
            max_iterations: config.max_iterations,
            rng,
            state,
            history: HistoryStore::new(),
        })
    }

    pub fn get_k(&self) -> usize {
        self.k
    }

    pub fn get_metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn get_init(&self) -> InitMethod {
        self.init
    }

    /// sum over points of the squared metric distance to their centroid, None before the first step.
    /// With [DistanceMetric::Manhattan] this is the sum of squared l1 distances, the centroids
    /// staying the arithmetic means of their clusters.
    pub fn get_inertia(&self) -> Option<f64> {
        if self.state.iteration_count == 0 {
            return None;
        }
        let inertia = self
            .data
            .iter()
            .zip(self.state.assignment.iter())
            .filter_map(|(p, c)| c.map(|c| self.metric.distance(p, &self.state.centroids[c])))
            .map(|d| d * d)
            .sum();
        Some(inertia)
    }

    // one Lloyd iteration, no history. Returns true on convergence
    fn iterate(&mut self) -> bool {
        let state = &mut self.state;
        state.iteration_count += 1;
        let mut clusters: Vec<Vec<&Point>> = vec![Vec::new(); state.centroids.len()];
        for (i, point) in self.data.iter().enumerate() {
            let c = nearest_centroid(point, &state.centroids, self.metric);
            state.assignment[i] = Some(c);
            clusters[c].push(point);
        }
        let new_centroids = update_centroids(&clusters, &mut self.rng, self.domain);
        let changed = state
            .centroids
            .iter()
            .zip(new_centroids.iter())
            .any(|(old, new)| !old.same_position(new));
        state.centroids = new_centroids;
        if changed {
            state.status = format!(
                "Iteration {}: points assigned, centroids moved.",
                state.iteration_count
            );
            false
        } else {
            state.converged = true;
            state.status = format!("Algorithm converged in {} steps.", state.iteration_count);
            log::info!("kmeans converged in {} iterations", state.iteration_count);
            true
        }
    } // end of iterate
} // end of impl KmeansEngine

impl StepEngine for KmeansEngine {
    type State = KmeansState;

    fn get_points(&self) -> &[Point] {
        &self.data
    }

    fn get_state(&self) -> &KmeansState {
        &self.state
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }

    fn step(&mut self) -> StepOutcome {
        if self.state.converged {
            return StepOutcome::AlreadyTerminal;
        }
        self.history.push((self.state.clone(), self.rng.clone()));
        let converged = self.iterate();
        log::debug!("kmeans step : {}", self.state.status);
        if converged {
            StepOutcome::Finished
        } else {
            StepOutcome::Advanced
        }
    }

    fn step_back(&mut self) -> StepOutcome {
        match self.history.pop() {
            Some((previous, rng)) => {
                self.state = previous;
                self.rng = rng;
                StepOutcome::Advanced
            }
            None => StepOutcome::HistoryEmpty,
        }
    }

    /// iterates until convergence or max_iterations more iterations
    fn fast_forward(&mut self) -> StepOutcome {
        if self.state.converged {
            return StepOutcome::AlreadyTerminal;
        }
        self.history.push((self.state.clone(), self.rng.clone()));
        for _ in 0..self.max_iterations {
            if self.iterate() {
                return StepOutcome::Finished;
            }
        }
        log::warn!(
            "kmeans fast forward stopped after {} iterations without convergence",
            self.max_iterations
        );
        self.state.status = format!(
            "Stopped after {} iterations without convergence.",
            self.state.iteration_count
        );
        StepOutcome::Advanced
    }
} // end of impl StepEngine for KmeansEngine

//========================================================

#[cfg(test)]
mod tests {

    use super::*;

    use crate::error::VizError;
    use crate::shapes::{Shape, generate};

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn blobs(n: usize) -> Vec<Point> {
        let mut rng = RandomSource::new(DEFAULT_SEED);
        generate(Shape::Gaussian, n, &mut rng)
    }

    // 4 tight groups far apart
    fn squares() -> Vec<Point> {
        let corners = [(10., 10.), (90., 10.), (10., 90.), (90., 90.)];
        let mut data = Vec::new();
        for (cx, cy) in corners {
            for (dx, dy) in [(0., 0.), (1., 0.), (0., 1.), (1., 1.)] {
                data.push(Point::new(data.len(), cx + dx, cy + dy));
            }
        }
        data
    }

    #[test]
    fn converges_on_blobs_with_each_init() {
        log_init_test();
        let data = blobs(200);
        for init in [
            InitMethod::Forgy,
            InitMethod::RandomPartition,
            InitMethod::KmeansPlusPlus,
        ] {
            let config = RunConfig::default().with_k(4).with_init(init);
            let mut engine = KmeansEngine::start(data.clone(), &config).unwrap();
            assert_eq!(engine.fast_forward(), StepOutcome::Finished);
            let state = engine.get_state();
            assert!(state.is_converged());
            assert!(state.get_iteration_count() <= 20, "{:?} took {} iterations", init, state.get_iteration_count());
            assert_eq!(state.get_centroids().len(), 4);
            assert_eq!(state.get_cluster_sizes().iter().sum::<usize>(), 200);
            assert_eq!(
                engine.status(),
                format!("Algorithm converged in {} steps.", state.get_iteration_count())
            );
            log::info!("init {:?} : {} iterations", init, state.get_iteration_count());
        }
    }

    #[test]
    fn finds_separated_groups() {
        log_init_test();
        let config = RunConfig::default()
            .with_k(4)
            .with_init(InitMethod::KmeansPlusPlus);
        let mut engine = KmeansEngine::start(squares(), &config).unwrap();
        engine.fast_forward();
        let assignment = engine.get_state().get_assignment();
        // each group of 4 consecutive points shares a cluster
        for group in assignment.chunks(4) {
            assert!(group.iter().all(|c| *c == group[0]));
        }
        let mut sizes = engine.get_state().get_cluster_sizes();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![4, 4, 4, 4]);
        // 16 points at squared distance 0.5 from their centroid
        assert!((engine.get_inertia().unwrap() - 8.).abs() < 1e-9);
    }

    #[test]
    fn runs_are_deterministic() {
        log_init_test();
        let data = blobs(120);
        let config = RunConfig::default().with_k(5).with_init(InitMethod::Forgy);
        let mut a = KmeansEngine::start(data.clone(), &config).unwrap();
        let mut b = KmeansEngine::start(data, &config).unwrap();
        assert_eq!(a.get_state(), b.get_state());
        while a.step().changed() {
            b.step();
            assert_eq!(a.get_state(), b.get_state());
        }
    }

    #[test]
    fn steps_match_fast_forward() {
        log_init_test();
        let data = blobs(150);
        let config = RunConfig::default()
            .with_k(3)
            .with_init(InitMethod::RandomPartition);
        let mut stepped = KmeansEngine::start(data.clone(), &config).unwrap();
        let mut nb_steps = 0;
        while stepped.step().changed() {
            nb_steps += 1;
        }
        assert_eq!(nb_steps, stepped.get_state().get_iteration_count());
        assert_eq!(stepped.history_len(), nb_steps);
        let mut fast = KmeansEngine::start(data, &config).unwrap();
        fast.fast_forward();
        assert_eq!(fast.get_state(), stepped.get_state());
        assert_eq!(fast.history_len(), 1);
    }

    #[test]
    fn step_back_replays_same_draws() {
        log_init_test();
        // more clusters than points, reseeding happens at each iteration
        let config = RunConfig::default().with_k(6);
        let data = squares()[..4].to_vec();
        let mut engine = KmeansEngine::start(data, &config).unwrap();
        assert_eq!(engine.step_back(), StepOutcome::HistoryEmpty);
        let initial = engine.get_state().clone();
        engine.step();
        let first = engine.get_state().clone();
        assert_eq!(first.get_iteration_count(), 1);
        assert_eq!(engine.step_back(), StepOutcome::Advanced);
        assert_eq!(*engine.get_state(), initial);
        engine.step();
        assert_eq!(*engine.get_state(), first);
    }

    #[test]
    fn more_clusters_than_points() {
        log_init_test();
        let data = squares()[..3].to_vec();
        let config = RunConfig::default().with_k(5).with_max_iterations(50);
        let mut engine = KmeansEngine::start(data, &config).unwrap();
        assert_eq!(engine.get_state().get_centroids().len(), 5);
        engine.step();
        let state = engine.get_state();
        assert_eq!(state.get_centroids().len(), 5);
        for c in state.get_centroids() {
            assert!((0. ..100.).contains(&c.get_x()));
            assert!((0. ..100.).contains(&c.get_y()));
        }
        // reseeded centroids keep moving, fast forward hits the cap
        let outcome = engine.fast_forward();
        if outcome == StepOutcome::Advanced {
            assert!(!engine.is_terminal());
            assert_eq!(engine.get_state().get_iteration_count(), 51);
        } else {
            assert_eq!(outcome, StepOutcome::Finished);
        }
    }

    #[test]
    fn zero_clusters_rejected() {
        let config = RunConfig::default().with_k(0);
        assert!(matches!(
            KmeansEngine::start(squares(), &config),
            Err(VizError::InvalidClusterCount { requested: 0, .. })
        ));
    }

    #[test]
    fn manhattan_metric() {
        log_init_test();
        let config = RunConfig::default()
            .with_k(4)
            .with_metric(DistanceMetric::Manhattan)
            .with_init(InitMethod::KmeansPlusPlus);
        let mut engine = KmeansEngine::start(squares(), &config).unwrap();
        assert_eq!(engine.get_metric(), DistanceMetric::Manhattan);
        assert_eq!(engine.fast_forward(), StepOutcome::Finished);
        assert_eq!(engine.fast_forward(), StepOutcome::AlreadyTerminal);
        assert_eq!(engine.step(), StepOutcome::AlreadyTerminal);
        // each point is at l1 distance 1 from its centroid
        assert!((engine.get_inertia().unwrap() - 16.).abs() < 1e-9);
    }
} // end of mod tests
