//! the dbscan engine

use crate::engine::{RunConfig, StepEngine, StepOutcome};
use crate::error::Result;
use crate::geom::{Point, euclidean};
use crate::history::HistoryStore;

use super::state::{DbscanState, PointState};

/// brute force neighbourhood : indices j != idx with distance < epsilon, in increasing order
fn region_query(data: &[Point], idx: usize, epsilon: f64) -> Vec<usize> {
    let point = &data[idx];
    data.iter()
        .enumerate()
        .filter(|(j, other)| *j != idx && euclidean(point, other) < epsilon)
        .map(|(j, _)| j)
        .collect()
}

/// Step by step dbscan.
pub struct DbscanEngine {
    data: Vec<Point>,
    epsilon: f64,
    min_pts: usize,
    state: DbscanState,
    history: HistoryStore<DbscanState>,
}

impl DbscanEngine {
    /// all points unvisited, nothing assigned, empty queue.
    /// Fails only if min_pts is 0, epsilon <= 0 is accepted and makes every point noise.
    pub fn start(points: Vec<Point>, config: &RunConfig) -> Result<Self> {
        config.check_dbscan()?;
        log::info!(
            "dbscan start, nb points : {}, epsilon : {:.3e}, min_pts : {}",
            points.len(),
            config.epsilon,
            config.min_pts
        );
        let mut state = DbscanState::new(points.len());
        state.status = format!(
            "Ready: {} points, epsilon {}, min points {}.",
            points.len(),
            config.epsilon,
            config.min_pts
        );
        Ok(DbscanEngine {
            data: points,
            epsilon: config.epsilon,
            min_pts: config.min_pts,
            state,
            history: HistoryStore::new(),
        })
    }

    pub fn get_epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn get_min_pts(&self) -> usize {
        self.min_pts
    }

    // dequeue one index and evaluate it for the cluster being expanded
    fn expand_one(&mut self) {
        let Some(n) = self.state.queue.pop_front() else {
            return;
        };
        let cluster = self.state.cluster_counter;
        let state = &mut self.state;
        if state.visited[n] {
            if state.assignment[n] == 0 || state.point_states[n] == PointState::Noise {
                state.assignment[n] = cluster;
                state.point_states[n] = PointState::Border;
                state.status = format!(
                    "Neighbor {} was previously NOISE, now assigned as BORDER point of cluster {}.",
                    n + 1,
                    cluster
                );
            } else {
                state.status = format!(
                    "Neighbor {} already belongs to cluster {}. Skipping.",
                    n + 1,
                    state.assignment[n]
                );
            }
            return;
        }
        state.visited[n] = true;
        state.assignment[n] = cluster;
        state.point_states[n] = PointState::Border;
        let neighbours = region_query(&self.data, n, self.epsilon);
        if neighbours.len() >= self.min_pts {
            state.point_states[n] = PointState::Core;
            let before = state.queue.len();
            for nn in neighbours {
                if !state.visited[nn] {
                    state.queue.push_back(nn);
                }
            }
            state.status = format!(
                "Neighbor {} is a CORE point! Added {} new neighbors to expansion queue.",
                n + 1,
                state.queue.len() - before
            );
        } else {
            state.status = format!(
                "Neighbor {} is a BORDER point ({} neighbors, need {} for core).",
                n + 1,
                neighbours.len(),
                self.min_pts
            );
        }
    } // end of expand_one

    // evaluate next unvisited point of the main scan. Returns true if the scan is exhausted
    fn scan_one(&mut self) -> bool {
        let nb_points = self.data.len();
        let state = &mut self.state;
        while state.scan_cursor < nb_points && state.visited[state.scan_cursor] {
            state.scan_cursor += 1;
        }
        if state.scan_cursor >= nb_points {
            state.finished = true;
            state.status = format!(
                "Algorithm complete! Found {} clusters.",
                state.cluster_counter
            );
            log::info!(
                "dbscan finished, nb clusters : {}, nb noise : {}",
                state.cluster_counter,
                state.get_nb_noise()
            );
            return true;
        }
        let i = state.scan_cursor;
        state.visited[i] = true;
        let neighbours = region_query(&self.data, i, self.epsilon);
        if neighbours.len() >= self.min_pts {
            state.point_states[i] = PointState::Core;
            state.cluster_counter += 1;
            state.assignment[i] = state.cluster_counter;
            state.status = format!(
                "Point {} is a CORE point! Starting cluster {} with {} neighbors.",
                i + 1,
                state.cluster_counter,
                neighbours.len()
            );
            state.queue = neighbours.into();
        } else {
            state.point_states[i] = PointState::Noise;
            state.status = format!(
                "Point {} is NOISE (only {} neighbors, need {}).",
                i + 1,
                neighbours.len(),
                self.min_pts
            );
        }
        false
    } // end of scan_one

    // expansion run to exhaustion without stopping, same rules as expand_one
    fn expand_cluster_fast(&mut self, cluster: usize) {
        while let Some(n) = self.state.queue.pop_front() {
            let state = &mut self.state;
            if state.visited[n] {
                if state.assignment[n] == 0 || state.point_states[n] == PointState::Noise {
                    state.assignment[n] = cluster;
                    state.point_states[n] = PointState::Border;
                }
                continue;
            }
            state.visited[n] = true;
            state.assignment[n] = cluster;
            state.point_states[n] = PointState::Border;
            let neighbours = region_query(&self.data, n, self.epsilon);
            if neighbours.len() >= self.min_pts {
                state.point_states[n] = PointState::Core;
                for nn in neighbours {
                    if !state.visited[nn] {
                        state.queue.push_back(nn);
                    }
                }
            }
        }
    } // end of expand_cluster_fast
} // end of impl DbscanEngine

impl StepEngine for DbscanEngine {
    type State = DbscanState;

    fn get_points(&self) -> &[Point] {
        &self.data
    }

    fn get_state(&self) -> &DbscanState {
        &self.state
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }

    fn step(&mut self) -> StepOutcome {
        if self.state.finished {
            return StepOutcome::AlreadyTerminal;
        }
        self.history.push(self.state.clone());
        if !self.state.queue.is_empty() {
            self.expand_one();
            log::debug!("dbscan step : {}", self.state.status);
            return StepOutcome::Advanced;
        }
        let done = self.scan_one();
        log::debug!("dbscan step : {}", self.state.status);
        if done {
            StepOutcome::Finished
        } else {
            StepOutcome::Advanced
        }
    } // end of step

    fn step_back(&mut self) -> StepOutcome {
        match self.history.pop() {
            Some(previous) => {
                self.state = previous;
                StepOutcome::Advanced
            }
            None => StepOutcome::HistoryEmpty,
        }
    }

    /// finishes a pending expansion then runs the scan with inline expansion,
    /// as the classical loop does
    fn fast_forward(&mut self) -> StepOutcome {
        if self.state.finished {
            return StepOutcome::AlreadyTerminal;
        }
        self.history.push(self.state.clone());
        let current = self.state.cluster_counter;
        self.expand_cluster_fast(current);
        for i in self.state.scan_cursor..self.data.len() {
            if self.state.visited[i] {
                continue;
            }
            self.state.visited[i] = true;
            let neighbours = region_query(&self.data, i, self.epsilon);
            if neighbours.len() < self.min_pts {
                self.state.point_states[i] = PointState::Noise;
            } else {
                self.state.cluster_counter += 1;
                let cluster = self.state.cluster_counter;
                self.state.assignment[i] = cluster;
                self.state.point_states[i] = PointState::Core;
                self.state.queue = neighbours.into();
                self.expand_cluster_fast(cluster);
            }
        }
        self.state.scan_cursor = self.data.len();
        self.state.finished = true;
        self.state.status = format!(
            "Algorithm complete! Found {} clusters.",
            self.state.cluster_counter
        );
        log::info!(
            "dbscan fast forward done, nb clusters : {}, nb noise : {}",
            self.state.cluster_counter,
            self.state.get_nb_noise()
        );
        StepOutcome::Finished
    } // end of fast_forward
} // end of impl StepEngine for DbscanEngine

//========================================================

#[cfg(test)]
mod tests {

    use super::*;

    use crate::random::{DEFAULT_SEED, RandomSource};
    use crate::shapes::{Shape, generate};

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn points(coords: &[(f64, f64)]) -> Vec<Point> {
        coords
            .iter()
            .enumerate()
            .map(|(i, (x, y))| Point::new(i, *x, *y))
            .collect()
    }

    fn run_steps(engine: &mut DbscanEngine) -> usize {
        let mut nb_steps = 0;
        loop {
            let outcome = engine.step();
            nb_steps += 1;
            if outcome == StepOutcome::Finished {
                break;
            }
            assert_eq!(outcome, StepOutcome::Advanced);
            assert!(nb_steps < 100_000, "dbscan does not terminate");
        }
        nb_steps
    }

    #[test]
    fn two_tight_groups() {
        log_init_test();
        let data = points(&[
            (0., 0.),
            (1., 0.),
            (0.5, 0.5),
            (10., 10.),
            (11., 10.),
            (10.5, 10.5),
        ]);
        let config = RunConfig::default().with_epsilon(2.).with_min_pts(2);
        let mut engine = DbscanEngine::start(data, &config).unwrap();
        run_steps(&mut engine);
        let state = engine.get_state();
        assert_eq!(state.get_cluster_count(), 2);
        assert_eq!(state.get_nb_noise(), 0);
        assert_eq!(state.get_assignment(), &[1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn pairs_with_min_pts_one() {
        log_init_test();
        let data = points(&[(0., 0.), (1., 0.), (10., 10.), (11., 10.)]);
        let config = RunConfig::default().with_epsilon(2.).with_min_pts(1);
        let mut engine = DbscanEngine::start(data, &config).unwrap();
        assert_eq!(engine.fast_forward(), StepOutcome::Finished);
        assert_eq!(engine.get_state().get_assignment(), &[1, 1, 2, 2]);
        assert_eq!(engine.get_state().get_nb_noise(), 0);
    }

    #[test]
    fn noise_reclaimed_as_border() {
        log_init_test();
        let data = points(&[(0., 0.), (1.2, 0.), (2.4, 0.), (2.4, 1.2)]);
        let config = RunConfig::default().with_epsilon(1.5).with_min_pts(2);
        let mut engine = DbscanEngine::start(data, &config).unwrap();
        // point 0 has a single neighbour
        assert_eq!(engine.step(), StepOutcome::Advanced);
        assert_eq!(engine.get_state().get_point_states()[0], PointState::Noise);
        // point 1 is core and seeds the queue with 0 and 2
        assert_eq!(engine.step(), StepOutcome::Advanced);
        assert_eq!(engine.get_state().get_point_states()[1], PointState::Core);
        assert_eq!(
            engine.get_state().get_queue().iter().copied().collect::<Vec<usize>>(),
            vec![0, 2]
        );
        // 0 reclaimed
        engine.step();
        assert_eq!(engine.get_state().get_point_states()[0], PointState::Border);
        assert_eq!(engine.get_state().get_assignment()[0], 1);
        // 2 is core and pushes 3
        engine.step();
        assert_eq!(engine.get_state().get_point_states()[2], PointState::Core);
        assert_eq!(engine.get_state().get_queue().len(), 1);
        engine.step();
        assert!(!engine.is_terminal());
        // final scan step finds nothing left
        assert_eq!(engine.step(), StepOutcome::Finished);
        let state = engine.get_state();
        assert_eq!(
            state.get_point_states(),
            &[
                PointState::Border,
                PointState::Core,
                PointState::Core,
                PointState::Border
            ]
        );
        assert_eq!(state.get_assignment(), &[1, 1, 1, 1]);
        assert_eq!(engine.step(), StepOutcome::AlreadyTerminal);
    }

    #[test]
    fn border_keeps_first_cluster() {
        log_init_test();
        // point 4 is in reach of both dense groups but has only 2 neighbours
        let data = points(&[
            (0., 0.),
            (0.5, 0.),
            (0., 0.5),
            (0.2, 0.4),
            (1.3, 0.),
            (2.1, 0.),
            (2.6, 0.),
            (2.6, 0.5),
            (2.4, 0.4),
        ]);
        let config = RunConfig::default().with_epsilon(1.).with_min_pts(3);
        let mut engine = DbscanEngine::start(data.clone(), &config).unwrap();
        run_steps(&mut engine);
        let stepped = engine.get_state().clone();
        assert_eq!(stepped.get_cluster_count(), 2);
        assert_eq!(stepped.get_point_states()[4], PointState::Border);
        assert_eq!(stepped.get_assignment()[4], 1);
        assert_eq!(stepped.get_assignment(), &[1, 1, 1, 1, 1, 2, 2, 2, 2]);
        //
        let mut fast = DbscanEngine::start(data, &config).unwrap();
        fast.fast_forward();
        assert_eq!(fast.get_state().get_assignment(), stepped.get_assignment());
        assert_eq!(
            fast.get_state().get_point_states(),
            stepped.get_point_states()
        );
    }

    #[test]
    fn step_and_fast_forward_agree_on_shapes() {
        log_init_test();
        for shape in [Shape::Moons, Shape::Gaussian, Shape::Circle, Shape::Random] {
            let mut rng = RandomSource::new(DEFAULT_SEED);
            let data = generate(shape, 120, &mut rng);
            let config = RunConfig::default().with_epsilon(6.).with_min_pts(3);
            let mut stepped = DbscanEngine::start(data.clone(), &config).unwrap();
            let nb_steps = run_steps(&mut stepped);
            let mut fast = DbscanEngine::start(data, &config).unwrap();
            assert_eq!(fast.fast_forward(), StepOutcome::Finished);
            log::info!(
                "shape {:?}, nb steps : {}, nb clusters {}",
                shape,
                nb_steps,
                stepped.get_state().get_cluster_count()
            );
            assert_eq!(
                fast.get_state().get_assignment(),
                stepped.get_state().get_assignment()
            );
            assert_eq!(
                fast.get_state().get_point_states(),
                stepped.get_state().get_point_states()
            );
            assert_eq!(
                fast.get_state().get_cluster_count(),
                stepped.get_state().get_cluster_count()
            );
        }
    }

    #[test]
    fn fast_forward_from_the_middle() {
        log_init_test();
        let mut rng = RandomSource::new(DEFAULT_SEED);
        let data = generate(Shape::Moons, 75, &mut rng);
        let config = RunConfig::default().with_epsilon(5.).with_min_pts(3);
        let mut reference = DbscanEngine::start(data.clone(), &config).unwrap();
        reference.fast_forward();
        for nb_before in [1, 3, 10, 40] {
            let mut engine = DbscanEngine::start(data.clone(), &config).unwrap();
            for _ in 0..nb_before {
                engine.step();
            }
            engine.fast_forward();
            assert_eq!(
                engine.get_state().get_assignment(),
                reference.get_state().get_assignment()
            );
        }
    }

    #[test]
    fn completeness() {
        log_init_test();
        let mut rng = RandomSource::new(DEFAULT_SEED);
        let data = generate(Shape::Scurve, 150, &mut rng);
        let config = RunConfig::default().with_epsilon(4.).with_min_pts(4);
        let mut engine = DbscanEngine::start(data, &config).unwrap();
        run_steps(&mut engine);
        let state = engine.get_state();
        for (s, c) in state
            .get_point_states()
            .iter()
            .zip(state.get_assignment().iter())
        {
            match s {
                PointState::Unvisited => panic!("unvisited point after termination"),
                PointState::Noise => assert_eq!(*c, 0),
                PointState::Core | PointState::Border => assert!(*c > 0),
            }
        }
        assert!(state.get_queue().is_empty());
    }

    #[test]
    fn non_positive_epsilon_gives_noise() {
        log_init_test();
        let data = points(&[(0., 0.), (0., 0.), (1., 1.)]);
        let config = RunConfig::default().with_epsilon(0.).with_min_pts(1);
        let mut engine = DbscanEngine::start(data, &config).unwrap();
        run_steps(&mut engine);
        assert_eq!(engine.get_state().get_nb_noise(), 3);
        assert_eq!(engine.get_state().get_cluster_count(), 0);
    }

    #[test]
    fn zero_min_pts_rejected() {
        let config = RunConfig::default().with_min_pts(0);
        assert!(DbscanEngine::start(vec![Point::new(0, 0., 0.)], &config).is_err());
    }

    #[test]
    fn empty_input_terminates() {
        let mut engine = DbscanEngine::start(Vec::new(), &RunConfig::default()).unwrap();
        assert_eq!(engine.step(), StepOutcome::Finished);
        assert_eq!(engine.get_state().get_cluster_count(), 0);
    }

    #[test]
    fn step_back_restores() {
        log_init_test();
        let mut rng = RandomSource::new(DEFAULT_SEED);
        let data = generate(Shape::Gaussian, 60, &mut rng);
        let config = RunConfig::default().with_epsilon(5.).with_min_pts(3);
        let mut engine = DbscanEngine::start(data, &config).unwrap();
        assert_eq!(engine.step_back(), StepOutcome::HistoryEmpty);
        loop {
            let before = engine.get_state().clone();
            let outcome = engine.step();
            assert!(outcome.changed());
            assert_eq!(engine.step_back(), StepOutcome::Advanced);
            assert_eq!(*engine.get_state(), before);
            if engine.step() == StepOutcome::Finished {
                break;
            }
        }
        // undo fast forward in one step_back
        let mut engine2 = DbscanEngine::start(engine.get_points().to_vec(), &config).unwrap();
        engine2.step();
        let before = engine2.get_state().clone();
        engine2.fast_forward();
        assert_eq!(engine2.step_back(), StepOutcome::Advanced);
        assert_eq!(*engine2.get_state(), before);
    }

    #[test]
    fn visited_flags() {
        log_init_test();
        let data = points(&[(0., 0.), (1., 0.), (50., 50.)]);
        let config = RunConfig::default().with_epsilon(2.).with_min_pts(2);
        let mut engine = DbscanEngine::start(data, &config).unwrap();
        assert_eq!(engine.get_state().is_visited(0), Some(false));
        assert_eq!(engine.get_state().is_visited(3), None);
        engine.fast_forward();
        for idx in 0..3 {
            assert_eq!(engine.get_state().is_visited(idx), Some(true));
        }
        assert_eq!(engine.get_state().is_visited(usize::MAX), None);
    }
} // end of mod tests
