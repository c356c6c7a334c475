//! replays through the controller : same seed and same inputs give the same frames

use stepclust::controller::{Algorithm, Frame, StepController};
use stepclust::engine::{InitMethod, RunConfig, StepOutcome};
use stepclust::random::{DEFAULT_SEED, RandomSource};
use stepclust::shapes::{Shape, generate};

const ALGORITHMS: [Algorithm; 4] = [
    Algorithm::Kmeans,
    Algorithm::Dbscan,
    Algorithm::Hierarchical,
    Algorithm::Pca,
];

fn log_init_test() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn run_all_steps(algorithm: Algorithm, shape: Shape, config: &RunConfig) -> Vec<Frame> {
    let mut rng = RandomSource::new(DEFAULT_SEED);
    let points = generate(shape, 60, &mut rng);
    let mut controller = StepController::new();
    let mut frames = vec![controller.start(algorithm, points, config).unwrap()];
    loop {
        let (outcome, frame) = controller.step().unwrap();
        if !outcome.changed() {
            break;
        }
        frames.push(frame);
    }
    frames
}

#[test]
fn replays_are_identical() {
    log_init_test();
    let config = RunConfig::default()
        .with_k(4)
        .with_epsilon(7.)
        .with_init(InitMethod::KmeansPlusPlus);
    for algorithm in ALGORITHMS {
        for shape in [Shape::Gaussian, Shape::Moons, Shape::Scurve] {
            let first = run_all_steps(algorithm, shape, &config);
            let second = run_all_steps(algorithm, shape, &config);
            assert_eq!(first, second, "{:?} on {}", algorithm, shape.name());
            assert!(first.last().unwrap().is_terminal());
        }
    }
}

#[test]
fn step_back_then_step_is_idempotent() {
    log_init_test();
    let config = RunConfig::default().with_k(3).with_epsilon(6.);
    for algorithm in ALGORITHMS {
        let mut rng = RandomSource::new(DEFAULT_SEED);
        let points = generate(Shape::Diagonal, 50, &mut rng);
        let mut controller = StepController::new();
        controller.start(algorithm, points, &config).unwrap();
        for _ in 0..3 {
            let before = controller.frame().unwrap();
            let (_, after) = controller.step().unwrap();
            let (outcome, back) = controller.step_back().unwrap();
            assert_eq!(outcome, StepOutcome::Advanced);
            assert_eq!(back, before, "{:?}", algorithm);
            let (_, again) = controller.step().unwrap();
            assert_eq!(again, after, "{:?}", algorithm);
        }
    }
}

#[test]
fn fast_forward_lands_where_steps_end() {
    log_init_test();
    let config = RunConfig::default().with_k(4).with_epsilon(8.);
    for algorithm in ALGORITHMS {
        let stepped = run_all_steps(algorithm, Shape::Gaussian, &config);
        let mut rng = RandomSource::new(DEFAULT_SEED);
        let points = generate(Shape::Gaussian, 60, &mut rng);
        let mut controller = StepController::new();
        controller.start(algorithm, points, &config).unwrap();
        let (outcome, frame) = controller.fast_forward().unwrap();
        assert_eq!(outcome, StepOutcome::Finished);
        let last = stepped.last().unwrap();
        assert_eq!(frame.get_points(), last.get_points());
        assert_eq!(frame.is_terminal(), last.is_terminal());
        assert_eq!(frame.counter(), last.counter(), "{:?}", algorithm);
        // one step back undoes the whole jump
        let (_, back) = controller.step_back().unwrap();
        assert_eq!(back, stepped[0]);
    }
}
