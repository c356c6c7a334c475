//! Runs one algorithm step by step on a generated point set and prints the status of each step.
//!
//! For example :
//! ```text
//! cargo run --example walkthrough -- --algo dbscan --shape moons --eps 6 --minpts 3
//! cargo run --example walkthrough -- --algo kmeans --shape gaussian --k 4 --init kmeans++ --autoplay 200
//! ```
//! Without `--autoplay` the run goes step by step up to `--steps` steps, then steps back once
//! and fast forwards to the end.

use anyhow::anyhow;
use clap::{Arg, ArgAction, ArgMatches, Command};

use cpu_time::ProcessTime;
use std::time::{Duration, SystemTime};

use stepclust::controller::{Algorithm, Frame, StepController};
use stepclust::engine::{Component, DistanceMetric, InitMethod, Linkage, RunConfig};
use stepclust::random::{DEFAULT_SEED, RandomSource};
use stepclust::shapes::{Shape, generate};

fn parse_config(matches: &ArgMatches) -> anyhow::Result<RunConfig> {
    let mut config = RunConfig::default();
    if let Some(k) = matches.get_one::<usize>("k") {
        config = config.with_k(*k);
    }
    if let Some(eps) = matches.get_one::<f64>("eps") {
        config = config.with_epsilon(*eps);
    }
    if let Some(min_pts) = matches.get_one::<usize>("minpts") {
        config = config.with_min_pts(*min_pts);
    }
    if let Some(linkage) = matches.get_one::<String>("linkage") {
        config = config.with_linkage(linkage.parse::<Linkage>()?);
    }
    if let Some(init) = matches.get_one::<String>("init") {
        config = config.with_init(init.parse::<InitMethod>()?);
    }
    if let Some(metric) = matches.get_one::<String>("metric") {
        config = config.with_metric(metric.parse::<DistanceMetric>()?);
    }
    if let Some(component) = matches.get_one::<String>("component") {
        config = config.with_component(component.parse::<Component>()?);
    }
    Ok(config)
}

fn print_frame(frame: &Frame) {
    println!(
        "[{:?} {:>4}] {}",
        frame.get_algorithm(),
        frame.counter(),
        frame.status()
    );
}

pub fn main() -> anyhow::Result<()> {
    //
    let _ = env_logger::builder().is_test(true).try_init();
    //
    let matches = Command::new("walkthrough")
        .arg(
            Arg::new("algo")
                .long("algo")
                .action(ArgAction::Set)
                .default_value("kmeans")
                .help("kmeans, dbscan, hierarchical or pca"),
        )
        .arg(
            Arg::new("shape")
                .long("shape")
                .action(ArgAction::Set)
                .default_value("gaussian")
                .help("random, circle, moons, spiral, gaussian, elongated, diagonal, scurve"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(usize))
                .help("number of points, defaults to the shape default"),
        )
        .arg(
            Arg::new("k")
                .long("k")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("eps")
                .long("eps")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("minpts")
                .long("minpts")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(Arg::new("linkage").long("linkage").action(ArgAction::Set))
        .arg(Arg::new("init").long("init").action(ArgAction::Set))
        .arg(Arg::new("metric").long("metric").action(ArgAction::Set))
        .arg(Arg::new("component").long("component").action(ArgAction::Set))
        .arg(
            Arg::new("steps")
                .long("steps")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(usize))
                .default_value("10")
                .help("manual steps before fast forward"),
        )
        .arg(
            Arg::new("autoplay")
                .long("autoplay")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(u64))
                .help("autoplay with this interval in milliseconds"),
        )
        .get_matches();
    //
    let algorithm = matches
        .get_one::<String>("algo")
        .ok_or_else(|| anyhow!("no algorithm"))?
        .parse::<Algorithm>()?;
    let shape = Shape::from_name(
        matches
            .get_one::<String>("shape")
            .map(|s| s.as_str())
            .unwrap_or("random"),
    );
    let count = matches
        .get_one::<usize>("count")
        .copied()
        .unwrap_or(shape.default_count());
    let config = parse_config(&matches)?;
    log::info!("config : {:?}", config);
    //
    let mut rng = RandomSource::new(DEFAULT_SEED);
    let points = generate(shape, count, &mut rng);
    println!(
        "{:?} on {} points of shape {}",
        algorithm,
        points.len(),
        shape.name()
    );
    //
    let mut controller = StepController::new();
    let frame = controller.start(algorithm, points, &config)?;
    print_frame(&frame);
    //
    if let Some(ms) = matches.get_one::<u64>("autoplay") {
        let nb_ticks = controller.autoplay(Duration::from_millis(*ms), None, |frame| {
            print_frame(frame);
            true
        })?;
        println!("autoplay done, {} steps", nb_ticks);
        return Ok(());
    }
    //
    let nb_steps = *matches.get_one::<usize>("steps").unwrap_or(&10);
    for _ in 0..nb_steps {
        let (outcome, frame) = controller.step()?;
        print_frame(&frame);
        if !outcome.changed() {
            break;
        }
    }
    let (outcome, frame) = controller.step_back()?;
    println!("step back : {:?}", outcome);
    print_frame(&frame);
    //
    let cpu_start = ProcessTime::now();
    let sys_now = SystemTime::now();
    let (outcome, frame) = controller.fast_forward()?;
    let cpu_time: Duration = cpu_start.elapsed();
    println!(
        "fast forward : {:?}, sys time(ms) {:?} cpu time(ms) {:?}",
        outcome,
        sys_now.elapsed()?.as_millis(),
        cpu_time.as_millis()
    );
    print_frame(&frame);
    //
    Ok(())
}
