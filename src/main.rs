#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use rand::RngCore;
use rand::SeedableRng;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chunk_life::{ChunkLife, LifeConfig, Result};

const DEFAULT_SEED_SIDE: i64 = 96;
const DEFAULT_DENSITY: f64 = 0.35;
const DEFAULT_STEPS: u64 = 200;
const DEFAULT_REPORT_INTERVAL: u64 = 50;

struct MainArgs {
    config: LifeConfig,
    side: i64,
    density: f64,
    steps: u64,
    report_interval: u64,
    seed: u64,
}

fn parse_args() -> Result<MainArgs> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = None;
    let mut side = DEFAULT_SEED_SIDE;
    let mut density = DEFAULT_DENSITY;
    let mut steps = DEFAULT_STEPS;
    let mut report_interval = DEFAULT_REPORT_INTERVAL;
    let mut seed = 0x5EED_1234_ABCD_EF01u64;
    let next_arg = |i: usize, flag: &str| -> &str {
        args.get(i)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{flag} requires a value"))
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config = Some(LifeConfig::from_file(next_arg(i, "--config"))?);
            }
            "--side" => {
                i += 1;
                side = next_arg(i, "--side")
                    .parse()
                    .expect("--side requires a positive integer");
            }
            "--density" => {
                i += 1;
                density = next_arg(i, "--density")
                    .parse()
                    .expect("--density requires a number in [0, 1]");
            }
            "--steps" => {
                i += 1;
                steps = next_arg(i, "--steps")
                    .parse()
                    .expect("--steps requires a non-negative integer");
            }
            "--report" => {
                i += 1;
                let n: u64 = next_arg(i, "--report")
                    .parse()
                    .expect("--report requires a positive integer");
                report_interval = n.max(1);
            }
            "--seed" => {
                i += 1;
                seed = next_arg(i, "--seed")
                    .parse()
                    .expect("--seed requires an integer");
            }
            other => panic!(
                "unknown argument: {other}\nusage: chunk-life [--config FILE] [--side N] [--density D] [--steps N] [--report N] [--seed S]"
            ),
        }
        i += 1;
    }
    Ok(MainArgs {
        config: config.unwrap_or_default().with_env_overrides(),
        side: side.max(1),
        density: density.clamp(0.0, 1.0),
        steps,
        report_interval,
        seed,
    })
}

fn seed_random_world(engine: &mut ChunkLife, args: &MainArgs) -> Result<()> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(args.seed);
    let threshold = (u64::MAX as f64 * args.density) as u64;
    let half = args.side / 2;

    for y in -half..args.side - half {
        for x in -half..args.side - half {
            if rng.next_u64() <= threshold {
                engine.set_cell_at(x, y, true)?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
    let mut engine = ChunkLife::with_config(args.config.clone());
    seed_random_world(&mut engine, &args)?;
    info!(
        side = args.side,
        density = args.density,
        population = engine.population(),
        chunks = engine.chunk_count(),
        "seeded world"
    );

    let mut total = std::time::Duration::ZERO;
    let mut phase = std::time::Duration::ZERO;
    let mut births = 0u64;
    let mut deaths = 0u64;
    for step in 1..=args.steps {
        let start = Instant::now();
        let stats = engine.step()?;
        let elapsed = start.elapsed();
        total += elapsed;
        phase += elapsed;
        births += stats.births;
        deaths += stats.deaths;

        if step % args.report_interval == 0 || step == args.steps {
            let phase_ms = phase.as_secs_f64() * 1000.0;
            info!(
                generation = engine.generation(),
                population = engine.population(),
                chunks = engine.chunk_count(),
                births,
                deaths,
                "{phase_ms:.3} ms since last report"
            );
            phase = std::time::Duration::ZERO;
            births = 0;
            deaths = 0;
        }
    }

    let total_ms = total.as_secs_f64() * 1000.0;
    let avg_ms = if args.steps == 0 {
        0.0
    } else {
        total_ms / args.steps as f64
    };
    println!("\n--- Summary ({} generations) ---", args.steps);
    println!("population: {}", engine.population());
    println!("chunks:     {}", engine.chunk_count());
    match engine.bounds() {
        Some((min_x, min_y, max_x, max_y)) => {
            println!("bounds:     ({min_x}, {min_y}) .. ({max_x}, {max_y})")
        }
        None => println!("bounds:     empty"),
    }
    println!("time:       {total_ms:.3} ms total, {avg_ms:.4} ms/gen");
    Ok(())
}
