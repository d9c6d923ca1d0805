use rand::RngCore;
use rand::SeedableRng;
use std::time::Instant;

use chunk_life::ChunkLife;
use chunk_life::chunklife::CHUNK_SIZE;

fn bench_chunked(size: i64, density: f64, iterations: u64) -> chunk_life::Result<(f64, u64, usize)> {
    let mut engine = ChunkLife::new();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED_1234_ABCD_EF01);
    let threshold = (u64::MAX as f64 * density) as u64;

    for y in 0..size {
        for x in 0..size {
            if rng.next_u64() <= threshold {
                engine.set_cell_at(x, y, true)?;
            }
        }
    }

    let start = Instant::now();
    engine.step_n(iterations)?;
    let duration = start.elapsed();

    let total_ms = duration.as_secs_f64() * 1000.0;
    Ok((total_ms, engine.population(), engine.chunk_count()))
}

fn main() -> chunk_life::Result<()> {
    let scales: &[(i64, u64)] = &[
        (64, 200),  // 4 chunks
        (128, 100), // 16 chunks
        (256, 50),  // 64 chunks
        (512, 20),  // 256 chunks
    ];

    println!(
        "{:<10} {:>8} {:>8} {:>12} {:>10}",
        "Grid", "Chunks", "Iters", "Total(ms)", "Avg(ms)"
    );
    println!("{}", "-".repeat(52));

    for &(size, iters) in scales {
        let (total_ms, _pop, chunks) = bench_chunked(size, 0.42, iters)?;
        let avg_ms = total_ms / iters as f64;
        println!(
            "{:<10} {:>8} {:>8} {:>12.1} {:>10.4}",
            format!("{size}x{size}"),
            chunks,
            iters,
            total_ms,
            avg_ms
        );
    }
    println!("(chunk edge = {CHUNK_SIZE} cells)");
    Ok(())
}
