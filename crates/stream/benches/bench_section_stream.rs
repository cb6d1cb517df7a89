use std::hint::black_box;
use std::time::{Duration, Instant};

use cityscape_common::CityConfig;
use cityscape_procgen::{GeometryCatalog, PlacementPlanner, SectionBuilder};
use cityscape_render::RecordingScene;
use cityscape_stream::StreamController;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn config(grid_divisions: usize) -> CityConfig {
    CityConfig {
        grid_divisions,
        zoom_speed: 25.0,
        ..CityConfig::default()
    }
}

fn bench_plan(grid_divisions: usize, iterations: usize) {
    let config = config(grid_divisions);
    let mut rng = StdRng::seed_from_u64(1);
    let catalog = GeometryCatalog::build(&config, &mut rng);
    let planner = PlacementPlanner::new(&config, &catalog);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(planner.plan(&mut rng));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  plan ({grid_divisions}x{grid_divisions}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_assemble(grid_divisions: usize, iterations: usize) {
    let config = config(grid_divisions);
    let mut rng = StdRng::seed_from_u64(2);
    let mut builder = SectionBuilder::new(&config, &mut rng);

    let start = Instant::now();
    for i in 0..iterations {
        let section = builder.assemble(-(i as f64) * 500.0, &config, &mut rng);
        // Hand the lines back so later iterations hit the pool.
        builder.reclaim(black_box(section));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  assemble ({grid_divisions}x{grid_divisions}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}, pool {:?}",
        builder.pool_stats()
    );
}

fn bench_stream_step(grid_divisions: usize, frames: u32) {
    let mut controller = StreamController::new(config(grid_divisions));
    let mut scene = RecordingScene::new();
    let mut state = controller.start(&mut scene);

    let frame = Duration::from_millis(16);
    let start = Instant::now();
    for i in 1..=frames {
        let _ = black_box(controller.step(&mut state, frame * i, &mut scene));
    }
    let elapsed = start.elapsed();
    let timer = controller.timer();
    println!(
        "  stream step ({grid_divisions}x{grid_divisions}, {frames} frames): avg {:?}, max {:?}, total {elapsed:?}",
        timer.average(),
        timer.max()
    );
}

fn main() {
    println!("=== Section Stream Benchmarks ===\n");

    println!("Placement planning:");
    bench_plan(10, 10000);
    bench_plan(30, 2000);
    bench_plan(100, 200);

    println!("\nSection assembly (pooled roads):");
    bench_assemble(10, 5000);
    bench_assemble(30, 1000);
    bench_assemble(100, 100);

    println!("\nStream step (generation + eviction):");
    bench_stream_step(10, 20000);
    bench_stream_step(30, 5000);
    bench_stream_step(100, 1000);

    println!("\n=== Done ===");
}
