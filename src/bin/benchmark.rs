//! Combined viewport cost with many secondary cameras

use std::time::Instant;

use multiview::{CellRect, ViewportRegistry, WorldBounds, expand_to_sections};
use multiview::application::ViewportId;
use rand::{Rng, SeedableRng, rngs::StdRng};

const MAP: WorldBounds = WorldBounds::new(1000, 1000);
const SECTION: i32 = 17;
/// Culling queries the renderer makes per frame
const QUERIES_PER_FRAME: u32 = 8;

fn random_view(rng: &mut StdRng) -> CellRect {
    let w = rng.random_range(10..120);
    let h = rng.random_range(10..90);
    let x = rng.random_range(-20..MAP.width);
    let z = rng.random_range(-20..MAP.height);
    expand_to_sections(CellRect::new(x, z, w, h), SECTION, MAP)
}

fn setup(cameras: usize, rng: &mut StdRng) -> (ViewportRegistry, Vec<ViewportId>) {
    let mut registry = ViewportRegistry::new(MAP);
    let ids = (0..cameras)
        .filter_map(|_| {
            let rect = random_view(rng);
            registry.register(rect)
        })
        .collect();
    (registry, ids)
}

/// Every camera moves every frame, then the renderer queries several times
fn benchmark_churn(cameras: usize, frames: u32) -> f64 {
    let mut rng = StdRng::seed_from_u64(7);
    let (mut registry, ids) = setup(cameras, &mut rng);
    let primary = CellRect::new(400, 400, 120, 80);

    let start = Instant::now();
    for _ in 0..frames {
        registry.advance_frame();
        for &id in &ids {
            let rect = random_view(&mut rng);
            registry.update(id, rect);
        }
        for _ in 0..QUERIES_PER_FRAME {
            std::hint::black_box(registry.combined_viewport(primary));
        }
    }
    start.elapsed().as_secs_f64() * 1_000_000.0 / frames as f64
}

/// Cameras hold still; only the frame stamp advances
fn benchmark_static(cameras: usize, frames: u32) -> f64 {
    let mut rng = StdRng::seed_from_u64(7);
    let (mut registry, _ids) = setup(cameras, &mut rng);
    let primary = CellRect::new(400, 400, 120, 80);

    let start = Instant::now();
    for _ in 0..frames {
        registry.advance_frame();
        for _ in 0..QUERIES_PER_FRAME {
            std::hint::black_box(registry.combined_viewport(primary));
        }
    }
    start.elapsed().as_secs_f64() * 1_000_000.0 / frames as f64
}

/// The naive alternative: fold every rect on every query
fn benchmark_uncached(cameras: usize, frames: u32) -> f64 {
    let mut rng = StdRng::seed_from_u64(7);
    let rects: Vec<CellRect> = (0..cameras).map(|_| random_view(&mut rng)).collect();
    let primary = CellRect::new(400, 400, 120, 80);

    let start = Instant::now();
    for _ in 0..frames {
        for _ in 0..QUERIES_PER_FRAME {
            let combined = rects.iter().fold(primary, |acc, r| acc.encapsulate(*r));
            std::hint::black_box(MAP.clip(combined));
        }
    }
    start.elapsed().as_secs_f64() * 1_000_000.0 / frames as f64
}

fn main() {
    env_logger::init();

    println!("=== Combined Viewport Benchmark ===\n");

    let camera_counts = [1, 4, 16, 64, 256, 1024];
    let frames = 2_000;

    println!("{:>10} {:>14} {:>14} {:>14}", "Cameras", "Churn us/f", "Static us/f", "Uncached us/f");
    println!("{:-<56}", "");

    for cameras in camera_counts {
        let churn = benchmark_churn(cameras, frames);
        let still = benchmark_static(cameras, frames);
        let uncached = benchmark_uncached(cameras, frames);
        println!("{:>10} {:>14.2} {:>14.2} {:>14.2}", cameras, churn, still, uncached);
    }

    let mut rng = StdRng::seed_from_u64(7);
    let (mut registry, _) = setup(64, &mut rng);
    for _ in 0..frames {
        registry.advance_frame();
        registry.combined_viewport(CellRect::new(0, 0, 10, 10));
    }
    let stats = registry.stats();
    println!("\n{registry}");
    println!(
        "{} frames, {} recomputations, {} sweeps",
        frames, stats.recomputations, stats.sweeps
    );
}
