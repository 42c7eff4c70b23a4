//! Headless demo host.
//!
//! Simulates a gesture thread firing bursts into a pool while the main
//! thread runs a fixed-rate frame loop, then prints pool statistics.
//!
//! Run with: `RUST_LOG=debug cargo run --bin burstpool-demo -- [config.json]`

use burstpool::prelude::*;
use burstpool::{FrameClock, RetirementLog};
use std::error::Error;
use std::thread;
use std::time::Duration;

const FRAMES: u32 = 240;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading config from {}", path);
            PoolConfig::load(&path)?
        }
        None => PoolConfig::default(),
    };

    let mut pool = ParticlePool::with_config(config)?.with_observer(RetirementLog::new());
    let sender = pool.sender();

    // Stand-in for the hand tracker: a pinch every ~100ms along a small arc.
    let gestures = thread::spawn(move || -> Result<(), burstpool::QueueError> {
        let palette = [0xff8800, 0x00bfff, 0xff69b4, 0x7fff00];
        for i in 0..12u32 {
            let angle = i as f32 * 0.5;
            let origin = Vec3::new(angle.cos() * 0.5, 0.3 + angle.sin() * 0.2, 0.0);
            let color = Color::from_hex(palette[i as usize % palette.len()]);
            let request = if i % 3 == 0 {
                EmissionRequest::sparkle(origin, color)
            } else {
                EmissionRequest::pop(origin, color)
            };
            sender.send(request)?;
            thread::sleep(Duration::from_millis(100));
        }
        Ok(())
    });

    let mut clock = FrameClock::new().with_fixed_delta(1.0 / 60.0);
    let mut vertices: Vec<PointVertex> = Vec::new();
    let mut uploaded = 0usize;

    for frame in 0..FRAMES {
        let report = pool.tick(clock.update());
        for handle in &report.spawned {
            log::info!("frame {}: burst {} spawned", frame, handle);
        }

        for view in pool.views() {
            view.write_vertices(&mut vertices);
            uploaded += vertices.len();
        }

        thread::sleep(Duration::from_millis(5));
    }

    match gestures.join() {
        Ok(result) => result?,
        Err(_) => log::error!("gesture thread panicked"),
    }

    pool.clear();
    let stats = pool.stats();
    log::info!(
        "{} frames: {} groups emitted, {} retired, {} vertices uploaded",
        stats.ticks,
        stats.total_emitted_groups,
        stats.total_retired_groups,
        uploaded
    );
    log::info!(
        "observer saw {} spawns and {} retirements",
        pool.observer().spawned.len(),
        pool.observer().retired.len()
    );
    Ok(())
}
