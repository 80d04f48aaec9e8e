//! # Arena Demo
//!
//! A headless run of the arena loop against a recording sink:
//! two scripted players shove each other around a prop for a few hundred
//! frames, then the demo reports frame timings, bake counts and the
//! result of a full sync check.
//!
//! Pass a TOML config path as the first argument to override the default
//! arena tunables.

use std::path::Path;
use std::time::Instant;

use spritebox::{Arena, ArenaConfig, Button, FrameStats, ScriptedInput};
use spritebox_core::RecordingSink;

const FRAMES: u64 = 300;

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match ArenaConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("cannot load config {path}: {error}");
                std::process::exit(1);
            }
        },
        None => ArenaConfig::default(),
    };

    println!();
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                       SPRITEBOX ARENA DEMO                       ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let mut arena = Arena::new(config, RecordingSink::new());

    // Two players charging each other, one prop in the middle of the lane.
    arena.spawn_player(
        60.0,
        120.0,
        0,
        0,
        Box::new(ScriptedInput::holding(Button::Right)),
    );
    arena.spawn_player(
        260.0,
        120.0,
        1,
        0,
        Box::new(ScriptedInput::new(vec![
            Button::Left.bit(),
            Button::Left.bit() | Button::Up.bit(),
        ])),
    );
    arena.spawn_prop(160.0, 120.0, 2, 1, false);
    arena.spawn_prop(160.0, 60.0, 3, 1, true);

    let start = Instant::now();
    let mut total_writes = 0_usize;
    let mut max_writes = 0_usize;
    let mut total_collisions = 0_usize;
    let mut last = FrameStats::default();
    for _ in 0..FRAMES {
        last = arena.update();
        total_writes += last.writes;
        max_writes = max_writes.max(last.writes);
        total_collisions += last.collisions;
    }
    let elapsed = start.elapsed();

    let sync = arena.pool().verify_sync(true, true);
    let stats = *arena.pool().stats();

    println!("┌─ RUN ────────────────────────────────────────────────────────────┐");
    println!("│ Frames:             {FRAMES}");
    println!(
        "│ Wall time:          {:.3} ms ({:.1} us/frame)",
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_micros() as f64 / FRAMES as f64
    );
    println!("│ Live sprites:       {}", last.live_sprites);
    println!("│ Collisions:         {total_collisions}");
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
    println!("┌─ BAKES ──────────────────────────────────────────────────────────┐");
    println!("│ Total writes:       {total_writes}");
    println!("│ Max writes/frame:   {max_writes}");
    println!("│ Flushes:            {}", stats.flushes);
    println!("│ Writes (pool):      {}", stats.total_writes);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    match sync {
        Ok(()) => {
            println!("✅ SYNC CHECK PASSED");
        }
        Err(error) => {
            println!("❌ SYNC CHECK FAILED: {error}");
            std::process::exit(1);
        }
    }
}
