//! Headless Hopper2D demo.
//!
//! Runs two tiny levels with scripted input, no window or renderer: the
//! simulation is advanced with synthetic wall-clock time and every event
//! the core emits is logged as it is drained.

use anyhow::Result;
use hopper2d::{
    AnimationClip, BlockKind, EntityState, EntityTuning, GameEvent, GraphicsSet, InputIntent,
    LevelData, RibbonSpec, RunState, SimConfig, Simulation, SpriteCatalog, SpriteDef, TileDims,
};

const TICK_MS: u64 = 16;

fn catalog() -> SpriteCatalog {
    let walk = AnimationClip::new(2, 250, true);
    let clips = GraphicsSet::uniform(walk).with_dying(AnimationClip::new(4, 125, false));

    SpriteCatalog::new()
        .with(1, SpriteDef::player(20, 20, EntityTuning::new(5, 14), clips))
        .with(2, SpriteDef::terrain())
        .with(3, SpriteDef::terrain())
        .with(33, SpriteDef::trigger(BlockKind::LevelExit, 30, 30, AnimationClip::still()))
        .with(
            35,
            SpriteDef::trigger(BlockKind::Collectible, 30, 30, AnimationClip::new(4, 300, true)),
        )
        .with(37, SpriteDef::enemy(20, 20, 0, None, false, clips))
}

/// A drop chute onto a parked boar, then a ground corridor with a carrot
/// and the exit sign.
fn first_level() -> LevelData {
    let mut rows = vec![vec![0i32; 16]; 10];
    for code in rows[9].iter_mut() {
        *code = 102;
    }
    for row in 2..8 {
        rows[row][5] = 103;
    }
    rows[2][4] = 1;
    rows[8][4] = 37;
    rows[8][8] = 35;
    rows[8][14] = 33;
    LevelData::new(TileDims::square(30), rows)
}

/// A pit two tiles wide to hop over, then the exit.
fn second_level() -> LevelData {
    let mut rows = vec![vec![0i32; 16]; 10];
    for (col, code) in rows[9].iter_mut().enumerate() {
        if !(8..10).contains(&col) {
            *code = 102;
        }
    }
    rows[8][1] = 1;
    rows[8][14] = 33;
    LevelData::new(TileDims::square(30), rows)
}

/// Hold right the whole run. The first level is a ground corridor; the
/// second needs hops until the pit is behind.
fn scripted_input(sim: &Simulation) -> InputIntent {
    let player = sim.level().player();
    let grounded = player.state() == EntityState::Normal;
    let wants_jump = sim.current_level() == 1 && player.bounds().right() < 300;
    if grounded && wants_jump {
        InputIntent::right().with_jump()
    } else {
        InputIntent::right()
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = SimConfig::default()
        .with_tick_ms(TICK_MS)
        .with_ribbon(RibbonSpec { width: 480, step: 2 });
    let mut sim = Simulation::new(vec![first_level(), second_level()], catalog(), config)?;

    let mut carrots = 0;
    let mut defeated = 0;
    let mut deaths = 0;

    // Simulate ~30 seconds of wall-clock time in uneven slices, the way
    // a render loop with jitter would feed the accumulator.
    for frame in 0..900 {
        let elapsed = if frame % 3 == 0 { 21 } else { 33 };
        sim.advance(elapsed, scripted_input(&sim));

        for event in sim.drain_events() {
            log::info!("event: {event:?}");
            match event {
                GameEvent::ItemCollected { .. } => carrots += 1,
                GameEvent::EnemyDefeated => defeated += 1,
                GameEvent::PlayerDied => deaths += 1,
                GameEvent::LevelAdvance => {
                    log::info!("entering level {}", sim.current_level());
                }
                GameEvent::SpecialEnemyDefeated => {}
            }
        }

        if sim.run_state() == RunState::Finished {
            break;
        }
    }

    println!(
        "run over: state={:?} carrots={carrots} defeated={defeated} deaths={deaths}",
        sim.run_state()
    );
    Ok(())
}
