//! Headless run: a scripted backend and a manual clock, no terminal.
//!
//! Replays two seconds of frames at a slightly uneven 50 Hz against a
//! 60 Hz simulation and prints what the loop did.

use proscenium::{
    Actor, Body, Clock, Engine, EngineConfig, Event, GameState, KeyCode, ManualClock, Process,
    ProcessError, ScriptedBackend, Stage,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Drifter {
    body: Body,
}

impl Actor for Drifter {
    fn step(&mut self) {
        self.body.advance();
    }

    fn cleanup(&mut self) {
        println!("{} stopped at x = {:.2}", self.body.id(), self.body.x);
    }
}

/// Counts ticks until told to stop.
struct Counter {
    ticks: Arc<AtomicU32>,
}

impl Process for Counter {
    fn tick(&mut self) -> Result<bool, ProcessError> {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        Ok(true)
    }
}

struct Field {
    ticks: Arc<AtomicU32>,
}

impl GameState for Field {
    fn init(&mut self, stage: &Stage) {
        stage.add_actor(0, |id| {
            let mut body = Body::new(id, 0.0, 0.0);
            body.vx = 0.25;
            Drifter { body }
        });
        if let Err(err) = stage.run_process(Counter {
            ticks: Arc::clone(&self.ticks),
        }) {
            log::error!("counter failed to start: {err}");
        }
    }

    fn handle_event(&mut self, stage: &Stage, event: &Event) -> bool {
        if event.is_key_down(KeyCode::Esc) {
            stage.request_exit();
            return true;
        }
        false
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EngineConfig::from_toml_str("tick_rate = 60\ntitle = \"headless\"")?;
    let clock = ManualClock::new();
    let mut backend = ScriptedBackend::new(clock.clone());
    for frame in 0..100u64 {
        backend = backend.frame(Duration::from_millis(19 + frame % 3));
    }
    let backend = backend.advance(Duration::from_millis(5)).key(KeyCode::Esc);

    let ticks = Arc::new(AtomicU32::new(0));
    let mut engine: Engine<_> = Engine::with_clock(backend, config, clock.clone());
    engine.run(Field {
        ticks: Arc::clone(&ticks),
    })?;

    let stats = engine.stats();
    println!(
        "{:?} simulated: {} steps, {} frames, {} events",
        clock.now(),
        stats.steps,
        stats.frames,
        stats.events
    );
    println!("counter saw {} ticks", ticks.load(Ordering::Relaxed));
    Ok(())
}
