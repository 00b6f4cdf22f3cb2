//! Hero: a tiny terminal platformer.
//!
//! Left/Right walk, Space jumps, `p` pauses, Esc quits.
//!
//! ```sh
//! cargo run --example hero [config.toml]
//! RUST_LOG=debug cargo run --example hero 2> hero.log
//! ```

use proscenium::{
    Actor, ActorHandle, ActorState, AnimationFrame, AnimationProcess, Body, DelayProcess, Engine,
    EngineConfig, Event, GameState, KeyCode, Rgb, Stage, Stateful, Surface, TerminalBackend, View,
};

const FLOOR: f32 = 16.0;
const GRAVITY: f32 = 0.08;
const JUMP_SPEED: f32 = -1.1;
const WALK_SPEED: f32 = 0.4;
/// Steps a single key press keeps the hero walking.
const WALK_STEPS: u32 = 12;

const HERO_COLOR: Rgb = Rgb::new(250, 200, 80);
const TEXT_COLOR: Rgb = Rgb::new(180, 180, 200);
const FLOOR_COLOR: Rgb = Rgb::new(90, 110, 90);

// --- Hero ---

struct Hero {
    body: Body,
    surface: Surface,
    stride: AnimationFrame<char>,
    walk: f32,
    walk_left: u32,
    wants_jump: bool,
}

impl Hero {
    fn draw(&self, glyph: char, delta: f32) {
        let (x, y) = self.body.render_pos(delta);
        #[allow(clippy::cast_possible_truncation)]
        self.surface.put(x.round() as i32, y.round() as i32, glyph, HERO_COLOR);
    }
}

impl Actor for Hero {
    fn init(&mut self) {
        log::info!("{} enters at ({}, {})", self.body.id(), self.body.x, self.body.y);
    }
}

struct Standing;

impl ActorState<Hero> for Standing {
    fn init(&mut self, hero: &mut Hero) {
        hero.body.vx = 0.0;
    }

    fn step(&mut self, hero: &mut Hero) -> Option<Box<dyn ActorState<Hero>>> {
        if hero.wants_jump {
            return Some(Box::new(Jumping));
        }
        (hero.walk_left > 0).then(|| Box::new(Walking) as Box<dyn ActorState<Hero>>)
    }

    fn render(&self, hero: &Hero, delta: f32) {
        hero.draw('@', delta);
    }
}

struct Walking;

impl ActorState<Hero> for Walking {
    fn step(&mut self, hero: &mut Hero) -> Option<Box<dyn ActorState<Hero>>> {
        if hero.wants_jump {
            return Some(Box::new(Jumping));
        }
        if hero.walk_left == 0 {
            return Some(Box::new(Standing));
        }
        hero.walk_left -= 1;
        hero.body.vx = hero.walk * WALK_SPEED;
        hero.body.advance();
        None
    }

    fn render(&self, hero: &Hero, delta: f32) {
        hero.draw(hero.stride.current().copied().unwrap_or('@'), delta);
    }
}

struct Jumping;

impl ActorState<Hero> for Jumping {
    fn init(&mut self, hero: &mut Hero) {
        hero.wants_jump = false;
        hero.body.vy = JUMP_SPEED;
    }

    fn step(&mut self, hero: &mut Hero) -> Option<Box<dyn ActorState<Hero>>> {
        hero.body.vx = if hero.walk_left > 0 {
            hero.walk_left -= 1;
            hero.walk * WALK_SPEED
        } else {
            0.0
        };
        hero.body.vy += GRAVITY;
        hero.body.advance();

        if hero.body.y < FLOOR {
            return None;
        }
        hero.body.y = FLOOR;
        hero.body.vy = 0.0;
        Some(Box::new(Standing))
    }

    fn render(&self, hero: &Hero, delta: f32) {
        hero.draw('^', delta);
    }

    fn cleanup(&mut self, hero: &mut Hero) {
        log::debug!("landed at x = {:.1}", hero.body.x);
    }
}

// --- Controls ---

struct Controls {
    hero: ActorHandle<Stateful<Hero>>,
    surface: Surface,
}

impl View for Controls {
    fn handle_event(&mut self, stage: &Stage, event: &Event) -> bool {
        let Event::KeyDown(key) = event else {
            return false;
        };
        match key.code {
            KeyCode::Left | KeyCode::Right => {
                let dir = if key.code == KeyCode::Left { -1.0 } else { 1.0 };
                self.hero.with(|hero| {
                    let hero = hero.actor_mut();
                    hero.walk = dir;
                    hero.walk_left = WALK_STEPS;
                });
            }
            KeyCode::Space | KeyCode::Up => {
                self.hero.with(|hero| hero.actor_mut().wants_jump = true);
            }
            KeyCode::Char('p') => stage.push_state(Paused {
                surface: self.surface.clone(),
            }),
            KeyCode::Esc => stage.request_exit(),
            _ => return false,
        }
        true
    }
}

// --- States ---

struct Loading {
    surface: Surface,
}

impl GameState for Loading {
    fn init(&mut self, stage: &Stage) {
        let next = stage.clone();
        let surface = self.surface.clone();
        let countdown = DelayProcess::new(45)
            .on_activate(move || next.new_state_now(Playing { surface }));
        if let Err(err) = stage.run_process(countdown) {
            log::error!("loading countdown failed to start: {err}");
            stage.request_exit();
        }
    }

    fn render(&mut self, _stage: &Stage, _delta: f32) {
        self.surface.text(2, 2, "Loading...", TEXT_COLOR);
    }
}

struct Playing {
    surface: Surface,
}

impl GameState for Playing {
    fn init(&mut self, stage: &Stage) {
        let stride = AnimationProcess::new(vec!['/', '|', '\\', '|'], 4).repeating();
        let frame = stride.frame();
        if let Err(err) = stage.run_process(stride) {
            log::warn!("stride animation unavailable: {err}");
        }

        let surface = self.surface.clone();
        let hero = stage.add_actor(1, move |id| {
            Stateful::with_state(
                Hero {
                    body: Body::new(id, 10.0, FLOOR),
                    surface,
                    stride: frame,
                    walk: 0.0,
                    walk_left: 0,
                    wants_jump: false,
                },
                Standing,
            )
        });

        stage.add_view(Controls {
            hero,
            surface: self.surface.clone(),
        });
    }

    fn render(&mut self, _stage: &Stage, _delta: f32) {
        let (width, _) = self.surface.size();
        #[allow(clippy::cast_possible_truncation)]
        let floor = FLOOR as i32 + 1;
        for x in 0..i32::from(width) {
            self.surface.put(x, floor, '=', FLOOR_COLOR);
        }
        self.surface
            .text(2, 1, "Left/Right walk  Space jump  p pause  Esc quit", TEXT_COLOR);
    }

    fn pause(&mut self, _stage: &Stage) {
        log::info!("paused");
    }

    fn resume(&mut self, _stage: &Stage) {
        log::info!("resumed");
    }
}

struct Paused {
    surface: Surface,
}

impl GameState for Paused {
    fn render(&mut self, _stage: &Stage, _delta: f32) {
        let (width, height) = self.surface.size();
        let x = i32::from(width / 2) - 3;
        self.surface.text(x, i32::from(height / 2), "PAUSED", TEXT_COLOR);
    }

    fn handle_event(&mut self, stage: &Stage, event: &Event) -> bool {
        if event.is_key_down(KeyCode::Char('p')) {
            stage.pop_state();
            return true;
        }
        if event.is_key_down(KeyCode::Esc) {
            stage.request_exit();
            return true;
        }
        false
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig {
            title: "Hero".to_string(),
            background: Rgb::new(16, 16, 24),
            ..EngineConfig::default()
        },
    };

    let backend = TerminalBackend::new(&config)?;
    let surface = backend.surface().clone();
    let mut engine: Engine<_> = Engine::new(backend, config);
    engine.run(Loading { surface })?;
    Ok(())
}
