use anyhow::Result;

use crate::assets::AssetManager;
use crate::audio::{AudioSink, NullAudio};
use crate::camera::{Viewport, ViewportKind};
use crate::config::Config;
use crate::error::ConfigError;
use crate::event::EventBus;
use crate::i18n::{MapBundle, TextBundle};
use crate::input::InputState;
use crate::math::{Camera2D, Vec2};
use crate::physics::PhysicsWorld;
use crate::render::{DrawList, GlyphMetrics, MonospaceMetrics};
use crate::world::{EntityId, World};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// What the screen asks its owner to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Reload the same level.
    Retry,
    /// Move on to the following level.
    NextLevel,
}

#[derive(Clone, Copy, Debug)]
struct PendingOutcome {
    outcome: Outcome,
    at: f64,
}

/// Shared state handed to every system and event listener.
pub struct EngineContext {
    pub world: World,
    pub physics: PhysicsWorld,
    pub bus: EventBus,
    pub rng: fastrand::Rng,
    pub camera: Camera2D,
    pub viewport: Viewport,
    pub input: InputState,
    pub assets: AssetManager,
    pub audio: Box<dyn AudioSink>,
    pub texts: Box<dyn TextBundle>,
    pub glyphs: Box<dyn GlyphMetrics>,
    pub config: Config,
    /// Commands produced by the render systems this frame.
    pub draw: DrawList,
    screen_size: Vec2,
    outcome: Option<PendingOutcome>,
}

impl EngineContext {
    /// Build a context from a validated configuration.
    pub fn new(
        config: Config,
        assets: AssetManager,
        audio: Box<dyn AudioSink>,
        texts: Box<dyn TextBundle>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let viewport = config.viewport_kind()?;
        Ok(Self::build(config, viewport, assets, audio, texts, seed))
    }

    /// Context with default configuration, no assets and silent audio.
    pub fn headless(seed: u64) -> Self {
        Self::build(
            Config::default(),
            ViewportKind::Fit,
            AssetManager::default(),
            Box::new(NullAudio),
            Box::new(MapBundle::new()),
            seed,
        )
    }

    fn build(
        config: Config,
        viewport: ViewportKind,
        assets: AssetManager,
        audio: Box<dyn AudioSink>,
        texts: Box<dyn TextBundle>,
        seed: u64,
    ) -> Self {
        let world_size = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        Self {
            world: World::new(),
            physics: PhysicsWorld::new(),
            bus: EventBus::new(),
            rng: fastrand::Rng::with_seed(seed),
            camera: Camera2D::new(world_size * 0.5),
            viewport: Viewport::new(viewport, world_size.x, world_size.y),
            input: InputState::new(),
            assets,
            audio,
            texts,
            glyphs: Box::new(MonospaceMetrics::default()),
            config,
            draw: DrawList::new(),
            screen_size: world_size,
            outcome: None,
        }
    }

    /// Remove an entity together with its physics body.
    pub fn remove_entity(&mut self, entity: EntityId) {
        self.physics.detach_entity(entity);
        self.world.despawn(entity);
    }

    /// Play a sound effect by asset name, if sound effects are enabled.
    pub fn play_sound(&mut self, name: &str, volume: f32) -> Result<()> {
        if !self.config.sfx || !self.audio.is_available() {
            return Ok(());
        }
        let sound = self.assets.sound(name)?;
        self.audio.play_sound(sound, volume);
        Ok(())
    }

    /// The window was resized to `width` x `height` pixels.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.screen_size = Vec2::new(width, height);
        self.viewport
            .update(width, height, Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    }

    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    /// Pointer position in world coordinates.
    pub fn pointer_world(&self) -> Vec2 {
        self.viewport
            .unproject(&self.camera, self.screen_size.y, self.input.pointer())
    }

    /// Ask the owner to leave the screen `delay` seconds from now.
    pub fn request_outcome(&mut self, outcome: Outcome, delay: f32) {
        log::info!("screen outcome {outcome:?} in {delay}s");
        self.outcome = Some(PendingOutcome {
            outcome,
            at: self.bus.clock() + f64::from(delay.max(0.0)),
        });
    }

    /// The requested outcome, once its delay has elapsed.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
            .filter(|pending| self.bus.clock() >= pending.at)
            .map(|pending| pending.outcome)
    }
}

/// One step of the frame pipeline.
pub trait System {
    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> Result<()>;
}

/// Adapts a closure into a [`System`].
pub struct FnSystem<F>(F);

impl<F> FnSystem<F>
where
    F: FnMut(&mut EngineContext, f32) -> Result<()>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&mut EngineContext, f32) -> Result<()>,
{
    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> Result<()> {
        (self.0)(ctx, dt)
    }
}

/// Runs the systems in the order they were added, once per frame.
pub struct Engine {
    ctx: EngineContext,
    systems: Vec<Box<dyn System>>,
    frames: u64,
}

impl Engine {
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ctx,
            systems: Vec::new(),
            frames: 0,
        }
    }

    pub fn add_system(&mut self, system: impl System + 'static) -> &mut Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.ctx
    }

    /// Frames simulated so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance the simulation by one frame and return the delta actually used.
    ///
    /// The delta is capped at `config.max_delta` so a long stall never turns
    /// into one huge physics step. Delayed events come due before any system
    /// runs; the per-frame input flags are cleared once every system saw them.
    pub fn update(&mut self, raw_dt: f32) -> Result<f32> {
        let dt = if raw_dt.is_nan() {
            0.0
        } else {
            raw_dt.clamp(0.0, self.ctx.config.max_delta)
        };

        self.ctx.draw.clear();
        self.ctx.flush_events(dt)?;
        for system in &mut self.systems {
            system.update(&mut self.ctx, dt)?;
        }
        self.ctx.input.begin_frame();
        self.frames += 1;
        Ok(dt)
    }
}
