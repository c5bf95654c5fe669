//! Beat - simulation core of a 2D breakout game.
//!
//! A [`GameScreen`] owns one round: entities in a [`World`], an event bus with
//! delayed delivery, per-entity state machines and the systems that move the
//! ball, break bricks and compose the frame into [`DrawCommand`]s. Rendering,
//! audio output and asset decoding stay with the caller.

pub mod assets;
pub mod audio;
pub mod camera;
pub mod components;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod event;
pub mod game;
pub mod i18n;
pub mod input;
pub mod interpolation;
pub mod level;
pub mod math;
pub mod physics;
pub mod render;
pub mod state;
pub mod systems;
pub mod world;

/// Width of the playing area, in world units.
pub const SCREEN_WIDTH: f32 = 128.0;
/// Height of the playing area, in world units.
pub const SCREEN_HEIGHT: f32 = 224.0;
/// Seconds a hit flash lasts.
pub const HIT_TIME: f32 = 0.2;
pub const PLAYER_WIDTH: f32 = 48.0;
pub const PLAYER_HEIGHT: f32 = 32.0;
pub const BALL_RADIUS: f32 = 4.0;

pub use crate::assets::{AssetKind, AssetLoader, AssetManager, MemoryAssets, SpriteSheet};
pub use crate::audio::{AudioLog, AudioSink, NullAudio};
pub use crate::config::Config;
pub use crate::engine::{Engine, EngineContext, Outcome, System};
pub use crate::error::{AssetError, ConfigError, LevelError};
pub use crate::event::{Event, EventBus, EventId, Payload};
pub use crate::game::GameScreen;
pub use crate::i18n::{MapBundle, TextBundle};
pub use crate::input::{InputState, Key};
pub use crate::level::{JsonTileMap, Level, TileMapSource};
pub use crate::math::{Camera2D, Rect, Vec2};
pub use crate::physics::PhysicsWorld;
pub use crate::render::{DrawCommand, DrawList, GlyphMetrics, TextureHandle, TextureRegion};
pub use crate::state::{Behavior, StateMachine};
pub use crate::world::{EntityId, Family, World};
