//! Component types attached to game entities.
//!
//! Components are plain data; every behaviour lives in `systems`.

use std::rc::Rc;

use crate::interpolation::Interpolation;
use crate::math::Vec2;
use crate::physics::BodyHandle;
use crate::render::{Animation, Color, HAlign, ShapeKind, SliceAnimation, TextureRegion};

/// Bottom-left corner of the entity, in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position(pub Vec2);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size(pub Vec2);

/// Visual rotation around `origin` (relative to the position), in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub origin: Vec2,
    pub degree: f32,
}

impl Rotation {
    pub fn around(origin: Vec2) -> Self {
        Self { origin, degree: 0.0 }
    }
}

/// Seconds spent in the current state. Reset to 0 on every transition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StateComponent {
    pub time: f32,
}

/// The ball. `direction` is a displacement per frame, not a velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ball {
    pub direction: Vec2,
}

/// Fading echo of the ball.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallCopy {
    pub alpha: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brick {
    /// Remaining hits. Positive for breakable bricks, 0 for walls, -2 for gates.
    pub hit: i32,
    pub body: Option<BodyHandle>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gate {
    pub open: bool,
    pub open_time: f32,
    pub close_time: f32,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            open: true,
            open_time: 3.0,
            close_time: 1.0,
        }
    }
}

/// The paddle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Player {
    pub hitbox: Vec2,
    pub hitbox_offset: Vec2,
    /// Horizontal displacement requested for this frame.
    pub direction: Vec2,
    pub win: bool,
}

/// Marker for the two debug dots showing where a drag started and where it is.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerTouch;

/// Collision box distinct from the drawn size, relative to the position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hitbox {
    pub size: Vec2,
    pub offset: Vec2,
}

/// Hitbox bounds that follow the current clip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimatedHitbox {
    pub slices: Option<Rc<SliceAnimation>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityRender {
    pub texture: Option<TextureRegion>,
    pub z_level: i32,
    pub enabled: bool,
    pub offset: Vec2,
    pub h_flip: bool,
    pub alpha: f32,
}

impl Default for EntityRender {
    fn default() -> Self {
        Self {
            texture: None,
            z_level: 0,
            enabled: true,
            offset: Vec2::ZERO,
            h_flip: false,
            alpha: 1.0,
        }
    }
}

impl EntityRender {
    pub fn at_z(z_level: i32) -> Self {
        Self {
            z_level,
            ..Self::default()
        }
    }

    pub fn with_texture(texture: TextureRegion, z_level: i32) -> Self {
        Self {
            texture: Some(texture),
            z_level,
            ..Self::default()
        }
    }
}

/// Current clip, sampled at `StateComponent::time + offset`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animated {
    pub animation: Option<Rc<Animation>>,
    pub offset: f32,
}

impl Animated {
    pub fn new(animation: Rc<Animation>) -> Self {
        Self {
            animation: Some(animation),
            offset: 0.0,
        }
    }
}

/// One-shot vertical slide, removed once it completes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Move {
    pub duration: f32,
    pub delay: f32,
    pub from: Vec2,
    pub target: Vec2,
    pub interpolation: Interpolation,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeadZone;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cloud {
    pub origin: Vec2,
    pub offset: f32,
}

/// Camera anchor; the camera itself lives in the engine context.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraHolder {
    pub amplitude: Vec2,
}

/// Eligible for debug overlays.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Debugable;

/// Seconds left on the red "just hit" flash of the debug outline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DebugCollision {
    pub hit: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeToRender {
    pub kind: ShapeKind,
    pub color: Color,
}

impl ShapeToRender {
    pub fn rect(color: Color) -> Self {
        Self {
            kind: ShapeKind::Rectangle,
            color,
        }
    }
}

/// Short-lived dust puff left where the ball hit something.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ImpactParticle;

/// A chicken escaping a broken brick; removed once far enough from `origin`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FreeChicken {
    pub origin: Vec2,
}

/// Per-frame displacement of free-flying decorations.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Direction(pub Vec2);

/// Screen fade. Way-in fades to black, way-out fades from black.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub duration: f32,
    pub way_in: bool,
    pub done: bool,
}

impl Transition {
    pub fn way_in() -> Self {
        Self {
            duration: 0.5,
            way_in: true,
            done: false,
        }
    }

    pub fn way_out() -> Self {
        Self {
            way_in: false,
            ..Self::way_in()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextRender {
    pub text: String,
    pub color: Color,
    pub scale: f32,
    pub halign: HAlign,
}

/// Tile map layers drawn behind and in front of the entities.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapLayer {
    pub background: Vec<usize>,
    pub foreground: Vec<usize>,
}
