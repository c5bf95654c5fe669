use crate::math::{Rect, Vec2};

use super::sprite::{Color, TextureRegion};

/// Outline primitive used by the debug overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Circle,
}

/// Particle effect flavours the renderer knows how to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleEffect {
    /// Dust puff where the ball hit something.
    Impact,
    /// Feathers trailing an escaping chicken.
    Feathers,
}

/// One instruction for the renderer collaborator.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Textured quad. A negative `size.x` means the quad is mirrored horizontally
    /// around `position.x`; `rotation` is in degrees around `origin`.
    Sprite {
        region: TextureRegion,
        position: Vec2,
        size: Vec2,
        origin: Vec2,
        rotation: f32,
        alpha: f32,
        z: i32,
    },
    Text {
        text: String,
        position: Vec2,
        scale: f32,
        color: Color,
    },
    Shape {
        kind: ShapeKind,
        bounds: Rect,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
    },
    Particles {
        effect: ParticleEffect,
        position: Vec2,
        /// Progress of the effect in `[0, 1]`.
        progress: f32,
    },
    /// Tile map layers, by index in the map.
    TileLayers { layers: Vec<usize> },
    /// Full-screen fade, `alpha` 1 meaning fully covered.
    Overlay {
        region: Option<TextureRegion>,
        bounds: Rect,
        alpha: f32,
    },
}

/// Ordered draw commands produced during one frame.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Hand the frame's commands to the renderer, leaving the list empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}
