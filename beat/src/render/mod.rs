mod animation;
mod draw;
mod sprite;
mod text;

pub use animation::{Animation, AnimationFrame, SliceAnimation};
pub use draw::{DrawCommand, DrawList, ParticleEffect, ShapeKind};
pub use sprite::{Color, TextureHandle, TextureRegion};
pub use text::{layout, GlyphMetrics, HAlign, MonospaceMetrics, TextLine};
