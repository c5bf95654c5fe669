//! Viewport strategies mapping the fixed world window onto a screen.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::math::{Camera2D, Vec2};

/// How the world window is fitted into the physical screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewportKind {
    /// Keep aspect ratio, letterbox the rest.
    #[default]
    Fit,
    /// Keep aspect ratio, crop whatever overflows.
    Fill,
    /// Keep aspect ratio, grow the world window to cover the screen.
    Extend,
    /// Ignore aspect ratio.
    Stretch,
    /// One world unit per pixel.
    Screen,
}

impl FromStr for ViewportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FitViewport" => Ok(Self::Fit),
            "FillViewport" => Ok(Self::Fill),
            "ExtendViewport" => Ok(Self::Extend),
            "StretchViewport" => Ok(Self::Stretch),
            "ScreenViewport" => Ok(Self::Screen),
            other => Err(ConfigError::UnknownViewport(other.to_string())),
        }
    }
}

/// World window plus the screen rectangle it is drawn into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub kind: ViewportKind,
    /// Size of the world window, in world units.
    pub world_size: Vec2,
    /// Bottom-left corner of the drawn area, in pixels.
    pub screen_origin: Vec2,
    /// Size of the drawn area, in pixels.
    pub screen_size: Vec2,
}

impl Viewport {
    pub fn new(kind: ViewportKind, world_width: f32, world_height: f32) -> Self {
        let world_size = Vec2::new(world_width, world_height);
        Self {
            kind,
            world_size,
            screen_origin: Vec2::ZERO,
            screen_size: world_size,
        }
    }

    /// Recompute the drawn area for a screen of `width` x `height` pixels.
    pub fn update(&mut self, width: f32, height: f32, base_world: Vec2) {
        let screen = Vec2::new(width, height);
        let fit = (width / base_world.x).min(height / base_world.y);
        let fill = (width / base_world.x).max(height / base_world.y);

        let (world, drawn) = match self.kind {
            ViewportKind::Fit => (base_world, base_world * fit),
            ViewportKind::Fill => (base_world, base_world * fill),
            ViewportKind::Extend => (screen / fit, screen),
            ViewportKind::Stretch => (base_world, screen),
            ViewportKind::Screen => (screen, screen),
        };

        self.world_size = world;
        self.screen_size = drawn;
        self.screen_origin = (screen - drawn) * 0.5;
    }

    /// Convert a pointer position (pixels, y pointing down) to world coordinates.
    pub fn unproject(&self, camera: &Camera2D, screen_height: f32, pointer: Vec2) -> Vec2 {
        let from_bottom = Vec2::new(pointer.x, screen_height - pointer.y);
        let local = from_bottom - self.screen_origin;
        let normalized = Vec2::new(local.x / self.screen_size.x, local.y / self.screen_size.y);
        let centered = normalized - Vec2::new(0.5, 0.5);
        camera.position + (self.world_size * centered) / camera.zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: Vec2 = Vec2::new(128.0, 224.0);

    #[test]
    fn test_parse_known_kinds() {
        assert_eq!("FitViewport".parse::<ViewportKind>().unwrap(), ViewportKind::Fit);
        assert_eq!(
            "ScreenViewport".parse::<ViewportKind>().unwrap(),
            ViewportKind::Screen
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = "WobblyViewport".parse::<ViewportKind>().unwrap_err();
        assert!(err.to_string().contains("WobblyViewport"));
    }

    #[test]
    fn test_fit_letterboxes_and_unprojects() {
        let mut viewport = Viewport::new(ViewportKind::Fit, WORLD.x, WORLD.y);
        viewport.update(256.0, 896.0, WORLD);
        assert_eq!(viewport.screen_size, Vec2::new(256.0, 448.0));
        assert_eq!(viewport.screen_origin, Vec2::new(0.0, 224.0));

        let camera = Camera2D::new(WORLD * 0.5);
        // top-left pixel of the drawn area maps to the world's top-left corner
        let p = viewport.unproject(&camera, 896.0, Vec2::new(0.0, 224.0));
        assert!((p.x - 0.0).abs() < 1e-4 && (p.y - 224.0).abs() < 1e-4);
    }

    #[test]
    fn test_stretch_fills_screen() {
        let mut viewport = Viewport::new(ViewportKind::Stretch, WORLD.x, WORLD.y);
        viewport.update(100.0, 100.0, WORLD);
        let camera = Camera2D::new(WORLD * 0.5);
        let p = viewport.unproject(&camera, 100.0, Vec2::new(50.0, 50.0));
        assert!((p.x - 64.0).abs() < 1e-4 && (p.y - 112.0).abs() < 1e-4);
    }
}
