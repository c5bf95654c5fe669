use crate::math::Rect;

use super::sprite::TextureRegion;

/// A single keyframe of an animation.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationFrame<T> {
    pub key: T,
    /// How long this frame lasts in seconds.
    pub duration: f32,
}

impl<T> AnimationFrame<T> {
    pub fn new(key: T, duration: f32) -> Self {
        Self { key, duration }
    }
}

/// Keyframes sampled by elapsed time.
///
/// Sprite clips use `Animation<TextureRegion>`; animated hitboxes use
/// `Animation<Rect>` so a collision box can follow the drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation<T = TextureRegion> {
    pub frames: Vec<AnimationFrame<T>>,
    pub looping: bool,
    pub total_duration: f32,
}

/// Hitbox rectangles keyed by time.
pub type SliceAnimation = Animation<Rect>;

impl<T> Animation<T> {
    pub fn new(frames: Vec<AnimationFrame<T>>, looping: bool) -> Self {
        let total_duration = frames.iter().map(|f| f.duration).sum();
        Self {
            frames,
            looping,
            total_duration,
        }
    }

    /// Evenly timed frames.
    pub fn uniform(keys: impl IntoIterator<Item = T>, frame_duration: f32, looping: bool) -> Self {
        let frames = keys
            .into_iter()
            .map(|key| AnimationFrame::new(key, frame_duration))
            .collect();
        Self::new(frames, looping)
    }

    /// Frame shown `time` seconds after the clip started.
    ///
    /// Looping clips wrap; one-shot clips hold their last frame.
    pub fn key_frame(&self, time: f32) -> Option<&T> {
        let last = self.frames.last()?;
        if self.total_duration <= 0.0 {
            return self.frames.first().map(|f| &f.key);
        }

        let mut t = time.max(0.0);
        if self.looping {
            t %= self.total_duration;
        }

        let mut elapsed = 0.0;
        for frame in &self.frames {
            elapsed += frame.duration;
            if t < elapsed {
                return Some(&frame.key);
            }
        }
        Some(&last.key)
    }

    /// True once `time` has run past the last frame, whether or not the clip loops.
    pub fn is_finished(&self, time: f32) -> bool {
        time >= self.total_duration
    }
}
