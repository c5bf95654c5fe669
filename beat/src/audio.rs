//! Playback requests for sound effects and music.
//!
//! The simulation only decides *what* to play; an [`AudioSink`] implemented by
//! the platform layer does the mixing.

use std::cell::RefCell;
use std::rc::Rc;

/// Handle to a decoded sound effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub(crate) u32);

impl SoundHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Handle to a streamed music track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MusicHandle(pub(crate) u32);

impl MusicHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

pub trait AudioSink {
    /// Play a sound effect once; effects may overlap.
    fn play_sound(&mut self, sound: SoundHandle, volume: f32);

    /// Start a music track, replacing whatever is playing.
    fn play_music(&mut self, music: MusicHandle, looping: bool, volume: f32);

    fn stop_music(&mut self);

    /// Whether the device can play anything at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// Sink for headless runs: every request is dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sound(&mut self, _sound: SoundHandle, _volume: f32) {}

    fn play_music(&mut self, _music: MusicHandle, _looping: bool, _volume: f32) {}

    fn stop_music(&mut self) {}

    fn is_available(&self) -> bool {
        false
    }
}

/// A playback request captured by [`AudioLog`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Playback {
    Sound { sound: SoundHandle, volume: f32 },
    Music { music: MusicHandle, looping: bool, volume: f32 },
    StopMusic,
}

/// Sink that records requests instead of playing them, shareable with the caller.
#[derive(Clone, Debug, Default)]
pub struct AudioLog {
    entries: Rc<RefCell<Vec<Playback>>>,
}

impl AudioLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Playback> {
        self.entries.borrow().clone()
    }
}

impl AudioSink for AudioLog {
    fn play_sound(&mut self, sound: SoundHandle, volume: f32) {
        self.entries.borrow_mut().push(Playback::Sound { sound, volume });
    }

    fn play_music(&mut self, music: MusicHandle, looping: bool, volume: f32) {
        self.entries.borrow_mut().push(Playback::Music {
            music,
            looping,
            volume,
        });
    }

    fn stop_music(&mut self) {
        self.entries.borrow_mut().push(Playback::StopMusic);
    }
}
