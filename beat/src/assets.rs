use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use anyhow::Result;

use crate::audio::{MusicHandle, SoundHandle};
use crate::error::AssetError;
use crate::math::Rect;
use crate::render::{Animation, SliceAnimation, TextureHandle, TextureRegion};

/// Frames, named clips and named hitbox slices exported from one sprite sheet.
#[derive(Clone, Debug, Default)]
pub struct SpriteSheet {
    name: String,
    frames: Vec<TextureRegion>,
    clips: HashMap<String, Rc<Animation>>,
    slices: HashMap<String, Rect>,
    slice_clips: HashMap<(String, String), Rc<SliceAnimation>>,
}

impl SpriteSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_frame(mut self, frame: TextureRegion) -> Self {
        self.frames.push(frame);
        self
    }

    #[must_use]
    pub fn with_clip(mut self, name: impl Into<String>, clip: Animation) -> Self {
        self.clips.insert(name.into(), Rc::new(clip));
        self
    }

    #[must_use]
    pub fn with_slice(mut self, name: impl Into<String>, bounds: Rect) -> Self {
        self.slices.insert(name.into(), bounds);
        self
    }

    /// Slice bounds that change over the course of clip `clip`.
    #[must_use]
    pub fn with_slice_clip(
        mut self,
        slice: impl Into<String>,
        clip: impl Into<String>,
        keys: SliceAnimation,
    ) -> Self {
        self.slice_clips
            .insert((slice.into(), clip.into()), Rc::new(keys));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frames(&self) -> &[TextureRegion] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Result<TextureRegion, AssetError> {
        self.frames
            .get(index)
            .copied()
            .ok_or_else(|| AssetError::EmptySheet(self.name.clone()))
    }

    pub fn clip(&self, name: &str) -> Result<Rc<Animation>, AssetError> {
        self.clips
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::MissingClip {
                sheet: self.name.clone(),
                clip: name.to_string(),
            })
    }

    pub fn slice(&self, name: &str) -> Result<Rect, AssetError> {
        self.slices
            .get(name)
            .copied()
            .ok_or_else(|| AssetError::MissingSlice {
                sheet: self.name.clone(),
                slice: name.to_string(),
            })
    }

    pub fn slice_clip(&self, slice: &str, clip: &str) -> Result<Rc<SliceAnimation>, AssetError> {
        self.slice_clips
            .get(&(slice.to_string(), clip.to_string()))
            .cloned()
            .ok_or_else(|| AssetError::MissingSlice {
                sheet: self.name.clone(),
                slice: format!("{slice}/{clip}"),
            })
    }
}

/// Decodes assets by name. Implemented by the platform layer.
pub trait AssetLoader {
    fn load_texture(&mut self, name: &str) -> Result<TextureHandle>;
    fn load_sheet(&mut self, name: &str) -> Result<SpriteSheet>;
    fn load_sound(&mut self, name: &str) -> Result<SoundHandle>;
    fn load_music(&mut self, name: &str) -> Result<MusicHandle>;
}

/// Loader over assets that already live in memory (generated or embedded).
#[derive(Default)]
pub struct MemoryAssets {
    textures: HashMap<String, TextureHandle>,
    sheets: HashMap<String, SpriteSheet>,
    sounds: HashMap<String, SoundHandle>,
    music: HashMap<String, MusicHandle>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_texture(&mut self, name: impl Into<String>, handle: TextureHandle) {
        self.textures.insert(name.into(), handle);
    }

    pub fn add_sheet(&mut self, sheet: SpriteSheet) {
        self.sheets.insert(sheet.name().to_string(), sheet);
    }

    pub fn add_sound(&mut self, name: impl Into<String>, handle: SoundHandle) {
        self.sounds.insert(name.into(), handle);
    }

    pub fn add_music(&mut self, name: impl Into<String>, handle: MusicHandle) {
        self.music.insert(name.into(), handle);
    }
}

impl AssetLoader for MemoryAssets {
    fn load_texture(&mut self, name: &str) -> Result<TextureHandle> {
        Ok(*self
            .textures
            .get(name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?)
    }

    fn load_sheet(&mut self, name: &str) -> Result<SpriteSheet> {
        Ok(self
            .sheets
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?)
    }

    fn load_sound(&mut self, name: &str) -> Result<SoundHandle> {
        Ok(*self
            .sounds
            .get(name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?)
    }

    fn load_music(&mut self, name: &str) -> Result<MusicHandle> {
        Ok(*self
            .music
            .get(name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Texture,
    Sheet,
    Sound,
    Music,
}

/// Caches loaded assets and streams queued loads, one per `update` call.
pub struct AssetManager {
    loader: Box<dyn AssetLoader>,
    queue: VecDeque<(AssetKind, String)>,
    textures: HashMap<String, TextureHandle>,
    sheets: HashMap<String, Rc<SpriteSheet>>,
    sounds: HashMap<String, SoundHandle>,
    music: HashMap<String, MusicHandle>,
}

impl AssetManager {
    pub fn new(loader: Box<dyn AssetLoader>) -> Self {
        Self {
            loader,
            queue: VecDeque::new(),
            textures: HashMap::new(),
            sheets: HashMap::new(),
            sounds: HashMap::new(),
            music: HashMap::new(),
        }
    }

    /// Queue an asset for background loading.
    pub fn queue(&mut self, kind: AssetKind, name: impl Into<String>) {
        let name = name.into();
        if !self.is_loaded(kind, &name) && !self.queue.iter().any(|(k, n)| *k == kind && *n == name) {
            self.queue.push_back((kind, name));
        }
    }

    /// Load the next queued asset. Returns true once the queue is empty.
    pub fn update(&mut self) -> Result<bool> {
        if let Some((kind, name)) = self.queue.pop_front() {
            self.load(kind, &name)?;
        }
        Ok(self.queue.is_empty())
    }

    /// Drain the whole queue.
    pub fn finish_loading(&mut self) -> Result<()> {
        while !self.update()? {}
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    /// Loaded fraction of everything requested so far, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        let loaded = self.textures.len() + self.sheets.len() + self.sounds.len() + self.music.len();
        let total = loaded + self.queue.len();
        if total == 0 {
            1.0
        } else {
            loaded as f32 / total as f32
        }
    }

    pub fn is_loaded(&self, kind: AssetKind, name: &str) -> bool {
        match kind {
            AssetKind::Texture => self.textures.contains_key(name),
            AssetKind::Sheet => self.sheets.contains_key(name),
            AssetKind::Sound => self.sounds.contains_key(name),
            AssetKind::Music => self.music.contains_key(name),
        }
    }

    pub fn texture(&mut self, name: &str) -> Result<TextureHandle> {
        if !self.textures.contains_key(name) {
            self.force_load(AssetKind::Texture, name)?;
        }
        Ok(*self.textures.get(name).ok_or_else(|| AssetError::NotFound(name.into()))?)
    }

    pub fn sheet(&mut self, name: &str) -> Result<Rc<SpriteSheet>> {
        if !self.sheets.contains_key(name) {
            self.force_load(AssetKind::Sheet, name)?;
        }
        Ok(Rc::clone(self.sheets.get(name).ok_or_else(|| AssetError::NotFound(name.into()))?))
    }

    pub fn sound(&mut self, name: &str) -> Result<SoundHandle> {
        if !self.sounds.contains_key(name) {
            self.force_load(AssetKind::Sound, name)?;
        }
        Ok(*self.sounds.get(name).ok_or_else(|| AssetError::NotFound(name.into()))?)
    }

    pub fn music(&mut self, name: &str) -> Result<MusicHandle> {
        if !self.music.contains_key(name) {
            self.force_load(AssetKind::Music, name)?;
        }
        Ok(*self.music.get(name).ok_or_else(|| AssetError::NotFound(name.into()))?)
    }

    /// Remove every cached asset; they will be reloaded on next access.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.sheets.clear();
        self.sounds.clear();
        self.music.clear();
    }

    fn force_load(&mut self, kind: AssetKind, name: &str) -> Result<()> {
        log::warn!("{kind:?} `{name}` requested before it finished loading; force loading it");
        self.queue.retain(|(k, n)| !(*k == kind && n == name));
        self.load(kind, name)
    }

    fn load(&mut self, kind: AssetKind, name: &str) -> Result<()> {
        log::debug!("Loading {kind:?} `{name}`");
        match kind {
            AssetKind::Texture => {
                let handle = self.loader.load_texture(name)?;
                self.textures.insert(name.to_string(), handle);
            }
            AssetKind::Sheet => {
                let sheet = self.loader.load_sheet(name)?;
                self.sheets.insert(name.to_string(), Rc::new(sheet));
            }
            AssetKind::Sound => {
                let handle = self.loader.load_sound(name)?;
                self.sounds.insert(name.to_string(), handle);
            }
            AssetKind::Music => {
                let handle = self.loader.load_music(name)?;
                self.music.insert(name.to_string(), handle);
            }
        }
        Ok(())
    }
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new(Box::new(MemoryAssets::new()))
    }
}
