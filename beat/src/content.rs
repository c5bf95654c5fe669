//! Names of the assets the game screen uses, and stand-ins for them.
//!
//! [`placeholder_assets`] builds every sheet and sound with untextured frames
//! and plausible clip timings, so the whole screen can run without art
//! (servers, replays, tests).

use crate::assets::{AssetKind, MemoryAssets, SpriteSheet};
use crate::audio::{MusicHandle, SoundHandle};
use crate::config::Config;
use crate::math::Rect;
use crate::render::{Animation, SliceAnimation, TextureHandle, TextureRegion};

pub const SHEET_BRICK: &str = "sheets/brick";
pub const SHEET_GATE: &str = "sheets/gate";
pub const SHEET_CHICKEN: &str = "sheets/chicken";
pub const SHEET_FOX: &str = "sheets/renard";
pub const SHEET_EGG: &str = "sheets/egg";
pub const SHEET_CLOUDS: &str = "sheets/clouds";
pub const SHEET_WRECKAGE: &str = "sheets/wreckage";
pub const SHEET_FREE_CHICKEN: &str = "sheets/free_chicken";

pub const SFX_PADDLE: &str = "sfx/beat_sfx_0.ogg";
pub const SFX_BRICK: &str = "sfx/beat_sfx_1.ogg";
pub const SFX_WALL: &str = "sfx/beat_sfx_3.ogg";
pub const MUSIC: &str = "sfx/beat_music.ogg";

/// Slice of the player sheet giving the paddle hitbox.
pub const SLICE_HITBOX: &str = "hitbox";
/// Animated slice of the gate sheet.
pub const SLICE_GATE: &str = "gate";

/// Everything the game screen loads for `config`.
pub fn manifest(config: &Config) -> Vec<(AssetKind, String)> {
    let mut assets: Vec<(AssetKind, String)> = [
        SHEET_BRICK,
        SHEET_GATE,
        SHEET_CHICKEN,
        SHEET_FOX,
        SHEET_EGG,
        SHEET_CLOUDS,
        SHEET_WRECKAGE,
        SHEET_FREE_CHICKEN,
    ]
    .into_iter()
    .chain(std::iter::once(config.transitions.as_str()))
    .map(|name| (AssetKind::Sheet, name.to_string()))
    .collect();

    if config.sfx {
        for name in [SFX_PADDLE, SFX_BRICK, SFX_WALL] {
            assets.push((AssetKind::Sound, name.to_string()));
        }
    }
    if config.music {
        assets.push((AssetKind::Music, MUSIC.to_string()));
    }
    assets
}

fn frames(count: usize, width: f32, height: f32) -> Vec<TextureRegion> {
    (0..count)
        .map(|i| {
            TextureRegion::new(
                TextureHandle::new(0),
                Rect::new(i as f32 * width, 0.0, width, height),
            )
        })
        .collect()
}

fn clip(count: usize, width: f32, height: f32, frame: f32, looping: bool) -> Animation {
    Animation::uniform(frames(count, width, height), frame, looping)
}

fn sheet(name: &str, width: f32, height: f32, count: usize) -> SpriteSheet {
    frames(count, width, height)
        .into_iter()
        .fold(SpriteSheet::new(name), SpriteSheet::with_frame)
}

/// Stand-in assets with the clip names, slices and timings of the real art.
pub fn placeholder_assets(config: &Config) -> MemoryAssets {
    let mut assets = MemoryAssets::new();

    assets.add_sheet(
        sheet(SHEET_BRICK, 16.0, 8.0, 1)
            .with_clip("idle", clip(4, 16.0, 8.0, 0.125, true))
            .with_clip("idle2", clip(4, 16.0, 8.0, 0.15, true))
            .with_clip("explode_fill", clip(2, 16.0, 8.0, 0.1, false))
            .with_clip("explode_nr", clip(5, 16.0, 8.0, 0.1, false)),
    );

    let closed = Rect::new(0.0, 0.0, 16.0, 16.0);
    let half = Rect::new(0.0, 0.0, 16.0, 8.0);
    let open = Rect::new(0.0, 0.0, 0.0, 0.0);
    assets.add_sheet(
        sheet(SHEET_GATE, 16.0, 16.0, 1)
            .with_clip("open_nr", clip(3, 16.0, 16.0, 0.1, false))
            .with_clip("close_nr", clip(3, 16.0, 16.0, 0.1, false))
            .with_slice_clip(
                SLICE_GATE,
                "open_nr",
                SliceAnimation::uniform([closed, half, open], 0.1, false),
            )
            .with_slice_clip(
                SLICE_GATE,
                "close_nr",
                SliceAnimation::uniform([open, half, closed], 0.1, false),
            ),
    );

    assets.add_sheet(
        sheet(SHEET_CHICKEN, 48.0, 32.0, 1)
            .with_clip("bounce", clip(3, 48.0, 32.0, 0.1, false))
            .with_clip("idle", clip(4, 48.0, 32.0, 0.2, false))
            .with_clip("idle2", clip(2, 48.0, 32.0, 0.2, false))
            .with_clip("idle3", clip(6, 48.0, 32.0, 0.2, false))
            .with_slice(SLICE_HITBOX, Rect::new(4.0, 18.0, 40.0, 8.0)),
    );

    assets.add_sheet(
        sheet(SHEET_FOX, 64.0, 32.0, 1).with_clip("idle", clip(4, 64.0, 32.0, 0.25, true)),
    );
    assets.add_sheet(sheet(SHEET_EGG, 8.0, 9.0, 1));
    assets.add_sheet(
        sheet(SHEET_CLOUDS, 64.0, 64.0, 3)
            .with_clip("cloud1", clip(1, 64.0, 64.0, 1.0, true))
            .with_clip("cloud2", clip(1, 64.0, 64.0, 1.0, true))
            .with_clip("cloud3", clip(1, 64.0, 64.0, 1.0, true)),
    );
    assets.add_sheet(sheet(SHEET_WRECKAGE, 8.0, 8.0, 4));
    assets.add_sheet(
        sheet(SHEET_FREE_CHICKEN, 16.0, 16.0, 1).with_clip("fly", clip(4, 16.0, 16.0, 0.1, true)),
    );
    assets.add_sheet(sheet(&config.transitions, 128.0, 224.0, 1));

    for (id, name) in [SFX_PADDLE, SFX_BRICK, SFX_WALL].into_iter().enumerate() {
        assets.add_sound(name, SoundHandle::new(id as u32));
    }
    assets.add_music(MUSIC, MusicHandle::new(0));
    assets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetManager;

    #[test]
    fn test_placeholders_cover_manifest() {
        let config = Config::default();
        let mut manager = AssetManager::new(Box::new(placeholder_assets(&config)));
        for (kind, name) in manifest(&config) {
            manager.queue(kind, name);
        }
        manager.finish_loading().unwrap();
        assert_eq!(manager.progress(), 1.0);

        let chicken = manager.sheet(SHEET_CHICKEN).unwrap();
        assert!(chicken.clip("bounce").is_ok());
        assert!(chicken.slice(SLICE_HITBOX).is_ok());
        let gate = manager.sheet(SHEET_GATE).unwrap();
        assert!(gate.slice_clip(SLICE_GATE, "close_nr").is_ok());
    }

    #[test]
    fn test_manifest_skips_disabled_audio() {
        let config = Config {
            sfx: false,
            music: false,
            ..Config::default()
        };
        assert!(manifest(&config)
            .iter()
            .all(|(kind, _)| *kind == AssetKind::Sheet));
    }
}
