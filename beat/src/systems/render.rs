//! Render pass: turns the world into [`DrawCommand`]s for the renderer.
//!
//! Nothing here touches a GPU. Systems run in drawing order and append to
//! `EngineContext::draw`, which the owner hands over once the frame is done.

use anyhow::Result;

use crate::components::{
    Animated, AnimatedHitbox, Ball, DebugCollision, Debugable, Direction, EntityRender,
    FreeChicken, Hitbox, ImpactParticle, MapLayer, Player, Position, Rotation, ShapeToRender,
    Size, StateComponent, TextRender, Transition,
};
use crate::engine::{EngineContext, System};
use crate::math::{Rect, Vec2};
use crate::render::{layout, Color, DrawCommand, ParticleEffect};
use crate::world::{EntityId, Family};

use super::decor::IMPACT_DURATION;
use super::transition::overlay_alpha;

const ARROW_LENGTH: f32 = 10.0;
const ARROW_HEAD: f32 = 5.0;
const LABEL_SCALE: f32 = 0.35;
/// Distance over which an escaping chicken's feathers fade out.
const FEATHER_RANGE: f32 = 72.0;

fn time_of(ctx: &EngineContext, entity: EntityId) -> f32 {
    ctx.world
        .get::<StateComponent>(entity)
        .map(|s| s.time)
        .unwrap_or(0.0)
}

/// Samples each entity's clip into its render texture.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationFrames;

impl System for AnimationFrames {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        let family = Family::new()
            .with::<Animated>()
            .with::<StateComponent>()
            .with::<EntityRender>();
        for entity in ctx.world.family(&family) {
            let time = time_of(ctx, entity);
            let frame = ctx.world.get::<Animated>(entity).and_then(|a| {
                a.animation
                    .as_ref()
                    .and_then(|clip| clip.key_frame(time + a.offset).copied())
            });
            if let (Some(frame), Some(render)) = (frame, ctx.world.get_mut::<EntityRender>(entity)) {
                render.texture = Some(frame);
            }
        }
        Ok(())
    }
}

/// Moves animated hitboxes to the slice of the current frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct HitboxSlices;

impl System for HitboxSlices {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        let family = Family::new()
            .with::<AnimatedHitbox>()
            .with::<Hitbox>()
            .with::<StateComponent>();
        for entity in ctx.world.family(&family) {
            let time = time_of(ctx, entity);
            let slice = ctx
                .world
                .get::<AnimatedHitbox>(entity)
                .and_then(|h| h.slices.as_ref())
                .and_then(|slices| slices.key_frame(time).copied());
            if let (Some(slice), Some(hitbox)) = (slice, ctx.world.get_mut::<Hitbox>(entity)) {
                hitbox.size = slice.size();
                hitbox.offset = slice.position();
            }
        }
        Ok(())
    }
}

fn map_layers(ctx: &mut EngineContext, pick: fn(&MapLayer) -> &Vec<usize>) {
    let layers: Vec<Vec<usize>> = ctx
        .world
        .query::<MapLayer>()
        .into_iter()
        .map(|(_, map)| pick(map).clone())
        .filter(|layers| !layers.is_empty())
        .collect();
    for layers in layers {
        ctx.draw.push(DrawCommand::TileLayers { layers });
    }
}

/// Map layers drawn behind every entity.
#[derive(Clone, Copy, Debug, Default)]
pub struct MapBackground;

impl System for MapBackground {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        map_layers(ctx, |map| &map.background);
        Ok(())
    }
}

/// Map layers drawn in front of every entity.
#[derive(Clone, Copy, Debug, Default)]
pub struct MapForeground;

impl System for MapForeground {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        map_layers(ctx, |map| &map.foreground);
        Ok(())
    }
}

/// Feathers trailing escaping chickens.
#[derive(Clone, Copy, Debug, Default)]
pub struct Feathers;

impl System for Feathers {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        if !ctx.config.particles {
            return Ok(());
        }
        let trails: Vec<(Vec2, f32)> = ctx
            .world
            .query::<FreeChicken>()
            .into_iter()
            .filter_map(|(e, chicken)| {
                let position = ctx.world.get::<Position>(e)?.0;
                let progress = (position.distance(chicken.origin) / FEATHER_RANGE).min(1.0);
                Some((position, progress))
            })
            .collect();
        for (position, progress) in trails {
            ctx.draw.push(DrawCommand::Particles {
                effect: ParticleEffect::Feathers,
                position,
                progress,
            });
        }
        Ok(())
    }
}

/// Textured entities, back to front: lower z first, then from top to bottom.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpriteRender;

impl System for SpriteRender {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        if !ctx.config.sprites {
            return Ok(());
        }

        let mut sprites: Vec<(i32, DrawCommand, f32)> = Vec::new();
        for (entity, render) in ctx.world.query::<EntityRender>() {
            let Some(region) = render.texture.filter(|_| render.enabled) else {
                continue;
            };
            let Some(position) = ctx.world.get::<Position>(entity).map(|p| p.0) else {
                continue;
            };
            let size = ctx.world.get::<Size>(entity).map(|s| s.0).unwrap_or_default();
            let (origin, rotation) = ctx
                .world
                .get::<Rotation>(entity)
                .map(|r| (r.origin, r.degree))
                .unwrap_or((Vec2::ZERO, 0.0));

            let (x, width) = if render.h_flip {
                (position.x + render.offset.x + size.x, -size.x)
            } else {
                (position.x + render.offset.x, size.x)
            };
            let command = DrawCommand::Sprite {
                region,
                position: Vec2::new(x, position.y + render.offset.y),
                size: Vec2::new(width, size.y),
                origin,
                rotation,
                alpha: render.alpha,
                z: render.z_level,
            };
            sprites.push((render.z_level, command, position.y));
        }

        sprites.sort_by(|a, b| a.0.cmp(&b.0).then(b.2.total_cmp(&a.2)));
        for (_, command, _) in sprites {
            ctx.draw.push(command);
        }
        Ok(())
    }
}

/// Dust puffs where the ball hit something.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImpactDraw;

impl System for ImpactDraw {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        if !ctx.config.particles {
            return Ok(());
        }
        let puffs: Vec<(Vec2, f32)> = ctx
            .world
            .query::<ImpactParticle>()
            .into_iter()
            .filter_map(|(e, _)| {
                let position = ctx.world.get::<Position>(e)?.0;
                Some((position, (time_of(ctx, e) / IMPACT_DURATION).min(1.0)))
            })
            .collect();
        for (position, progress) in puffs {
            ctx.draw.push(DrawCommand::Particles {
                effect: ParticleEffect::Impact,
                position,
                progress,
            });
        }
        Ok(())
    }
}

/// Wrapped, aligned text inside each text entity's box.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextDraw;

impl System for TextDraw {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        let mut commands = Vec::new();
        for (entity, text) in ctx.world.query::<TextRender>() {
            let Some(position) = ctx.world.get::<Position>(entity).map(|p| p.0) else {
                continue;
            };
            let size = ctx.world.get::<Size>(entity).map(|s| s.0).unwrap_or_default();
            let top_left = Vec2::new(position.x, position.y + size.y);
            let lines = layout(
                &text.text,
                ctx.glyphs.as_ref(),
                text.scale,
                top_left,
                size.x,
                text.halign,
            );
            commands.extend(lines.into_iter().map(|line| DrawCommand::Text {
                text: line.text,
                position: line.position,
                scale: text.scale,
                color: text.color,
            }));
        }
        for command in commands {
            ctx.draw.push(command);
        }
        Ok(())
    }
}

/// Outlines of every debuggable shape, red while its hit flash lasts.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugShapes;

impl System for DebugShapes {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        if !ctx.config.hitbox {
            return Ok(());
        }
        let family = Family::new()
            .with::<Debugable>()
            .with::<Position>()
            .with::<ShapeToRender>()
            .with::<Size>();

        let mut commands = Vec::new();
        for entity in ctx.world.family(&family) {
            let (Some(position), Some(size), Some(shape)) = (
                ctx.world.get::<Position>(entity).map(|p| p.0),
                ctx.world.get::<Size>(entity).map(|s| s.0),
                ctx.world.get::<ShapeToRender>(entity).copied(),
            ) else {
                continue;
            };
            let flashing = ctx
                .world
                .get::<DebugCollision>(entity)
                .is_some_and(|c| c.hit > 0.0);
            let mut color = if flashing { Color::RED } else { shape.color };
            let mut outline = |at: Vec2, extent: Vec2, color: Color| {
                commands.push(DrawCommand::Shape {
                    kind: shape.kind,
                    bounds: Rect::from_corner(at, extent),
                    color,
                });
            };

            if let Some(player) = ctx.world.get::<Player>(entity) {
                outline(position + player.hitbox_offset, player.hitbox, color);
            }
            if let Some(hitbox) = ctx.world.get::<Hitbox>(entity) {
                if hitbox.size.x <= 0.1 {
                    color = Color::WHITE;
                }
                outline(position + hitbox.offset, hitbox.size, color);
            }
            outline(position, size, color);
        }
        for command in commands {
            ctx.draw.push(command);
        }
        Ok(())
    }
}

/// `x|y` labels at every debuggable position.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugPositions;

impl System for DebugPositions {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        if !ctx.config.position {
            return Ok(());
        }
        let family = Family::new().with::<Debugable>().with::<Position>();
        let labels: Vec<Vec2> = ctx
            .world
            .family(&family)
            .into_iter()
            .filter_map(|e| ctx.world.get::<Position>(e).map(|p| p.0))
            .collect();
        for position in labels {
            ctx.draw.push(DrawCommand::Text {
                text: format!("{:.0}|{:.0}", position.x, position.y),
                position,
                scale: LABEL_SCALE,
                color: Color::WHITE,
            });
        }
        Ok(())
    }
}

fn arrow(from: Vec2, direction: Vec2) -> [DrawCommand; 3] {
    let tip = from + direction.normalized() * ARROW_LENGTH;
    let left = (tip - from).normalized() * ARROW_HEAD;
    let left = left.rotated_deg(135.0);
    let right = left.rotated_deg(90.0);
    [
        DrawCommand::Line {
            from,
            to: tip,
            color: Color::RED,
        },
        DrawCommand::Line {
            from: tip,
            to: tip + left,
            color: Color::GREEN,
        },
        DrawCommand::Line {
            from: tip,
            to: tip + right,
            color: Color::BLUE,
        },
    ]
}

/// Heading arrows for the ball, the paddle and drifting decorations.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugDirections;

impl System for DebugDirections {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        if !ctx.config.direction {
            return Ok(());
        }
        let family = Family::new().with::<Debugable>().with::<Position>();
        let mut commands = Vec::new();
        for entity in ctx.world.family(&family) {
            let Some(position) = ctx.world.get::<Position>(entity).map(|p| p.0) else {
                continue;
            };
            let heading = if let Some(ball) = ctx.world.get::<Ball>(entity) {
                Some((position, ball.direction))
            } else if let Some(player) = ctx.world.get::<Player>(entity) {
                let size = ctx.world.get::<Size>(entity).map(|s| s.0).unwrap_or_default();
                Some((position + size * 0.5, player.direction))
            } else {
                ctx.world.get::<Direction>(entity).map(|d| (position, d.0))
            };
            if let Some((from, direction)) = heading {
                commands.extend(arrow(from, direction));
            }
        }
        for command in commands {
            ctx.draw.push(command);
        }
        Ok(())
    }
}

/// Full-screen fade of running transitions.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransitionOverlay;

impl System for TransitionOverlay {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        if !ctx.config.shader {
            return Ok(());
        }
        let family = Family::new()
            .with::<Transition>()
            .with::<StateComponent>();
        let fades: Vec<f32> = ctx
            .world
            .family(&family)
            .into_iter()
            .filter_map(|e| {
                let transition = ctx.world.get::<Transition>(e)?;
                Some(overlay_alpha(transition, time_of(ctx, e)))
            })
            .collect();
        if fades.is_empty() {
            return Ok(());
        }

        let sheet_name = ctx.config.transitions.clone();
        let region = Some(ctx.assets.sheet(&sheet_name)?.frame(0)?);
        let bounds = Rect::from_corner(Vec2::ZERO, ctx.screen_size());
        for alpha in fades {
            ctx.draw.push(DrawCommand::Overlay {
                region,
                bounds,
                alpha,
            });
        }
        Ok(())
    }
}
