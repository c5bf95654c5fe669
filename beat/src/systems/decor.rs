//! Short-lived decorations: clouds, escaping chickens, ball echoes, dust.

use anyhow::Result;

use crate::components::{
    Ball, BallCopy, Cloud, DebugCollision, Debugable, Direction, EntityRender, FreeChicken,
    ImpactParticle, Position, Rotation, Size, StateComponent,
};
use crate::content::SHEET_EGG;
use crate::engine::{EngineContext, System};
use crate::math::Vec2;
use crate::world::{EntityId, Family};

/// Distance at which an escaping chicken is out of sight.
const FREE_CHICKEN_RANGE: f32 = 72.0;
const ECHO_INTERVAL: f32 = 0.1;
const ECHO_SHRINK: f32 = 0.95;
/// Lifetime of an impact puff, in seconds.
pub const IMPACT_DURATION: f32 = 0.3;

/// Fades the red collision outline.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugCollisionDecay;

impl System for DebugCollisionDecay {
    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> Result<()> {
        let family = Family::new().with::<DebugCollision>().with::<Debugable>();
        for entity in ctx.world.family(&family) {
            if let Some(flash) = ctx.world.get_mut::<DebugCollision>(entity) {
                flash.hit -= dt.max(0.0);
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CloudDrift;

impl System for CloudDrift {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        let family = Family::new()
            .with::<Cloud>()
            .with::<Position>()
            .with::<StateComponent>();
        for entity in ctx.world.family(&family) {
            let (Some(cloud), Some(clock)) = (
                ctx.world.get::<Cloud>(entity).copied(),
                ctx.world.get::<StateComponent>(entity).copied(),
            ) else {
                continue;
            };
            let sway = ((clock.time + cloud.offset) / 3.0).sin() * 8.0;
            if let Some(p) = ctx.world.get_mut::<Position>(entity) {
                p.0 = Vec2::new(cloud.origin.x + sway, cloud.origin.y);
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FreeChickenFlight;

impl System for FreeChickenFlight {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        let family = Family::new()
            .with::<FreeChicken>()
            .with::<Position>()
            .with::<Direction>();
        for entity in ctx.world.family(&family) {
            let step = ctx.world.get::<Direction>(entity).map(|d| d.0).unwrap_or_default();
            let origin = ctx
                .world
                .get::<FreeChicken>(entity)
                .map(|c| c.origin)
                .unwrap_or_default();
            let Some(p) = ctx.world.get_mut::<Position>(entity) else {
                continue;
            };
            p.0 += step;
            if p.0.distance(origin) >= FREE_CHICKEN_RANGE {
                ctx.remove_entity(entity);
            }
        }
        Ok(())
    }
}

/// Drops a fading copy of the ball every tenth of a second.
#[derive(Clone, Debug, Default)]
pub struct BallEchoes {
    accumulator: f32,
}

impl BallEchoes {
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn_echo(ctx: &mut EngineContext) -> Result<Option<EntityId>> {
        let ball = ctx
            .world
            .query::<Ball>()
            .first()
            .map(|(e, _)| *e);
        let Some(ball) = ball else {
            return Ok(None);
        };
        let position = ctx.world.get::<Position>(ball).map(|p| p.0).unwrap_or_default();
        let degree = ctx.world.get::<Rotation>(ball).map(|r| r.degree).unwrap_or(0.0);
        let frame = ctx.assets.sheet(SHEET_EGG)?.frame(0)?;

        let echo = ctx.world.spawn();
        ctx.world.insert(echo, BallCopy { alpha: 1.0 });
        ctx.world.insert(echo, Position(position));
        ctx.world.insert(echo, Size(Vec2::new(8.0, 9.0)));
        ctx.world.insert(echo, EntityRender::with_texture(frame, -1));
        ctx.world.insert(echo, StateComponent::default());
        ctx.world.insert(
            echo,
            Rotation {
                origin: Vec2::new(4.0, 4.0),
                degree,
            },
        );
        Ok(Some(echo))
    }
}

impl System for BallEchoes {
    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> Result<()> {
        self.accumulator += dt;
        while self.accumulator >= ECHO_INTERVAL {
            self.accumulator -= ECHO_INTERVAL;
            Self::spawn_echo(ctx)?;
        }
        Ok(())
    }
}

/// Fades and shrinks ball echoes, removing them once invisible.
#[derive(Clone, Copy, Debug, Default)]
pub struct EchoFade;

impl System for EchoFade {
    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> Result<()> {
        let family = Family::new().with::<BallCopy>();
        for entity in ctx.world.family(&family) {
            let Some(copy) = ctx.world.get_mut::<BallCopy>(entity) else {
                continue;
            };
            copy.alpha -= dt;
            let alpha = copy.alpha;
            if let Some(render) = ctx.world.get_mut::<EntityRender>(entity) {
                render.alpha = alpha;
            }
            if alpha < 0.0 {
                ctx.remove_entity(entity);
                continue;
            }
            if let Some(size) = ctx.world.get_mut::<Size>(entity) {
                size.0 *= ECHO_SHRINK;
            }
        }
        Ok(())
    }
}

/// Ages impact puffs and removes them when their effect is over.
///
/// Drawing happens in the render pass; this only owns their lifetime.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImpactParticles;

impl System for ImpactParticles {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        let family = Family::new()
            .with::<ImpactParticle>()
            .with::<StateComponent>();
        for entity in ctx.world.family(&family) {
            let time = ctx
                .world
                .get::<StateComponent>(entity)
                .map(|s| s.time)
                .unwrap_or(0.0);
            if time >= IMPACT_DURATION {
                ctx.remove_entity(entity);
            }
        }
        Ok(())
    }
}
