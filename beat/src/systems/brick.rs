//! Breakable bricks: flash when hit, explode on their last hit.
//!
//! An exploding brick leaves debris in the physics world and releases a
//! chicken that flies off toward the nearer side of the screen. The last
//! brick to explode wins the level.

use anyhow::Result;

use crate::components::{
    Animated, Brick, DebugCollision, Debugable, Direction, EntityRender, FreeChicken, Gate,
    Position, Rotation, Size, StateComponent,
};
use crate::content::{SHEET_BRICK, SHEET_FREE_CHICKEN, SHEET_WRECKAGE};
use crate::engine::EngineContext;
use crate::event::{Event, EventId};
use crate::math::Vec2;
use crate::physics::{ColliderShape, Material, RigidBodyType};
use crate::state::{Behavior, Transitions};
use crate::world::{EntityId, Family};
use crate::{HIT_TIME, SCREEN_WIDTH};

use super::random_range;

const WRECKAGE_SIZE: Vec2 = Vec2::new(8.0, 8.0);
const CHICKEN_SIZE: Vec2 = Vec2::new(16.0, 16.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BrickState {
    Idle,
    /// Flashing after a hit; further hits are ignored until back to idle.
    Touched,
    Exploded,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrickBehavior;

impl BrickBehavior {
    fn set_clip(ctx: &mut EngineContext, brick: EntityId, clip: &str, offset: f32) -> Result<()> {
        let animation = ctx.assets.sheet(SHEET_BRICK)?.clip(clip)?;
        if let Some(animated) = ctx.world.get_mut::<Animated>(brick) {
            animated.animation = Some(animation);
            animated.offset = offset;
        }
        Ok(())
    }

    fn explode(ctx: &mut EngineContext, brick: EntityId, event: Option<&Event>) -> Result<()> {
        let impact = event.and_then(Event::vector).unwrap_or_default();
        let position = ctx
            .world
            .get::<Position>(brick)
            .map(|p| p.0)
            .unwrap_or_default();

        if let Some(body) = ctx.world.get::<Brick>(brick).and_then(|b| b.body) {
            ctx.physics.destroy_body(body);
        }
        if ctx.config.box2d {
            spawn_wreckage(ctx, position, impact)?;
        }
        spawn_free_chicken(ctx, position)?;

        ctx.world.remove::<Brick>(brick);
        Self::set_clip(ctx, brick, "explode_nr", 0.0)?;

        if ctx.world.count(&Self.family()) == 0 {
            log::info!("last brick exploded");
            ctx.emit(Event::new(EventId::Win))?;
        }
        Ok(())
    }
}

impl Behavior for BrickBehavior {
    type State = BrickState;

    fn family(&self) -> Family {
        Family::new()
            .with::<Brick>()
            .with::<Animated>()
            .without::<Gate>()
    }

    fn start(&self, _ctx: &EngineContext, _entity: EntityId) -> BrickState {
        BrickState::Idle
    }

    fn transitions(&self) -> Transitions<BrickState> {
        Transitions::new()
            .on(BrickState::Idle, &[EventId::BrickTouched], BrickState::Touched)
            .on(BrickState::Touched, &[EventId::BrickIdle], BrickState::Idle)
            .on(BrickState::Touched, &[EventId::BrickExploded], BrickState::Exploded)
    }

    fn enter(
        &self,
        ctx: &mut EngineContext,
        entity: EntityId,
        state: BrickState,
        event: Option<&Event>,
    ) -> Result<()> {
        match state {
            BrickState::Idle => {
                let hit = ctx.world.get::<Brick>(entity).map(|b| b.hit).unwrap_or(0);
                let clip = if hit == 1 { "idle2" } else { "idle" };
                // bricks would blink in sync without a per-brick offset
                let offset = random_range(&mut ctx.rng, 0.0, 0.5);
                Self::set_clip(ctx, entity, clip, offset)
            }
            BrickState::Touched => {
                if let Some(flash) = ctx.world.get_mut::<DebugCollision>(entity) {
                    flash.hit = HIT_TIME;
                }
                let remaining = match ctx.world.get_mut::<Brick>(entity) {
                    Some(brick) => {
                        brick.hit = (brick.hit - 1).max(0);
                        brick.hit
                    }
                    None => return Ok(()),
                };
                Self::set_clip(ctx, entity, "explode_fill", 0.0)?;

                if remaining == 0 {
                    let mut exploded = Event::to(EventId::BrickExploded, entity);
                    if let Some(event) = event {
                        exploded = exploded.with_payload(event.payload);
                    }
                    ctx.emit(exploded)
                } else {
                    ctx.emit_later(HIT_TIME, Event::to(EventId::BrickIdle, entity));
                    Ok(())
                }
            }
            BrickState::Exploded => Self::explode(ctx, entity, event),
        }
    }
}

/// Debris thrown away from the impact, only when physics effects are enabled.
fn spawn_wreckage(ctx: &mut EngineContext, position: Vec2, impact: Vec2) -> Result<()> {
    let radius = random_range(&mut ctx.rng, 1.5, 4.0);
    let spread = random_range(&mut ctx.rng, -20.0, 20.0);
    let impulse = impact.rotated_deg(spread).normalized() * 40.0;

    let sheet = ctx.assets.sheet(SHEET_WRECKAGE)?;
    let frame = match sheet.frames().len() {
        0 => sheet.frame(0)?,
        n => sheet.frame(ctx.rng.usize(..n))?,
    };

    let body = ctx
        .physics
        .create_body(RigidBodyType::Dynamic, position, impulse.angle());
    ctx.physics.add_collider(
        body,
        ColliderShape::Circle { radius },
        Material {
            density: 1.0,
            friction: 2.0,
            restitution: 0.0,
        },
    )?;
    ctx.physics.set_linear_damping(body, 0.5);
    ctx.physics.apply_impulse(body, impulse, position);

    let wreckage = ctx.world.spawn();
    ctx.world.insert(wreckage, Position(position));
    ctx.world.insert(wreckage, Size(WRECKAGE_SIZE));
    ctx.world.insert(wreckage, StateComponent::default());
    ctx.world.insert(wreckage, EntityRender::with_texture(frame, 0));
    ctx.world
        .insert(wreckage, Rotation::around(WRECKAGE_SIZE * 0.5));
    ctx.physics.attach(body, wreckage);
    Ok(())
}

/// A chicken escaping toward the nearer side of the screen.
fn spawn_free_chicken(ctx: &mut EngineContext, position: Vec2) -> Result<()> {
    let (heading, h_flip) = if position.x < SCREEN_WIDTH * 0.5 {
        (Vec2::new(-SCREEN_WIDTH * 0.5, 0.0), false)
    } else {
        (Vec2::new(SCREEN_WIDTH * 0.5, 0.0), true)
    };
    let angle = random_range(&mut ctx.rng, -1.0, 1.0);
    let direction = (heading.normalized() * 0.5).rotated(angle);
    let fly = ctx.assets.sheet(SHEET_FREE_CHICKEN)?.clip("fly")?;

    let chicken = ctx.world.spawn();
    ctx.world.insert(chicken, FreeChicken { origin: position });
    ctx.world.insert(chicken, Position(position));
    ctx.world.insert(chicken, Size(CHICKEN_SIZE));
    ctx.world.insert(chicken, StateComponent::default());
    ctx.world.insert(
        chicken,
        EntityRender {
            h_flip,
            ..EntityRender::default()
        },
    );
    ctx.world.insert(chicken, Debugable);
    ctx.world.insert(chicken, Direction(direction));
    ctx.world.insert(chicken, Animated::new(fly));
    Ok(())
}
