use anyhow::Result;

use crate::components::{Move, Position, StateComponent};
use crate::engine::{EngineContext, System};
use crate::interpolation::InterpolationOverride;
use crate::world::{EntityId, Family};

/// Plays scripted vertical slides, after their delay.
#[derive(Clone, Debug)]
pub struct MoveSystem {
    family: Family,
}

impl Default for MoveSystem {
    fn default() -> Self {
        Self {
            family: Family::new()
                .with::<Move>()
                .with::<Position>()
                .with::<StateComponent>(),
        }
    }
}

impl MoveSystem {
    fn slide(ctx: &mut EngineContext, entity: EntityId, curve: InterpolationOverride) {
        let Some(m) = ctx.world.get::<Move>(entity).copied() else {
            return;
        };
        let time = ctx
            .world
            .get::<StateComponent>(entity)
            .map(|s| s.time)
            .unwrap_or(0.0);

        let percent = if m.duration > 0.0 {
            (time / m.duration).min(1.0)
        } else {
            1.0
        };
        let y = curve.blend(m.interpolation, m.from.y, m.target.y, percent);
        if let Some(p) = ctx.world.get_mut::<Position>(entity) {
            p.0.y = y;
        }
        if percent >= 1.0 {
            ctx.world.remove::<Move>(entity);
        }
    }
}

impl System for MoveSystem {
    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> Result<()> {
        let curve = ctx.config.interpolation_override().unwrap_or_else(|err| {
            log::warn!("{err}, using each entity's own curve");
            InterpolationOverride::Current
        });

        for entity in ctx.world.family(&self.family) {
            let Some(m) = ctx.world.get_mut::<Move>(entity) else {
                continue;
            };
            if m.delay > 0.0 {
                m.delay -= dt;
                if m.delay < 0.0 {
                    if let Some(clock) = ctx.world.get_mut::<StateComponent>(entity) {
                        clock.time = 0.0;
                    }
                    Self::slide(ctx, entity, curve);
                }
            } else {
                Self::slide(ctx, entity, curve);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::Interpolation;
    use crate::math::Vec2;
    use crate::state::StateClock;

    fn spawn(ctx: &mut EngineContext, delay: f32) -> EntityId {
        let e = ctx.world.spawn();
        ctx.world.insert(e, Position(Vec2::new(0.0, 212.0)));
        ctx.world.insert(e, StateComponent::default());
        ctx.world.insert(
            e,
            Move {
                duration: 0.5,
                delay,
                from: Vec2::new(0.0, 212.0),
                target: Vec2::new(0.0, 100.0),
                interpolation: Interpolation::Linear,
            },
        );
        e
    }

    fn frame(ctx: &mut EngineContext, dt: f32) {
        StateClock.update(ctx, dt).unwrap();
        MoveSystem::default().update(ctx, dt).unwrap();
    }

    fn y_of(ctx: &EngineContext, e: EntityId) -> f32 {
        ctx.world.get::<Position>(e).unwrap().0.y
    }

    #[test]
    fn test_slide_reaches_target_and_drops_move() {
        let mut ctx = EngineContext::headless(1);
        let e = spawn(&mut ctx, 0.0);

        frame(&mut ctx, 0.25);
        assert!((y_of(&ctx, e) - 156.0).abs() < 1e-3);
        assert!(ctx.world.has::<Move>(e));

        frame(&mut ctx, 0.25);
        assert_eq!(y_of(&ctx, e), 100.0);
        assert!(!ctx.world.has::<Move>(e));
    }

    #[test]
    fn test_delay_holds_then_restarts_clock() {
        let mut ctx = EngineContext::headless(1);
        let e = spawn(&mut ctx, 0.3);

        frame(&mut ctx, 0.25);
        assert_eq!(y_of(&ctx, e), 212.0);

        // delay expires: clock restarts from zero
        frame(&mut ctx, 0.25);
        assert_eq!(y_of(&ctx, e), 212.0);
        assert_eq!(ctx.world.get::<StateComponent>(e).unwrap().time, 0.0);

        frame(&mut ctx, 0.25);
        assert!((y_of(&ctx, e) - 156.0).abs() < 1e-3);
    }

    #[test]
    fn test_disabled_override_jumps_to_target() {
        let mut ctx = EngineContext::headless(1);
        ctx.config.interpolation = "DISABLED".into();
        let e = spawn(&mut ctx, 0.0);

        frame(&mut ctx, 0.01);
        assert_eq!(y_of(&ctx, e), 100.0);
    }
}
