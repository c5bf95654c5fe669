use anyhow::Result;

use crate::components::{Position, Rotation};
use crate::engine::{EngineContext, System};

/// Advances the physics world, split into `physics_substeps` equal steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhysicsStep;

impl System for PhysicsStep {
    fn update(&mut self, ctx: &mut EngineContext, dt: f32) -> Result<()> {
        if dt <= 0.0 || ctx.physics.is_empty() {
            return Ok(());
        }
        let substeps = ctx.config.physics_substeps.max(1);
        let step = dt / substeps as f32;
        for _ in 0..substeps {
            ctx.physics.step(
                step,
                ctx.config.velocity_iterations,
                ctx.config.position_iterations,
            );
        }
        Ok(())
    }
}

/// Copies body transforms back onto their entities.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransformSync;

impl System for TransformSync {
    fn update(&mut self, ctx: &mut EngineContext, _dt: f32) -> Result<()> {
        for body in ctx.physics.bodies() {
            let Some(entity) = body.entity else {
                continue;
            };
            if !ctx.world.is_alive(entity) {
                continue;
            }
            if let Some(p) = ctx.world.get_mut::<Position>(entity) {
                p.0 = body.position;
            }
            if let Some(r) = ctx.world.get_mut::<Rotation>(entity) {
                r.degree = body.angle.to_degrees();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::physics::{ColliderShape, Material, RigidBodyType};

    #[test]
    fn test_bodies_drive_their_entities() {
        let mut ctx = EngineContext::headless(1);
        let e = ctx.world.spawn();
        ctx.world.insert(e, Position::default());
        ctx.world.insert(e, Rotation::default());

        let body = ctx
            .physics
            .create_body(RigidBodyType::Dynamic, Vec2::new(10.0, 20.0), 0.5);
        ctx.physics
            .add_collider(body, ColliderShape::Circle { radius: 2.0 }, Material::default())
            .unwrap();
        ctx.physics.attach(body, e);
        ctx.physics.apply_impulse(body, Vec2::new(0.0, 50.0), Vec2::ZERO);

        ctx.config.physics_substeps = 4;
        PhysicsStep.update(&mut ctx, 1.0 / 60.0).unwrap();
        TransformSync.update(&mut ctx, 1.0 / 60.0).unwrap();

        let p = ctx.world.get::<Position>(e).unwrap().0;
        assert!(p.y > 20.0);
        assert!((p.x - 10.0).abs() < 1e-4);
        let degree = ctx.world.get::<Rotation>(e).unwrap().degree;
        assert!((degree - 0.5f32.to_degrees()).abs() < 1e-2);
    }

    #[test]
    fn test_unowned_bodies_are_ignored() {
        let mut ctx = EngineContext::headless(1);
        ctx.physics
            .create_body(RigidBodyType::Fixed, Vec2::new(64.0, 0.0), 0.0);
        TransformSync.update(&mut ctx, 0.016).unwrap();
        assert!(ctx.world.is_empty());
    }
}
