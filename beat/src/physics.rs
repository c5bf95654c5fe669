// beat/src/physics.rs
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::math::Vec2;
use crate::world::EntityId;

// Rapier is private implementation detail: do NOT re-export it.
use rapier2d::prelude::*;

/// Engine-facing rigid body type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RigidBodyType {
    Dynamic,
    Kinematic,
    Fixed,
}

/// Engine-facing collider shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Box { hx: f32, hy: f32 },
    Circle { radius: f32 },
}

impl ColliderShape {
    fn area(self) -> f32 {
        match self {
            ColliderShape::Box { hx, hy } => 4.0 * hx * hy,
            ColliderShape::Circle { radius } => std::f32::consts::PI * radius * radius,
        }
    }

    /// Moment of inertia around the shape's center for the given mass.
    fn inertia(self, mass: f32) -> f32 {
        match self {
            ColliderShape::Box { hx, hy } => mass * (hx * hx + hy * hy) / 3.0,
            ColliderShape::Circle { radius } => 0.5 * mass * radius * radius,
        }
    }
}

/// Mass properties summed over the colliders attached to one body.
#[derive(Clone, Copy, Debug, Default)]
struct MassProps {
    mass: f32,
    inertia: f32,
}

/// Surface properties of a collider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.5,
            restitution: 0.3,
        }
    }
}

/// Opaque reference to a body in the physics world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// Transform snapshot of one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub handle: BodyHandle,
    pub position: Vec2,
    /// Radians.
    pub angle: f32,
    pub entity: Option<EntityId>,
}

pub struct PhysicsWorld {
    // --- rapier internals ---
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    rigid_bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    // --- mappings (engine <-> rapier) ---
    entity_to_body: HashMap<EntityId, RigidBodyHandle>,
    body_to_entity: HashMap<RigidBodyHandle, EntityId>,
    // Accumulated from attached colliders, used to turn impulses into velocity.
    masses: HashMap<RigidBodyHandle, MassProps>,
    // Creation order, so enumeration is deterministic.
    order: Vec<RigidBodyHandle>,

    gravity: Vec2,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// A world without gravity: the arena is seen from the front, nothing falls.
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),

            entity_to_body: HashMap::new(),
            body_to_entity: HashMap::new(),
            masses: HashMap::new(),
            order: Vec::new(),

            gravity: Vec2::ZERO,
        }
    }

    pub fn create_body(&mut self, kind: RigidBodyType, position: Vec2, angle: f32) -> BodyHandle {
        let rb_type = match kind {
            RigidBodyType::Dynamic => rapier2d::prelude::RigidBodyType::Dynamic,
            RigidBodyType::Kinematic => rapier2d::prelude::RigidBodyType::KinematicPositionBased,
            RigidBodyType::Fixed => rapier2d::prelude::RigidBodyType::Fixed,
        };

        let mut builder = RigidBodyBuilder::new(rb_type)
            .translation(vector![position.x, position.y])
            .rotation(angle);

        // Enable CCD for dynamic bodies to prevent tunneling through thin colliders
        if matches!(kind, RigidBodyType::Dynamic) {
            builder = builder.ccd_enabled(true);
        }

        let handle = self.rigid_bodies.insert(builder.build());
        self.order.push(handle);
        BodyHandle(handle)
    }

    /// Attach a solid collider to a body.
    pub fn add_collider(
        &mut self,
        body: BodyHandle,
        shape: ColliderShape,
        material: Material,
    ) -> Result<()> {
        if !self.rigid_bodies.contains(body.0) {
            return Err(anyhow!("Body {:?} does not exist", body));
        }

        let collider = ColliderBuilder::new(to_rapier_shape(shape))
            .density(material.density)
            .friction(material.friction)
            .restitution(material.restitution)
            .build();

        self.colliders
            .insert_with_parent(collider, body.0, &mut self.rigid_bodies);
        let mass = shape.area() * material.density;
        let props = self.masses.entry(body.0).or_default();
        props.mass += mass;
        props.inertia += shape.inertia(mass);

        Ok(())
    }

    /// Record `entity` as the owner of `body`. A previous owner link of either side is replaced.
    pub fn attach(&mut self, body: BodyHandle, entity: EntityId) {
        if let Some(old) = self.entity_to_body.insert(entity, body.0) {
            self.body_to_entity.remove(&old);
        }
        if let Some(old) = self.body_to_entity.insert(body.0, entity) {
            if old != entity {
                self.entity_to_body.remove(&old);
            }
        }
    }

    /// Destroy a body and its colliders. Returns whether it existed.
    pub fn destroy_body(&mut self, body: BodyHandle) -> bool {
        let removed = self
            .rigid_bodies
            .remove(
                body.0,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some();

        if let Some(entity) = self.body_to_entity.remove(&body.0) {
            self.entity_to_body.remove(&entity);
        }
        self.masses.remove(&body.0);
        self.order.retain(|h| *h != body.0);
        removed
    }

    /// Entity removal path: destroy whatever body the entity owned.
    pub fn detach_entity(&mut self, entity: EntityId) -> bool {
        match self.entity_to_body.get(&entity).copied() {
            Some(handle) => self.destroy_body(BodyHandle(handle)),
            None => false,
        }
    }

    pub fn destroy_all(&mut self) {
        for handle in self.order.clone() {
            self.destroy_body(BodyHandle(handle));
        }
    }

    pub fn body_of(&self, entity: EntityId) -> Option<BodyHandle> {
        self.entity_to_body.get(&entity).copied().map(BodyHandle)
    }

    pub fn entity_of(&self, body: BodyHandle) -> Option<EntityId> {
        self.body_to_entity.get(&body.0).copied()
    }

    pub fn contains(&self, body: BodyHandle) -> bool {
        self.rigid_bodies.contains(body.0)
    }

    pub fn len(&self) -> usize {
        self.rigid_bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rigid_bodies.is_empty()
    }

    /// Apply an impulse at a world `point`; off-center points also spin the body.
    ///
    /// The impulse is converted to a velocity change with the mass of the
    /// attached colliders, so it takes effect before the first step.
    pub fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2, point: Vec2) {
        let props = self.masses.get(&body.0).copied().unwrap_or_default();
        if let Some(b) = self.rigid_bodies.get_mut(body.0) {
            if !b.is_dynamic() {
                return;
            }
            let dv = if props.mass > 0.0 {
                impulse / props.mass
            } else {
                impulse
            };
            let v = b.linvel();
            b.set_linvel(vector![v.x + dv.x, v.y + dv.y], true);

            let t = b.translation();
            let arm = point - Vec2::new(t.x, t.y);
            let torque = arm.x * impulse.y - arm.y * impulse.x;
            if props.inertia > 0.0 && torque != 0.0 {
                let w = b.angvel();
                b.set_angvel(w + torque / props.inertia, true);
            }
        }
    }

    pub fn set_linear_damping(&mut self, body: BodyHandle, damping: f32) {
        if let Some(b) = self.rigid_bodies.get_mut(body.0) {
            b.set_linear_damping(damping);
        }
    }

    pub fn linear_velocity(&self, body: BodyHandle) -> Option<Vec2> {
        let v = self.rigid_bodies.get(body.0)?.linvel();
        Some(Vec2::new(v.x, v.y))
    }

    /// Radians per second.
    pub fn angular_velocity(&self, body: BodyHandle) -> Option<f32> {
        Some(self.rigid_bodies.get(body.0)?.angvel())
    }

    pub fn body_position(&self, body: BodyHandle) -> Option<Vec2> {
        let t = self.rigid_bodies.get(body.0)?.translation();
        Some(Vec2::new(t.x, t.y))
    }

    /// Step simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32, velocity_iterations: usize, position_iterations: usize) {
        self.integration_parameters.dt = dt;
        self.integration_parameters.max_velocity_iterations = velocity_iterations.max(1);
        self.integration_parameters.max_stabilization_iterations = position_iterations.max(1);

        let gravity = vector![self.gravity.x, self.gravity.y];

        self.pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );

        self.query_pipeline
            .update(&self.island_manager, &self.rigid_bodies, &self.colliders);
    }

    /// Every body with its transform and owning entity, in creation order.
    pub fn bodies(&self) -> Vec<BodyState> {
        self.order
            .iter()
            .filter_map(|handle| {
                let b = self.rigid_bodies.get(*handle)?;
                let t = b.translation();
                Some(BodyState {
                    handle: BodyHandle(*handle),
                    position: Vec2::new(t.x, t.y),
                    angle: b.rotation().angle(),
                    entity: self.body_to_entity.get(handle).copied(),
                })
            })
            .collect()
    }
}

fn to_rapier_shape(s: ColliderShape) -> SharedShape {
    match s {
        ColliderShape::Box { hx, hy } => SharedShape::cuboid(hx, hy),
        ColliderShape::Circle { radius } => SharedShape::ball(radius),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;

    #[test]
    fn test_body_entity_backreference_is_cleaned_on_destroy() {
        let mut world = World::new();
        let e = world.spawn();
        let mut physics = PhysicsWorld::new();
        let body = physics.create_body(RigidBodyType::Fixed, Vec2::new(10.0, 10.0), 0.0);
        physics
            .add_collider(body, ColliderShape::Box { hx: 5.0, hy: 5.0 }, Material::default())
            .unwrap();
        physics.attach(body, e);

        assert_eq!(physics.entity_of(body), Some(e));
        assert_eq!(physics.body_of(e), Some(body));

        assert!(physics.destroy_body(body));
        assert_eq!(physics.body_of(e), None);
        assert_eq!(physics.entity_of(body), None);
        assert!(!physics.destroy_body(body));
    }

    #[test]
    fn test_detach_entity_destroys_its_body() {
        let mut world = World::new();
        let e = world.spawn();
        let mut physics = PhysicsWorld::new();
        let body = physics.create_body(RigidBodyType::Dynamic, Vec2::ZERO, 0.0);
        physics.attach(body, e);

        assert!(physics.detach_entity(e));
        assert!(!physics.contains(body));
        assert!(physics.bodies().is_empty());
    }

    #[test]
    fn test_impulse_moves_dynamic_body_without_gravity() {
        let mut physics = PhysicsWorld::new();
        let body = physics.create_body(RigidBodyType::Dynamic, Vec2::new(0.0, 0.0), 0.0);
        physics
            .add_collider(body, ColliderShape::Circle { radius: 1.0 }, Material::default())
            .unwrap();
        physics.apply_impulse(body, Vec2::new(10.0, 0.0), Vec2::ZERO);

        let v = physics.linear_velocity(body).unwrap();
        assert!(v.x > 0.0 && v.y == 0.0);

        for _ in 0..10 {
            physics.step(1.0 / 60.0, 6, 2);
        }
        let p = physics.body_position(body).unwrap();
        assert!(p.x > 0.0);
        assert!(p.y.abs() < 1e-4);
    }

    #[test]
    fn test_off_center_impulse_spins_body() {
        let mut physics = PhysicsWorld::new();
        let body = physics.create_body(RigidBodyType::Dynamic, Vec2::new(5.0, 5.0), 0.0);
        physics
            .add_collider(body, ColliderShape::Circle { radius: 2.0 }, Material::default())
            .unwrap();

        physics.apply_impulse(body, Vec2::new(10.0, 0.0), Vec2::new(5.0, 5.0));
        assert_eq!(physics.angular_velocity(body), Some(0.0));

        // pushing right above the center turns clockwise
        physics.apply_impulse(body, Vec2::new(10.0, 0.0), Vec2::new(5.0, 7.0));
        assert!(physics.angular_velocity(body).unwrap() < 0.0);
    }

    #[test]
    fn test_fixed_bodies_ignore_impulses() {
        let mut physics = PhysicsWorld::new();
        let wall = physics.create_body(RigidBodyType::Fixed, Vec2::new(64.0, 0.0), 0.0);
        physics.apply_impulse(wall, Vec2::new(0.0, 100.0), Vec2::ZERO);
        assert_eq!(physics.linear_velocity(wall), Some(Vec2::ZERO));
    }

    #[test]
    fn test_bodies_enumerate_in_creation_order() {
        let mut physics = PhysicsWorld::new();
        let a = physics.create_body(RigidBodyType::Fixed, Vec2::new(1.0, 0.0), 0.0);
        let b = physics.create_body(RigidBodyType::Fixed, Vec2::new(2.0, 0.0), 0.5);
        let handles: Vec<_> = physics.bodies().iter().map(|s| s.handle).collect();
        assert_eq!(handles, vec![a, b]);
        physics.destroy_all();
        assert!(physics.is_empty());
    }
}
