//! Gameplay and render systems of the game screen.
//!
//! State-machine driven entities (ball, bricks, gates, camera, player) expose
//! a [`Behavior`](crate::state::Behavior); everything else is a plain
//! [`System`](crate::engine::System) run once per frame.

pub mod ball;
pub mod brick;
pub mod camera;
pub mod decor;
pub mod gate;
pub mod movement;
pub mod physics;
pub mod player;
pub mod render;
pub mod transition;

pub use ball::{BallBehavior, BallState};
pub use brick::{BrickBehavior, BrickState};
pub use camera::{CameraBehavior, CameraState};
pub use decor::{
    BallEchoes, CloudDrift, DebugCollisionDecay, EchoFade, FreeChickenFlight, ImpactParticles,
};
pub use gate::{GateBehavior, GateState};
pub use movement::MoveSystem;
pub use physics::{PhysicsStep, TransformSync};
pub use player::{InputEvents, PlayerAnimation, PlayerControl, PlayerState};
pub use render::{
    AnimationFrames, DebugDirections, DebugPositions, DebugShapes, Feathers, HitboxSlices,
    ImpactDraw, MapBackground, MapForeground, SpriteRender, TextDraw, TransitionOverlay,
};
pub use transition::{drop_chickens, register_outcome_listeners, TransitionSystem};

/// Uniform sample in `[min, max)`.
pub(crate) fn random_range(rng: &mut fastrand::Rng, min: f32, max: f32) -> f32 {
    min + rng.f32() * (max - min)
}

/// Headless context whose asset manager serves the placeholder content.
#[cfg(test)]
pub(crate) fn test_context(seed: u64) -> crate::engine::EngineContext {
    use crate::assets::AssetManager;
    use crate::content::placeholder_assets;

    let mut ctx = crate::engine::EngineContext::headless(seed);
    ctx.assets = AssetManager::new(Box::new(placeholder_assets(&ctx.config)));
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_range_stays_in_bounds() {
        let mut rng = fastrand::Rng::with_seed(9);
        for _ in 0..1000 {
            let v = random_range(&mut rng, -20.0, 20.0);
            assert!((-20.0..20.0).contains(&v));
        }
    }
}
