//! Pairwise inverse-square attraction
//!
//! `F = G · mA · mB / (r² + softening)` along the line between centers, with
//! `m = size²`. Every receiver sums over a read-only snapshot in slot order,
//! so the result does not depend on how rayon splits the work.

use glam::Vec2;
use rayon::prelude::*;

use super::state::World;

/// Snapshot of one body as a gravity source
#[derive(Debug, Clone, Copy)]
struct Source {
    pos: Vec2,
    mass: f32,
    /// Valid bodies attract, attached ones included
    attracts: bool,
    /// Only free, unpinned bodies are moved
    moves: bool,
}

/// Accelerations for every slot given a gravitational constant
///
/// Every valid body pulls on the others. Attached satellites ride their host
/// and the pinned core stays put, so both get zero acceleration.
pub fn accelerations(world: &World, g: f32) -> Vec<Vec2> {
    let pinned = world.pinned();
    let softening = world.settings.gravity.softening;
    let sources: Vec<Source> = world
        .bodies
        .iter()
        .enumerate()
        .map(|(i, b)| Source {
            pos: b.pos,
            mass: b.mass(),
            attracts: b.valid,
            moves: b.is_free() && pinned != Some(i),
        })
        .collect();

    (0..sources.len())
        .into_par_iter()
        .map(|i| {
            let me = sources[i];
            if !me.moves {
                return Vec2::ZERO;
            }
            let mut force = Vec2::ZERO;
            for (j, other) in sources.iter().enumerate() {
                if i == j || !other.attracts {
                    continue;
                }
                let r = other.pos - me.pos;
                let r2 = r.length_squared();
                if r2 == 0.0 {
                    continue; // no direction to pull in
                }
                let magnitude = g * me.mass * other.mass / (r2 + softening);
                force += r / r2.sqrt() * magnitude;
            }
            force / me.mass
        })
        .collect()
}

/// Add one tick of gravitational acceleration to every free body's velocity
pub fn apply(world: &mut World) {
    let accel = accelerations(world, world.gravity);
    world
        .bodies
        .par_iter_mut()
        .zip(accel.par_iter())
        .for_each(|(body, a)| body.vel += *a);
}

/// Grow G unless the shell cycle has it frozen
pub fn evolve_constant(world: &mut World) {
    if world.lifecycle.collision_enabled() {
        return;
    }
    let settings = &world.settings.gravity;
    world.gravity = (world.gravity * settings.growth).min(settings.max_constant);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::body::Body;

    fn two_body_world(dist: f32, size_a: f32, size_b: f32) -> World {
        let settings = Settings {
            width: 1000,
            height: 1000,
            population: 2,
            ..Settings::default()
        };
        let a = Body::new(Vec2::new(500.0 - dist / 2.0, 500.0), Vec2::ZERO, size_a, 0xFF0000);
        let b = Body::new(Vec2::new(500.0 + dist / 2.0, 500.0), Vec2::ZERO, size_b, 0x00FF00);
        World::with_bodies(settings, 0, vec![a, b])
    }

    #[test]
    fn test_newton_third_law() {
        let world = two_body_world(200.0, 40.0, 20.0);
        let acc = accelerations(&world, 1.0);
        let fa = acc[0] * world.bodies[0].mass();
        let fb = acc[1] * world.bodies[1].mass();
        assert!((fa + fb).length() < 1e-3 * fa.length());
        // Attraction: a pulled toward +x, b toward -x
        assert!(acc[0].x > 0.0 && acc[1].x < 0.0);
        // Lighter body accelerates more
        assert!(acc[1].length() > acc[0].length());
    }

    #[test]
    fn test_inverse_square_magnitude() {
        let world = two_body_world(100.0, 10.0, 10.0);
        let acc = accelerations(&world, 2.0);
        let expected = 2.0 * 100.0 / (100.0 * 100.0 + world.settings.gravity.softening);
        assert!((acc[0].x - expected).abs() < 1e-6);
    }

    #[test]
    fn test_attached_body_attracts_but_does_not_move() {
        let mut world = two_body_world(100.0, 10.0, 10.0);
        let free = accelerations(&world, 1.0);
        world.bodies[1].attached_to = Some(0);
        let acc = accelerations(&world, 1.0);
        assert_eq!(acc[0], free[0]);
        assert!(acc[0].x > 0.0);
        assert_eq!(acc[1], Vec2::ZERO);
    }

    #[test]
    fn test_pinned_core_attracts_but_does_not_move() {
        let mut world = two_body_world(100.0, 40.0, 10.0);
        world.lifecycle = crate::sim::Lifecycle::ShellMode {
            core: 0,
            remaining: 1,
            bounce_ticks: 0,
        };
        let acc = accelerations(&world, 1.0);
        assert_eq!(acc[0], Vec2::ZERO);
        assert!(acc[1].x < 0.0);
    }

    #[test]
    fn test_invalid_is_inert() {
        let mut world = two_body_world(100.0, 10.0, 10.0);
        world.bodies[1].valid = false;
        assert_eq!(accelerations(&world, 1.0)[0], Vec2::ZERO);
    }

    #[test]
    fn test_apply_adds_to_velocity() {
        let mut world = two_body_world(100.0, 10.0, 10.0);
        world.gravity = 1.0;
        apply(&mut world);
        assert!(world.bodies[0].vel.x > 0.0);
        assert!(world.bodies[1].vel.x < 0.0);
        // Positions untouched until integration
        assert_eq!(world.bodies[0].pos, Vec2::new(450.0, 500.0));
    }

    #[test]
    fn test_constant_grows_then_caps() {
        let mut world = two_body_world(100.0, 10.0, 10.0);
        world.settings.gravity.growth = 2.0;
        world.settings.gravity.max_constant = 0.3;
        world.gravity = 0.1;
        evolve_constant(&mut world);
        assert!((world.gravity - 0.2).abs() < 1e-6);
        evolve_constant(&mut world);
        assert!((world.gravity - 0.3).abs() < 1e-6);
    }
}
