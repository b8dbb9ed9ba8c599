//! Fixed timestep simulation tick
//!
//! One call advances the world by exactly one frame. Velocities are in pixels
//! per tick, so there is no dt.

use glam::Vec2;
use rayon::prelude::*;

use super::collision::{self, reflect_velocity};
use super::state::World;
use super::{gravity, lifecycle};

/// Advance the world by one tick
pub fn tick(world: &mut World) {
    world.events.clear();
    let cycles = world.settings.policy.has_lifecycle();

    if cycles {
        lifecycle::pre_step(world);
    }

    if world.settings.gravity.enabled {
        gravity::apply(world);
        gravity::evolve_constant(world);
    }

    integrate(world);
    collision::resolve(world);
    confine(world);

    if cycles {
        lifecycle::post_step(world);
    }

    for event in &world.events {
        log::debug!("tick {}: {:?}", world.time_ticks, event);
    }
    world.time_ticks += 1;
}

/// Explicit Euler step plus wall reflection for every free body
pub fn integrate(world: &mut World) {
    let pinned = world.pinned();
    let bounds = world.bounds();

    world
        .bodies
        .par_iter_mut()
        .enumerate()
        .filter(|(i, body)| body.is_free() && pinned != Some(*i))
        .for_each(|(_, body)| {
            body.pos += body.vel;
            let radius = body.radius();

            if body.pos.x - radius < 0.0 {
                body.pos.x = radius;
                body.vel = bounce_off_wall(body.vel, Vec2::X);
            } else if body.pos.x + radius > bounds.x {
                body.pos.x = bounds.x - radius;
                body.vel = bounce_off_wall(body.vel, Vec2::NEG_X);
            }

            if body.pos.y - radius < 0.0 {
                body.pos.y = radius;
                body.vel = bounce_off_wall(body.vel, Vec2::Y);
            } else if body.pos.y + radius > bounds.y {
                body.pos.y = bounds.y - radius;
                body.vel = bounce_off_wall(body.vel, Vec2::NEG_Y);
            }
        });
}

/// Only reflect if moving into the wall
fn bounce_off_wall(vel: Vec2, normal: Vec2) -> Vec2 {
    if vel.dot(normal) < 0.0 {
        reflect_velocity(vel, normal)
    } else {
        vel
    }
}

/// Pull every valid body back inside the arena without touching velocity
pub fn confine(world: &mut World) {
    let bounds = world.bounds();
    for body in world.bodies.iter_mut().filter(|b| b.valid) {
        let radius = body.radius();
        body.pos.x = confine_axis(body.pos.x, radius, bounds.x);
        body.pos.y = confine_axis(body.pos.y, radius, bounds.y);
    }
}

fn confine_axis(pos: f32, radius: f32, extent: f32) -> f32 {
    if radius * 2.0 >= extent {
        extent * 0.5
    } else {
        pos.clamp(radius, extent - radius)
    }
}
