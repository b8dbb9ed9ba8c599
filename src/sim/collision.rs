//! Contact detection and response between bodies
//!
//! All pairs are visited in slot order, one pair at a time, mutating both
//! bodies in place. Later pairs see the outcome of earlier ones within the
//! same tick, so this pass must stay single-threaded.
//!
//! One pass is not always enough: a fused survivor grows into pairs that were
//! already visited, a bounce correction can push a body into a neighbour, and
//! draining satellites grows their hosts. `resolve` repeats the pair pass until
//! no free pair is left touching.

use glam::Vec2;

use super::body::{Body, contact_distance, overlapping};
use super::color::lerp_rgb;
use super::state::{SimEvent, World};
use crate::consts::{
    COINCIDENT_DISTANCE, MAX_BOUNCE_PASSES, MIN_FADE, SEPARATION_SLOP, SIZE_TIE_EPSILON,
};
use crate::settings::InteractionPolicy;

/// Coefficient of restitution for body-body bounces
pub const RESTITUTION: f32 = 1.0;

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Unit normal pointing from `b` toward `a`, and the center distance
///
/// Coincident centers get an arbitrary +x normal.
pub fn contact_normal(a: &Body, b: &Body) -> (Vec2, f32) {
    let delta = a.pos - b.pos;
    let dist = delta.length();
    if dist < COINCIDENT_DISTANCE {
        return (Vec2::X, dist);
    }
    (delta / dist, dist)
}

/// Borrow two distinct slots mutably
pub(crate) fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = bodies.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

/// Elastic equal-mass bounce with positional correction
pub fn bounce(a: &mut Body, b: &mut Body) {
    let (normal, dist) = contact_normal(a, b);

    // Positional correction, split evenly
    let overlap = contact_distance(a, b) + SEPARATION_SLOP - dist;
    let separation = overlap * 0.5;
    a.pos += normal * separation;
    b.pos -= normal * separation;

    // Velocity exchange only if approaching
    let vel_along_normal = (a.vel - b.vel).dot(normal);
    if vel_along_normal < 0.0 {
        let impulse = -(1.0 + RESTITUTION) * vel_along_normal / 2.0;
        a.vel += normal * impulse;
        b.vel -= normal * impulse;
    }
}

/// Bounce `other` off an immovable, non-absorbing core
pub fn reflect_off_core(core: &Body, other: &mut Body) {
    let (normal, dist) = contact_normal(other, core);
    other.pos += normal * (contact_distance(core, other) + SEPARATION_SLOP - dist);
    if other.vel.dot(normal) < 0.0 {
        other.vel = reflect_velocity(other.vel, normal);
    }
}

/// Merge two touching bodies; slot `i` holds `a`, slot `j` holds `b`
///
/// Area and momentum are conserved. Equal sizes keep the more energetic body
/// (ties keep `a`); otherwise the larger body survives.
pub fn fuse(i: usize, j: usize, a: &mut Body, b: &mut Body) -> SimEvent {
    let (mass_a, mass_b) = (a.mass(), b.mass());
    let (size_a, size_b) = (a.size, b.size);
    let merged_mass = mass_a + mass_b;
    let merged_vel = (a.vel * mass_a + b.vel * mass_b) / merged_mass;

    let a_survives = if (size_a - size_b).abs() < SIZE_TIE_EPSILON {
        a.kinetic_energy() >= b.kinetic_energy()
    } else {
        size_a > size_b
    };

    let (survivor, loser, survivor_slot, loser_slot) = if a_survives {
        (a, b, i, j)
    } else {
        (b, a, j, i)
    };
    survivor.set_mass(merged_mass);
    survivor.vel = merged_vel;
    loser.invalidate();

    SimEvent::Fused {
        survivor: survivor_slot,
        loser: loser_slot,
        size_a,
        size_b,
        merged_size: survivor.size,
    }
}

/// Stick the smaller body onto the larger one
///
/// The host takes the area-weighted velocity of both so momentum is kept; the
/// satellite stops and starts draining on the next attachment pass.
pub fn attach(i: usize, j: usize, a: &mut Body, b: &mut Body) -> SimEvent {
    let (host, satellite, host_slot, satellite_slot) = if b.size > a.size {
        (b, a, j, i)
    } else {
        (a, b, i, j)
    };
    let (mass_h, mass_s) = (host.mass(), satellite.mass());
    host.vel = (host.vel * mass_h + satellite.vel * mass_s) / (mass_h + mass_s);
    satellite.vel = Vec2::ZERO;
    satellite.attached_to = Some(host_slot);

    SimEvent::Attached {
        host: host_slot,
        satellite: satellite_slot,
    }
}

/// One slot-order sweep over every overlapping pair of free bodies
///
/// Returns how many contacts were handled.
pub fn resolve_pairs(world: &mut World) -> usize {
    let n = world.bodies.len();
    let core = world.pinned();
    let policy = world.policy;
    let mut contacts = 0;

    for i in 0..n {
        for j in (i + 1)..n {
            // Slot i can be fused away or attached partway through its row
            if !world.bodies[i].is_free() {
                break;
            }
            if !world.bodies[j].is_free() {
                continue;
            }
            let (a, b) = pair_mut(&mut world.bodies, i, j);
            if !overlapping(a, b) {
                continue;
            }
            contacts += 1;

            if core == Some(i) {
                reflect_off_core(a, b);
                continue;
            }
            if core == Some(j) {
                reflect_off_core(b, a);
                continue;
            }

            let event = match policy {
                InteractionPolicy::Bounce => {
                    bounce(a, b);
                    None
                }
                InteractionPolicy::Suction => Some(attach(i, j, a, b)),
                InteractionPolicy::Fuse => Some(fuse(i, j, a, b)),
            };
            if let Some(event) = event {
                world.emit(event);
            }
        }
    }
    contacts
}

/// Sweep the pairs until none touch
///
/// Every fusion retires a body and every attachment takes one out of the free
/// set, so those policies always settle. Bounce relaxation is capped.
pub fn settle_pairs(world: &mut World) {
    let mut passes = 0;
    while resolve_pairs(world) > 0 {
        passes += 1;
        if world.policy == InteractionPolicy::Bounce && passes >= MAX_BOUNCE_PASSES {
            log::debug!("Bounce relaxation stopped after {passes} passes");
            break;
        }
    }
}

/// Drain every attached satellite a little further into its host
pub fn drain_attachments(world: &mut World) {
    let rate = world.settings.lifecycle.transfer_rate;
    let floor = world.settings.lifecycle.absorb_floor;
    let base_size = world.settings.base_size;
    let background = world.settings.background;

    for s in 0..world.bodies.len() {
        let Some(h) = world.bodies[s].attached_to else {
            continue;
        };
        if h == s || !world.bodies[h].valid {
            world.bodies[s].attached_to = None;
            world.emit(SimEvent::Released { satellite: s });
            continue;
        }

        let (satellite, host) = pair_mut(&mut world.bodies, s, h);
        let transfer = satellite.mass() * rate;
        let remaining = satellite.mass() - transfer;

        if remaining < floor {
            host.set_mass(host.mass() + satellite.mass());
            satellite.invalidate();
            world.emit(SimEvent::Consumed {
                host: h,
                satellite: s,
            });
            continue;
        }

        host.set_mass(host.mass() + transfer);
        satellite.set_mass(remaining);
        satellite.vel = Vec2::ZERO;

        // Sit flush on the host surface along the line between centers
        let (dir, _) = contact_normal(satellite, host);
        satellite.pos = host.pos + dir * (host.radius() + satellite.radius());

        let fade = (satellite.size / base_size).clamp(MIN_FADE, 1.0);
        satellite.color = lerp_rgb(background, satellite.base_color, fade);
    }
}

/// Free satellites whose host died this tick
pub fn release_orphans(world: &mut World) {
    for s in 0..world.bodies.len() {
        let Some(h) = world.bodies[s].attached_to else {
            continue;
        };
        if world.bodies[h].valid {
            continue;
        }
        world.bodies[s].attached_to = None;
        world.emit(SimEvent::Released { satellite: s });
    }
}

/// Full resolver pass: pairs, then attachments
pub fn resolve(world: &mut World) {
    settle_pairs(world);
    if world.bodies.iter().any(|b| b.attached_to.is_some()) {
        drain_attachments(world);
        release_orphans(world);
        // Grown hosts and released orphans may touch free bodies now
        settle_pairs(world);
    }
}
