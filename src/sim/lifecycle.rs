//! Core/shell cycle for the suction configuration
//!
//! Idle -> Waiting -> CollisionEnabled -> ShellMode -> Idle
//!
//! Once suction has reduced the population to a single survivor and it has
//! waited long enough, that survivor becomes an immovable core that sheds its
//! area as base-size shell bodies under the bounce policy. Only one cycle runs
//! at a time.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::body::{Body, overlapping};
use super::color::brightness;
use super::state::{SimEvent, World};
use crate::consts::MIN_COLOR_BRIGHTNESS;
use crate::polar_to_cartesian;
use crate::settings::InteractionPolicy;

/// Global lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Suction running, gravity growing
    #[default]
    Idle,
    /// One survivor left; counting ticks before it goes critical
    Waiting { ticks: u32 },
    /// Core picked and bounce policy switched on; emissions start next tick
    CollisionEnabled { core: usize },
    /// Core shedding shell bodies
    ShellMode {
        core: usize,
        /// Emissions left before the core is spent
        remaining: u32,
        /// Ticks spent in the bounce regime
        bounce_ticks: u32,
    },
}

impl Lifecycle {
    pub fn name(&self) -> &'static str {
        match self {
            Lifecycle::Idle => "idle",
            Lifecycle::Waiting { .. } => "waiting",
            Lifecycle::CollisionEnabled { .. } => "collision-enabled",
            Lifecycle::ShellMode { .. } => "shell",
        }
    }

    /// The pinned core, if a cycle is underway
    pub fn core(&self) -> Option<usize> {
        match *self {
            Lifecycle::CollisionEnabled { core } | Lifecycle::ShellMode { core, .. } => Some(core),
            _ => None,
        }
    }

    /// Bounce policy active and gravity frozen
    pub fn collision_enabled(&self) -> bool {
        self.core().is_some()
    }
}

fn transition(world: &mut World, next: Lifecycle) {
    let from = world.lifecycle.name();
    let to = next.name();
    world.lifecycle = next;
    if from != to {
        log::info!("tick {}: lifecycle {} -> {}", world.time_ticks, from, to);
        world.emit(SimEvent::PhaseChanged { from, to });
    }
}

/// Decisions taken before physics runs this tick
pub fn pre_step(world: &mut World) {
    match world.lifecycle {
        Lifecycle::Idle => {
            if world.valid_count() == 1 {
                transition(world, Lifecycle::Waiting { ticks: 0 });
            }
        }
        Lifecycle::Waiting { ticks } => {
            if world.valid_count() != 1 {
                transition(world, Lifecycle::Idle);
                return;
            }
            let ticks = ticks + 1;
            if ticks <= world.settings.lifecycle.wait_ticks {
                world.lifecycle = Lifecycle::Waiting { ticks };
                return;
            }
            let Some(core) = world.first_valid() else {
                transition(world, Lifecycle::Idle);
                return;
            };
            let body = &mut world.bodies[core];
            body.vel = Vec2::ZERO;
            body.attached_to = None;
            world.policy = InteractionPolicy::Bounce;
            transition(world, Lifecycle::CollisionEnabled { core });
        }
        Lifecycle::CollisionEnabled { .. } => {}
        Lifecycle::ShellMode {
            core,
            remaining,
            bounce_ticks,
        } => {
            if remaining == 0 || !world.bodies[core].valid {
                return;
            }
            let bounce_ticks = bounce_ticks + 1;
            if bounce_ticks > world.settings.lifecycle.bounce_phase_cap {
                log::warn!(
                    "Shell phase hit its {} tick cap with {} emissions left; resetting",
                    world.settings.lifecycle.bounce_phase_cap,
                    remaining
                );
                end_cycle(world, None);
                return;
            }
            let emitted = emit_shell(world, core, remaining);
            world.lifecycle = Lifecycle::ShellMode {
                core,
                remaining: remaining - emitted,
                bounce_ticks,
            };
        }
    }
}

/// Bookkeeping after physics ran this tick
pub fn post_step(world: &mut World) {
    if let Lifecycle::CollisionEnabled { core } = world.lifecycle {
        if world.bodies[core].valid {
            let base_mass = world.settings.base_size * world.settings.base_size;
            let remaining = (world.bodies[core].mass() / base_mass).floor() as u32;
            log::info!(
                "Core {} (size {:.1}) will emit {} shell bodies",
                core,
                world.bodies[core].size,
                remaining
            );
            transition(
                world,
                Lifecycle::ShellMode {
                    core,
                    remaining,
                    bounce_ticks: 0,
                },
            );
        }
    }

    match world.lifecycle {
        Lifecycle::CollisionEnabled { core } | Lifecycle::ShellMode { core, remaining: 0, .. } => {
            end_cycle(world, Some(core));
        }
        Lifecycle::ShellMode { core, .. } if !world.bodies[core].valid => {
            end_cycle(world, Some(core));
        }
        _ => {}
    }
}

/// Close a cycle; `spent_core` is reset to base size when it survived
///
/// `None` is the safety valve: the core keeps whatever area it has left.
fn end_cycle(world: &mut World, spent_core: Option<usize>) {
    if let Some(core) = spent_core {
        let base_size = world.settings.base_size;
        let body = &mut world.bodies[core];
        if body.valid {
            body.size = base_size;
        }
    }
    world.gravity = world.settings.gravity.constant;
    world.policy = world.settings.policy;
    transition(world, Lifecycle::Idle);
}

/// Emit up to one batch of shell bodies; returns how many were placed
fn emit_shell(world: &mut World, core: usize, remaining: u32) -> u32 {
    let batch = world.settings.lifecycle.emission_batch.min(remaining);
    let base_size = world.settings.base_size;
    let base_mass = base_size * base_size;
    let mut emitted = 0;

    for _ in 0..batch {
        let Some(slot) = world.first_free_slot() else {
            log::debug!("No free slot for a shell body");
            break;
        };
        let Some((pos, dir)) = place_shell_body(world, core) else {
            log::debug!("No room around core {} this tick", core);
            break;
        };

        let fallback_color = world.bodies[core].base_color;
        let old = world.bodies[slot];
        let color = if brightness(old.base_color) >= MIN_COLOR_BRIGHTNESS {
            old.base_color
        } else {
            fallback_color
        };
        world.bodies[slot] = Body::new(pos, dir * world.settings.max_speed, base_size, color);

        let core_body = &mut world.bodies[core];
        core_body.set_mass(core_body.mass() - base_mass);

        emitted += 1;
        world.emit(SimEvent::Emitted { core, slot });
    }
    emitted
}

/// Find a spot just outside the core for a base-size body
///
/// Returns the position and the outward unit direction.
fn place_shell_body(world: &mut World, core: usize) -> Option<(Vec2, Vec2)> {
    let base_size = world.settings.base_size;
    let radius = base_size * 0.5;
    let bounds = world.bounds();
    let center = world.bodies[core].pos;
    let dist = world.bodies[core].radius() + radius + world.settings.lifecycle.emission_gap;

    for _ in 0..world.settings.lifecycle.emission_trials {
        let angle = world.rng.random_range(0.0..TAU);
        let dir = polar_to_cartesian(1.0, angle);
        let pos = center + dir * dist;

        let inside = pos.x - radius >= 0.0
            && pos.y - radius >= 0.0
            && pos.x + radius <= bounds.x
            && pos.y + radius <= bounds.y;
        if !inside {
            continue;
        }

        let candidate = Body::new(pos, Vec2::ZERO, base_size, 0);
        if world
            .bodies
            .iter()
            .any(|other| other.valid && overlapping(&candidate, other))
        {
            continue;
        }
        return Some((pos, dir));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{LifecycleSettings, Settings};

    fn suction_world(core_size: f32, capacity: usize) -> World {
        let settings = Settings {
            width: 2000,
            height: 2000,
            population: capacity,
            base_size: 20.0,
            policy: InteractionPolicy::Suction,
            lifecycle: LifecycleSettings {
                wait_ticks: 3,
                emission_batch: 4,
                ..LifecycleSettings::default()
            },
            ..Settings::default()
        };
        let core = Body::new(Vec2::new(1000.0, 1000.0), Vec2::new(1.0, 2.0), core_size, 0xAA5522);
        World::with_bodies(settings, 11, vec![core])
    }

    #[test]
    fn test_lone_survivor_waits_then_goes_critical() {
        let mut world = suction_world(60.0, 16);
        pre_step(&mut world);
        assert_eq!(world.lifecycle, Lifecycle::Waiting { ticks: 0 });
        for _ in 0..3 {
            pre_step(&mut world);
            assert!(matches!(world.lifecycle, Lifecycle::Waiting { .. }));
        }
        pre_step(&mut world);
        assert_eq!(world.lifecycle, Lifecycle::CollisionEnabled { core: 0 });
        assert_eq!(world.policy, InteractionPolicy::Bounce);
        assert_eq!(world.bodies[0].vel, Vec2::ZERO);

        post_step(&mut world);
        // 3600 / 400 = 9 emissions
        assert_eq!(
            world.lifecycle,
            Lifecycle::ShellMode {
                core: 0,
                remaining: 9,
                bounce_ticks: 0
            }
        );
    }

    #[test]
    fn test_waiting_falls_back_when_population_grows() {
        let mut world = suction_world(60.0, 4);
        world.lifecycle = Lifecycle::Waiting { ticks: 2 };
        world.bodies[1] = Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 20.0, 0x808080);
        pre_step(&mut world);
        assert_eq!(world.lifecycle, Lifecycle::Idle);
    }

    #[test]
    fn test_shell_emission_conserves_core_area() {
        let mut world = suction_world(70.0, 32);
        let base_mass = 400.0;
        let initial = world.bodies[0].mass();
        let expected = (initial / base_mass).floor() as u32; // 12
        world.policy = InteractionPolicy::Bounce;
        world.lifecycle = Lifecycle::CollisionEnabled { core: 0 };
        post_step(&mut world);

        let mut emitted = 0;
        while let Lifecycle::ShellMode { remaining, .. } = world.lifecycle {
            if remaining == 0 {
                break;
            }
            let core_before = world.bodies[0].mass();
            world.events.clear();
            pre_step(&mut world);

            let slots: Vec<usize> = world
                .events
                .iter()
                .filter_map(|e| match e {
                    SimEvent::Emitted { slot, .. } => Some(*slot),
                    _ => None,
                })
                .collect();
            assert!(!slots.is_empty());
            assert!(slots.len() <= 4);
            emitted += slots.len() as u32;

            let lost = core_before - world.bodies[0].mass();
            assert!((lost - slots.len() as f32 * base_mass).abs() < 1e-2);

            let core = world.bodies[0];
            for &slot in &slots {
                let shell = world.bodies[slot];
                assert!(shell.valid);
                assert_eq!(shell.size, 20.0);
                assert!(shell.pos.distance(core.pos) > core.radius() + shell.radius());
                assert!(shell.vel.dot(shell.pos - core.pos) > 0.0, "shell moves outward");
                for (k, other) in world.bodies.iter().enumerate() {
                    if k != slot && other.valid {
                        assert!(!overlapping(&shell, other));
                    }
                }
            }
            // Pretend the batch flew off so the next one has room
            for &slot in &slots {
                world.bodies[slot].invalidate();
            }
        }

        assert_eq!(emitted, expected);
        let lost_total = initial - world.bodies[0].mass();
        assert!((lost_total - expected as f32 * base_mass).abs() < 0.5);

        world.gravity = 123.0;
        post_step(&mut world);
        assert_eq!(world.lifecycle, Lifecycle::Idle);
        assert_eq!(world.bodies[0].size, 20.0);
        assert_eq!(world.policy, InteractionPolicy::Suction);
        assert_eq!(world.gravity, world.settings.gravity.constant);
    }

    #[test]
    fn test_no_free_slots_trips_safety_valve() {
        // Capacity 1: the core can never emit
        let mut world = suction_world(60.0, 1);
        world.settings.lifecycle.bounce_phase_cap = 5;
        world.lifecycle = Lifecycle::CollisionEnabled { core: 0 };
        world.policy = InteractionPolicy::Bounce;
        post_step(&mut world);

        for _ in 0..5 {
            pre_step(&mut world);
            post_step(&mut world);
            assert!(matches!(world.lifecycle, Lifecycle::ShellMode { remaining: 9, .. }));
        }
        pre_step(&mut world);
        assert_eq!(world.lifecycle, Lifecycle::Idle);
        assert_eq!(world.policy, InteractionPolicy::Suction);
        // Safety valve leaves the core's area alone
        assert_eq!(world.bodies[0].size, 60.0);
    }

    #[test]
    fn test_core_smaller_than_base_ends_immediately() {
        let mut world = suction_world(15.0, 4);
        world.lifecycle = Lifecycle::CollisionEnabled { core: 0 };
        post_step(&mut world);
        assert_eq!(world.lifecycle, Lifecycle::Idle);
        assert_eq!(world.bodies[0].size, 20.0);
    }

    #[test]
    fn test_dead_core_ends_cycle() {
        let mut world = suction_world(60.0, 4);
        world.lifecycle = Lifecycle::ShellMode {
            core: 0,
            remaining: 5,
            bounce_ticks: 2,
        };
        world.bodies[0].invalidate();
        pre_step(&mut world);
        post_step(&mut world);
        assert_eq!(world.lifecycle, Lifecycle::Idle);
        assert!(!world.bodies[0].valid);
    }

    #[test]
    fn test_lifecycle_helpers() {
        assert_eq!(Lifecycle::Idle.core(), None);
        assert!(!Lifecycle::Waiting { ticks: 4 }.collision_enabled());
        assert_eq!(Lifecycle::CollisionEnabled { core: 3 }.core(), Some(3));
        assert!(
            Lifecycle::ShellMode {
                core: 1,
                remaining: 2,
                bounce_ticks: 0
            }
            .collision_enabled()
        );
    }
}
