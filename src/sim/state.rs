//! World state
//!
//! The world owns a fixed-capacity arena of body slots. Destroyed bodies are
//! tombstoned and their slots reused by the shell emitter, so slot indices stay
//! stable for `attached_to` back-references.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::body::Body;
use super::lifecycle::Lifecycle;
use super::spawn;
use crate::error::SimError;
use crate::settings::{InteractionPolicy, Settings};

/// Something notable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// `loser` merged into `survivor`
    Fused {
        survivor: usize,
        loser: usize,
        size_a: f32,
        size_b: f32,
        merged_size: f32,
    },
    /// `satellite` stuck to `host` and started draining into it
    Attached { host: usize, satellite: usize },
    /// `satellite` was fully drained into `host`
    Consumed { host: usize, satellite: usize },
    /// `satellite` lost its host and is free again
    Released { satellite: usize },
    /// Shell body revived in `slot`
    Emitted { core: usize, slot: usize },
    /// The lifecycle moved to a new state
    PhaseChanged { from: &'static str, to: &'static str },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub settings: Settings,
    /// Fixed-capacity body arena
    pub bodies: Vec<Body>,
    /// Policy currently resolving contacts
    pub policy: InteractionPolicy,
    /// Current gravitational constant
    pub gravity: f32,
    pub lifecycle: Lifecycle,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised during the last tick
    pub events: Vec<SimEvent>,
    pub seed: u64,
    pub(crate) rng: Pcg32,
}

impl World {
    /// Build a world and populate it with non-overlapping bodies
    pub fn new(settings: Settings, seed: u64) -> Result<Self, SimError> {
        settings.validate()?;
        let mut world = Self::empty(settings, seed);
        world.bodies = spawn::populate(&world.settings, &mut world.rng)?;
        log::info!(
            "Placed {} bodies ({} policy, seed {})",
            world.bodies.len(),
            world.policy.as_str(),
            seed
        );
        Ok(world)
    }

    /// A world with `population` empty slots
    pub fn empty(settings: Settings, seed: u64) -> Self {
        Self {
            bodies: vec![Body::default(); settings.population],
            policy: settings.policy,
            gravity: settings.gravity.constant,
            lifecycle: Lifecycle::Idle,
            time_ticks: 0,
            events: Vec::new(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            settings,
        }
    }

    /// Build a world from explicit bodies (scenarios and tests)
    ///
    /// Extra capacity is padded with free slots up to `settings.population`.
    pub fn with_bodies(settings: Settings, seed: u64, mut bodies: Vec<Body>) -> Self {
        let capacity = settings.population.max(bodies.len());
        bodies.resize(capacity, Body::default());
        let mut world = Self::empty(settings, seed);
        world.bodies = bodies;
        world
    }

    /// Arena capacity
    pub fn capacity(&self) -> usize {
        self.bodies.len()
    }

    /// Number of live bodies
    pub fn valid_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.valid).count()
    }

    /// Slot of the first live body
    pub fn first_valid(&self) -> Option<usize> {
        self.bodies.iter().position(|b| b.valid)
    }

    /// Slot of the first tombstoned body
    pub fn first_free_slot(&self) -> Option<usize> {
        self.bodies.iter().position(|b| !b.valid)
    }

    /// Σ size² over live bodies
    pub fn total_mass(&self) -> f32 {
        self.bodies.iter().filter(|b| b.valid).map(Body::mass).sum()
    }

    /// Arena size
    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.settings.width as f32, self.settings.height as f32)
    }

    /// The immovable core while a shell cycle is running
    pub fn pinned(&self) -> Option<usize> {
        self.lifecycle.core()
    }

    /// Raise an event for this tick
    pub(crate) fn emit(&mut self, event: SimEvent) {
        log::trace!("tick {}: {:?}", self.time_ticks, event);
        self.events.push(event);
    }
}
