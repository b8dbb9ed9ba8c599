//! Ball Pit - a fixed-timestep 2D ball physics toy
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, gravity, collisions, lifecycle)
//! - `renderer`: Software rasterizer producing raw RGB24 frames
//! - `platform`: Frame pacing, encoder pipe and stop input
//! - `settings`: Startup configuration

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{SimError, SinkError};
pub use settings::{InteractionPolicy, Settings};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Slack added to the contact distance so exact tangency is not a contact
    pub const OVERLAP_EPSILON: f32 = 1e-3;
    /// Distance two bodies are pushed apart to, beyond exact contact
    pub const SEPARATION_SLOP: f32 = 2.0 * OVERLAP_EPSILON;
    /// Below this center distance two bodies are treated as coincident
    pub const COINCIDENT_DISTANCE: f32 = 1e-6;
    /// Sizes closer than this are equal for fusion tie-breaking
    pub const SIZE_TIE_EPSILON: f32 = 1e-6;
    /// Pair sweeps per tick before bounce relaxation gives up
    pub const MAX_BOUNCE_PASSES: usize = 16;

    /// Rejection sampling cap for placement and colors (per body)
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1 << 16;
    /// Minimum r + g + b for a generated color
    pub const MIN_COLOR_BRIGHTNESS: u32 = 150;
    /// Color fade never goes below this fraction of the base color
    pub const MIN_FADE: f32 = 0.3;

    /// Densest packing of equal disks in the plane (hexagonal)
    pub const HEX_PACKING_DENSITY: f32 = 0.906_9;

    /// Background tint (#1e1e1e)
    pub const BACKGROUND_COLOR: u32 = 0x1e1e1e;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
