//! Body slots
//!
//! A body is a disk. `size` is its diameter and its mass is `size²` (area
//! model), so mass is always derived and never stored.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::OVERLAP_EPSILON;

/// One slot in the body arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Slot holds a live body
    pub valid: bool,
    /// Center
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    /// Diameter
    pub size: f32,
    /// Color drawn this frame (fades while being absorbed)
    pub color: u32,
    /// Color the body was created with
    pub base_color: u32,
    /// Host slot while being absorbed
    pub attached_to: Option<usize>,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            valid: false,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: 0.0,
            color: 0,
            base_color: 0,
            attached_to: None,
        }
    }
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, size: f32, color: u32) -> Self {
        Self {
            valid: true,
            pos,
            vel,
            size,
            color,
            base_color: color,
            attached_to: None,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * 0.5
    }

    /// Area-model mass (`size²`)
    #[inline]
    pub fn mass(&self) -> f32 {
        self.size * self.size
    }

    /// Set size from an area-model mass
    #[inline]
    pub fn set_mass(&mut self, mass: f32) {
        self.size = mass.max(0.0).sqrt();
    }

    /// Kinetic energy under the area-as-mass model
    #[inline]
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass() * self.vel.length_squared()
    }

    /// Live and free to move (not riding a host)
    #[inline]
    pub fn is_free(&self) -> bool {
        self.valid && self.attached_to.is_none()
    }

    /// Tombstone the slot
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.vel = Vec2::ZERO;
        self.attached_to = None;
    }
}

/// Center distance at which two bodies touch
#[inline]
pub fn contact_distance(a: &Body, b: &Body) -> f32 {
    (a.size + b.size) * 0.5
}

/// The single contact predicate used by every interaction policy
#[inline]
pub fn overlapping(a: &Body, b: &Body) -> bool {
    a.pos.distance(b.pos) < contact_distance(a, b) + OVERLAP_EPSILON
}
