//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by slot index)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod color;
pub mod gravity;
pub mod lifecycle;
pub mod spawn;
pub mod state;
pub mod tick;

pub use body::{Body, contact_distance, overlapping};
pub use lifecycle::Lifecycle;
pub use state::{SimEvent, World};
pub use tick::tick;
