//! Shape generation for 2D primitives

use glam::Vec2;

use crate::sim::World;

/// One filled disk, in arena pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
    /// Packed 0xRRGGBB
    pub color: u32,
}

/// Every live body as a circle, in slot order (later slots paint over earlier)
pub fn world_circles(world: &World) -> impl Iterator<Item = Circle> + '_ {
    world.bodies.iter().filter(|b| b.valid).map(|b| Circle {
        center: b.pos,
        radius: b.radius(),
        color: b.color,
    })
}
