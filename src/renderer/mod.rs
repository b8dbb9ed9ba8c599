//! Rendering module
//!
//! Everything downstream of the simulation sees the world through
//! [`RenderSink`], called once per tick after the step.

pub mod frame;
pub mod shapes;

pub use frame::FrameBuffer;
pub use shapes::{Circle, world_circles};

use crate::error::SinkError;
use crate::sim::World;

/// Consumer of one frame per tick
pub trait RenderSink {
    fn render(&mut self, world: &World) -> Result<(), SinkError>;

    /// Flush anything buffered once the run ends
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Hands every live body to a closure as a [`Circle`]
///
/// This is the seam for an on-screen display.
pub struct CircleSink<F> {
    draw: F,
}

impl<F: FnMut(&Circle)> CircleSink<F> {
    pub fn new(draw: F) -> Self {
        Self { draw }
    }
}

impl<F: FnMut(&Circle)> RenderSink for CircleSink<F> {
    fn render(&mut self, world: &World) -> Result<(), SinkError> {
        for circle in world_circles(world) {
            (self.draw)(&circle);
        }
        Ok(())
    }
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn render(&mut self, world: &World) -> Result<(), SinkError> {
        (**self).render(world)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}
