//! Software rasterizer into a raw RGB24 frame

use super::shapes::{Circle, world_circles};
use super::RenderSink;
use crate::error::SinkError;
use crate::sim::World;
use crate::sim::color::unpack_rgb;

/// Row-major RGB24 pixel buffer, `width * height * 3` bytes
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    background: [u8; 3],
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, background: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        let background = unpack_rgb(background);
        let mut frame = Self {
            width,
            height,
            background,
            pixels: vec![0; width * height * 3],
        };
        frame.clear();
        frame
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw frame bytes, ready for an rgb24 pipe
    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at a pixel, `None` outside the frame
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    /// Fill with the background tint
    pub fn clear(&mut self) {
        for px in self.pixels.chunks_exact_mut(3) {
            px.copy_from_slice(&self.background);
        }
    }

    /// Midpoint-test disk: every pixel with dx² + dy² <= r², clipped
    pub fn fill_circle(&mut self, circle: &Circle) {
        let cx = circle.center.x as i64;
        let cy = circle.center.y as i64;
        let r = circle.radius.floor() as i64;
        let r2 = r * r;
        let rgb = unpack_rgb(circle.color);
        let (w, h) = (self.width as i64, self.height as i64);

        for dy in -r..=r {
            let py = cy + dy;
            if py < 0 || py >= h {
                continue;
            }
            for dx in -r..=r {
                let px = cx + dx;
                if px < 0 || px >= w || dx * dx + dy * dy > r2 {
                    continue;
                }
                let idx = ((py * w + px) * 3) as usize;
                self.pixels[idx..idx + 3].copy_from_slice(&rgb);
            }
        }
    }

    /// Clear and paint every live body
    pub fn draw_world(&mut self, world: &World) {
        self.clear();
        for circle in world_circles(world) {
            self.fill_circle(&circle);
        }
    }
}

impl RenderSink for FrameBuffer {
    fn render(&mut self, world: &World) -> Result<(), SinkError> {
        self.draw_world(world);
        Ok(())
    }
}
