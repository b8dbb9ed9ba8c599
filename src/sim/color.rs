//! Packed 0xRRGGBB color helpers

/// Pack channels into 0xRRGGBB
#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Unpack 0xRRGGBB into channels
#[inline]
pub fn unpack_rgb(color: u32) -> [u8; 3] {
    [
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    ]
}

/// Sum of the three channels
#[inline]
pub fn brightness(color: u32) -> u32 {
    unpack_rgb(color).iter().map(|&c| c as u32).sum()
}

/// Blend from `from` (t = 0) to `to` (t = 1)
pub fn lerp_rgb(from: u32, to: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let a = unpack_rgb(from);
    let b = unpack_rgb(to);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    pack_rgb(mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let c = pack_rgb(0x12, 0x34, 0x56);
        assert_eq!(c, 0x123456);
        assert_eq!(unpack_rgb(c), [0x12, 0x34, 0x56]);
    }

    #[test]
    fn test_brightness() {
        assert_eq!(brightness(0x1e1e1e), 90);
        assert_eq!(brightness(0xFFFFFF), 765);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp_rgb(0x000000, 0xFF8040, 0.0), 0x000000);
        assert_eq!(lerp_rgb(0x000000, 0xFF8040, 1.0), 0xFF8040);
        assert_eq!(lerp_rgb(0x1e1e1e, 0x1e1e1e, 0.37), 0x1e1e1e);
    }
}
