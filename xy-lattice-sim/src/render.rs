//! False-color rendering of the angle field.
//!
//! Each angle becomes a hue (degrees) at full saturation and 50% lightness.
//! The N×N pixel buffer is then scaled onto the output surface with
//! nearest-neighbor sampling only. No interpolation happens at any stage:
//! each lattice site maps to a solid block of output pixels.

use std::f64::consts::PI;

use crate::lattice::{LatticeSize, LatticeState};
use crate::surface::Surface;

/// Logical output size of the reference viewport.
pub const DEFAULT_VIEWPORT: usize = 512;

/// HSL → RGB with hue in degrees, saturation and lightness in `[0, 1]`.
///
/// Hue is reduced modulo 360°, so `h` and `h + 360` give the same color.
pub fn hsl_to_rgb(hue_deg: f64, s: f64, l: f64) -> [f64; 3] {
    let h = hue_deg.rem_euclid(360.0);
    let a = s * l.min(1.0 - l);
    let f = |n: f64| {
        let k = (n + h / 30.0).rem_euclid(12.0);
        l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0)
    };
    [f(0.0), f(8.0), f(4.0)]
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Color of a spin angle (radians). `angle_to_color(0) == angle_to_color(2π)`.
pub fn angle_to_color(angle: f64) -> [u8; 3] {
    let [r, g, b] = hsl_to_rgb(angle * 180.0 / PI, 1.0, 0.5);
    [channel(r), channel(g), channel(b)]
}

/// Row-major RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Transparent black buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, 4 per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = (y * self.width + x) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Reallocate at new dimensions, discarding contents.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data = vec![0; width * height * 4];
    }
}

/// Nearest-neighbor copy of `src` onto the whole of `dst`, centered.
///
/// Equivalent to translating to the destination center, scaling by
/// `dst/src` per axis and drawing `src` at `(-w/2, -h/2)`: destination pixel
/// centers are mapped back into the source and truncated. Integer math keeps
/// the mapping exact, so every source pixel covers a solid block.
pub fn blit_nearest(src: &PixelBuffer, dst: &mut PixelBuffer) {
    let (sw, sh) = (src.width, src.height);
    let (dw, dh) = (dst.width, dst.height);
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 {
        return;
    }

    for oy in 0..dh {
        let sy = ((2 * oy + 1) * sh) / (2 * dh);
        let src_row = &src.data[sy * sw * 4..(sy + 1) * sw * 4];
        let dst_row = &mut dst.data[oy * dw * 4..(oy + 1) * dw * 4];
        for ox in 0..dw {
            let sx = ((2 * ox + 1) * sw) / (2 * dw);
            dst_row[ox * 4..ox * 4 + 4].copy_from_slice(&src_row[sx * 4..sx * 4 + 4]);
        }
    }
}

/// Owns the lattice-sized pixel buffer and the surface-sized output frame.
#[derive(Debug, Clone)]
pub struct Renderer {
    pixels: PixelBuffer,
    output: PixelBuffer,
}

impl Renderer {
    pub fn new(size: LatticeSize, viewport: (usize, usize)) -> Self {
        let n = size.side();
        Self {
            pixels: PixelBuffer::new(n, n),
            output: PixelBuffer::new(viewport.0, viewport.1),
        }
    }

    /// Lattice-sized buffer from the most recent render.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Scaled frame from the most recent render.
    pub fn output(&self) -> &PixelBuffer {
        &self.output
    }

    /// Match the pixel buffer to a new lattice size.
    pub fn resize(&mut self, size: LatticeSize) {
        let n = size.side();
        self.pixels.resize(n, n);
    }

    /// Rewrite every pixel from the lattice (opaque alpha).
    pub fn fill(&mut self, lattice: &LatticeState) {
        let n = lattice.side();
        if self.pixels.width != n || self.pixels.height != n {
            self.pixels.resize(n, n);
        }
        for (px, &theta) in self.pixels.data.chunks_exact_mut(4).zip(lattice.angles()) {
            let [r, g, b] = angle_to_color(theta);
            px.copy_from_slice(&[r, g, b, 255]);
        }
    }

    /// Fill, scale onto the surface's logical size, and present.
    pub fn render(&mut self, lattice: &LatticeState, surface: &mut dyn Surface) {
        self.fill(lattice);

        let (w, h) = surface.size();
        if self.output.width != w || self.output.height != h {
            self.output.resize(w, h);
        }
        blit_nearest(&self.pixels, &mut self.output);
        surface.present(&self.output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use std::f64::consts::TAU;

    #[test]
    fn test_hue_wraps() {
        assert_eq!(angle_to_color(0.0), angle_to_color(TAU));
        assert_eq!(angle_to_color(1.0), angle_to_color(1.0 + TAU));
    }

    #[test]
    fn test_primary_hues() {
        assert_eq!(angle_to_color(0.0), [255, 0, 0]);
        assert_eq!(angle_to_color(TAU / 3.0), [0, 255, 0]);
        assert_eq!(angle_to_color(2.0 * TAU / 3.0), [0, 0, 255]);
        assert_eq!(angle_to_color(PI), [0, 255, 255]);
        assert_eq!(angle_to_color(PI / 3.0), [255, 255, 0]);
    }

    #[test]
    fn test_hsl_lightness_extremes() {
        assert_eq!(hsl_to_rgb(123.0, 1.0, 0.0), [0.0, 0.0, 0.0]);
        assert_eq!(hsl_to_rgb(123.0, 1.0, 1.0), [1.0, 1.0, 1.0]);
        assert_eq!(hsl_to_rgb(-120.0, 1.0, 0.5), hsl_to_rgb(240.0, 1.0, 0.5));
    }

    #[test]
    fn test_blit_nearest_blocks() {
        let mut src = PixelBuffer::new(2, 2);
        src.set_pixel(0, 0, [1, 0, 0, 255]);
        src.set_pixel(1, 0, [2, 0, 0, 255]);
        src.set_pixel(0, 1, [3, 0, 0, 255]);
        src.set_pixel(1, 1, [4, 0, 0, 255]);
        let mut dst = PixelBuffer::new(8, 8);
        blit_nearest(&src, &mut dst);
        for y in 0..8 {
            for x in 0..8 {
                let expected = 1 + (x / 4) as u8 + 2 * (y / 4) as u8;
                assert_eq!(dst.pixel(x, y)[0], expected, "at ({}, {})", x, y);
                assert_eq!(dst.pixel(x, y)[3], 255);
            }
        }
    }

    #[test]
    fn test_render_is_opaque_and_sized() {
        let mut lat = LatticeState::new(LatticeSize::N64);
        lat.set(0, 0, 2.0);
        let mut renderer = Renderer::new(LatticeSize::N32, (DEFAULT_VIEWPORT, DEFAULT_VIEWPORT));
        let mut surface = MemorySurface::new(DEFAULT_VIEWPORT, DEFAULT_VIEWPORT);
        renderer.render(&lat, &mut surface);

        assert_eq!(renderer.pixels().width(), 64);
        assert_eq!(renderer.pixels().height(), 64);
        assert!(renderer.pixels().as_bytes().chunks_exact(4).all(|p| p[3] == 255));

        let frame = surface.last_frame().expect("frame presented");
        assert_eq!(frame.width(), DEFAULT_VIEWPORT);
        // Site (0, 0) covers an 8×8 block
        let [r, g, b] = angle_to_color(2.0);
        assert_eq!(frame.pixel(7, 7), [r, g, b, 255]);
        assert_eq!(frame.pixel(8, 8), [255, 0, 0, 255]);
    }
}
