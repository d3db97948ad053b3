//! Image filters used by classification and the raster pipeline.
//!
//! Edge detection is delegated to `imageproc`'s Canny implementation; only
//! the threshold semantics (low/high 100/200, density cut-off 0.95) are part
//! of this crate's contract, not the filter internals. The adaptive
//! binarization is a mean-offset threshold over a square neighborhood,
//! computed with an integral image so each pixel's window sum is O(1).

use image::{GrayImage, Luma, RgbImage};
use imageproc::edges::canny;

/// Canny hysteresis thresholds used by the classifier.
pub const CANNY_LOW: f32 = 100.0;
pub const CANNY_HIGH: f32 = 200.0;

/// Neighborhood side length for adaptive binarization.
pub const ADAPTIVE_BLOCK_SIZE: u32 = 11;
/// Constant subtracted from the neighborhood mean before comparison.
pub const ADAPTIVE_OFFSET: i32 = 2;

/// Convert a rendered page canvas to grayscale.
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

/// Fraction of pixels the Canny detector marks as edges, in `[0, 1]`.
///
/// Empty images have no edges by definition.
pub fn edge_density(gray: &GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return 0.0;
    }
    let edges = canny(gray, CANNY_LOW, CANNY_HIGH);
    let edge_pixels = edges.pixels().filter(|p| p[0] != 0).count();
    edge_pixels as f64 / (w as f64 * h as f64)
}

/// Mean-offset adaptive binarization.
///
/// A pixel becomes white when its value exceeds the mean of the
/// `block_size × block_size` window around it minus `offset`, black
/// otherwise. Windows are clamped at the image border, so edge pixels use a
/// smaller neighborhood rather than padded values.
pub fn adaptive_threshold(gray: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut out = GrayImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }

    // integral[(y + 1) * (w + 1) + (x + 1)] = sum over rows 0..=y, cols 0..=x
    let iw = w as usize + 1;
    let mut integral = vec![0u64; iw * (h as usize + 1)];
    let raw = gray.as_raw();
    for y in 0..h as usize {
        let mut row_sum = 0u64;
        for x in 0..w as usize {
            row_sum += u64::from(raw[y * w as usize + x]);
            integral[(y + 1) * iw + (x + 1)] = integral[y * iw + (x + 1)] + row_sum;
        }
    }

    let radius = i64::from(block_size / 2);
    for y in 0..i64::from(h) {
        let top = (y - radius).max(0) as usize;
        let bottom = ((y + radius).min(i64::from(h) - 1) + 1) as usize;
        for x in 0..i64::from(w) {
            let left = (x - radius).max(0) as usize;
            let right = ((x + radius).min(i64::from(w) - 1) + 1) as usize;

            let sum = integral[bottom * iw + right] + integral[top * iw + left]
                - integral[top * iw + right]
                - integral[bottom * iw + left];
            let count = ((bottom - top) * (right - left)) as u64;
            let mean = (sum / count) as i32;

            let value = i32::from(raw[y as usize * w as usize + x as usize]);
            let pixel: u8 = if value > mean - offset { 255 } else { 0 };
            out.put_pixel(x as u32, y as u32, Luma([pixel]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_and_half(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, _| if x < w / 2 { Luma([0]) } else { Luma([255]) })
    }

    #[test]
    fn uniform_image_has_no_edges() {
        let img = GrayImage::from_pixel(64, 64, Luma([200]));
        assert_eq!(edge_density(&img), 0.0);
    }

    #[test]
    fn sharp_boundary_produces_some_edges() {
        let img = half_and_half(64, 64);
        let density = edge_density(&img);
        assert!(density > 0.0, "step edge must be detected, got {density}");
        assert!(density < 0.5, "edges should be a thin line, got {density}");
    }

    #[test]
    fn empty_image_density_is_zero() {
        let img = GrayImage::new(0, 0);
        assert_eq!(edge_density(&img), 0.0);
    }

    #[test]
    fn uniform_regions_threshold_to_white() {
        // With a positive offset, a pixel equal to its neighborhood mean
        // stays above (mean - offset), so flat regions come out white.
        for value in [0u8, 128, 255] {
            let img = GrayImage::from_pixel(32, 32, Luma([value]));
            let out = adaptive_threshold(&img, ADAPTIVE_BLOCK_SIZE, ADAPTIVE_OFFSET);
            assert!(
                out.pixels().all(|p| p[0] == 255),
                "uniform {value} image must binarize to white"
            );
        }
    }

    #[test]
    fn dark_pixels_near_a_bright_region_go_black() {
        let img = half_and_half(20, 20);
        let out = adaptive_threshold(&img, ADAPTIVE_BLOCK_SIZE, ADAPTIVE_OFFSET);

        // Dark pixel whose window straddles the boundary: mean is pulled up
        // by the white half, so the pixel drops to black.
        assert_eq!(out.get_pixel(9, 10)[0], 0);
        // Deep inside the dark half the window is uniform: white.
        assert_eq!(out.get_pixel(0, 10)[0], 255);
        // Deep inside the bright half: white.
        assert_eq!(out.get_pixel(19, 10)[0], 255);
    }

    #[test]
    fn threshold_preserves_dimensions() {
        let img = GrayImage::new(17, 5);
        let out = adaptive_threshold(&img, ADAPTIVE_BLOCK_SIZE, ADAPTIVE_OFFSET);
        assert_eq!(out.dimensions(), (17, 5));
    }
}
