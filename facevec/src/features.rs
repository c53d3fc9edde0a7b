//! Hand-crafted face descriptors over a square luma patch.
//!
//! All accumulation is done in f64 and every loop runs in a fixed order,
//! so results are bit-identical for identical input.

use image::DynamicImage;
use image::imageops::{self, FilterType};

/// Number of uniform LBP bins: 58 uniform 8-bit patterns plus one
/// shared bin for all non-uniform patterns.
pub const LBP_BINS: usize = 59;

const HOG_EPS: f64 = 1e-6;

/// Neighbour offsets in clockwise order starting top-left.
const LBP_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Square grayscale patch with values in [0, 255], row-major.
#[derive(Debug, Clone)]
pub struct LumaPatch {
    pub size: usize,
    pub pixels: Vec<f64>,
}

impl LumaPatch {
    /// Builds a patch from raw row-major values. Panics if the length is not `size * size`.
    pub fn from_pixels(size: usize, pixels: Vec<f64>) -> Self {
        assert_eq!(pixels.len(), size * size, "facevec: patch length mismatch");
        Self { size, pixels }
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f64 {
        self.pixels[y * self.size + x]
    }

    /// Population standard deviation of the pixel values.
    pub fn std_dev(&self) -> f64 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let n = self.pixels.len() as f64;
        let mean = self.pixels.iter().sum::<f64>() / n;
        let var = self.pixels.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / n;
        var.sqrt()
    }
}

/// Converts an image to a `size x size` luma patch with a triangle filter.
pub fn to_luma(img: &DynamicImage, size: u32) -> LumaPatch {
    let gray = img.to_luma8();
    let resized = imageops::resize(&gray, size, size, FilterType::Triangle);
    let pixels = resized.pixels().map(|p| p.0[0] as f64).collect();
    LumaPatch::from_pixels(size as usize, pixels)
}

/// Histogram of oriented gradients.
///
/// Central-difference gradients, unsigned orientation in [0, 180) split
/// into `bins` bins with linear interpolation between neighbouring bins,
/// magnitude-weighted votes, one histogram per `cell x cell` block, each
/// histogram L2-normalized. Output length is `(size / cell)^2 * bins`.
pub fn hog(patch: &LumaPatch, cell: usize, bins: usize) -> Vec<f32> {
    let n = patch.size;
    let cells = n / cell;
    let bin_width = 180.0 / bins as f64;
    let mut hist = vec![0.0f64; cells * cells * bins];

    for y in 0..cells * cell {
        for x in 0..cells * cell {
            let gx = patch.at((x + 1).min(n - 1), y) - patch.at(x.saturating_sub(1), y);
            let gy = patch.at(x, (y + 1).min(n - 1)) - patch.at(x, y.saturating_sub(1));
            let mag = (gx * gx + gy * gy).sqrt();
            if mag == 0.0 {
                continue;
            }

            let mut angle = gy.atan2(gx).to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }
            if angle >= 180.0 {
                angle -= 180.0;
            }

            let pos = angle / bin_width - 0.5;
            let lo = pos.floor();
            let frac = pos - lo;
            let lo_bin = (lo as isize).rem_euclid(bins as isize) as usize;
            let hi_bin = (lo_bin + 1) % bins;

            let base = ((y / cell) * cells + x / cell) * bins;
            hist[base + lo_bin] += mag * (1.0 - frac);
            hist[base + hi_bin] += mag * frac;
        }
    }

    let mut out = Vec::with_capacity(hist.len());
    for h in hist.chunks(bins) {
        let norm = (h.iter().map(|v| v * v).sum::<f64>() + HOG_EPS * HOG_EPS).sqrt();
        out.extend(h.iter().map(|v| (v / norm) as f32));
    }
    out
}

/// Maps every 8-bit LBP code to its uniform bin index.
///
/// Codes with at most two circular 0/1 transitions get indices 0..58 in
/// ascending code order; all others map to bin 58.
pub fn uniform_lbp_table() -> [u8; 256] {
    let mut table = [(LBP_BINS - 1) as u8; 256];
    let mut next = 0u8;
    for code in 0u32..256 {
        let rotated = ((code << 1) | (code >> 7)) & 0xFF;
        if (code ^ rotated).count_ones() <= 2 {
            table[code as usize] = next;
            next += 1;
        }
    }
    table
}

/// Uniform local binary pattern histograms over a `grid x grid` layout.
///
/// Border pixels are skipped. Each region histogram sums to 1 (or is all
/// zeros for an empty region). Output length is `grid^2 * 59`.
pub fn lbp(patch: &LumaPatch, grid: usize) -> Vec<f32> {
    let n = patch.size;
    let region = (n / grid).max(1);
    let table = uniform_lbp_table();
    let mut hist = vec![0.0f64; grid * grid * LBP_BINS];

    for y in 1..n.saturating_sub(1) {
        for x in 1..n.saturating_sub(1) {
            let center = patch.at(x, y);
            let mut code = 0usize;
            for (bit, (dx, dy)) in LBP_OFFSETS.iter().enumerate() {
                let nx = (x as isize + dx) as usize;
                let ny = (y as isize + dy) as usize;
                if patch.at(nx, ny) >= center {
                    code |= 1 << bit;
                }
            }
            let r = (y / region).min(grid - 1) * grid + (x / region).min(grid - 1);
            hist[r * LBP_BINS + table[code] as usize] += 1.0;
        }
    }

    let mut out = Vec::with_capacity(hist.len());
    for h in hist.chunks(LBP_BINS) {
        let total: f64 = h.iter().sum();
        if total > 0.0 {
            out.extend(h.iter().map(|v| (v / total) as f32));
        } else {
            out.extend(std::iter::repeat_n(0.0f32, LBP_BINS));
        }
    }
    out
}

/// L2-normalizes a vector to unit length in-place.
/// Uses f64 intermediate precision. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let mut norm: f64 = 0.0;
    for &x in v.iter() {
        norm += (x as f64) * (x as f64);
    }
    norm = norm.sqrt();
    if norm > 0.0 {
        let scale = (1.0 / norm) as f32;
        for x in v.iter_mut() {
            *x *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch_from_fn(size: usize, f: impl Fn(usize, usize) -> f64) -> LumaPatch {
        let mut pixels = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                pixels.push(f(x, y));
            }
        }
        LumaPatch::from_pixels(size, pixels)
    }

    #[test]
    fn uniform_table_has_58_patterns() {
        let table = uniform_lbp_table();
        let uniform = table.iter().filter(|&&b| (b as usize) < LBP_BINS - 1).count();
        assert_eq!(uniform, 58);
        assert_eq!(table[0], 0);
        assert_eq!(table[255], 57);
        // 0b01010101 has 8 transitions
        assert_eq!(table[0x55] as usize, LBP_BINS - 1);
    }

    #[test]
    fn hog_flat_patch_is_zero() {
        let p = patch_from_fn(16, |_, _| 128.0);
        let h = hog(&p, 8, 9);
        assert_eq!(h.len(), 2 * 2 * 9);
        assert!(h.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn hog_horizontal_edge_votes_ninety_degrees() {
        // Brightness increases downward: gradient points along +y (90 degrees).
        let p = patch_from_fn(8, |_, y| (y * 10) as f64);
        let h = hog(&p, 8, 9);
        // 90 / 20 - 0.5 = 4.0 exactly, so everything lands in bin 4.
        assert!((h[4] - 1.0).abs() < 1e-6, "bin 4 = {}", h[4]);
        for (i, v) in h.iter().enumerate() {
            if i != 4 {
                assert!(v.abs() < 1e-6, "bin {i} = {v}");
            }
        }
    }

    #[test]
    fn hog_distinguishes_orientation() {
        let vertical = patch_from_fn(16, |x, _| if (x / 2) % 2 == 0 { 0.0 } else { 255.0 });
        let horizontal = patch_from_fn(16, |_, y| if (y / 2) % 2 == 0 { 0.0 } else { 255.0 });
        assert_ne!(hog(&vertical, 8, 9), hog(&horizontal, 8, 9));
    }

    #[test]
    fn lbp_flat_patch_single_bin() {
        let p = patch_from_fn(16, |_, _| 42.0);
        let h = lbp(&p, 2);
        assert_eq!(h.len(), 4 * LBP_BINS);
        for region in h.chunks(LBP_BINS) {
            let sum: f32 = region.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
            // All neighbours equal the centre: code 255.
            assert_eq!(region[57], 1.0);
        }
    }

    #[test]
    fn std_dev_values() {
        let flat = patch_from_fn(4, |_, _| 7.0);
        assert_eq!(flat.std_dev(), 0.0);

        let checker = patch_from_fn(4, |x, y| if (x + y) % 2 == 0 { 0.0 } else { 100.0 });
        assert!((checker.std_dev() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn l2_normalize_unit() {
        let mut v = vec![3.0f32, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_zero() {
        let mut v = vec![0.0f32; 3];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0; 3]);
    }
}
