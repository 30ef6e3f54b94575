//! Adaptive binary thresholding of cell tiles.

use rand::Rng;

/// Local-deviation multiplier used when classifying camera tiles. Training
/// draws a fresh multiplier in [2, 4] per sample instead.
pub const INFERENCE_THRESHOLD: f32 = 2.0;

/// Binarize a greyscale tile into classifier input.
///
/// A pixel goes high when it exceeds `a` local standard deviations over a
/// replicate-clamped 3×3 neighbourhood AND 95% of the whole-tile mean.
/// Paper reads as 1.0, ink as 0.0.
pub fn binarize(tile: &[u8], width: usize, height: usize, a: f32) -> Vec<f32> {
    debug_assert_eq!(tile.len(), width * height);

    let global_mean = tile.iter().map(|&v| v as f32).sum::<f32>() / tile.len().max(1) as f32;
    let mut out = vec![0.0f32; tile.len()];

    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0f32;
            let mut sum_squares = 0.0f32;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = (x as i64 + dx).clamp(0, width as i64 - 1) as usize;
                    let ny = (y as i64 + dy).clamp(0, height as i64 - 1) as usize;
                    let value = tile[ny * width + nx] as f32;
                    sum += value;
                    sum_squares += value * value;
                }
            }
            let local_mean = sum / 9.0;
            let local_variance = (sum_squares / 9.0 - local_mean * local_mean).max(0.0);

            let center = tile[y * width + x] as f32;
            if center > a * local_variance.sqrt() && center > 0.95 * global_mean {
                out[y * width + x] = 1.0;
            }
        }
    }
    out
}

/// Jitter anti-aliased glyph boundaries of a binarized tile.
///
/// Edge pixels (4-neighbour Laplacian magnitude ≥ 1) are, with probability
/// `1 − keep`, copied onto a uniformly chosen diagonal neighbour while the
/// original is inverted. Regularises training against the razor-sharp
/// edges of synthetic glyphs.
pub fn shuffle_edge_pixels<R: Rng>(
    tile: &mut [f32],
    width: usize,
    height: usize,
    keep: f32,
    rng: &mut R,
) {
    debug_assert_eq!(tile.len(), width * height);
    if width < 3 || height < 3 {
        return;
    }

    const DIAGONALS: [(i64, i64); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];
    let snapshot = tile.to_vec();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let i = y * width + x;
            let laplacian = 4.0 * snapshot[i]
                - snapshot[i - 1]
                - snapshot[i + 1]
                - snapshot[i - width]
                - snapshot[i + width];
            if laplacian.abs() < 1.0 {
                continue;
            }
            if rng.gen::<f32>() >= 1.0 - keep {
                continue;
            }

            let (dx, dy) = DIAGONALS[rng.gen_range(0..DIAGONALS.len())];
            let j = (y as i64 + dy) as usize * width + (x as i64 + dx) as usize;
            tile[j] = snapshot[i];
            tile[i] = 1.0 - snapshot[i];
        }
    }
}
