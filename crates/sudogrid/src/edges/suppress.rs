//! Non-maximum suppression and hysteresis linking.

use std::f32::consts::PI;

use crate::frame::{clamp_u8, Image};

const STRONG: u8 = 255;

/// Thin the gradient to single-pixel candidates and link them.
///
/// Magnitudes are clamped to u8 without rescaling; discarding the headroom
/// above 255 favors strong lines. Each interior pixel is kept only when it
/// is a maximum along its gradient direction, quantized into four 45°-wide
/// buckets. Survivors at or above `high` seed an 8-neighbour flood fill
/// that promotes connected survivors at or above `low`; everything else is
/// dropped. The output encodes retained pixels as 255 in channel 0.
pub fn suppress_and_link(
    gradient: &[f32],
    width: u32,
    height: u32,
    output: &mut Image,
    low: u8,
    high: u8,
) {
    let w = width as usize;
    let h = height as usize;
    debug_assert_eq!(gradient.len(), w * h * 2);

    output.width = width;
    output.height = height;
    output.data.clear();
    output.data.resize(w * h * 3, 0);
    if w < 3 || h < 3 {
        return;
    }

    // Quantized copy of the gradient map.
    let mut magnitude = vec![0u8; w * h];
    let mut direction = vec![0u8; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            magnitude[i] = clamp_u8(gradient[i * 2]);
            let mut angle = gradient[i * 2 + 1];
            if angle < 0.0 {
                angle += PI;
            }
            direction[i] = (angle * 4.0 / PI).round() as u8 % 4;
        }
    }

    let mut weak = vec![false; w * h];
    let mut stack: Vec<usize> = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let value = magnitude[i];
            if value < low {
                continue;
            }

            // Neighbours along the gradient axis for this direction bucket.
            let (before, after) = match direction[i] {
                0 => (i - 1, i + 1),         // gradient along x: vertical line
                1 => (i - w - 1, i + w + 1), // right diagonal
                2 => (i - w, i + w),         // gradient along y: horizontal line
                _ => (i - w + 1, i + w - 1), // left diagonal
            };
            if value < magnitude[before] || value < magnitude[after] {
                continue;
            }

            if value >= high {
                output.data[i * 3] = STRONG;
                stack.push(i);
            } else {
                weak[i] = true;
            }
        }
    }

    // Hysteresis: promote weak pixels 8-connected to a strong pixel.
    while let Some(i) = stack.pop() {
        let x = i % w;
        let y = i / w;
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let n = ny * w + nx;
                if weak[n] {
                    weak[n] = false;
                    output.data[n * 3] = STRONG;
                    stack.push(n);
                }
            }
        }
    }
}
