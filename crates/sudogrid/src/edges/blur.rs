//! Separable windowed Gaussian blur.

use crate::frame::{clamp_u8, Image};

/// Windowed Gaussian weights over `2·⌊radius⌋ + 3` taps.
///
/// The Gaussian value at the window edge is subtracted so the kernel falls
/// to zero at ±radius (Real-Time Rendering's "Gaussian cook" windowing),
/// then the weights are clamped non-negative and normalized to sum 1.
fn gaussian_kernel(radius: f32) -> (usize, Vec<f32>) {
    let sigma = radius / 3.0;
    let sigma2_times2 = 2.0 * sigma * sigma;
    let edge = (-(radius * radius) / sigma2_times2).exp();

    let weight_radius = radius as usize + 1;
    let count = weight_radius * 2 + 1;
    let mut weights = vec![0.0f32; count];
    for (i, weight) in weights.iter_mut().enumerate() {
        let x = i as f32 - weight_radius as f32;
        if x.abs() <= radius {
            *weight = ((-(x * x) / sigma2_times2).exp() - edge).max(0.0);
        }
    }

    let sum: f32 = weights.iter().sum();
    if sum > 0.0 {
        for weight in &mut weights {
            *weight /= sum;
        }
    }
    (weight_radius, weights)
}

/// Separable Gaussian blur over all three channels.
///
/// Pixels within `⌊radius⌋ + 1` of any border are left at zero; the lost
/// aperture is accounted for by the auto-levels stage that follows.
pub fn gaussian_blur(input: &Image, output: &mut Image, radius: f32) {
    output.match_size(input);

    let (weight_radius, weights) = gaussian_kernel(radius);
    let width = input.width as usize;
    let height = input.height as usize;
    if width <= weight_radius * 2 || height <= weight_radius * 2 {
        return;
    }

    let mut temp = vec![0u8; input.data.len()];

    // Horizontal pass into the scratch buffer.
    for y in weight_radius..height - weight_radius {
        for x in weight_radius..width - weight_radius {
            let mut sum = [0.0f32; 3];
            for (w, &weight) in weights.iter().enumerate() {
                let index = (y * width + x + w - weight_radius) * 3;
                sum[0] += input.data[index] as f32 * weight;
                sum[1] += input.data[index + 1] as f32 * weight;
                sum[2] += input.data[index + 2] as f32 * weight;
            }
            let index = (y * width + x) * 3;
            temp[index] = clamp_u8(sum[0]);
            temp[index + 1] = clamp_u8(sum[1]);
            temp[index + 2] = clamp_u8(sum[2]);
        }
    }

    // Vertical pass into the output.
    for y in weight_radius..height - weight_radius {
        for x in weight_radius..width - weight_radius {
            let mut sum = [0.0f32; 3];
            for (w, &weight) in weights.iter().enumerate() {
                let index = ((y + w - weight_radius) * width + x) * 3;
                sum[0] += temp[index] as f32 * weight;
                sum[1] += temp[index + 1] as f32 * weight;
                sum[2] += temp[index + 2] as f32 * weight;
            }
            let index = (y * width + x) * 3;
            output.data[index] = clamp_u8(sum[0]);
            output.data[index + 1] = clamp_u8(sum[1]);
            output.data[index + 2] = clamp_u8(sum[2]);
        }
    }
}
