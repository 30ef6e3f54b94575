//! Histogram and Otsu threshold selection.

use crate::frame::Image;

/// 256-bin histogram of channel 0, normalized so the bins sum to 1.
pub(crate) fn histogram(image: &Image, bins: &mut Vec<f32>) {
    bins.clear();
    bins.resize(256, 0.0);

    let pixels = image.pixel_count();
    if pixels == 0 {
        return;
    }
    for i in 0..pixels {
        bins[image.data[i * 3] as usize] += 1.0;
    }
    let divisor = 1.0 / pixels as f32;
    for bin in bins.iter_mut() {
        *bin *= divisor;
    }
}

/// Otsu's between-class variance maximization over a normalized histogram.
///
/// Uses the cumulative-sum formulation of Digital Image Processing 3rd ed.,
/// §10.3.3. Ties resolve to the integer mean of all tying thresholds.
pub(crate) fn otsu_threshold(histogram: &[f32]) -> u8 {
    debug_assert_eq!(histogram.len(), 256);

    let global_mean: f32 = histogram
        .iter()
        .enumerate()
        .map(|(value, &p)| p * value as f32)
        .sum();

    let mut cumulative_sum = 0.0f32;
    let mut cumulative_mean = 0.0f32;
    let mut best_variance = 0.0f32;
    let mut tied: Vec<u32> = Vec::new();
    for (value, &p) in histogram.iter().enumerate() {
        cumulative_sum += p;
        cumulative_mean += p * value as f32;

        let numerator = global_mean * cumulative_sum - cumulative_mean;
        let denominator = cumulative_sum * (1.0 - cumulative_sum);
        let variance = if denominator == 0.0 {
            0.0
        } else {
            numerator * numerator / denominator
        };

        if variance > best_variance {
            best_variance = variance;
            tied.clear();
            tied.push(value as u32);
        } else if variance == best_variance {
            tied.push(value as u32);
        }
    }

    (tied.iter().sum::<u32>() / tied.len() as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::uniform_image;

    #[test]
    fn histogram_counts_and_normalizes() {
        let mut image = uniform_image(4, 1, 10);
        let index = image.index(2, 0);
        image.data[index] = 200;
        let mut bins = Vec::new();
        histogram(&image, &mut bins);
        assert!((bins[10] - 0.75).abs() < 1e-6);
        assert!((bins[200] - 0.25).abs() < 1e-6);
        assert!((bins.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn otsu_separates_a_bimodal_histogram() {
        let mut bins = vec![0.0f32; 256];
        bins[40] = 0.6;
        bins[41] = 0.05;
        bins[220] = 0.35;
        let threshold = otsu_threshold(&bins);
        assert!(threshold > 41 && threshold < 220, "threshold {threshold}");
    }

    #[test]
    fn otsu_ties_resolve_to_the_mean_index() {
        // Two equal spikes: the between-class variance is flat across the
        // whole valley, so every k in [64, 191] ties for the maximum.
        let mut bins = vec![0.0f32; 256];
        bins[64] = 0.5;
        bins[192] = 0.5;
        assert_eq!(otsu_threshold(&bins), 127);
    }

    #[test]
    fn otsu_on_flat_histogram_is_mid_range() {
        let bins = vec![1.0 / 256.0; 256];
        let threshold = otsu_threshold(&bins);
        assert!((threshold as i32 - 127).abs() <= 1);
    }
}
