//! Contrast stretch ahead of gradient thresholding.

use crate::frame::{clamp_u8, Image};

/// Fraction of the value range clipped off each tail. Saturating the
/// extremes raises the contrast the Otsu threshold has to work with.
const CLIPPING: f32 = 0.1;

/// Auto-levels with 10% tail clipping on each end.
///
/// The value range is measured inside the rectangle that excludes
/// `ignore_padding` pixels on every side, so the zeroed blur aperture does
/// not drag the range down; the remap is then applied to the whole image.
/// A range too narrow to stretch passes the input through unchanged.
pub fn auto_levels(input: &Image, output: &mut Image, ignore_padding: u32) {
    output.match_size(input);

    let pad = ignore_padding as usize;
    let width = input.width as usize;
    let height = input.height as usize;
    if width < pad * 2 || height < pad * 2 {
        output.data.copy_from_slice(&input.data);
        return;
    }

    let mut min_value = 255u8;
    let mut max_value = 0u8;
    for y in pad..height - pad {
        for x in pad..width - pad {
            let value = input.data[(y * width + x) * 3];
            min_value = min_value.min(value);
            max_value = max_value.max(value);
        }
    }

    let delta = (max_value as f32 - min_value as f32) / 255.0 - CLIPPING * 2.0;
    if delta <= 0.0 {
        output.data.copy_from_slice(&input.data);
        return;
    }

    for i in 0..input.pixel_count() {
        let index = i * 3;
        let value = clamp_u8((input.data[index] as f32 - min_value as f32) / delta);
        output.data[index] = value;
        output.data[index + 1] = value;
        output.data[index + 2] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::uniform_image;

    #[test]
    fn narrow_range_passes_through() {
        let input = uniform_image(16, 16, 128);
        let mut output = Image::default();
        auto_levels(&input, &mut output, 2);
        assert_eq!(output.data, input.data);
    }

    #[test]
    fn full_range_saturates_tails() {
        let mut input = uniform_image(16, 16, 0);
        for x in 8..16 {
            for y in 0..16 {
                let index = input.index(x, y);
                input.data[index] = 200;
            }
        }
        let mut output = Image::default();
        auto_levels(&input, &mut output, 2);

        // delta = 200/255 - 0.2 ≈ 0.584; 200/delta saturates to 255.
        assert_eq!(output.data[output.index(12, 8)], 255);
        assert_eq!(output.data[output.index(2, 8)], 0);
    }
}
