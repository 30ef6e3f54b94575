//! 3×3 Sobel gradient.

use crate::frame::Image;

/// Compute the Sobel gradient of channel 0.
///
/// Writes one interleaved `(magnitude, angle)` pair per pixel in row-major
/// order: magnitude ≥ 0 and angle ∈ (−π, π] from `atan2`. The one-pixel
/// border keeps `(0, 0)`.
pub fn sobel_gradient(image: &Image, gradient: &mut Vec<f32>) {
    let width = image.width as usize;
    let height = image.height as usize;

    gradient.clear();
    gradient.resize(width * height * 2, 0.0);
    if width < 3 || height < 3 {
        return;
    }

    let row = width * 3;
    let data = &image.data;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let i = (y * width + x) * 3;
            let horizontal = -(data[i - row - 3] as f32) + data[i - row + 3] as f32
                - 2.0 * data[i - 3] as f32
                + 2.0 * data[i + 3] as f32
                - data[i + row - 3] as f32
                + data[i + row + 3] as f32;
            let vertical = -(data[i - row - 3] as f32)
                - 2.0 * data[i - row] as f32
                - data[i - row + 3] as f32
                + data[i + row - 3] as f32
                + 2.0 * data[i + row] as f32
                + data[i + row + 3] as f32;

            let out = (y * width + x) * 2;
            gradient[out] = horizontal.hypot(vertical);
            gradient[out + 1] = vertical.atan2(horizontal);
        }
    }
}
