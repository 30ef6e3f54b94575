//! Canny edge extraction.
//!
//! [`Canny`] turns a greyscale [`Image`] into a binary edge mask: channel 0
//! is 255 on retained edge pixels and 0 elsewhere. The stages run in fixed
//! order — Gaussian blur, auto-levels, Sobel gradient, Otsu-derived double
//! thresholding with non-maximum suppression, hysteresis linking, and one
//! pass of morphological line thinning.
//!
//! The extractor never signals failure: an empty or near-uniform input
//! simply produces an all-zero mask, which downstream stages tolerate.

mod blur;
mod levels;
mod sobel;
mod suppress;
mod thinning;
mod threshold;

pub use blur::gaussian_blur;
pub use levels::auto_levels;
pub use sobel::sobel_gradient;
pub use suppress::suppress_and_link;
pub use thinning::thin_lines;

pub(crate) use threshold::{histogram, otsu_threshold};

use crate::frame::Image;

/// Reusable Canny pipeline with owned scratch buffers.
///
/// The intermediate images and the gradient map are kept on the struct so
/// per-frame processing does not reallocate.
pub struct Canny {
    radius: f32,
    blurred: Image,
    levelled: Image,
    gradient: Vec<f32>,
    histogram: Vec<f32>,
    suppressed: Image,
}

impl Canny {
    pub fn with_radius(gaussian_blur_radius: f32) -> Self {
        Self {
            radius: gaussian_blur_radius,
            blurred: Image::default(),
            levelled: Image::default(),
            gradient: Vec::new(),
            histogram: Vec::new(),
            suppressed: Image::default(),
        }
    }

    /// Extract edges from a greyscale image into `output`.
    pub fn process(&mut self, input: &Image, output: &mut Image) {
        gaussian_blur(input, &mut self.blurred, self.radius);
        auto_levels(&self.blurred, &mut self.levelled, self.radius as u32 + 1);
        sobel_gradient(&self.levelled, &mut self.gradient);

        histogram(&self.levelled, &mut self.histogram);
        let high = otsu_threshold(&self.histogram);
        let low = high / 2;
        suppress_and_link(
            &self.gradient,
            input.width,
            input.height,
            &mut self.suppressed,
            low,
            high,
        );
        thin_lines(&self.suppressed, output);
    }
}
