//! Dense RGB raster shared by every pipeline stage.

/// A dense row-major RGB byte raster.
///
/// Greyscale content is stored with all three channels equal so every stage
/// can read channel 0 as luma without a separate single-channel type.
/// Invariant: `data.len() == width * height * 3`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Image {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
        }
    }

    /// Resize to the dimensions of `other` and zero-fill the buffer.
    ///
    /// Scratch images are reused across frames; zeroing keeps stale content
    /// from a previous frame out of border regions the stages never write.
    pub fn match_size(&mut self, other: &Image) {
        self.width = other.width;
        self.height = other.height;
        self.data.clear();
        self.data
            .resize(other.width as usize * other.height as usize * 3, 0);
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Byte offset of the pixel at `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Copy from an `image` crate RGB buffer.
    pub fn from_rgb(src: &image::RgbImage) -> Self {
        Self {
            width: src.width(),
            height: src.height(),
            data: src.as_raw().clone(),
        }
    }

    /// Copy from an `image` crate greyscale buffer, replicating channels.
    pub fn from_gray(src: &image::GrayImage) -> Self {
        let mut out = Self::new(src.width(), src.height());
        for (i, pixel) in src.as_raw().iter().enumerate() {
            out.data[i * 3] = *pixel;
            out.data[i * 3 + 1] = *pixel;
            out.data[i * 3 + 2] = *pixel;
        }
        out
    }

    /// Channel 0 as an `image` crate greyscale buffer.
    pub fn to_gray(&self) -> image::GrayImage {
        let luma: Vec<u8> = (0..self.pixel_count()).map(|i| self.data[i * 3]).collect();
        image::GrayImage::from_raw(self.width, self.height, luma)
            .unwrap_or_else(|| image::GrayImage::new(self.width, self.height))
    }

    pub fn to_rgb(&self) -> image::RgbImage {
        image::RgbImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| image::RgbImage::new(self.width, self.height))
    }
}

#[inline]
pub(crate) fn clamp_u8(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// BT.601 luma conversion; the greyscale result keeps all channels equal.
pub fn rgb_to_greyscale(rgb: &Image, greyscale: &mut Image) {
    greyscale.match_size(rgb);
    for i in 0..rgb.pixel_count() {
        let index = i * 3;
        let luma = 0.299 * rgb.data[index] as f32
            + 0.587 * rgb.data[index + 1] as f32
            + 0.114 * rgb.data[index + 2] as f32;
        let luma = clamp_u8(luma);
        greyscale.data[index] = luma;
        greyscale.data[index + 1] = luma;
        greyscale.data[index + 2] = luma;
    }
}

/// Saturating per-channel add, used to overlay an edge mask on a frame.
pub fn blend_add(image1: &Image, image2: &Image, output: &mut Image) {
    debug_assert_eq!(image1.width, image2.width);
    debug_assert_eq!(image1.height, image2.height);

    output.match_size(image1);
    for (out, (&a, &b)) in output
        .data
        .iter_mut()
        .zip(image1.data.iter().zip(image2.data.iter()))
    {
        *out = a.saturating_add(b);
    }
}
