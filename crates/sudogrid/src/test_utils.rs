//! Shared builders for synthetic test imagery.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::frame::Image;

/// The classic Will Shortz "hard" board used across the solver tests.
pub(crate) const HARD_PUZZLE: [u8; 81] = [
    5, 3, 0, 0, 7, 0, 0, 0, 0, //
    6, 0, 0, 1, 9, 5, 0, 0, 0, //
    0, 9, 8, 0, 0, 0, 0, 6, 0, //
    8, 0, 0, 0, 6, 0, 0, 0, 3, //
    4, 0, 0, 8, 0, 3, 0, 0, 1, //
    7, 0, 0, 0, 2, 0, 0, 0, 6, //
    0, 6, 0, 0, 0, 0, 2, 8, 0, //
    0, 0, 0, 4, 1, 9, 0, 0, 5, //
    0, 0, 0, 0, 8, 0, 0, 7, 9,
];

pub(crate) const HARD_SOLUTION: [u8; 81] = [
    5, 3, 4, 6, 7, 8, 9, 1, 2, //
    6, 7, 2, 1, 9, 5, 3, 4, 8, //
    1, 9, 8, 3, 4, 2, 5, 6, 7, //
    8, 5, 9, 7, 6, 1, 4, 2, 3, //
    4, 2, 6, 8, 5, 3, 7, 9, 1, //
    7, 1, 3, 9, 2, 4, 8, 5, 6, //
    9, 6, 1, 5, 3, 7, 2, 8, 4, //
    2, 8, 7, 4, 1, 9, 6, 3, 5, //
    3, 4, 5, 2, 8, 6, 1, 7, 9,
];

/// Channel-equal greyscale frame filled with `value`.
pub(crate) fn uniform_image(width: u32, height: u32, value: u8) -> Image {
    let mut image = Image::new(width, height);
    image.data.fill(value);
    image
}

/// Seeded random greyscale frame.
pub(crate) fn noise_image(width: u32, height: u32, seed: u64) -> Image {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut image = Image::new(width, height);
    for i in 0..image.pixel_count() {
        let value: u8 = rng.gen();
        image.data[i * 3] = value;
        image.data[i * 3 + 1] = value;
        image.data[i * 3 + 2] = value;
    }
    image
}

/// Single-pixel edge mask with ten vertical and ten horizontal lines,
/// evenly spaced by `spacing` starting at `offset`.
pub(crate) fn grid_edge_mask(width: u32, height: u32, offset: u32, spacing: u32) -> Image {
    let mut image = Image::new(width, height);
    for step in 0..10 {
        let position = offset + step * spacing;
        for y in 0..height {
            let index = image.index(position, y);
            image.data[index] = 255;
        }
        for x in 0..width {
            let index = image.index(x, position);
            image.data[index] = 255;
        }
    }
    image
}
