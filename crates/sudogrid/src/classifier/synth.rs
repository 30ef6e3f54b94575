//! Deterministic synthetic training data.
//!
//! Training never sees a camera: digit grids are rendered through the
//! [`Renderer`] collaborator, perspective-warped through randomly jittered
//! corners the way a live frame would be, and binarized per cell. One
//! seeded [`StdRng`] drives every random choice, so a synthesis run is
//! reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::threshold::{binarize, shuffle_edge_pixels};
use super::TrainingSample;
use crate::frame::Image;
use crate::geometry::Point;
use crate::render::Renderer;

/// Warp target edge length for a whole puzzle.
pub const PUZZLE_SIZE: u32 = 144;
/// Edge length of one cell tile inside the warped puzzle.
pub const CELL_SIZE: u32 = 16;

/// Synthesis controls. Defaults match the production training run.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Number of random grids rendered per invocation.
    pub grids: u32,
    /// Randomly displace anti-aliased edge pixels of each tile.
    pub shuffle_edges: bool,
    /// Maximum corner jitter as a fraction of the glyph sheet size.
    pub corner_jitter: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            grids: 3000,
            shuffle_edges: true,
            corner_jitter: 0.04,
        }
    }
}

/// Render `config.grids` random grids, warp each sheet into a 144×144
/// puzzle image, and binarize its 81 cells into labelled, shuffled
/// training samples.
pub fn generate_training_set<R: Renderer>(
    renderer: &R,
    config: &SynthConfig,
    rng: &mut StdRng,
) -> Vec<TrainingSample> {
    let mut samples = Vec::with_capacity(config.grids as usize * 81);

    for _ in 0..config.grids {
        let mut digits = [0u8; 81];
        for digit in &mut digits {
            *digit = rng.gen_range(0..=9);
        }

        let sheet = renderer.render_puzzle_glyphs(&digits);
        let corners = jittered_corners(&sheet, config.corner_jitter, rng);
        let puzzle = renderer.extract_image(&sheet, &corners, PUZZLE_SIZE, PUZZLE_SIZE);

        for (cell, &label) in digits.iter().enumerate() {
            let tile = cut_tile(&puzzle, cell);
            let a = rng.gen_range(2.0..4.0);
            let mut input = binarize(&tile, CELL_SIZE as usize, CELL_SIZE as usize, a);
            if config.shuffle_edges {
                let keep = rng.gen_range(0.95..0.99);
                shuffle_edge_pixels(
                    &mut input,
                    CELL_SIZE as usize,
                    CELL_SIZE as usize,
                    keep,
                    rng,
                );
            }
            samples.push(TrainingSample { input, label });
        }
    }

    samples.shuffle(rng);
    samples
}

/// Copy channel 0 of the `cell`-th 16×16 tile (row-major) out of a warped
/// 144×144 puzzle image.
pub fn cut_tile(puzzle: &Image, cell: usize) -> Vec<u8> {
    debug_assert_eq!(puzzle.width, PUZZLE_SIZE);
    debug_assert_eq!(puzzle.height, PUZZLE_SIZE);
    debug_assert!(cell < 81);

    let column = (cell % 9) as u32;
    let row = (cell / 9) as u32;
    let mut tile = Vec::with_capacity((CELL_SIZE * CELL_SIZE) as usize);
    for y in row * CELL_SIZE..(row + 1) * CELL_SIZE {
        for x in column * CELL_SIZE..(column + 1) * CELL_SIZE {
            tile.push(puzzle.data[puzzle.index(x, y)]);
        }
    }
    tile
}

/// The sheet corners, each displaced by up to ±`jitter` of the sheet size.
fn jittered_corners(sheet: &Image, jitter: f32, rng: &mut StdRng) -> [Point; 4] {
    let width = (sheet.width - 1) as f32;
    let height = (sheet.height - 1) as f32;
    let range = jitter * sheet.width as f32;
    let mut displace = |value: f32, limit: f32| {
        if range > 0.0 {
            (value + rng.gen_range(-range..range)).clamp(0.0, limit)
        } else {
            value
        }
    };
    [
        Point {
            x: displace(0.0, width),
            y: displace(0.0, height),
        },
        Point {
            x: displace(width, width),
            y: displace(0.0, height),
        },
        Point {
            x: displace(width, width),
            y: displace(height, height),
        },
        Point {
            x: displace(0.0, width),
            y: displace(height, height),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SoftwareRenderer;
    use rand::SeedableRng;

    fn small_config() -> SynthConfig {
        SynthConfig {
            grids: 2,
            ..SynthConfig::default()
        }
    }

    #[test]
    fn generates_81_samples_per_grid() {
        let mut rng = StdRng::seed_from_u64(3);
        let samples = generate_training_set(&SoftwareRenderer, &small_config(), &mut rng);
        assert_eq!(samples.len(), 162);
        for sample in &samples {
            assert_eq!(sample.input.len(), 256);
            assert!(sample.label <= 9);
            assert!(sample.input.iter().all(|&v| v == 0.0 || v == 1.0));
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_set() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let first = generate_training_set(&SoftwareRenderer, &small_config(), &mut rng1);
        let second = generate_training_set(&SoftwareRenderer, &small_config(), &mut rng2);
        assert_eq!(first, second);
    }

    #[test]
    fn blank_cells_binarize_to_paper() {
        // A grid of all blanks: every tile is pure paper.
        let sheet = SoftwareRenderer.render_puzzle_glyphs(&[0u8; 81]);
        let corners = [
            Point { x: 0.0, y: 0.0 },
            Point {
                x: (sheet.width - 1) as f32,
                y: 0.0,
            },
            Point {
                x: (sheet.width - 1) as f32,
                y: (sheet.height - 1) as f32,
            },
            Point {
                x: 0.0,
                y: (sheet.height - 1) as f32,
            },
        ];
        let puzzle = SoftwareRenderer.extract_image(&sheet, &corners, PUZZLE_SIZE, PUZZLE_SIZE);
        for cell in [0usize, 40, 80] {
            let tile = cut_tile(&puzzle, cell);
            let input = binarize(&tile, CELL_SIZE as usize, CELL_SIZE as usize, 2.0);
            assert!(input.iter().all(|&v| v == 1.0), "cell {cell} not paper");
        }
    }

    #[test]
    fn cut_tile_addresses_row_major_cells() {
        let mut puzzle = Image::new(PUZZLE_SIZE, PUZZLE_SIZE);
        // Mark the top-left pixel of cell 10 (row 1, column 1).
        let index = puzzle.index(CELL_SIZE, CELL_SIZE);
        puzzle.data[index] = 77;
        let tile = cut_tile(&puzzle, 10);
        assert_eq!(tile[0], 77);
        assert_eq!(tile.len(), 256);
    }
}
