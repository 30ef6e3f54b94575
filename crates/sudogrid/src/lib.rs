//! sudogrid — vision and reasoning core for an augmented-reality Sudoku solver.
//!
//! Given one RGB camera frame, the pipeline either recovers a printed 9×9
//! Sudoku grid — four outer corners, 81 decoded digits, and their solution —
//! or reports a negative result for that frame. The stages are:
//!
//! 1. **Edges** – Canny edge extraction (Gaussian blur, auto-levels, Sobel
//!    gradient, Otsu-derived double thresholding, non-maximum suppression,
//!    hysteresis linking, line thinning).
//! 2. **Hough** – (θ, ρ) line voting and sliding-window peak extraction.
//! 3. **Finder** – orientation clustering, evenly-spaced ten-line runs,
//!    perpendicular-pair selection, and outer-corner extraction.
//! 4. **Classifier** – a small feed-forward network over binarized 16×16
//!    cell tiles, trained on deterministic synthetic glyph sheets.
//! 5. **Solver** – backtracking constraint search behind a recently-used
//!    cache and a single background solve task.
//!
//! Camera capture, GPU drawing, and font rasterization are collaborator
//! concerns behind the [`Camera`] and [`Renderer`] traits; the crate ships
//! CPU reference implementations for tests, training synthesis, and the CLI.
//!
//! Per-frame failures (no edges, no grid, unreadable digits, too few clues)
//! are ordinary outcomes reported as absent optionals, never as errors.

pub mod classifier;
pub mod edges;
pub mod finder;
pub mod frame;
pub mod geometry;
pub mod homography;
pub mod hough;
pub mod pipeline;
pub mod render;
pub mod solver;

#[cfg(test)]
pub(crate) mod test_utils;

pub use classifier::{NeuralNetwork, TrainConfig, TrainingSample};
pub use finder::{FinderConfig, PuzzleFinder};
pub use frame::Image;
pub use geometry::{Line, Point};
pub use homography::Homography;
pub use hough::{HoughTransform, PeakConfig};
pub use pipeline::{FramePipeline, FrameResult};
pub use render::{Camera, Renderer, SoftwareRenderer};
pub use solver::{CachedPuzzleSolver, Game};
