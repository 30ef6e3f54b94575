//! Digit classification.
//!
//! A small fully-connected network reads binarized 16×16 cell tiles and
//! produces a digit (0 = blank). Training data is synthesized on demand
//! ([`synth`]), the trained session persists to a little-endian binary
//! artifact ([`artifact::DEFAULT_PATH`]), and the adaptive thresholder
//! ([`threshold`]) preprocesses both training and camera tiles.

mod artifact;
mod network;
pub mod synth;
pub mod threshold;

pub use artifact::DEFAULT_PATH as ARTIFACT_PATH;
pub use network::{NeuralNetwork, TrainConfig, TrainingSample};
pub use threshold::{binarize, shuffle_edge_pixels, INFERENCE_THRESHOLD};
