//! Per-frame orchestration.

use serde::Serialize;

use crate::classifier::synth::{cut_tile, CELL_SIZE, PUZZLE_SIZE};
use crate::classifier::{binarize, NeuralNetwork, INFERENCE_THRESHOLD};
use crate::edges::Canny;
use crate::finder::PuzzleFinder;
use crate::frame::{rgb_to_greyscale, Image};
use crate::geometry::Point;
use crate::hough::HoughTransform;
use crate::render::Renderer;
use crate::solver::CachedPuzzleSolver;

/// Outcome of one frame.
///
/// Fields go absent at the stage where the chain stopped; that is the
/// expected result for frames without a readable grid, never an error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameResult {
    /// Outer grid corners (TL, TR, BR, BL) in frame coordinates.
    pub corners: Option<[Point; 4]>,
    /// The 81 decoded digits, 0 for blank cells.
    pub digits: Option<Vec<u8>>,
    /// The completed board, once the solver has one.
    pub solution: Option<Vec<u8>>,
}

/// One-frame pipeline with scratch buffers reused across frames.
///
/// Stages run sequentially on the calling thread; the only concurrency
/// underneath is the classifier's per-neuron fan-out and the solver's
/// single background task.
pub struct FramePipeline {
    canny: Canny,
    greyscale: Image,
    edges: Image,
    hough: Option<HoughTransform>,
    frame_size: (u32, u32),
    /// Finder state stays inspectable for overlays.
    pub finder: PuzzleFinder,
    classifier: NeuralNetwork,
    solver: CachedPuzzleSolver,
}

impl FramePipeline {
    /// Default Gaussian radius of the edge extractor.
    pub const EDGE_RADIUS: f32 = 5.0;

    pub fn new(classifier: NeuralNetwork) -> Self {
        Self {
            canny: Canny::with_radius(Self::EDGE_RADIUS),
            greyscale: Image::default(),
            edges: Image::default(),
            hough: None,
            frame_size: (0, 0),
            finder: PuzzleFinder::default(),
            classifier,
            solver: CachedPuzzleSolver::new(),
        }
    }

    /// Run the full chain on one RGB frame.
    pub fn process(&mut self, frame: &Image, renderer: &dyn Renderer) -> FrameResult {
        let mut result = FrameResult::default();
        if frame.width == 0
            || frame.height == 0
            || frame.data.len() != frame.pixel_count() * 3
        {
            tracing::debug!("skipping malformed frame");
            return result;
        }

        rgb_to_greyscale(frame, &mut self.greyscale);
        self.canny.process(&self.greyscale, &mut self.edges);

        if self.frame_size != (frame.width, frame.height) || self.hough.is_none() {
            self.hough = Some(HoughTransform::sized_for(frame.width, frame.height));
            self.frame_size = (frame.width, frame.height);
        }
        let Some(hough) = self.hough.as_mut() else {
            return result;
        };
        hough.accumulate(&self.edges);

        let Some(corners) = self.finder.find(frame.width, frame.height, hough) else {
            tracing::debug!("no grid this frame");
            return result;
        };
        result.corners = Some(corners);

        let puzzle = renderer.extract_image(&self.greyscale, &corners, PUZZLE_SIZE, PUZZLE_SIZE);
        let mut digits = vec![0u8; 81];
        for (cell, digit) in digits.iter_mut().enumerate() {
            let tile = cut_tile(&puzzle, cell);
            let input = binarize(
                &tile,
                CELL_SIZE as usize,
                CELL_SIZE as usize,
                INFERENCE_THRESHOLD,
            );
            *digit = self.classifier.run(&input);
        }
        tracing::debug!(
            clues = digits.iter().filter(|&&digit| digit > 0).count(),
            "classified grid"
        );

        result.solution = self.solver.solve(&digits);
        result.digits = Some(digits);
        result
    }

    pub fn solver(&self) -> &CachedPuzzleSolver {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut CachedPuzzleSolver {
        &mut self.solver
    }

    pub fn classifier(&self) -> &NeuralNetwork {
        &self.classifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{TrainConfig, TrainingSample};
    use crate::render::SoftwareRenderer;
    use crate::test_utils::{noise_image, uniform_image};

    fn untrained_pipeline() -> FramePipeline {
        // A placeholder network trained for one epoch on junk; process()
        // never reaches it in these tests.
        let path = std::env::temp_dir().join(format!(
            "sudogrid-pipeline-{}.dat",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let config = TrainConfig {
            epochs: 1,
            artifact_path: path.clone(),
            ..TrainConfig::default()
        };
        let data = vec![
            TrainingSample {
                input: vec![0.0; 256],
                label: 0,
            },
            TrainingSample {
                input: vec![1.0; 256],
                label: 1,
            },
        ];
        let network = NeuralNetwork::train(data, &config);
        let _ = std::fs::remove_file(&path);
        FramePipeline::new(network)
    }

    #[test]
    fn malformed_frame_yields_an_empty_result() {
        let mut pipeline = untrained_pipeline();
        let mut frame = Image::new(10, 10);
        frame.data.pop();
        let result = pipeline.process(&frame, &SoftwareRenderer);
        assert!(result.corners.is_none());
        assert!(result.digits.is_none());
        assert!(result.solution.is_none());
    }

    #[test]
    fn empty_frame_finds_no_grid() {
        let mut pipeline = untrained_pipeline();
        let frame = uniform_image(120, 120, 255);
        let result = pipeline.process(&frame, &SoftwareRenderer);
        assert!(result.corners.is_none());
        assert!(result.digits.is_none());
    }

    #[test]
    fn noise_frame_does_not_panic_and_buffers_are_reused() {
        let mut pipeline = untrained_pipeline();
        let frame = noise_image(100, 100, 21);
        for _ in 0..3 {
            let _ = pipeline.process(&frame, &SoftwareRenderer);
        }
        let smaller = noise_image(60, 60, 22);
        let _ = pipeline.process(&smaller, &SoftwareRenderer);
    }
}
