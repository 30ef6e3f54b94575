//! Grid localisation from Hough line peaks.
//!
//! A printed Sudoku grid appears as two clusters of near-parallel lines,
//! ten lines each, perpendicular to one another and evenly spaced in ρ.
//! [`PuzzleFinder`] walks the peak list through orientation clustering,
//! spacing analysis, and perpendicular-pair selection, and intersects the
//! outer boundary lines into the four grid corners.

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::geometry::{difference_theta, intersect_lines, mean_theta, Line, Point};
use crate::hough::{HoughTransform, PeakConfig};

/// Number of grid lines bounding the nine rows (or columns) of a puzzle.
pub const GRID_LINES: usize = 10;

/// Clustering tolerances.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Peak extraction passed through to the accumulator.
    pub peaks: PeakConfig,
    /// Maximum θ distance from a cluster's running mean, in radians.
    pub theta_tolerance: f32,
    /// Accepted deviation from π/2 between two cluster means, in radians.
    pub perpendicular_tolerance: f32,
    /// Accepted deviation of consecutive ρ spacings from their median,
    /// as a fraction of that median.
    pub spacing_tolerance: f32,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            peaks: PeakConfig::default(),
            theta_tolerance: 0.08,
            perpendicular_tolerance: 0.08,
            spacing_tolerance: 0.20,
        }
    }
}

/// Locates the four outer corners of a Sudoku grid among Hough peaks.
///
/// The intermediate lists from the most recent [`find`](Self::find) call
/// stay on the struct for debug overlays and tests.
#[derive(Debug, Default)]
pub struct PuzzleFinder {
    pub config: FinderConfig,
    /// All peak lines of the last frame.
    pub lines: Vec<Line>,
    /// Lines grouped by orientation.
    pub line_clusters: Vec<Vec<Line>>,
    /// Ten-line runs with near-uniform ρ spacing, one per surviving cluster.
    pub candidate_clusters: Vec<Vec<Line>>,
    /// Perpendicular candidate pairs considered for the grid.
    pub puzzle_line_pairs: Vec<(Vec<Line>, Vec<Line>)>,
}

impl PuzzleFinder {
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Search the accumulator for a grid in a `target_width` ×
    /// `target_height` frame and return its corners as TL, TR, BR, BL.
    pub fn find(
        &mut self,
        target_width: u32,
        target_height: u32,
        hough: &HoughTransform,
    ) -> Option<[Point; 4]> {
        self.lines = hough.find_peaks(target_width, target_height, &self.config.peaks);
        self.line_clusters = cluster_by_theta(&self.lines, self.config.theta_tolerance);
        self.candidate_clusters = self
            .line_clusters
            .iter()
            .filter_map(|cluster| uniform_run(cluster, self.config.spacing_tolerance))
            .collect();
        self.puzzle_line_pairs = perpendicular_pairs(
            &self.candidate_clusters,
            self.config.perpendicular_tolerance,
        );
        tracing::debug!(
            lines = self.lines.len(),
            clusters = self.line_clusters.len(),
            candidates = self.candidate_clusters.len(),
            pairs = self.puzzle_line_pairs.len(),
            "grid search"
        );

        // The grid is square, so of all perpendicular pairs prefer the one
        // whose two spacings agree best.
        let (first, second) = self
            .puzzle_line_pairs
            .iter()
            .min_by(|a, b| spacing_ratio_error(a).total_cmp(&spacing_ratio_error(b)))?;

        let corners = [
            intersect_lines(&first[0], &second[0])?,
            intersect_lines(&first[0], &second[GRID_LINES - 1])?,
            intersect_lines(&first[GRID_LINES - 1], &second[0])?,
            intersect_lines(&first[GRID_LINES - 1], &second[GRID_LINES - 1])?,
        ];
        Some(sort_corners(corners))
    }
}

/// Greedily group lines whose θ sits within `tolerance` of a cluster's
/// running circular mean. Cluster identity depends on input order but the
/// grouping itself is stable for well-separated orientations.
pub(crate) fn cluster_by_theta(lines: &[Line], tolerance: f32) -> Vec<Vec<Line>> {
    let mut clusters: Vec<Vec<Line>> = Vec::new();
    for &line in lines {
        match clusters
            .iter_mut()
            .find(|cluster| difference_theta(mean_theta(cluster), line.theta) < tolerance)
        {
            Some(cluster) => cluster.push(line),
            None => clusters.push(vec![line]),
        }
    }
    clusters
}

/// Extract a contiguous run of exactly [`GRID_LINES`] lines (sorted by ρ)
/// whose consecutive spacings all sit within `tolerance` of their median
/// spacing. Returns the first such run.
pub(crate) fn uniform_run(cluster: &[Line], tolerance: f32) -> Option<Vec<Line>> {
    if cluster.len() < GRID_LINES {
        return None;
    }

    let mut sorted = cluster.to_vec();
    sorted.sort_by(|a, b| a.rho.total_cmp(&b.rho));

    for start in 0..=sorted.len() - GRID_LINES {
        let run = &sorted[start..start + GRID_LINES];
        let mut spacings = [0.0f32; GRID_LINES - 1];
        for (i, spacing) in spacings.iter_mut().enumerate() {
            *spacing = run[i + 1].rho - run[i].rho;
        }

        let mut sorted_spacings = spacings;
        let median = median_spacing_of(&mut sorted_spacings);
        if median <= 0.0 {
            continue;
        }
        let band = median * tolerance;
        if spacings.iter().all(|&s| (s - median).abs() <= band) {
            return Some(run.to_vec());
        }
    }
    None
}

/// All unordered pairs of candidate runs whose mean orientations are π/2
/// apart within `tolerance`.
pub(crate) fn perpendicular_pairs(
    clusters: &[Vec<Line>],
    tolerance: f32,
) -> Vec<(Vec<Line>, Vec<Line>)> {
    let mut pairs = Vec::new();
    for i in 0..clusters.len() {
        for j in i + 1..clusters.len() {
            let delta = difference_theta(mean_theta(&clusters[i]), mean_theta(&clusters[j]));
            if (delta - FRAC_PI_2).abs() < tolerance {
                pairs.push((clusters[i].clone(), clusters[j].clone()));
            }
        }
    }
    pairs
}

fn median_spacing(run: &[Line]) -> f32 {
    let mut spacings: Vec<f32> = run.windows(2).map(|w| w[1].rho - w[0].rho).collect();
    median_spacing_of(&mut spacings)
}

fn median_spacing_of(spacings: &mut [f32]) -> f32 {
    spacings.sort_by(|a, b| a.total_cmp(b));
    spacings[spacings.len() / 2]
}

fn spacing_ratio_error(pair: &(Vec<Line>, Vec<Line>)) -> f32 {
    let a = median_spacing(&pair.0);
    let b = median_spacing(&pair.1);
    if a.max(b) <= 0.0 {
        return f32::MAX;
    }
    1.0 - a.min(b) / a.max(b)
}

/// Canonical TL, TR, BR, BL order by angle around the centroid.
fn sort_corners(corners: [Point; 4]) -> [Point; 4] {
    let cx = corners.iter().map(|p| p.x).sum::<f32>() / 4.0;
    let cy = corners.iter().map(|p| p.y).sum::<f32>() / 4.0;

    let mut sorted = corners;
    sorted.sort_by(|a, b| {
        let angle_a = (a.y - cy).atan2(a.x - cx);
        let angle_b = (b.y - cy).atan2(b.x - cx);
        angle_a.total_cmp(&angle_b)
    });
    sorted
}
