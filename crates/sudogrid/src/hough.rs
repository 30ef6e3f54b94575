//! Hough line voting and sliding-window peak extraction.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::frame::Image;
use crate::geometry::Line;

/// Peak extraction tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeakConfig {
    /// Half-width of the strict-maximum window.
    pub radius: u32,
    /// Minimum number of votes for a cell to qualify as a peak.
    pub min_votes: u16,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            radius: 5,
            min_votes: 200,
        }
    }
}

/// Dense (θ, ρ) vote accumulator.
///
/// The x axis discretises θ over [0, π); the y axis discretises ρ over
/// [0, diag] where diag is the diagonal of the voted image. Counters are
/// plain `u16`s saturating at `0xFFFF`.
#[derive(Debug, Clone)]
pub struct HoughTransform {
    width: u32,
    height: u32,
    counts: Vec<u16>,
    cos_table: Vec<f32>,
    sin_table: Vec<f32>,
}

impl HoughTransform {
    /// Blurred image borders vote for phantom lines; ignore them.
    const IGNORE_PADDING: u32 = 10;

    /// Accumulator with explicit dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        let mut cos_table = Vec::with_capacity(width as usize);
        let mut sin_table = Vec::with_capacity(width as usize);
        for x in 0..width {
            let angle = x as f32 * PI / width as f32;
            cos_table.push(angle.cos());
            sin_table.push(angle.sin());
        }
        Self {
            width,
            height,
            counts: vec![0; width as usize * height as usize],
            cos_table,
            sin_table,
        }
    }

    /// Default sizing for a given input: 360 angle steps and one ρ step per
    /// pixel of the smaller input dimension.
    pub fn sized_for(input_width: u32, input_height: u32) -> Self {
        Self::new(360, input_width.min(input_height).max(1))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw vote counts, row-major over (ρ, θ).
    pub fn counts(&self) -> &[u16] {
        &self.counts
    }

    fn votes(&self, x: i64, y: i64) -> u16 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0;
        }
        self.counts[y as usize * self.width as usize + x as usize]
    }

    /// Cast votes for every edge pixel of `edges` (channel 0 non-zero).
    ///
    /// Previous votes are discarded; the accumulator can be reused across
    /// frames of the same size.
    pub fn accumulate(&mut self, edges: &Image) {
        self.counts.clear();
        self.counts
            .resize(self.width as usize * self.height as usize, 0);

        let pad = Self::IGNORE_PADDING;
        if edges.width <= pad * 2 || edges.height <= pad * 2 {
            return;
        }

        let diag = (edges.width as f32).hypot(edges.height as f32);
        let rho_scale = self.height as f32 / diag;
        let columns = self.width as usize;

        for y in pad..edges.height - pad {
            for x in pad..edges.width - pad {
                if edges.data[edges.index(x, y)] == 0 {
                    continue;
                }
                for z in 0..columns {
                    let rho = x as f32 * self.cos_table[z] + y as f32 * self.sin_table[z];
                    let row = (rho * rho_scale) as i64;
                    let row = row.clamp(0, self.height as i64 - 1) as usize;
                    let cell = &mut self.counts[row * columns + z];
                    *cell = cell.saturating_add(1);
                }
            }
        }
    }

    /// Strictly-maximal window peaks converted to Hesse normal form.
    ///
    /// `input_width`/`input_height` are the dimensions of the image the
    /// votes came from; they fix the ρ scale. Two equal maxima inside one
    /// window suppress each other, an accepted limitation of the strict
    /// comparison.
    pub fn find_peaks(&self, input_width: u32, input_height: u32, config: &PeakConfig) -> Vec<Line> {
        let diag = (input_width as f32).hypot(input_height as f32);
        let radius = config.radius as i64;

        let mut lines = Vec::new();
        for y in 0..self.height as i64 {
            for x in 0..self.width as i64 {
                let value = self.votes(x, y);
                if value < config.min_votes {
                    continue;
                }

                let mut peak = true;
                'window: for ny in y - radius..=y + radius {
                    for nx in x - radius..=x + radius {
                        if nx == x && ny == y {
                            continue;
                        }
                        if value <= self.votes(nx, ny) {
                            peak = false;
                            break 'window;
                        }
                    }
                }
                if !peak {
                    continue;
                }

                let theta = x as f32 / self.width as f32 * PI;
                let rho = y as f32 / self.height as f32 * diag;
                lines.push(Line::new(theta, rho));
            }
        }
        lines
    }
}
