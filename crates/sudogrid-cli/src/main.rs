//! sudogrid CLI — detect, train, and solve from the command line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use sudogrid::classifier::synth::{generate_training_set, SynthConfig};
use sudogrid::classifier::ARTIFACT_PATH;
use sudogrid::edges::Canny;
use sudogrid::frame::{blend_add, rgb_to_greyscale};
use sudogrid::solver::{solvable, solve};
use sudogrid::{
    Game, HoughTransform, Image, Line, NeuralNetwork, Point, PuzzleFinder, SoftwareRenderer,
    TrainConfig,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "sudogrid")]
#[command(about = "Detect and solve printed Sudoku grids in images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate a Sudoku grid in an image and report its corners.
    Detect {
        /// Path to the input image.
        #[arg(long)]
        image: PathBuf,

        /// Path to write detection results (JSON).
        #[arg(long)]
        out: PathBuf,

        /// Gaussian blur radius for edge extraction.
        #[arg(long, default_value = "5.0")]
        radius: f32,

        /// Write an edge overlay image alongside the results.
        #[arg(long)]
        overlay: Option<PathBuf>,
    },

    /// Train the digit classifier on synthetic glyph sheets.
    Train {
        /// Number of random grids to synthesize.
        #[arg(long, default_value = "3000")]
        grids: u32,

        /// Upper bound on training epochs.
        #[arg(long, default_value = "1500")]
        epochs: u32,

        /// Classifier artifact path.
        #[arg(long, default_value = ARTIFACT_PATH)]
        artifact: PathBuf,
    },

    /// Solve a puzzle from a nine-line text file.
    Solve {
        /// Path to the puzzle file: nine lines of nine characters,
        /// digits 1-9 for clues, anything else for blanks.
        #[arg(long)]
        puzzle: PathBuf,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Detect {
            image,
            out,
            radius,
            overlay,
        } => run_detect(&image, &out, radius, overlay.as_deref()),
        Commands::Train {
            grids,
            epochs,
            artifact,
        } => run_train(grids, epochs, artifact),
        Commands::Solve { puzzle } => run_solve(&puzzle),
    }
}

#[derive(Serialize)]
struct DetectReport {
    image_size: [u32; 2],
    corners: Option<[Point; 4]>,
    lines: Vec<Line>,
    cluster_count: usize,
    candidate_count: usize,
}

fn run_detect(
    image_path: &std::path::Path,
    out_path: &std::path::Path,
    radius: f32,
    overlay: Option<&std::path::Path>,
) -> CliResult<()> {
    let rgb = image::open(image_path)?.to_rgb8();
    let frame = Image::from_rgb(&rgb);
    tracing::info!(width = frame.width, height = frame.height, "loaded frame");

    let mut greyscale = Image::default();
    rgb_to_greyscale(&frame, &mut greyscale);

    let mut canny = Canny::with_radius(radius);
    let mut edges = Image::default();
    canny.process(&greyscale, &mut edges);

    let mut hough = HoughTransform::sized_for(frame.width, frame.height);
    hough.accumulate(&edges);

    let mut finder = PuzzleFinder::default();
    let corners = finder.find(frame.width, frame.height, &hough);
    match &corners {
        Some(corners) => tracing::info!(?corners, "grid found"),
        None => tracing::info!(lines = finder.lines.len(), "no grid found"),
    }

    let report = DetectReport {
        image_size: [frame.width, frame.height],
        corners,
        lines: finder.lines.clone(),
        cluster_count: finder.line_clusters.len(),
        candidate_count: finder.candidate_clusters.len(),
    };
    serde_json::to_writer_pretty(File::create(out_path)?, &report)?;
    tracing::info!(path = %out_path.display(), "wrote detection report");

    if let Some(overlay_path) = overlay {
        let mut merged = Image::default();
        blend_add(&frame, &edges, &mut merged);
        merged.to_rgb().save(overlay_path)?;
        tracing::info!(path = %overlay_path.display(), "wrote edge overlay");
    }
    Ok(())
}

fn run_train(grids: u32, epochs: u32, artifact: PathBuf) -> CliResult<()> {
    let mut rng = StdRng::from_entropy();
    let synth = SynthConfig {
        grids,
        ..SynthConfig::default()
    };
    tracing::info!(grids, "synthesizing training data");
    let training = generate_training_set(&SoftwareRenderer, &synth, &mut rng);
    tracing::info!(samples = training.len(), epochs, "training classifier");

    let config = TrainConfig {
        epochs,
        artifact_path: artifact.clone(),
        ..TrainConfig::default()
    };
    let network = NeuralNetwork::train(training, &config);
    network.save(&artifact)?;
    tracing::info!(path = %artifact.display(), "training artifact saved");
    Ok(())
}

fn run_solve(puzzle_path: &std::path::Path) -> CliResult<()> {
    let game = load_puzzle(puzzle_path)?;
    if !solvable(&game) {
        return Err("puzzle has conflicting clues".into());
    }

    let mut solved = game.clone();
    if !solve(&mut solved) {
        return Err("puzzle has no solution".into());
    }
    print!("{solved}");
    Ok(())
}

/// Nine lines of nine characters; digits 1-9 are clues, anything else is
/// an empty cell.
fn load_puzzle(path: &std::path::Path) -> CliResult<Game> {
    let reader = BufReader::new(File::open(path)?);
    let mut game = Game::new();
    for (y, line) in reader.lines().take(9).enumerate() {
        let line = line?;
        for (x, character) in line.chars().take(9).enumerate() {
            if let Some(digit) = character.to_digit(10) {
                if digit > 0 {
                    game.set(x as u32, y as u32, digit as u8);
                }
            }
        }
    }
    Ok(game)
}
