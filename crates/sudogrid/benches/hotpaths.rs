use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sudogrid::edges::Canny;
use sudogrid::solver::{solve, Game};
use sudogrid::{HoughTransform, Image, PuzzleFinder};

const HARD_PUZZLE: [u8; 81] = [
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

fn noise_frame(width: u32, height: u32, seed: u64) -> Image {
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

fn grid_edge_mask(size: u32) -> Image {
    let mut image = Image::new(size, size);
    for step in 0..10u32 {
        let position = 30 + step * 30;
        for y in 0..size {
            let index = image.index(position, y);
            image.data[index] = 255;
        }
        for x in 0..size {
            let index = image.index(x, position);
            image.data[index] = 255;
        }
    }
    image
}

fn bench_canny(c: &mut Criterion) {
    let frame = noise_frame(320, 240, 1);
    let mut canny = Canny::with_radius(5.0);
    let mut output = Image::default();
    c.bench_function("canny_320x240", |b| {
        b.iter(|| {
            canny.process(black_box(&frame), &mut output);
            black_box(&output);
        })
    });
}

fn bench_hough_accumulate(c: &mut Criterion) {
    let mask = grid_edge_mask(400);
    let mut hough = HoughTransform::sized_for(400, 400);
    c.bench_function("hough_accumulate_grid_400", |b| {
        b.iter(|| {
            hough.accumulate(black_box(&mask));
            black_box(hough.counts());
        })
    });
}

fn bench_find_grid(c: &mut Criterion) {
    let mask = grid_edge_mask(400);
    let mut hough = HoughTransform::sized_for(400, 400);
    hough.accumulate(&mask);
    let mut finder = PuzzleFinder::default();
    c.bench_function("find_grid_400", |b| {
        b.iter(|| black_box(finder.find(400, 400, black_box(&hough))))
    });
}

fn bench_solve_hard(c: &mut Criterion) {
    c.bench_function("solve_hard_puzzle", |b| {
        b.iter(|| {
            let mut game = Game::from_digits(black_box(&HARD_PUZZLE)).unwrap();
            black_box(solve(&mut game))
        })
    });
}

criterion_group!(
    benches,
    bench_canny,
    bench_hough_accumulate,
    bench_find_grid,
    bench_solve_hard
);
criterion_main!(benches);
