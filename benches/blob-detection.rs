use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use blob_capture::blob::find_largest_color_bounding_box;
use blob_capture::blob::frame::RgbFrame;
use blob_capture::blob::hsv::HsvRange;

/// A white frame with a grid of colored squares, one of them larger than the rest.
fn synthetic_frame(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![255u8; (width * height * 3) as usize];
    let cell = (width.min(height) / 8).max(4);
    for y in 0..height {
        for x in 0..width {
            let in_square = (x / cell + y / cell) % 3 == 0 && x % cell < cell / 2 && y % cell < cell / 2;
            let in_target = x >= width / 3 && x < width / 2 && y >= height / 3 && y < height / 2;
            if in_square || in_target {
                let i = ((y * width + x) * 3) as usize;
                data[i..i + 3].copy_from_slice(&[220, 40, 40]);
            }
        }
    }
    data
}

fn benchmark_blob_detection(c: &mut Criterion) {
    let range = HsvRange::default();
    for resolution in [(1920, 1080), (1280, 720), (640, 360)] {
        let data = synthetic_frame(resolution.0, resolution.1);
        let frame = RgbFrame::new(resolution.0, resolution.1, &data).unwrap();

        let bench_name = format!("blob detection {}x{}", resolution.0, resolution.1);
        c.bench_function(&bench_name, |b| {
            b.iter(|| black_box(find_largest_color_bounding_box(&frame, &range).unwrap()));
        });
    }
}

criterion_group!(benches, benchmark_blob_detection);
criterion_main!(benches);
