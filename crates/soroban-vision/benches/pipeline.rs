//! Pipeline benchmarks on a synthetic soroban scene.
//!
//! Run with: cargo bench -p soroban-vision

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use soroban_vision::{
    ImagePreprocessor, PreprocessingConfig, SorobanVision, TensorConverter,
};
use soroban_vision_core::ColorImage;

/// Bright slab on a dark desk with seven dark rods, scaled to the canvas.
fn soroban_scene(width: usize, height: usize) -> ColorImage {
    let mut img = ColorImage::filled(width, height, [60, 60, 60]);
    let (x0, x1) = (width * 9 / 80, width - width * 9 / 80);
    let (y0, y1) = (height * 7 / 30, height - height * 7 / 30);
    for y in y0..y1 {
        for x in x0..x1 {
            img.set_pixel(x, y, [210, 210, 210]);
        }
    }
    let rod_half = (width / 260).max(2);
    let (ry0, ry1) = (y0 + (y1 - y0) / 10, y1 - (y1 - y0) / 10);
    for i in 1..=7 {
        let cx = x0 + i * (x1 - x0) / 8;
        for y in ry0..ry1 {
            for x in cx - rod_half..cx + rod_half {
                img.set_pixel(x, y, [90, 90, 90]);
            }
        }
    }
    img
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let scene = soroban_scene(800, 300);
    group.throughput(Throughput::Elements((scene.width * scene.height) as u64));
    group.bench_function("process_image_800x300", |b| {
        let mut vision = SorobanVision::default();
        b.iter(|| vision.process_image(black_box(&scene.view())));
    });
    group.finish();
}

fn bench_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocess");
    let scene = soroban_scene(1280, 480);
    group.throughput(Throughput::Elements((scene.width * scene.height) as u64));
    group.bench_function("preprocess_image_1280x480", |b| {
        let preprocessor = ImagePreprocessor::new(PreprocessingConfig::default());
        b.iter(|| preprocessor.preprocess_image(black_box(&scene.view())));
    });
    group.finish();
}

fn bench_tensor_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("tensor");
    let cells: Vec<ColorImage> = (0..35)
        .map(|i| ColorImage::filled(100, 40, [i as u8, 128, 200]))
        .collect();
    group.throughput(Throughput::Elements(cells.len() as u64));
    group.bench_function("convert_batch_35_cells", |b| {
        let converter = TensorConverter::new(PreprocessingConfig::default());
        b.iter(|| converter.convert_batch(black_box(&cells)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_full_pipeline,
    bench_preprocess,
    bench_tensor_conversion
);
criterion_main!(benches);
