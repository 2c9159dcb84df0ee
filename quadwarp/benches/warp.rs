use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quadwarp::config::WarpConfig;
use quadwarp::geometry::{Containment, Quad};
use quadwarp::grid::project_grid;
use quadwarp::image::RgbaImage;
use quadwarp::warp::Warper;

fn gradient(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            img.set(x, y, [(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255]);
        }
    }
    img
}

fn bench_resample(c: &mut Criterion) {
    let source = gradient(640, 480);
    let src = source.corners();
    let dst = Quad::from([[40.0, 30.0], [600.0, 10.0], [630.0, 470.0], [5.0, 420.0]]);

    let boxed = Warper::default();
    c.bench_function("resample_640x480_bbox", |b| {
        b.iter(|| boxed.resample(black_box(&source), &src, &dst, 640, 480).unwrap())
    });

    let polygon = Warper::new(WarpConfig {
        containment: Containment::Polygon,
        ..WarpConfig::default()
    });
    c.bench_function("resample_640x480_polygon", |b| {
        b.iter(|| polygon.resample(black_box(&source), &src, &dst, 640, 480).unwrap())
    });
}

fn bench_grid(c: &mut Criterion) {
    let src = Quad::rect(1920.0, 1080.0);
    let dst = Quad::from([[100.0, 50.0], [1800.0, 0.0], [1900.0, 1000.0], [0.0, 1080.0]]);
    c.bench_function("project_grid_1080p", |b| {
        b.iter(|| project_grid(1920, 1080, black_box(&src), &dst, 20.0).unwrap())
    });
}

criterion_group!(benches, bench_resample, bench_grid);
criterion_main!(benches);
