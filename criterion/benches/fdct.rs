use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jfif_baseline::{fdct, reference_fdct, rgb_to_ycbcr};

fn sample_block() -> [f32; 64] {
    let mut block = [0f32; 64];
    for (i, v) in block.iter_mut().enumerate() {
        *v = ((i * 37) % 255) as f32 - 128.0;
    }
    block
}

fn bench_fdct(c: &mut Criterion) {
    let block = sample_block();

    c.bench_function("fdct_aan", |b| {
        b.iter(|| {
            let mut data = black_box(block);
            fdct(&mut data);
            data
        })
    });

    c.bench_function("fdct_reference", |b| {
        b.iter(|| reference_fdct(black_box(&block)))
    });
}

fn bench_color(c: &mut Criterion) {
    let pixels: Vec<u8> = (0..64 * 64 * 3).map(|i| (i % 256) as u8).collect();

    c.bench_function("rgb_to_ycbcr_64x64", |b| {
        b.iter(|| {
            let mut sum = 0f32;
            for p in black_box(&pixels).chunks_exact(3) {
                let (y, cb, cr) = rgb_to_ycbcr(p[0], p[1], p[2]);
                sum += y + cb + cr;
            }
            sum
        })
    });
}

criterion_group!(benches, bench_fdct, bench_color);
criterion_main!(benches);
