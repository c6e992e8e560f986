use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jfif_baseline::{ColorType, Encoder, SamplingFactor};

fn gradient_image(width: u16, height: u16) -> Vec<u8> {
    let (w, h) = (u32::from(width), u32::from(height));

    let mut pixels = Vec::with_capacity((w * h * 3) as usize);
    for y in 0..h {
        for x in 0..w {
            let r = ((x * 255) / w) as u8;
            let g = ((y * 255) / h) as u8;
            let b = (((x + y) * 127) / (w + h)) as u8;
            pixels.extend_from_slice(&[r, g, b]);
        }
    }
    pixels
}

fn encode_rgb(data: &[u8], width: u16, height: u16, sampling: SamplingFactor) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len() / 4);

    let mut encoder = Encoder::new(&mut output, 85);
    encoder.set_sampling_factor(sampling);
    encoder
        .encode(data, width, height, ColorType::Rgb)
        .expect("encode");

    output
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_rgb");

    for &(width, height) in &[(256u16, 256u16), (1024, 768)] {
        let data = gradient_image(width, height);
        group.throughput(Throughput::Bytes(data.len() as u64));

        for (name, sampling) in [
            ("444", SamplingFactor::R_4_4_4),
            ("420", SamplingFactor::R_4_2_0),
        ] {
            group.bench_with_input(
                BenchmarkId::new(name, format!("{}x{}", width, height)),
                &data,
                |b, data| {
                    b.iter(|| black_box(encode_rgb(black_box(data), width, height, sampling)));
                },
            );
        }
    }

    group.finish();
}

fn bench_encode_gray(c: &mut Criterion) {
    let data: Vec<u8> = (0..512 * 512).map(|i| (i % 251) as u8).collect();

    c.bench_function("encode_gray_512", |b| {
        b.iter(|| {
            black_box(
                jfif_baseline::encode(black_box(&data), 512, 512, false, 85, false, None)
                    .expect("encode"),
            )
        })
    });
}

criterion_group!(benches, bench_encode, bench_encode_gray);
criterion_main!(benches);
