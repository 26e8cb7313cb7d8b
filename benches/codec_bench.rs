use biarith::{compress_to_vec, decompress_to_vec};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn text_corpus(len: usize) -> Vec<u8> {
    b"It is a truth universally acknowledged, that a single man in \
      possession of a good fortune, must be in want of a wife. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn random_corpus(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..len).map(|_| rng.gen()).collect()
}

fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_text");
    let input = text_corpus(64 * 1024);

    group.bench_function("compress", |b| b.iter(|| compress_to_vec(&input)));

    let compressed = compress_to_vec(&input);
    group.bench_function("decompress", |b| b.iter(|| decompress_to_vec(&compressed)));
}

fn bench_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_random");
    let input = random_corpus(64 * 1024);

    group.bench_function("compress", |b| b.iter(|| compress_to_vec(&input)));

    let compressed = compress_to_vec(&input);
    group.bench_function("decompress", |b| b.iter(|| decompress_to_vec(&compressed)));
}

criterion_group!(benches, bench_text, bench_random);
criterion_main!(benches);
