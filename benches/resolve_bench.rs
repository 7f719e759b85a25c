//! Benchmarks for the CPU-bound resolve stages.
//!
//! Measures token decoding, provider planning over a source blob,
//! extraction and ranking. Network fetches are excluded.
//!
//! Run with: `cargo bench --bench resolve_bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use anilink::extract::extract;
use anilink::{decoder, rank, ExtractorKind, MediaFormat, MediaLink, ProviderRegistry};

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

const CLOCK_PATH: &str = "/apivtwo/clock?id=7d2473746a243c242b2f59696e3c2e2b5f4d7c6b2f5b4a7d2f";

const SOURCE_BLOB: &str = "Luf-Mp4:--175051\nYt-mp4:--17414c\nVid-mp4:--1759\nS-mp4:--174b48\nDefault:--174f40";

const REPACKAGER_BODY: &str = r#"{"links":[{"link":"https://repackager.wixmp.com/video.wixstatic.com/video/ep1/mp4/,1080p,720p,480p,360p,/mp4/file.mp4.urlset/master.m3u8","hls":true}]}"#;

fn sample_links() -> Vec<MediaLink> {
    let providers = ["HiAnime", "YouTube", "SharePoint", "Wixmp", "Unknown"];
    let qualities = ["360p", "HLS Master", "720p", "YouTube", "1080p", "480p"];
    (0..60)
        .map(|i| MediaLink {
            format: if i % 3 == 0 { MediaFormat::M3u8 } else { MediaFormat::Mp4 },
            quality: qualities[i % qualities.len()].to_string(),
            url: format!("https://cdn.example/{i}.mp4"),
            provider: providers[i % providers.len()].to_string(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let token = decoder::encode(CLOCK_PATH).expect("path uses alphabet chars only");

    group.bench_function("clock_path", |b| {
        b.iter(|| decoder::decode(black_box(&token)));
    });

    group.bench_function("odd_length", |b| {
        b.iter(|| decoder::decode(black_box("--79a")));
    });

    group.finish();
}

fn bench_plan(c: &mut Criterion) {
    let registry = ProviderRegistry::new();

    c.bench_function("match_tags_and_decode", |b| {
        b.iter(|| {
            registry
                .all()
                .iter()
                .filter_map(|p| p.find_token(black_box(SOURCE_BLOB)))
                .map(decoder::decode)
                .count()
        });
    });
}

fn bench_extract(c: &mut Criterion) {
    c.bench_function("extract_repackager", |b| {
        b.iter(|| extract(ExtractorKind::Repackager, black_box(REPACKAGER_BODY)));
    });
}

fn bench_rank(c: &mut Criterion) {
    let registry = ProviderRegistry::new();
    let links = sample_links();

    c.bench_function("rank_60_links", |b| {
        b.iter(|| rank(black_box(links.clone()), &registry));
    });
}

criterion_group!(benches, bench_decode, bench_plan, bench_extract, bench_rank);
criterion_main!(benches);
