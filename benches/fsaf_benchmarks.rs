//! FSAF Benchmarks
//!
//! Measures the segment trie and the difference between cold and warm
//! document resolution through the local provider.
//!
//! To run the benchmarks:
//! ```bash
//! cargo bench --features benchmarking
//! ```

use criterion::{
    black_box, criterion_group, criterion_main, measurement::WallTime, BatchSize, BenchmarkId,
    Criterion, SamplingMode, Throughput,
};
use fsaf_lib::config::FsafConfig;
use fsaf_lib::data_structures::SegmentTrie;
use fsaf_lib::file::{AbstractFile, Segment};
use fsaf_lib::manager::BaseDirectory;
use fsaf_lib::provider::LocalDocumentProvider;
use fsaf_lib::FileManager;
use std::fs;
use std::time::Duration;

fn paths(count: usize) -> Vec<Vec<String>> {
    (0..count)
        .map(|i| {
            vec![
                format!("{}", i % 10),
                format!("{}", i % 100),
                format!("{i}.txt"),
            ]
        })
        .collect()
}

/// Benchmark the segment trie
fn bench_segment_trie(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_trie");
    group.sampling_mode(SamplingMode::Flat);
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));

    for size in [100, 1000, 10_000].iter() {
        let keys = paths(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("insert", size), &keys, |b, keys| {
            b.iter(|| {
                let trie = SegmentTrie::new();
                for (i, key) in keys.iter().enumerate() {
                    trie.insert(key, black_box(i));
                }
            });
        });

        let trie = SegmentTrie::new();
        for (i, key) in keys.iter().enumerate() {
            trie.insert(key, i);
        }
        group.bench_with_input(BenchmarkId::new("find", size), &keys, |b, keys| {
            b.iter(|| {
                for key in keys {
                    black_box(trie.find(key));
                }
            });
        });
    }

    group.finish();
}

/// Benchmark cold versus warm resolution
fn bench_resolution(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("bench directory");
    for i in 0..50 {
        let sub = dir.path().join(format!("dir{}", i % 5));
        fs::create_dir_all(&sub).expect("bench tree");
        fs::write(sub.join(format!("file{i}.txt")), b"bench").expect("bench file");
    }

    let setup = || {
        let provider = LocalDocumentProvider::new(dir.path(), "bench");
        let tree = provider.tree_uri();
        let manager = FileManager::new(provider, &FsafConfig::default());
        manager.register_base_directory(BaseDirectory::from_uri("bench", tree.clone()));
        let root = manager.from_uri(&tree).expect("bench root");
        (manager, root)
    };

    let files = |root: &AbstractFile| -> Vec<AbstractFile> {
        (0..50)
            .map(|i| {
                root.clone_with([
                    Segment::dir(format!("dir{}", i % 5)).expect("segment"),
                    Segment::file(format!("file{i}.txt")).expect("segment"),
                ])
                .expect("handle")
            })
            .collect()
    };

    let mut group = c.benchmark_group("resolution");
    group.measurement_time(Duration::from_secs(3));
    group.throughput(Throughput::Elements(50));

    group.bench_function("cold_lengths", |b| {
        b.iter_batched(
            setup,
            |(manager, root)| {
                for file in files(&root) {
                    black_box(manager.length(&file));
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("snapshot_lengths", |b| {
        b.iter_batched(
            setup,
            |(manager, root)| {
                manager
                    .with_snapshot(&root, true, |manager| {
                        for file in files(&root) {
                            black_box(manager.length(&file));
                        }
                    })
                    .expect("snapshot");
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// Group all benchmarks together
criterion_group! {
    name = benches;
    config = Criterion::default()
        .with_measurement(WallTime)
        .significance_level(0.01)
        .noise_threshold(0.02)
        .confidence_level(0.99);
    targets = bench_segment_trie, bench_resolution
}

criterion_main!(benches);
