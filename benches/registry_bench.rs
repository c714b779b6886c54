use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use dxf_tables::{Handle, Layer, ObjectIndex, TableObject, TableObjectRegistry};
use std::time::Duration;

// Tables cap out at 32767 entries, so sizes stay below that.
const FILL: usize = 30_000;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn name(n: u64) -> String {
    format!("L{:016x}", n)
}

fn filled(seed: u64) -> (ObjectIndex, TableObjectRegistry<Layer>, Vec<String>) {
    let mut doc = ObjectIndex::new();
    let mut layers = TableObjectRegistry::new();
    let names: Vec<String> = lcg(seed).take(FILL).map(name).collect();
    for n in &names {
        let _ = layers.add(&mut doc, Layer::new(n.clone()), false).unwrap();
    }
    (doc, layers, names)
}

// Precompute `count` random picks from `names` via a second LCG.
fn picks(names: &[String], count: usize) -> Vec<String> {
    let n = names.len();
    let mut s = 0x9e3779b97f4a7c15u64;
    (0..count)
        .map(|_| {
            s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            names[(s as usize) % n].clone()
        })
        .collect()
}

fn bench_add_fresh(c: &mut Criterion) {
    c.bench_function("registry::add_fresh_30k", |b| {
        let names: Vec<String> = lcg(1).take(FILL).map(name).collect();
        b.iter_batched(
            || (ObjectIndex::new(), TableObjectRegistry::<Layer>::new()),
            |(mut doc, mut layers)| {
                for n in &names {
                    let _ = layers.add(&mut doc, Layer::new(n.clone()), false).unwrap();
                }
                black_box((doc, layers))
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_add_duplicate(c: &mut Criterion) {
    c.bench_function("registry::add_duplicate_10k_on_30k", |b| {
        let (mut doc, mut layers, names) = filled(2);
        let queries = picks(&names, 10_000);
        b.iter(|| {
            for n in &queries {
                let _ = black_box(layers.add(&mut doc, Layer::new(n.clone()), false));
            }
        })
    });
}

fn bench_lookup(c: &mut Criterion) {
    c.bench_function("registry::get_hit_10k_on_30k", |b| {
        let (_doc, layers, names) = filled(3);
        // Upper-cased so every probe folds case.
        let queries: Vec<String> = picks(&names, 10_000)
            .into_iter()
            .map(|n| n.to_uppercase())
            .collect();
        b.iter(|| {
            for n in &queries {
                black_box(layers.get(n));
            }
        })
    });

    c.bench_function("registry::get_miss_10k_on_30k", |b| {
        let (_doc, layers, _names) = filled(4);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let n = name(miss.next().unwrap());
                black_box(layers.get(&n));
            }
        })
    });
}

fn bench_remove(c: &mut Criterion) {
    c.bench_function("registry::remove_random_10k_of_30k", |b| {
        b.iter_batched(
            || {
                let (doc, layers, names) = filled(5);
                let mut targets = picks(&names, 10_000);
                targets.sort();
                targets.dedup();
                (doc, layers, targets)
            },
            |(mut doc, mut layers, targets)| {
                for n in &targets {
                    black_box(layers.remove(&mut doc, n));
                }
                black_box((doc, layers))
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_rename(c: &mut Criterion) {
    c.bench_function("registry::rename_10k_on_30k", |b| {
        b.iter_batched(
            || {
                let (doc, layers, names) = filled(6);
                let mut targets = picks(&names, 10_000);
                targets.sort();
                targets.dedup();
                (doc, layers, targets)
            },
            |(doc, mut layers, targets)| {
                for n in &targets {
                    let _ = black_box(layers.rename(n, &format!("{n}_r")));
                }
                black_box((doc, layers))
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_references(c: &mut Criterion) {
    c.bench_function("registry::reference_add_remove_10k", |b| {
        let (_doc, mut layers, names) = filled(7);
        let targets = picks(&names, 10_000);
        let by: Vec<Handle> = (1..=10_000u64)
            .map(|i| Handle::new(0x10_0000 + i).unwrap())
            .collect();
        b.iter(|| {
            for (n, h) in targets.iter().zip(&by) {
                let _ = layers.add_reference(n, *h);
            }
            for (n, h) in targets.iter().zip(&by) {
                black_box(layers.remove_reference(n, *h));
            }
        })
    });
}

fn bench_iter(c: &mut Criterion) {
    c.bench_function("registry::iter_all_30k", |b| {
        let (_doc, layers, _names) = filled(999);
        b.iter(|| {
            let mut sum = 0u64;
            for (_e, layer) in layers.iter() {
                sum = sum.wrapping_add(layer.handle().map_or(0, |h| h.get()));
            }
            black_box(sum)
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_add;
    config = bench_config();
    targets = bench_add_fresh, bench_add_duplicate
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_lookup,
              bench_remove,
              bench_rename,
              bench_references,
              bench_iter
}
criterion_main!(benches_add, benches_ops);
