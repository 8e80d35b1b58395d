use bjorn_abbrev::{
    AbbreviationPipeline, AbbreviationRequest, BatchOptions, BatchProcessor, DictionaryStore, SharedDictionary, Table,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const DESCRIPTIONS: &[&str] = &[
    "Temperature Controller",
    "Stainless Steel Recirculation Pump Assembly",
    "Thermostatic Mixing Valve Assembly with Check Stops",
    "Factory Assembled Hydrotherapy Shower Cabinet Group",
    "Butterfly Valve 3/4\" Bronze Body w/ Lever Handle",
    "Differential Pressure Transmitter, Remote Mount",
    "Variable Frequency Drive Replacement Keypad Display",
    "Thermoregulatorization",
];

fn pipeline() -> AbbreviationPipeline {
    AbbreviationPipeline::rule_based(SharedDictionary::new(DictionaryStore::with_defaults()))
}

// WHY: Budget drives how far the cap search descends; tight budgets hit every transformer
fn bench_single_request(c: &mut Criterion) {
    let pipeline = pipeline();
    let mut group = c.benchmark_group("single_request");

    for target in [40, 20, 8] {
        group.bench_with_input(BenchmarkId::new("target", target), &target, |b, &target| {
            b.iter(|| {
                for text in DESCRIPTIONS {
                    let request = AbbreviationRequest::new(*text).with_target_length(target);
                    black_box(pipeline.abbreviate(black_box(&request)).unwrap());
                }
            })
        });
    }

    group.finish();
}

fn bench_dictionary_lookup(c: &mut Criterion) {
    let store = DictionaryStore::with_defaults();
    let text = DESCRIPTIONS.join(" ");

    let mut group = c.benchmark_group("dictionary");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("apply_defaults", |b| {
        b.iter(|| black_box(store.apply(black_box(&text))))
    });
    group.finish();
}

fn bench_batch_workers(c: &mut Criterion) {
    let pipeline = pipeline();
    let rows: Vec<Vec<String>> = (0..2_000)
        .map(|i| vec![format!("B-{i}"), DESCRIPTIONS[i % DESCRIPTIONS.len()].to_string()])
        .collect();
    let table = Table {
        headers: vec!["Part Number".to_string(), "Part Definition".to_string()],
        rows,
    };

    let mut group = c.benchmark_group("batch");
    group.throughput(Throughput::Elements(table.rows.len() as u64));
    group.sample_size(20);

    for workers in [1, num_cpus::get()] {
        group.bench_with_input(BenchmarkId::new("workers", workers), &workers, |b, &workers| {
            let processor = BatchProcessor::new(&pipeline, BatchOptions::new(20).with_workers(workers));
            b.iter(|| black_box(processor.process(black_box(&table), None).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_request, bench_dictionary_lookup, bench_batch_workers);
criterion_main!(benches);
