// Criterion benchmarks for Cohort Match

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use cohort_match::core::{distribute, normalize, summarize_groups, DedupKey, NormalizeOptions, PairMatcher};
use cohort_match::models::{AnimalRecord, RawTable, Sex};

const GENOTYPES: &[&str] = &["WT", "KO", "HET"];

fn create_animal(id: usize) -> AnimalRecord {
    AnimalRecord {
        id: format!("A{:04}", id),
        sex: if id % 2 == 0 { Sex::Female } else { Sex::Male },
        genotype: GENOTYPES[id % GENOTYPES.len()].to_string(),
        age_weeks: 6 + (id % 17) as u32,
    }
}

fn create_table(rows: usize) -> RawTable {
    let rows = (0..rows)
        .map(|i| {
            let animal = create_animal(i);
            vec![
                animal.id,
                animal.sex.to_string(),
                animal.genotype,
                animal.age_weeks.to_string(),
            ]
        })
        .collect();
    RawTable::new(&["Animal ID No.", "Sex", "Genotype", "Age (w)"], rows)
}

fn bench_pair_matching(c: &mut Criterion) {
    let matcher = PairMatcher::for_selection(2, GENOTYPES.len());

    let mut group = c.benchmark_group("pair_matching");

    for cohort_size in [10, 50, 100, 500].iter() {
        let animals: Vec<AnimalRecord> = (0..*cohort_size).map(create_animal).collect();

        group.bench_with_input(
            BenchmarkId::new("match_records", cohort_size),
            cohort_size,
            |b, _| {
                b.iter(|| matcher.match_records(black_box(&animals)));
            },
        );
    }

    group.finish();
}

fn bench_distribution(c: &mut Criterion) {
    let animals: Vec<AnimalRecord> = (0..300).map(create_animal).collect();
    let names = ["Control", "Low dose", "High dose"];

    c.bench_function("distribute_300_into_3", |b| {
        b.iter(|| {
            let result = distribute(black_box(&animals), black_box(&names)).unwrap();
            black_box(summarize_groups(&result.groups))
        });
    });
}

fn bench_normalize(c: &mut Criterion) {
    let table = create_table(1000);
    let options = NormalizeOptions::new(DedupKey::IdAndSex).with_genotypes(["WT", "KO"]);

    c.bench_function("normalize_1000_rows", |b| {
        b.iter(|| normalize(black_box(&table), black_box(&options)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_pair_matching,
    bench_distribution,
    bench_normalize
);

criterion_main!(benches);
