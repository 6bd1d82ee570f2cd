use criterion::{criterion_group, criterion_main, Criterion};

use ams_grade::{grade, registry, Policy};
use ams_perm::{reference_environment, reference_table, SimConfig};

fn bench_grade(c: &mut Criterion) {
    let table = reference_table().unwrap();
    let env = reference_environment(&table, &SimConfig::with_seed(2024)).unwrap();
    let groups = registry::load();
    let policy = Policy::default();
    c.bench_function("grade_registry", |b| {
        b.iter(|| {
            let report = grade(&groups, &env, &policy).unwrap();
            criterion::black_box(report.points_earned);
        });
    });
}

criterion_group!(benches, bench_grade);
criterion_main!(benches);
