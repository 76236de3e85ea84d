use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use campus_core::{CourseId, EnrollmentId, StudentId};
use campus_enrollment::{Average, Enrollment, Score, ScoreUpdate, recompute_grade_state};
use chrono::Utc;
use rust_decimal::Decimal;

fn scores(n: usize) -> Vec<(Score, Score)> {
    (0..n as i64)
        .map(|i| {
            let a = Score::new(Decimal::new(i % 1001, 2)).unwrap();
            let b = Score::new(Decimal::new((i * 7) % 1001, 2)).unwrap();
            (a, b)
        })
        .collect()
}

fn bench_average(c: &mut Criterion) {
    let mut group = c.benchmark_group("average");

    for size in [100usize, 1_000, 10_000] {
        let pairs = scores(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &pairs, |b, pairs| {
            b.iter(|| {
                for (s1, s2) in pairs {
                    black_box(Average::of(*s1, *s2).status());
                }
            });
        });
    }

    group.finish();
}

fn bench_grade_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade_record");
    let pairs = scores(1_000);

    group.bench_function("grade_then_recompute", |b| {
        b.iter(|| {
            for (s1, s2) in &pairs {
                let mut enrollment =
                    Enrollment::open(EnrollmentId::new(), StudentId::new(), CourseId::new(), Utc::now());
                enrollment.grade(ScoreUpdate {
                    score1: Some(*s1),
                    score2: Some(*s2),
                });
                // Second pass exercises the idempotent path.
                recompute_grade_state(&mut enrollment);
                black_box(enrollment.status());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_average, bench_grade_record);
criterion_main!(benches);
