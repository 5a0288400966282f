use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use racecraft::config::EngineSettings;
use racecraft::models::{Goal, PerformanceRecord, RunnerProfile};
use racecraft::{planner, scenarios, ZoneCalculator, ZoneMode};
use rust_decimal_macros::dec;

/// Benchmarks for plan generation
///
/// Generation is closed-form, so cost scales with the number of plan weeks
/// and, for what-if runs, the number of goals.

fn create_profile() -> RunnerProfile {
    RunnerProfile {
        hr_max: Some(188),
        hr_rest: Some(55),
        ..Default::default()
    }
}

fn create_goal(prep_weeks: u32) -> Goal {
    Goal {
        distance_km: dec!(21.1),
        target_time_seconds: Some(6300),
        prep_weeks,
        days_per_week: 5,
        max_weekly_km: dec!(60),
        race_date: None,
    }
}

fn bench_generate(c: &mut Criterion) {
    let profile = create_profile();
    let performance = PerformanceRecord::new(dec!(10), 2880);

    let mut group = c.benchmark_group("Plan Generation");

    for &weeks in &[4, 12, 24, 52] {
        let goal = create_goal(weeks);

        group.throughput(Throughput::Elements(weeks as u64));
        group.bench_with_input(BenchmarkId::new("generate", weeks), &goal, |b, goal| {
            b.iter(|| planner::generate(black_box(&profile), black_box(&performance), black_box(goal)));
        });
    }

    group.finish();
}

fn bench_what_if(c: &mut Criterion) {
    let profile = create_profile();
    let performance = PerformanceRecord::new(dec!(10), 2880);
    let settings = EngineSettings::default();

    let mut group = c.benchmark_group("What-If Batch");

    for &count in &[8, 64, 256] {
        let weeks: Vec<u32> = (0..count).map(|i| 4 + i % 20).collect();
        let goals = scenarios::prep_week_variants(&create_goal(12), &weeks);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("evaluate_goals", count), &goals, |b, goals| {
            b.iter(|| scenarios::evaluate_goals(&profile, &performance, black_box(goals), &settings));
        });
    }

    group.finish();
}

fn bench_zones(c: &mut Criterion) {
    c.bench_function("compute_zones", |b| {
        b.iter(|| ZoneCalculator::compute_zones(black_box(Some(190)), black_box(Some(60)), &ZoneMode::Automatic));
    });
}

criterion_group!(benches, bench_generate, bench_what_if, bench_zones);
criterion_main!(benches);
