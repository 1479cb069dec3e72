use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use logstat::{
    Pipeline, TargetDate, aggregate, aggregation::MetricsCalculator, grouping::SessionGrouper,
    parser::LogRecordParser,
};
use std::hint::black_box;

const LOG_TYPES: &[&str] = &["changeState", "userAction", "startValidSession", "heartbeat"];

fn create_test_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Spread over 15:00Z..23:59Z so every line lands on 2021-07-26 at +9
            let secs = (i * 7) % (9 * 3600);
            let (hour, min, sec) = (15 + secs / 3600, (secs / 60) % 60, secs % 60);
            let valid = if i % 3 == 0 { r#","sessionIsValid":"1""# } else { "" };
            format!(
                "[2021-07-25T{hour:02}:{min:02}:{sec:02}.{:03}Z]\t{{\"sessionId\":\"session-{}\",\"logType\":\"{}\"{valid}}}",
                i % 1000,
                i % 50,
                LOG_TYPES[i % LOG_TYPES.len()],
            )
        })
        .collect()
}

fn target() -> TargetDate {
    "20210726".parse().unwrap()
}

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    let lines = create_test_lines(10_000);
    let parser = LogRecordParser::new(target());

    group.bench_function("sequential_10000_lines", |b| {
        b.iter(|| parser.parse_lines(black_box(&lines)));
    });
    group.bench_function("parallel_10000_lines", |b| {
        b.iter(|| parser.parse_lines_parallel(black_box(&lines)));
    });

    group.finish();
}

fn benchmark_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");
    let (records, _) = LogRecordParser::new(target()).parse_lines(&create_test_lines(10_000));
    let sessions = SessionGrouper::group(records);

    group.bench_function("calculate_50_sessions", |b| {
        b.iter(|| MetricsCalculator::calculate(black_box(&sessions)));
    });
    group.bench_function("session_stats_50_sessions", |b| {
        b.iter(|| MetricsCalculator::session_stats(black_box(&sessions)));
    });

    group.finish();
}

fn benchmark_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    group.sample_size(20);
    let date = target();

    for count in [1_000, 10_000, 100_000] {
        let lines = create_test_lines(count);
        group.bench_with_input(BenchmarkId::new("aggregate", count), &lines, |b, lines| {
            b.iter(|| aggregate(black_box(lines), &date));
        });
        group.bench_with_input(BenchmarkId::new("pipeline_parallel", count), &lines, |b, lines| {
            let pipeline = Pipeline::new(date).with_parallel(true);
            b.iter(|| pipeline.run(black_box(lines)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parsing, benchmark_metrics, benchmark_aggregate);
criterion_main!(benches);
