use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use scenario_report::{
    ActivityDetails, CompilerOptions, Outcome, ScenarioDetails, ScenarioReportCompiler, Tag,
};

/// 50 top-level activities, each with 20 nested ones
fn compile_wide_scenario() -> ScenarioReportCompiler {
    let t0 = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    let mut compiler = ScenarioReportCompiler::with_options(
        ScenarioDetails::new("Bulk checkout", "Shopping", "features/bulk.feature"),
        CompilerOptions::default().story_type("feature"),
    );

    compiler.scenario_started(t0).unwrap();
    compiler.tagged(Tag::Theme("Online".to_string())).unwrap();
    compiler.tagged(Tag::Capability("Checkout".to_string())).unwrap();

    let mut now = t0;
    for outer in 0..50 {
        compiler
            .activity_started(ActivityDetails::new(format!("basket {}", outer)), now)
            .unwrap();
        for inner in 0..20 {
            compiler
                .activity_started(ActivityDetails::new(format!("item {}", inner)), now)
                .unwrap();
            now += Duration::milliseconds(1);
            compiler.activity_finished(Outcome::Successful, now).unwrap();
            compiler.artifact_captured(format!("item-{}-{}.png", outer, inner)).unwrap();
        }
        compiler.activity_finished(Outcome::Successful, now).unwrap();
    }
    compiler.scenario_finished(now, Outcome::Successful).unwrap();
    compiler
}

fn benchmark_compile(c: &mut Criterion) {
    c.bench_function("compile_wide_scenario", |b| {
        b.iter(|| black_box(compile_wide_scenario()))
    });

    let compiler = compile_wide_scenario();
    c.bench_function("snapshot_wide_scenario", |b| {
        b.iter(|| black_box(compiler.snapshot()))
    });
}

criterion_group!(benches, benchmark_compile);
criterion_main!(benches);
