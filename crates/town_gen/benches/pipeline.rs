mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use town_gen::controls::Controls;
use town_gen::pipeline::{Orchestrator, PipelineConfig};
use town_gen::stages::labels;

const QUALITIES: [f32; 3] = [0.0, 0.5, 1.0];

fn full_build_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/full_build");
    for &quality in &QUALITIES {
        let controls = Controls::default().with_quality(quality);
        let mut orchestrator = Orchestrator::new(PipelineConfig::default()).expect("pipeline");
        group.bench_with_input(BenchmarkId::from_parameter(quality), &controls, |b, controls| {
            b.iter(|| {
                let report = orchestrator.build(controls, None).expect("build");
                black_box(report.stages.len());
            });
        });
    }
    group.finish();
}

fn partial_rebuild_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/rebuild_from_roads");
    for &quality in &QUALITIES {
        let controls = Controls::default().with_quality(quality);
        let mut orchestrator = Orchestrator::new(PipelineConfig::default()).expect("pipeline");
        orchestrator.build(&controls, None).expect("initial build");

        group.bench_with_input(BenchmarkId::from_parameter(quality), &controls, |b, controls| {
            b.iter(|| {
                let report = orchestrator
                    .build(controls, Some(labels::ROADS))
                    .expect("rebuild");
                black_box(report.first_stage);
            });
        });
    }
    group.finish();
}

fn draft_pass_benches(c: &mut Criterion) {
    let controls = Controls {
        draft: true,
        ..Controls::default().with_quality(0.0)
    };
    let mut orchestrator = Orchestrator::new(PipelineConfig::default()).expect("pipeline");
    c.bench_function("pipeline/draft_pass", |b| {
        b.iter(|| {
            let report = orchestrator.build(&controls, None).expect("draft");
            black_box(report.elapsed);
        });
    });
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = full_build_benches, partial_rebuild_benches, draft_pass_benches
}
criterion_main!(benches);
