use std::time::{Duration, Instant};

use town_gen::prelude::*;
use town_gen_examples::{init_tracing, render_world_to_png, RenderConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let orchestrator = Orchestrator::new(PipelineConfig::default())?;
    let mut builder = TwoPassBuilder::new(orchestrator);
    let requester = builder.requester();

    let mut passes = 0;
    let mut sink = FnSink::new(|event| match event {
        PipelineEvent::FinalPassScheduled {
            generation,
            due_in,
            quality_changed,
        } => info!(
            "Generation {} final pass in {:?}{}.",
            generation,
            due_in,
            if quality_changed { " (initializing geometry)" } else { "" }
        ),
        PipelineEvent::FinalPassSuperseded { generation, current } => {
            info!("Generation {} superseded by {}.", generation, current)
        }
        PipelineEvent::PassFinished { report } => {
            passes += 1;
            info!("{:?} pass done in {:.2?}.", report.pass, report.elapsed);
        }
        _ => {}
    });

    // Simulate a user dragging the quality slider: three requests 10 ms apart, then a
    // pause long enough for the last final pass to run.
    let start = Instant::now();
    let mut clock = start;
    for quality in [0.3, 0.5, 0.8] {
        requester.submit(Controls::default().with_quality(quality), None);
        builder.poll_with_events(clock, &mut sink)?;
        clock += Duration::from_millis(10);
    }
    while let Some(due) = builder.next_due() {
        clock = clock.max(due);
        builder.poll_with_events(clock, &mut sink)?;
    }
    drop(sink);

    info!("{} passes ran for 3 requests.", passes);
    render_world_to_png(
        builder.orchestrator().world(),
        &RenderConfig::new((1000, 1000)),
        "town-two-pass.png",
    )?;
    Ok(())
}
