use town_gen::prelude::*;
use town_gen_examples::{init_tracing, render_world_to_png, RenderConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = PipelineConfig::default();
    let mut orchestrator = Orchestrator::new(config)?;
    let report = orchestrator.build(&Controls::default(), None)?;

    for timing in &report.stages {
        info!("{:<12} {:>8.2?}", timing.label, timing.elapsed);
    }
    if let Some(Product::Buildings(buildings)) = orchestrator.retained(labels::BUILDINGS).map(|p| p.as_ref()) {
        info!(
            "{} buildings from {} road segments.",
            buildings.len(),
            buildings.stats.candidates
        );
    }

    render_world_to_png(
        orchestrator.world(),
        &RenderConfig::new((1000, 1000)),
        "town-default.png",
    )?;
    Ok(())
}
