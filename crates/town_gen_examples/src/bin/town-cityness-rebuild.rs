use town_gen::prelude::*;
use town_gen_examples::{init_tracing, render_world_to_png, RenderConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut orchestrator = Orchestrator::new(PipelineConfig::default())?;
    let mut controls = Controls::default();
    orchestrator.build(&controls, None)?;
    render_world_to_png(
        orchestrator.world(),
        &RenderConfig::new((800, 800)),
        "town-cityness-0.png",
    )?;

    // Only roads and buildings depend on cityness, so the terrain is reused.
    for (i, cityness) in [0.3, 0.6, 0.9].into_iter().enumerate() {
        let resume = controls.apply("cityness", ControlValue::Number(cityness))?;
        let report = orchestrator.build(&controls, resume)?;
        info!(
            "cityness {}: executed {:?} in {:.2?}.",
            cityness,
            report.executed_labels().collect::<Vec<_>>(),
            report.elapsed
        );
        render_world_to_png(
            orchestrator.world(),
            &RenderConfig::new((800, 800)),
            format!("town-cityness-{}.png", i + 1),
        )?;
    }
    Ok(())
}
