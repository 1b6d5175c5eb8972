use std::path::PathBuf;

use town_gen::prelude::*;
use town_gen_examples::{init_tracing, load_preset, render_world_to_png, RenderConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("presets");
    for file in ["harbour.ron", "hill_village.ron"] {
        let preset = load_preset(dir.join(file))?;
        let palette = preset.pipeline.placement.palette.clone();
        let mut orchestrator = Orchestrator::new(preset.pipeline)?;
        let report = orchestrator.build(&preset.controls, None)?;
        info!("Preset '{}' built in {:.2?}.", preset.name, report.elapsed);

        let out = format!("town-preset-{}.png", preset.name.replace(' ', "-"));
        render_world_to_png(
            orchestrator.world(),
            &RenderConfig::new((1000, 1000)).with_palette(palette),
            out,
        )?;
    }
    Ok(())
}
