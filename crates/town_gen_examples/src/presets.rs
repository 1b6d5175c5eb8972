//! Control presets stored as RON.
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use town_gen::prelude::*;

/// A named set of controls plus optional pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub controls: Controls,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Preset {
    /// Validate both the controls and the pipeline settings.
    pub fn validate(&self) -> town_gen::error::Result<()> {
        self.controls.validate()?;
        self.pipeline.validate()
    }
}

pub fn load_preset(path: impl AsRef<Path>) -> anyhow::Result<Preset> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading preset {}", path.display()))?;
    let preset: Preset =
        ron::from_str(&text).with_context(|| format!("parsing preset {}", path.display()))?;
    preset.validate()?;
    Ok(preset)
}
