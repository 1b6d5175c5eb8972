#![forbid(unsafe_code)]

mod presets;
mod rendering;

pub use presets::{load_preset, Preset};
pub use rendering::{init_tracing, render_world_to_png, RenderConfig};
