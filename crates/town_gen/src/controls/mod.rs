//! User controls and the per-pass control set.
//!
//! [`Controls`] holds the raw scalar inputs. At the start of every pass the orchestrator
//! derives a [`ControlSet`] from them, which then accumulates the products of every stage
//! that has run so far.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod schema;
pub mod set;

pub use schema::{spec_for, ControlInput, ControlSpec, ControlValue, CONTROL_SPECS};
pub use set::{model_scale_for, segments_for_quality, ControlSet};

/// Raw control values.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    /// Position seed along X.
    pub x: f32,
    /// Position seed along Y.
    pub y: f32,
    pub rivers: bool,
    /// Terrain roughness in `[0, 1]`.
    pub terrain: f32,
    /// Model scale slider in `[0, 1]`.
    pub scale: f32,
    /// Sea level as a fraction of the height limit.
    pub sea_level: f32,
    /// Flatness of the buildable plateau.
    pub flat: f32,
    /// Shore tolerance.
    pub shore: f32,
    /// Density of the road network.
    pub cityness: f32,
    /// Requested mesh quality in `[0, 1]`.
    pub quality: f32,
    /// Set by the orchestrator during the draft pass; stages use it to skip expensive work.
    pub draft: bool,
}

impl Default for Controls {
    fn default() -> Self {
        let mut controls = Self {
            x: 0.0,
            y: 0.0,
            rivers: false,
            terrain: 0.0,
            scale: 0.0,
            sea_level: 0.0,
            flat: 0.0,
            shore: 0.0,
            cityness: 0.0,
            quality: 0.5,
            draft: false,
        };
        for spec in &CONTROL_SPECS {
            let applied = controls.set(spec.name, spec.default);
            debug_assert!(
                applied.is_ok(),
                "schema default of '{}' does not fit its field",
                spec.name
            );
        }
        controls
    }
}

impl Controls {
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_cityness(mut self, cityness: f32) -> Self {
        self.cityness = cityness;
        self
    }

    /// Update the control called `name` and return the stage a rebuild should resume
    /// from (`None` for a full rebuild).
    pub fn apply(&mut self, name: &str, value: ControlValue) -> Result<Option<&'static str>> {
        let spec = spec_for(name).ok_or_else(|| Error::UnknownControl {
            name: name.to_string(),
        })?;
        self.set(spec.name, value)?;
        Ok(spec.rebuild_from)
    }

    fn set(&mut self, name: &str, value: ControlValue) -> Result<()> {
        match (name, value) {
            ("rivers", ControlValue::Bool(b)) => self.rivers = b,
            ("rivers", ControlValue::Number(_)) => {
                return Err(Error::InvalidConfig("'rivers' expects a boolean".into()))
            }
            (_, ControlValue::Bool(_)) => {
                return Err(Error::InvalidConfig(format!(
                    "'{name}' expects a number"
                )))
            }
            (_, ControlValue::Number(n)) => {
                let field = match name {
                    "x" => &mut self.x,
                    "y" => &mut self.y,
                    "terrain" => &mut self.terrain,
                    "scale" => &mut self.scale,
                    "sea_level" => &mut self.sea_level,
                    "flat" => &mut self.flat,
                    "shore" => &mut self.shore,
                    "cityness" => &mut self.cityness,
                    "quality" => &mut self.quality,
                    _ => {
                        return Err(Error::UnknownControl {
                            name: name.to_string(),
                        })
                    }
                };
                *field = n;
            }
        }
        Ok(())
    }

    /// Validates the controls, returning an error if any value is unusable.
    pub fn validate(&self) -> Result<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(Error::InvalidConfig("position must be finite".into()));
        }
        let sliders = [
            ("terrain", self.terrain),
            ("scale", self.scale),
            ("sea_level", self.sea_level),
            ("flat", self.flat),
            ("shore", self.shore),
            ("cityness", self.cityness),
            ("quality", self.quality),
        ];
        for (name, value) in sliders {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "'{name}' must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}
