//! Static description of the user-facing controls.
//!
//! Each [`ControlSpec`] names one control, how it is entered, its default and, for
//! controls that only affect late stages, the stage a change should resume from.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::stages::labels;

/// How a control is entered by the user.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlInput {
    /// Free numeric value.
    Number,
    /// Fraction in `[0, 1]`, entered as a percentage.
    Slider,
    Checkbox,
}

/// A value for a single control.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlValue {
    Number(f32),
    Bool(bool),
}

impl ControlValue {
    /// Convert a slider percentage (`0..=100`) to its fractional value.
    pub fn from_slider_percent(percent: f32) -> Self {
        ControlValue::Number(0.01 * percent)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ControlSpec {
    /// Identifier used by [`crate::controls::Controls::apply`].
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    pub input: ControlInput,
    pub default: ControlValue,
    /// Stage a change of this control resumes from; `None` means full rebuild.
    pub rebuild_from: Option<&'static str>,
}

const fn spec(
    name: &'static str,
    label: &'static str,
    input: ControlInput,
    default: ControlValue,
) -> ControlSpec {
    ControlSpec {
        name,
        label,
        input,
        default,
        rebuild_from: None,
    }
}

pub const CONTROL_SPECS: [ControlSpec; 9] = [
    spec("x", "x", ControlInput::Number, ControlValue::Number(33.0)),
    spec("y", "y", ControlInput::Number, ControlValue::Number(3.0)),
    spec(
        "rivers",
        "rivers",
        ControlInput::Checkbox,
        ControlValue::Bool(true),
    ),
    spec(
        "terrain",
        "terrain",
        ControlInput::Slider,
        ControlValue::Number(0.25),
    ),
    spec("scale", "scale", ControlInput::Slider, ControlValue::Number(0.5)),
    spec(
        "sea_level",
        "sea level",
        ControlInput::Slider,
        ControlValue::Number(0.55),
    ),
    spec("flat", "flat", ControlInput::Slider, ControlValue::Number(0.2)),
    spec("shore", "shore", ControlInput::Slider, ControlValue::Number(0.2)),
    ControlSpec {
        name: "cityness",
        label: "cityness",
        input: ControlInput::Slider,
        default: ControlValue::Number(0.11),
        rebuild_from: Some(labels::ROADS),
    },
];

/// Look up a control by name.
pub fn spec_for(name: &str) -> Option<&'static ControlSpec> {
    CONTROL_SPECS.iter().find(|s| s.name == name)
}
