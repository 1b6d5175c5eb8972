//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, unknown stage labels and control names, pipeline ordering
//! violations between stages, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown stage '{label}'")]
    UnknownStage { label: String },

    #[error("unknown control '{name}'")]
    UnknownControl { name: String },

    #[error("stage '{stage}' requires the product of '{dependency}', which has not been built")]
    MissingDependency { stage: String, dependency: String },

    #[error("product '{label}' is not a {expected} product")]
    UnexpectedProduct {
        label: String,
        expected: &'static str,
    },

    #[error("product '{label}' was already published in this pass")]
    ProductAlreadySet { label: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn missing(stage: impl Into<String>, dependency: impl Into<String>) -> Self {
        Error::MissingDependency {
            stage: stage.into(),
            dependency: dependency.into(),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        matches!(err, Error::Other(_))
            .then_some(())
            .expect("expected Other variant");
    }

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }

    #[test]
    fn missing_dependency_names_both_stages() {
        let err = Error::missing("buildings", "ground");
        assert_eq!(
            err.to_string(),
            "stage 'buildings' requires the product of 'ground', which has not been built"
        );
    }
}
