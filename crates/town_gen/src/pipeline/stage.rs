//! The stage contract.
use crate::controls::ControlSet;
use crate::error::Result;
use crate::product::Product;

/// One step of the generation pipeline.
///
/// A stage reads the controls and the products of earlier stages from the
/// [`ControlSet`] and returns its own product. Stages hold no per-call state; anything
/// that must restart on every call lives inside `create`.
pub trait Stage: Send + Sync {
    /// Unique label; also the key the product is published under.
    fn label(&self) -> &str;

    /// Labels of earlier stages whose products this stage reads.
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    /// Produce this stage's product. `Ok(None)` adds nothing to the scene.
    fn create(&self, controls: &ControlSet) -> Result<Option<Product>>;
}

/// A stage backed by a closure.
pub struct FnStage<F>
where
    F: Fn(&ControlSet) -> Result<Option<Product>> + Send + Sync,
{
    label: String,
    dependencies: Vec<&'static str>,
    f: F,
}

impl<F> FnStage<F>
where
    F: Fn(&ControlSet) -> Result<Option<Product>> + Send + Sync,
{
    pub fn new(label: impl Into<String>, f: F) -> Self {
        Self {
            label: label.into(),
            dependencies: Vec::new(),
            f,
        }
    }

    pub fn with_dependencies(mut self, dependencies: &[&'static str]) -> Self {
        self.dependencies = dependencies.to_vec();
        self
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&ControlSet) -> Result<Option<Product>> + Send + Sync,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn dependencies(&self) -> &[&'static str] {
        &self.dependencies
    }

    #[inline]
    fn create(&self, controls: &ControlSet) -> Result<Option<Product>> {
        (self.f)(controls)
    }
}
