use crate::di::Container;
use std::sync::Arc;

/// Builder for the bootstrap container.
///
/// # Example
/// ```
/// use restview::di::ContainerBuilder;
/// use restview::kernel::Kernel;
/// use serde_json::json;
///
/// let container = ContainerBuilder::new()
///     .register(Kernel::new(true))
///     .parameter("restview.exception.codes", json!({"NotFound": 404}))
///     .build();
/// assert!(container.contains::<Kernel>());
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Register a service instance
    pub fn register<T: 'static + Send + Sync>(mut self, instance: T) -> Self {
        self.container.register(instance);
        self
    }

    /// Bind a trait to a registered implementation so `Arc<dyn Trait>` resolves.
    pub fn bind<Trait, Impl, F>(mut self, caster: F) -> Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        self.container.register_trait::<Trait, Impl, F>(caster);
        self
    }

    /// Set a named configuration parameter
    pub fn parameter(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.container.set_parameter(name, value);
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
