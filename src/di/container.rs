use crate::error::{RestViewError, Result};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Function that turns the stored concrete instance into an `Arc<dyn Trait>`,
/// wrapped again in `Arc<dyn Any>` so it can be stored uniformly.
type CasterFn =
    Arc<dyn Fn(Arc<dyn Any + Send + Sync>) -> Option<Arc<dyn Any + Send + Sync>> + Send + Sync>;

/// Bootstrap-time registry of services and named parameters.
///
/// Components never hold on to the container. They resolve what they need
/// once in [`Injectable::inject`](crate::di::Injectable::inject) and keep the
/// resolved collaborators as plain fields.
#[derive(Clone, Default)]
pub struct Container {
    services: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    trait_mappings: DashMap<TypeId, TypeId>,
    casters: DashMap<TypeId, CasterFn>,
    parameters: DashMap<String, serde_json::Value>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: 'static + Send + Sync>(&mut self, instance: T) -> &mut Self {
        self.services.insert(TypeId::of::<T>(), Arc::new(instance));
        self
    }

    pub fn register_trait<Trait, Impl, F>(&mut self, caster_fn: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        let trait_id = TypeId::of::<Trait>();
        self.trait_mappings.insert(trait_id, TypeId::of::<Impl>());

        let caster: CasterFn = Arc::new(move |instance: Arc<dyn Any + Send + Sync>| {
            let concrete = instance.downcast::<Impl>().ok()?;
            let trait_obj: Arc<Trait> = caster_fn(concrete);
            Some(Arc::new(trait_obj) as Arc<dyn Any + Send + Sync>)
        });
        self.casters.insert(trait_id, caster);
        self
    }

    /// Store a named configuration parameter.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: serde_json::Value) -> &mut Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Read a named parameter, deserializing it into `T`.
    pub fn parameter<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .parameters
            .get(name)
            .ok_or_else(|| RestViewError::DependencyNotFound {
                type_name: format!("parameter '{}'", name),
            })?;
        serde_json::from_value(value.clone())
            .map_err(|e| RestViewError::invalid_config(name, e.to_string()))
    }

    pub fn resolve<T: 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let type_name = std::any::type_name::<T>();
        let instance = self
            .services
            .get(&TypeId::of::<T>())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RestViewError::DependencyNotFound {
                type_name: type_name.to_string(),
            })?;
        instance
            .downcast::<T>()
            .map_err(|_| RestViewError::DowncastFailed {
                type_name: type_name.to_string(),
            })
    }

    pub fn resolve_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let trait_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        let caster = self
            .casters
            .get(&trait_id)
            .map(|c| c.value().clone())
            .ok_or_else(|| RestViewError::DependencyNotFound {
                type_name: type_name.to_string(),
            })?;
        let impl_id = *self
            .trait_mappings
            .get(&trait_id)
            .ok_or_else(|| RestViewError::DependencyNotFound {
                type_name: format!("No implementation mapping found for trait '{}'", type_name),
            })?;
        let instance = self
            .services
            .get(&impl_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RestViewError::DependencyNotFound {
                type_name: format!("Implementation for trait '{}' not registered", type_name),
            })?;

        let downcast_failed = || RestViewError::DowncastFailed {
            type_name: type_name.to_string(),
        };
        let wrapper = caster(instance)
            .ok_or_else(downcast_failed)?
            .downcast::<Arc<T>>()
            .map_err(|_| downcast_failed())?;
        Ok(wrapper.as_ref().clone())
    }

    pub fn contains<T: 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.services.contains_key(&type_id) || self.trait_mappings.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct Kernel {
        debug: bool,
    }

    trait Renderer: Send + Sync {
        fn name(&self) -> &str;
    }

    struct PlainRenderer;

    impl Renderer for PlainRenderer {
        fn name(&self) -> &str {
            "plain"
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut container = Container::new();
        container.register(Kernel { debug: true });
        assert!(container.resolve::<Kernel>().unwrap().debug);
        assert!(container.contains::<Kernel>());
    }

    #[test]
    fn test_register_and_resolve_trait() {
        let mut container = Container::new();
        container.register(PlainRenderer);
        container.register_trait::<dyn Renderer, PlainRenderer, _>(|r| r as Arc<dyn Renderer>);
        let renderer = container.resolve_trait::<dyn Renderer>().unwrap();
        assert_eq!(renderer.name(), "plain");
    }

    #[test]
    fn test_missing_service_is_reported() {
        let container = Container::new();
        let err = container.resolve_trait::<dyn Renderer>().err().unwrap();
        assert!(matches!(err, RestViewError::DependencyNotFound { .. }));
    }

    #[test]
    fn test_parameters_deserialize() {
        let mut container = Container::new();
        container.set_parameter("codes", json!({"NotFound": 404}));
        let codes: HashMap<String, u16> = container.parameter("codes").unwrap();
        assert_eq!(codes["NotFound"], 404);

        let err = container.parameter::<Vec<u16>>("codes").unwrap_err();
        assert!(matches!(err, RestViewError::InvalidConfig { .. }));
        assert!(container.parameter::<bool>("missing").is_err());
    }
}
