use crate::error::{Result, SailError};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

type Provider = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum ProviderKey {
    Named(String),
    Typed(TypeId),
}

/// Thread-safe provider registry.
///
/// Providers are stored either under a string name (`register` / `resolve`)
/// or under their own type (`provide` / `get`). The two key spaces never
/// collide.
///
/// Once [`freeze`](Container::freeze) has been called every registration
/// fails with [`SailError::ContainerFrozen`]. [`Application`](crate::Application)
/// freezes its container as soon as all modules are initialized, so writes
/// after the server starts serving are rejected instead of silently racing
/// request handlers.
pub struct Container {
    providers: DashMap<ProviderKey, Provider>,
    frozen: AtomicBool,
}

impl Container {
    pub fn new() -> Self {
        Self {
            providers: DashMap::new(),
            frozen: AtomicBool::new(false),
        }
    }

    /// Store `provider` under `name`, replacing any previous value.
    pub fn register<T: 'static + Send + Sync>(
        &self,
        name: impl Into<String>,
        provider: T,
    ) -> Result<()> {
        self.register_arc(name, Arc::new(provider))
    }

    /// Store an already shared provider under `name`.
    pub fn register_arc<T: 'static + Send + Sync>(
        &self,
        name: impl Into<String>,
        provider: Arc<T>,
    ) -> Result<()> {
        let name = name.into();
        self.ensure_writable(&name)?;
        if self
            .providers
            .insert(ProviderKey::Named(name.clone()), provider)
            .is_some()
        {
            tracing::debug!(provider = %name, "Replaced existing provider");
        }
        Ok(())
    }

    /// Look up a named provider. `None` when the name is unknown or the
    /// stored value is not a `T`.
    pub fn resolve<T: 'static + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let provider = self
            .providers
            .get(&ProviderKey::Named(name.to_string()))
            .map(|entry| entry.value().clone())?;
        provider.downcast::<T>().ok()
    }

    /// Like [`resolve`](Container::resolve) but turns a miss into an error.
    ///
    /// Meant for startup wiring inside `Module::initialize`, where a missing
    /// provider should abort the whole application start.
    pub fn must_resolve<T: 'static + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        let provider = self
            .providers
            .get(&ProviderKey::Named(name.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SailError::ProviderNotFound {
                name: name.to_string(),
            })?;
        provider
            .downcast::<T>()
            .map_err(|_| SailError::ProviderTypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }

    /// Register a provider keyed by its own type.
    pub fn provide<T: 'static + Send + Sync>(&self, provider: T) -> Result<()> {
        self.ensure_writable(std::any::type_name::<T>())?;
        self.providers
            .insert(ProviderKey::Typed(TypeId::of::<T>()), Arc::new(provider));
        Ok(())
    }

    pub fn get<T: 'static + Send + Sync>(&self) -> Option<Arc<T>> {
        let provider = self
            .providers
            .get(&ProviderKey::Typed(TypeId::of::<T>()))
            .map(|entry| entry.value().clone())?;
        provider.downcast::<T>().ok()
    }

    pub fn require<T: 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        self.get::<T>().ok_or_else(|| SailError::ProviderNotFound {
            name: std::any::type_name::<T>().to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers
            .contains_key(&ProviderKey::Named(name.to_string()))
    }

    /// Reject all further registrations.
    pub fn freeze(&self) {
        if !self.frozen.swap(true, Ordering::AcqRel) {
            tracing::debug!(providers = self.len(), "Container frozen");
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn ensure_writable(&self, name: &str) -> Result<()> {
        if self.is_frozen() {
            tracing::warn!(provider = %name, "Registration attempted on frozen container");
            return Err(SailError::ContainerFrozen {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestService {
        value: i32,
    }

    #[test]
    fn test_register_and_resolve() {
        let container = Container::new();
        container
            .register("x", TestService { value: 42 })
            .unwrap();

        let service = container.resolve::<TestService>("x").unwrap();
        assert_eq!(service.value, 42);
        assert!(container.resolve::<TestService>("y").is_none());
    }

    #[test]
    fn test_register_overwrites_silently() {
        let container = Container::new();
        container.register("x", TestService { value: 1 }).unwrap();
        container.register("x", TestService { value: 2 }).unwrap();

        assert_eq!(container.len(), 1);
        assert_eq!(container.resolve::<TestService>("x").unwrap().value, 2);
    }

    #[test]
    fn test_must_resolve_reports_miss_and_mismatch() {
        let container = Container::new();
        container.register("number", 7_u32).unwrap();

        assert!(matches!(
            container.must_resolve::<u32>("missing"),
            Err(SailError::ProviderNotFound { name }) if name == "missing"
        ));
        assert!(matches!(
            container.must_resolve::<String>("number"),
            Err(SailError::ProviderTypeMismatch { name, .. }) if name == "number"
        ));
        assert_eq!(*container.must_resolve::<u32>("number").unwrap(), 7);
    }

    #[test]
    fn test_typed_and_named_keys_are_separate() {
        let container = Container::new();
        container.provide(TestService { value: 5 }).unwrap();

        assert_eq!(container.get::<TestService>().unwrap().value, 5);
        assert!(!container.contains(std::any::type_name::<TestService>()));
        assert!(container.require::<String>().is_err());
    }

    #[test]
    fn test_frozen_container_rejects_writes() {
        let container = Container::new();
        container.register("before", 1_i32).unwrap();
        container.freeze();

        assert!(container.is_frozen());
        assert!(matches!(
            container.register("after", 2_i32),
            Err(SailError::ContainerFrozen { name }) if name == "after"
        ));
        assert!(container.provide(3_i32).is_err());
        assert_eq!(*container.resolve::<i32>("before").unwrap(), 1);
    }

    #[test]
    fn test_concurrent_resolve_during_register() {
        let container = Arc::new(Container::new());
        container.register("shared", 1_u64).unwrap();

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let container = Arc::clone(&container);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        let value = *container.resolve::<u64>("shared").unwrap();
                        assert!(value == 1 || value == 2);
                    }
                })
            })
            .collect();

        container.register("shared", 2_u64).unwrap();

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(*container.resolve::<u64>("shared").unwrap(), 2);
    }
}
