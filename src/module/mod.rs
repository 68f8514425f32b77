use crate::config::ConfigService;
use crate::controller::Controller;
use crate::di::Container;
use crate::lifecycle::{LifecycleError, OnApplicationBootstrap, OnApplicationShutdown};
use crate::router::Router;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for application modules
///
/// A module wires its services into the [`Container`] and its routes into the
/// [`Router`] when [`initialize`](Module::initialize) runs. Optional bootstrap
/// and shutdown phases are declared when the module is registered, see
/// [`ModuleEntry`].
///
/// # Example
/// ```rust,ignore
/// struct UsersModule;
///
/// #[async_trait]
/// impl Module for UsersModule {
///     async fn initialize(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), LifecycleError> {
///         let service = Arc::new(UserService::default());
///         ctx.container().register_arc("users", Arc::clone(&service))?;
///         ctx.add_controller(Arc::new(UserController { service }))?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Module: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn initialize(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), LifecycleError>;
}

/// What a module sees while it initializes.
pub struct ModuleContext<'a> {
    container: &'a Arc<Container>,
    router: &'a mut Router,
    config: &'a ConfigService,
}

impl<'a> ModuleContext<'a> {
    pub fn new(
        container: &'a Arc<Container>,
        router: &'a mut Router,
        config: &'a ConfigService,
    ) -> Self {
        Self {
            container,
            router,
            config,
        }
    }

    pub fn container(&self) -> &Arc<Container> {
        self.container
    }

    pub fn router(&mut self) -> &mut Router {
        &mut *self.router
    }

    pub fn config(&self) -> &ConfigService {
        self.config
    }

    pub fn add_controller<C: Controller>(&mut self, controller: Arc<C>) -> crate::Result<()> {
        controller.register_routes(&mut *self.router)
    }
}

/// A registered module together with the lifecycle phases it takes part in.
pub struct ModuleEntry {
    pub(crate) name: String,
    pub(crate) identity: usize,
    pub(crate) module: Arc<RwLock<dyn Module>>,
    pub(crate) bootstrap: Option<Arc<RwLock<dyn OnApplicationBootstrap>>>,
    pub(crate) shutdown: Option<Arc<RwLock<dyn OnApplicationShutdown>>>,
}

impl ModuleEntry {
    /// Start describing a module that the registry will own.
    pub fn new<M: Module + 'static>(module: M) -> ModuleBuilder<M> {
        let name = module.name().to_string();
        ModuleBuilder::from_parts(Arc::new(RwLock::new(module)), name)
    }

    /// Start describing a module the caller keeps a handle to.
    pub fn shared<M: Module + 'static>(module: Arc<RwLock<M>>) -> ModuleBuilder<M> {
        let name = match module.try_read() {
            Ok(guard) => guard.name().to_string(),
            Err(_) => std::any::type_name::<M>().to_string(),
        };
        ModuleBuilder::from_parts(module, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_bootstrap(&self) -> bool {
        self.bootstrap.is_some()
    }

    pub fn has_shutdown(&self) -> bool {
        self.shutdown.is_some()
    }
}

/// Builder for [`ModuleEntry`].
pub struct ModuleBuilder<M> {
    module: Arc<RwLock<M>>,
    name: String,
    bootstrap: Option<Arc<RwLock<dyn OnApplicationBootstrap>>>,
    shutdown: Option<Arc<RwLock<dyn OnApplicationShutdown>>>,
}

impl<M: Module + 'static> ModuleBuilder<M> {
    fn from_parts(module: Arc<RwLock<M>>, name: String) -> Self {
        Self {
            module,
            name,
            bootstrap: None,
            shutdown: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run `on_application_bootstrap` once every module is initialized.
    pub fn with_bootstrap(mut self) -> Self
    where
        M: OnApplicationBootstrap,
    {
        let hook: Arc<RwLock<dyn OnApplicationBootstrap>> = self.module.clone();
        self.bootstrap = Some(hook);
        self
    }

    /// Run `on_application_shutdown` during teardown.
    pub fn with_shutdown(mut self) -> Self
    where
        M: OnApplicationShutdown,
    {
        let hook: Arc<RwLock<dyn OnApplicationShutdown>> = self.module.clone();
        self.shutdown = Some(hook);
        self
    }

    /// Shared handle to the module, e.g. to inspect it after shutdown.
    pub fn handle(&self) -> Arc<RwLock<M>> {
        Arc::clone(&self.module)
    }

    pub fn build(self) -> ModuleEntry {
        let identity = Arc::as_ptr(&self.module) as *const () as usize;
        let module: Arc<RwLock<dyn Module>> = self.module;
        ModuleEntry {
            name: self.name,
            identity,
            module,
            bootstrap: self.bootstrap,
            shutdown: self.shutdown,
        }
    }
}

impl<M: Module + 'static> From<ModuleBuilder<M>> for ModuleEntry {
    fn from(builder: ModuleBuilder<M>) -> Self {
        builder.build()
    }
}
