use std::{collections::HashMap, fmt, sync::Arc};

use super::CommandHandler;

/// Creates a fresh handler for one invocation.
pub type HandlerFactory = Arc<dyn Fn() -> Box<dyn CommandHandler> + Send + Sync>;

/// Maps handler identifiers, as named by command definitions, to the
/// factories that build them.
///
/// Definitions refer to handlers by a stable string such as `"eat.banana"`.
/// The processor looks the identifier up once the command is resolved, so
/// a tree can be built and validated before any handler exists.
///
/// ```text
/// registry
/// ├── eat.banana       -> BananaHandler
/// ├── config.list      -> ListProfilesHandler
/// └── config.profiles  -> ProfileNamesHandler
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerFactory>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.ids())
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `id`, replacing any earlier registration.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn CommandHandler> + Send + Sync + 'static,
    {
        self.handlers.insert(id.into(), Arc::new(factory));
    }

    /// Registers a handler type built with `Default`.
    pub fn register_default<H>(&mut self, id: impl Into<String>)
    where
        H: CommandHandler + Default + 'static,
    {
        self.register(id, || Box::new(H::default()));
    }

    /// Builds the handler registered under `id`.
    pub fn create(&self, id: &str) -> Option<Box<dyn CommandHandler>> {
        self.handlers.get(id).map(|factory| factory())
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
