#![forbid(unsafe_code)]

//! Component registry: route component names to mount factories.

use ahash::AHashMap;
use std::rc::Rc;
use tracing::warn;

use crate::router::MountContext;

/// A mount factory builds a component's subtree under the outlet.
pub type MountFn = Rc<dyn Fn(&MountContext)>;

/// Name-to-factory registry consulted on every successful route match.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: AHashMap<String, MountFn>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ComponentRegistry").field("components", &names).finish()
    }
}

impl ComponentRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component. Re-registering a name replaces the factory.
    pub fn register(&mut self, name: &str, mount: impl Fn(&MountContext) + 'static) {
        self.components.insert(name.to_owned(), Rc::new(mount));
    }

    /// Whether a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Mount a component by name. An unregistered name mounts nothing and
    /// returns `false`.
    pub fn mount(&self, name: &str, ctx: &MountContext) -> bool {
        match self.components.get(name) {
            Some(mount) => {
                mount(ctx);
                true
            }
            None => {
                warn!(component = name, "component not registered");
                false
            }
        }
    }
}
