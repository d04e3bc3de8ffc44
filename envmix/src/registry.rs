//! Process-wide registry of environment variable bindings
//!
//! The registry records, for every registered schema, which environment
//! variable feeds which field, and the inverse mapping from variable name to
//! its consumers. It is written only when a schema is registered; reads
//! return owned snapshots.

use crate::schema::{EnvBinding, SchemaDescriptor};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

/// One field of one schema consuming an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldRef {
    pub schema: &'static str,
    pub field: &'static str,
}

/// Schema identity to `{field name: env var}`.
pub type ModelsView = BTreeMap<&'static str, BTreeMap<&'static str, String>>;

/// Env var to the set of fields reading it.
pub type EnvsView = BTreeMap<String, BTreeSet<FieldRef>>;

#[derive(Debug, Default)]
struct RegistryStore {
    models: ModelsView,
    envs: EnvsView,
}

impl RegistryStore {
    fn unlink(&mut self, schema: &'static str, fields: &BTreeMap<&'static str, String>) {
        for (field, env) in fields {
            if let Some(consumers) = self.envs.get_mut(env) {
                consumers.remove(&FieldRef {
                    schema,
                    field: *field,
                });
                if consumers.is_empty() {
                    self.envs.remove(env);
                }
            }
        }
    }
}

/// Store of schema bindings.
///
/// Most code uses the process-wide instance through [`register`],
/// [`get_registered_models`] and [`get_registered_envs`]; separate
/// instances are useful for tooling and tests.
#[derive(Debug, Default)]
pub struct Registry {
    store: Mutex<RegistryStore>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // The store is consistent after every write, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, RegistryStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install or replace the bindings of `schema`.
    ///
    /// Registering the same schema again replaces its previous entry, so
    /// each field appears exactly once in both views.
    pub fn register(&self, schema: &SchemaDescriptor) {
        let fields: BTreeMap<&'static str, String> = schema
            .fields()
            .iter()
            .map(|field| (field.name(), schema.env_key(field)))
            .collect();

        let mut store = self.lock();
        if let Some(previous) = store.models.remove(schema.id()) {
            tracing::debug!(schema = schema.id(), "replacing registered schema");
            store.unlink(schema.id(), &previous);
        }
        for (field, env) in &fields {
            let consumers = store.envs.entry(env.clone()).or_default();
            consumers.insert(FieldRef {
                schema: schema.id(),
                field: *field,
            });
            if consumers.len() > 1 {
                tracing::debug!(env = %env, consumers = consumers.len(), "environment variable shared");
            }
        }
        tracing::debug!(schema = schema.id(), fields = fields.len(), "registered schema");
        store.models.insert(schema.id(), fields);
    }

    /// Snapshot of schema identity to `{field: env var}`.
    pub fn models(&self) -> ModelsView {
        self.lock().models.clone()
    }

    /// Snapshot of env var to consuming fields.
    pub fn envs(&self) -> EnvsView {
        self.lock().envs.clone()
    }

    /// Fields reading `env`, empty if none.
    pub fn consumers(&self, env: &str) -> BTreeSet<FieldRef> {
        self.lock().envs.get(env).cloned().unwrap_or_default()
    }

    /// Env vars read by more than one field.
    pub fn collisions(&self) -> EnvsView {
        self.lock()
            .envs
            .iter()
            .filter(|(_, consumers)| consumers.len() > 1)
            .map(|(env, consumers)| (env.clone(), consumers.clone()))
            .collect()
    }

    /// Every binding, ordered by env var then schema and field.
    pub fn bindings(&self) -> Vec<EnvBinding> {
        let store = self.lock();
        let mut bindings: Vec<EnvBinding> = store
            .models
            .iter()
            .flat_map(|(schema, fields)| {
                fields.iter().map(move |(field, env)| EnvBinding {
                    env: env.clone(),
                    schema: *schema,
                    field: *field,
                })
            })
            .collect();
        bindings.sort();
        bindings
    }
}

/// The process-wide registry, created on first use.
pub fn global() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(Registry::new)
}

/// Register `schema` in the process-wide registry.
pub fn register(schema: &SchemaDescriptor) {
    global().register(schema);
}

/// Snapshot of every registered schema's `{field: env var}` mapping.
pub fn get_registered_models() -> ModelsView {
    global().models()
}

/// Snapshot of every env var and the fields that read it.
pub fn get_registered_envs() -> EnvsView {
    global().envs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnvShape, FieldDescriptor};
    use serde_json::Value;
    use std::sync::Arc;
    use std::thread;

    fn accept(_: Value) -> Result<(), serde_json::Error> {
        Ok(())
    }

    fn app_schema(prefix: &'static str) -> SchemaDescriptor {
        SchemaDescriptor::builder("tests::App", "App", accept)
            .prefix(prefix)
            .field(FieldDescriptor::new("port", u16::shape()))
            .field(FieldDescriptor::new("server_host", String::shape()).with_env("SERVER_HOST"))
            .build()
    }

    fn worker_schema() -> SchemaDescriptor {
        SchemaDescriptor::builder("tests::Worker", "Worker", accept)
            .field(FieldDescriptor::new("host", String::shape()).with_env("SERVER_HOST"))
            .build()
    }

    /// Inverse of the models view, for checking the envs view against.
    fn inverse(models: &ModelsView) -> EnvsView {
        let mut envs = EnvsView::new();
        for (schema, fields) in models {
            for (field, env) in fields {
                envs.entry(env.clone())
                    .or_default()
                    .insert(FieldRef {
                        schema: *schema,
                        field: *field,
                    });
            }
        }
        envs
    }

    #[test]
    fn test_register_records_both_views() {
        let registry = Registry::new();
        registry.register(&app_schema("APP_"));

        let models = registry.models();
        assert_eq!(models["tests::App"]["port"], "APP_PORT");
        assert_eq!(models["tests::App"]["server_host"], "SERVER_HOST");

        let envs = registry.envs();
        assert_eq!(
            envs["APP_PORT"],
            BTreeSet::from([FieldRef {
                schema: "tests::App",
                field: "port"
            }])
        );
    }

    #[test]
    fn test_register_twice_is_idempotent() {
        let registry = Registry::new();
        registry.register(&app_schema("APP_"));
        registry.register(&app_schema("APP_"));

        let models = registry.models();
        assert_eq!(models.len(), 1);
        assert_eq!(models["tests::App"].len(), 2);

        let envs = registry.envs();
        assert_eq!(envs.len(), 2);
        assert!(envs.values().all(|consumers| consumers.len() == 1));
    }

    #[test]
    fn test_reregister_replaces_bindings() {
        let registry = Registry::new();
        registry.register(&app_schema("APP_"));
        registry.register(&app_schema("SVC_"));

        let envs = registry.envs();
        assert!(!envs.contains_key("APP_PORT"));
        assert!(envs.contains_key("SVC_PORT"));
        assert_eq!(envs, inverse(&registry.models()));
    }

    #[test]
    fn test_shared_env_is_not_collapsed() {
        let registry = Registry::new();
        registry.register(&app_schema("APP_"));
        registry.register(&worker_schema());

        let consumers = registry.consumers("SERVER_HOST");
        assert_eq!(consumers.len(), 2);

        let collisions = registry.collisions();
        assert_eq!(collisions.keys().collect::<Vec<_>>(), ["SERVER_HOST"]);
        assert_eq!(registry.envs(), inverse(&registry.models()));
    }

    #[test]
    fn test_bindings_sorted() {
        let registry = Registry::new();
        registry.register(&worker_schema());
        registry.register(&app_schema("APP_"));

        let envs: Vec<_> = registry
            .bindings()
            .into_iter()
            .map(|b| (b.env, b.schema))
            .collect();
        assert_eq!(
            envs,
            [
                ("APP_PORT".to_string(), "tests::App"),
                ("SERVER_HOST".to_string(), "tests::App"),
                ("SERVER_HOST".to_string(), "tests::Worker"),
            ]
        );
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    if i % 2 == 0 {
                        registry.register(&app_schema("APP_"));
                    } else {
                        registry.register(&worker_schema());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let models = registry.models();
        assert_eq!(models.len(), 2);
        assert_eq!(registry.envs(), inverse(&models));
        assert_eq!(registry.consumers("SERVER_HOST").len(), 2);
    }

    #[test]
    fn test_unknown_env_has_no_consumers() {
        let registry = Registry::new();
        assert!(registry.consumers("NOPE").is_empty());
    }
}
