//! Typed configuration objects from environment variables
//!
//! `envmix` builds configuration structs from the process environment. Each
//! field declares a shape through its Rust type, and the environment text is
//! coerced into that shape: scalars, lists, tuples, sets, maps, literal
//! enums, nested objects and optional values. Composite values accept both a
//! permissive comma-separated form and a JSON form, JSON always tried first.
//!
//! Explicit overrides take precedence over the environment, which takes
//! precedence over declared defaults. A process-wide registry records which
//! environment variable feeds which field of every registered schema.
//!
//! # Example
//!
//! ```rust
//! use envmix::EnvMix;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, EnvMix)]
//! #[envmix(prefix = "DOC_")]
//! struct Config {
//!     #[envmix(default = 8080)]
//!     pub port: u16,
//!
//!     #[envmix(default = vec!["api".to_string()])]
//!     pub tags: Vec<String>,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! #     std::env::set_var("DOC_TAGS", "api,v1");
//! let config = Config::from_env()?;
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.tags, ["api", "v1"]);
//!
//! let config = Config::from_env_with(envmix::Overrides::new().set("port", 9000))?;
//! assert_eq!(config.port, 9000);
//! #     Ok(())
//! # }
//! ```
//!
//! # Value Parsing
//!
//! | Type | Accepted text |
//! |------|---------------|
//! | `bool` | `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off` (any case) |
//! | integers, floats | the full text as a number |
//! | `String`, `PathBuf` | verbatim, or a quoted JSON string |
//! | `Vec<T>`, `HashSet<T>`, tuples | `a,b,c` or `["a","b","c"]` |
//! | `HashMap<K, V>` | `k=v,k=v` or `{"k":"v"}` |
//! | `#[derive(EnvLiteral)]` enums | `prod` or `"prod"` |
//! | `#[derive(EnvMix)]` structs | a JSON object only |
//! | `Option<T>` | as `T`; `None` when unset |
//!
//! Collections of collections must be given as JSON.
//!
//! # Attributes
//!
//! ## `#[envmix(prefix = "APP_")]`
//!
//! Prepended to every uppercased field name.
//!
//! ## `#[envmix(name = "CUSTOM_NAME")]`
//!
//! Read the field from this exact variable; the prefix is not applied.
//!
//! ```rust
//! # use envmix::EnvMix;
//! # use serde::Deserialize;
//! #[derive(Deserialize, EnvMix)]
//! #[envmix(prefix = "APP_")]
//! pub struct Config {
//!     // Load from SERVER_HOST, not APP_SERVER_HOST
//!     #[envmix(name = "SERVER_HOST", default = "0.0.0.0".to_string())]
//!     pub server_host: String,
//! }
//! ```
//!
//! ## `#[envmix(default)]` and `#[envmix(default = value)]`
//!
//! Value used when the variable is not set. Fields without a default are
//! required, except `Option<T>` fields, which default to `None`.
//!
//! # Registry
//!
//! ```rust
//! # use envmix::EnvMix;
//! # use serde::Deserialize;
//! #[derive(Deserialize, EnvMix)]
//! #[envmix(prefix = "REG_")]
//! struct Config {
//!     #[envmix(default)]
//!     pub debug: bool,
//! }
//!
//! Config::register();
//! let envs = envmix::get_registered_envs();
//! assert!(envs["REG_DEBUG"].iter().any(|r| r.field == "debug"));
//! ```

pub mod de;
pub mod factory;
pub mod registry;
pub mod schema;

mod error;

pub use envmix_derive::{EnvLiteral, EnvMix};
pub use error::{CoerceError, EnvMixError, NestedError};
pub use factory::Overrides;
pub use registry::{
    get_registered_envs, get_registered_models, register, EnvsView, FieldRef, ModelsView,
    Registry,
};
pub use schema::{
    resolve_env_key, EnvBinding, EnvShape, FieldDescriptor, ScalarKind, SchemaDescriptor, Shape,
};

// Re-export for macro-generated code
#[doc(hidden)]
pub use serde;
#[doc(hidden)]
pub use serde_json;

use serde::de::DeserializeOwned;

/// A configuration type that can be built from the environment.
///
/// Implemented by `#[derive(EnvMix)]`, which also requires the type to
/// implement `serde::Deserialize`.
pub trait EnvMix: DeserializeOwned {
    /// The static description of this type, built once.
    fn schema() -> &'static SchemaDescriptor;

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// - A present environment variable cannot be coerced into its field's shape
    /// - A required field has neither a value nor a default
    /// - The resolved values are rejected by the type's deserializer
    fn from_env() -> Result<Self, EnvMixError> {
        Self::from_env_with(Overrides::new())
    }

    /// Load configuration, taking the given fields from `overrides` instead of
    /// the environment.
    fn from_env_with(overrides: Overrides) -> Result<Self, EnvMixError> {
        factory::build(Self::schema(), &overrides)
    }

    /// Record this type's bindings in the process-wide registry.
    fn register() {
        registry::register(Self::schema());
    }

    /// Dotenv-style template documenting this type's variables.
    fn env_template() -> String {
        Self::schema().env_template()
    }
}
