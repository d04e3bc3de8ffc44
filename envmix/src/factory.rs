//! Per-schema construction from overrides, the environment and defaults

use crate::de;
use crate::error::{CoerceError, EnvMixError, NestedError};
use crate::schema::{SchemaDescriptor, Shape};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::env;

/// Caller-supplied field values that bypass the environment.
///
/// Keys are field names, not environment variable names. Values are used
/// as given, without coercion.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    values: Map<String, Value>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a JSON-representable value.
    ///
    /// ```rust
    /// # use envmix::Overrides;
    /// let overrides = Overrides::new().set("port", 9000).set("debug", true);
    /// assert_eq!(overrides.get("port"), Some(&serde_json::json!(9000)));
    /// ```
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Set a field to any serializable value.
    pub fn set_serialized<T: Serialize + ?Sized>(
        self,
        field: impl Into<String>,
        value: &T,
    ) -> Result<Self, EnvMixError> {
        let field = field.into();
        match serde_json::to_value(value) {
            Ok(value) => Ok(self.set(field, value)),
            Err(source) => Err(EnvMixError::Override { field, source }),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read an environment variable from the process environment.
///
/// Returns `Ok(None)` when the variable is not set; an empty value is
/// returned as an empty string.
pub fn lookup_env(name: &str) -> Result<Option<String>, EnvMixError> {
    match env::var_os(name) {
        Some(value) => value
            .into_string()
            .map(Some)
            .map_err(|_| EnvMixError::NotUnicode {
                env: name.to_string(),
            }),
        None => Ok(None),
    }
}

/// Build `T` for `schema` from the process environment.
pub fn build<T: DeserializeOwned>(
    schema: &SchemaDescriptor,
    overrides: &Overrides,
) -> Result<T, EnvMixError> {
    build_with(schema, overrides, lookup_env)
}

/// Build `T` for `schema`, reading variables through `lookup`.
pub fn build_with<T, F>(
    schema: &SchemaDescriptor,
    overrides: &Overrides,
    lookup: F,
) -> Result<T, EnvMixError>
where
    T: DeserializeOwned,
    F: Fn(&str) -> Result<Option<String>, EnvMixError>,
{
    let fields = assemble(schema, overrides, lookup)?;
    serde_json::from_value(Value::Object(fields)).map_err(|source| {
        EnvMixError::DownstreamValidation {
            schema: schema.name(),
            source,
        }
    })
}

/// Resolve every field of `schema` into a field name to value map.
///
/// Precedence per field: override, then environment, then default. Stops at
/// the first failing field.
pub fn assemble<F>(
    schema: &SchemaDescriptor,
    overrides: &Overrides,
    lookup: F,
) -> Result<Map<String, Value>, EnvMixError>
where
    F: Fn(&str) -> Result<Option<String>, EnvMixError>,
{
    if let Some(unknown) = overrides
        .values
        .keys()
        .find(|name| schema.field(name).is_none())
    {
        return Err(EnvMixError::UnknownOverride {
            schema: schema.name(),
            field: unknown.clone(),
        });
    }

    let mut fields = Map::new();
    for field in schema.fields() {
        let env = schema.env_key(field);

        if let Some(value) = overrides.get(field.name()) {
            tracing::debug!(schema = schema.name(), field = field.name(), env = %env, "using override");
            fields.insert(field.name().to_string(), value.clone());
            continue;
        }

        if let Some(raw) = lookup(&env)? {
            tracing::debug!(schema = schema.name(), field = field.name(), env = %env, "using environment");
            let value = de::coerce(&raw, field.shape(), field.name()).map_err(|source| {
                EnvMixError::Coerce {
                    schema: schema.name(),
                    field: field.name(),
                    env: env.clone(),
                    shape: field.shape().to_string(),
                    value: raw.clone(),
                    source,
                }
            })?;
            fields.insert(field.name().to_string(), value);
            continue;
        }

        match field.default_value() {
            Some(default) => {
                tracing::debug!(schema = schema.name(), field = field.name(), env = %env, "using default");
                let value = default.map_err(|source| EnvMixError::Default {
                    schema: schema.name(),
                    field: field.name(),
                    source,
                })?;
                fields.insert(field.name().to_string(), value);
            }
            None if matches!(field.shape(), Shape::Optional(_)) => {
                fields.insert(field.name().to_string(), Value::Null);
            }
            None => {
                return Err(EnvMixError::Missing {
                    schema: schema.name(),
                    field: field.name(),
                    env,
                })
            }
        }
    }

    Ok(fields)
}

/// Build a nested object from an already-parsed JSON object.
///
/// Nested fields are never read from the environment. Present members are
/// coerced by field shape, missing ones take their defaults, unknown members
/// are passed through, and the schema's own validation runs last.
pub(crate) fn assemble_nested(
    schema: &SchemaDescriptor,
    mut object: Map<String, Value>,
    path: &str,
) -> Result<Value, CoerceError> {
    let text = Value::Object(object.clone()).to_string();

    for field in schema.fields() {
        let field_path = format!("{path}.{}", field.name());
        match object.remove(field.name()) {
            Some(value) => {
                let value = de::coerce_value(value, field.shape(), &field_path).map_err(|e| {
                    match e {
                        e @ CoerceError::NestedValidation { .. } => e,
                        e => {
                            let value = e.value().to_string();
                            de::nested_error(
                                schema,
                                &field_path,
                                &value,
                                NestedError::Field(Box::new(e)),
                            )
                        }
                    }
                })?;
                object.insert(field.name().to_string(), value);
            }
            None => {
                if let Some(default) = field.default_value() {
                    let value = default.map_err(|source| {
                        de::nested_error(
                            schema,
                            &field_path,
                            &text,
                            NestedError::Default {
                                field: field.name(),
                                source,
                            },
                        )
                    })?;
                    object.insert(field.name().to_string(), value);
                }
            }
        }
    }

    let value = Value::Object(object);
    schema
        .validate(value.clone())
        .map_err(|e| de::nested_error(schema, path, &text, NestedError::Validation(e)))?;
    Ok(value)
}
