//! Schema and field descriptors
//!
//! A [`SchemaDescriptor`] is the static description of one configuration
//! type: its prefix, its ordered fields and the [`Shape`] of each field. It
//! is normally generated by `#[derive(EnvMix)]` and built once per type.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

/// Lazily evaluated default value of a field.
pub type DefaultFn = fn() -> Result<Value, serde_json::Error>;

/// Runs the final construction of a schema against an assembled object.
pub type ValidateFn = fn(Value) -> Result<(), serde_json::Error>;

/// Scalar kinds a field can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    /// Integer of the given width in bits (at most 64).
    Int { signed: bool, bits: u32 },
    Float { bits: u32 },
    String,
    Path,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int { signed: true, bits } => write!(f, "i{bits}"),
            Self::Int { signed: false, bits } => write!(f, "u{bits}"),
            Self::Float { bits } => write!(f, "f{bits}"),
            Self::String => f.write_str("string"),
            Self::Path => f.write_str("path"),
        }
    }
}

/// Declared shape of a field.
///
/// The shape drives which textual formats are accepted for a field and how
/// they are coerced.
#[derive(Debug, Clone)]
pub enum Shape {
    Scalar(ScalarKind),
    Sequence(Box<Shape>),
    Tuple(Vec<Shape>),
    Set(Box<Shape>),
    Mapping { key: Box<Shape>, value: Box<Shape> },
    /// One of a fixed set of literal string values.
    Tagged(&'static [&'static str]),
    /// A nested configuration object, decoded from a JSON object.
    Nested(&'static SchemaDescriptor),
    Optional(Box<Shape>),
}

impl Shape {
    /// Whether values of this shape can only be written as structured JSON.
    ///
    /// Such shapes cannot appear as items of a comma-separated list.
    pub fn requires_structure(&self) -> bool {
        match self {
            Self::Sequence(_)
            | Self::Tuple(_)
            | Self::Set(_)
            | Self::Mapping { .. }
            | Self::Nested(_) => true,
            Self::Optional(inner) => inner.requires_structure(),
            Self::Scalar(_) | Self::Tagged(_) => false,
        }
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (
                Self::Mapping { key: ka, value: va },
                Self::Mapping { key: kb, value: vb },
            ) => ka == kb && va == vb,
            (Self::Tagged(a), Self::Tagged(b)) => a == b,
            (Self::Nested(a), Self::Nested(b)) => a.id() == b.id(),
            (Self::Optional(a), Self::Optional(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => kind.fmt(f),
            Self::Sequence(elem) => write!(f, "list<{elem}>"),
            Self::Tuple(elems) => {
                f.write_str("tuple<")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    elem.fmt(f)?;
                }
                f.write_str(">")
            }
            Self::Set(elem) => write!(f, "set<{elem}>"),
            Self::Mapping { key, value } => write!(f, "map<{key}, {value}>"),
            Self::Tagged(allowed) => write!(f, "literal{allowed:?}"),
            Self::Nested(schema) => f.write_str(schema.name()),
            Self::Optional(inner) => write!(f, "option<{inner}>"),
        }
    }
}

/// Maps a Rust type onto its declared [`Shape`].
///
/// Implemented for the supported scalar and collection types. Structs
/// deriving `EnvMix` implement it as [`Shape::Nested`], fieldless enums
/// deriving `EnvLiteral` as [`Shape::Tagged`].
pub trait EnvShape {
    fn shape() -> Shape;
}

macro_rules! scalar_shape {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl EnvShape for $ty {
                fn shape() -> Shape {
                    Shape::Scalar($kind)
                }
            }
        )*
    };
}

scalar_shape! {
    bool => ScalarKind::Bool,
    i8 => ScalarKind::Int { signed: true, bits: 8 },
    i16 => ScalarKind::Int { signed: true, bits: 16 },
    i32 => ScalarKind::Int { signed: true, bits: 32 },
    i64 => ScalarKind::Int { signed: true, bits: 64 },
    isize => ScalarKind::Int { signed: true, bits: isize::BITS },
    u8 => ScalarKind::Int { signed: false, bits: 8 },
    u16 => ScalarKind::Int { signed: false, bits: 16 },
    u32 => ScalarKind::Int { signed: false, bits: 32 },
    u64 => ScalarKind::Int { signed: false, bits: 64 },
    usize => ScalarKind::Int { signed: false, bits: usize::BITS },
    f32 => ScalarKind::Float { bits: 32 },
    f64 => ScalarKind::Float { bits: 64 },
    String => ScalarKind::String,
    PathBuf => ScalarKind::Path,
}

impl<T: EnvShape> EnvShape for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }
}

impl<T: EnvShape> EnvShape for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }
}

impl<T: EnvShape, const N: usize> EnvShape for [T; N] {
    fn shape() -> Shape {
        Shape::Tuple((0..N).map(|_| T::shape()).collect())
    }
}

impl<T: EnvShape, S> EnvShape for HashSet<T, S> {
    fn shape() -> Shape {
        Shape::Set(Box::new(T::shape()))
    }
}

impl<T: EnvShape> EnvShape for BTreeSet<T> {
    fn shape() -> Shape {
        Shape::Set(Box::new(T::shape()))
    }
}

impl<K: EnvShape, V: EnvShape, S> EnvShape for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::Mapping {
            key: Box::new(K::shape()),
            value: Box::new(V::shape()),
        }
    }
}

impl<K: EnvShape, V: EnvShape> EnvShape for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Mapping {
            key: Box::new(K::shape()),
            value: Box::new(V::shape()),
        }
    }
}

macro_rules! tuple_shape {
    ($($name:ident)+) => {
        impl<$($name: EnvShape),+> EnvShape for ($($name,)+) {
            fn shape() -> Shape {
                Shape::Tuple(vec![$($name::shape()),+])
            }
        }
    };
}

tuple_shape!(A);
tuple_shape!(A B);
tuple_shape!(A B C);
tuple_shape!(A B C D);
tuple_shape!(A B C D E);
tuple_shape!(A B C D E F);
tuple_shape!(A B C D E F G);
tuple_shape!(A B C D E F G H);

/// Description of one field of a schema.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    shape: Shape,
    default: Option<DefaultFn>,
    env: Option<&'static str>,
}

impl FieldDescriptor {
    /// A required field with no custom environment variable name.
    pub fn new(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            default: None,
            env: None,
        }
    }

    /// Use the given function's value when the variable is not set.
    pub fn with_default(mut self, default: DefaultFn) -> Self {
        self.default = Some(default);
        self
    }

    /// Read this field from `env` instead of the prefixed field name.
    pub fn with_env(mut self, env: &'static str) -> Self {
        self.env = Some(env);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn custom_env(&self) -> Option<&'static str> {
        self.env
    }

    /// Evaluate the declared default, if any.
    pub fn default_value(&self) -> Option<Result<Value, serde_json::Error>> {
        self.default.map(|default| default())
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Compute the environment variable name for a field.
///
/// A custom name is used verbatim; otherwise the name is `prefix` followed
/// by the uppercased field name.
pub fn resolve_env_key(field: &FieldDescriptor, prefix: &str) -> String {
    match field.env {
        Some(env) => env.to_string(),
        None => format!("{}{}", prefix, field.name.to_uppercase()),
    }
}

/// Association between one field of one schema and its environment variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnvBinding {
    pub env: String,
    pub schema: &'static str,
    pub field: &'static str,
}

/// Static description of a configuration type.
#[derive(Debug)]
pub struct SchemaDescriptor {
    id: &'static str,
    name: &'static str,
    prefix: &'static str,
    fields: Vec<FieldDescriptor>,
    validate: ValidateFn,
}

impl SchemaDescriptor {
    /// Start describing a schema.
    ///
    /// `id` identifies the schema process-wide (the derive uses the type's
    /// module path), `name` is used in messages, and `validate` constructs
    /// the type from an assembled object.
    pub fn builder(
        id: &'static str,
        name: &'static str,
        validate: ValidateFn,
    ) -> SchemaDescriptorBuilder {
        SchemaDescriptorBuilder {
            schema: SchemaDescriptor {
                id,
                name,
                prefix: "",
                fields: Vec::new(),
                validate,
            },
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Environment variable name of a field of this schema.
    pub fn env_key(&self, field: &FieldDescriptor) -> String {
        resolve_env_key(field, self.prefix)
    }

    /// Run the final construction against an assembled object.
    pub fn validate(&self, value: Value) -> Result<(), serde_json::Error> {
        (self.validate)(value)
    }

    /// All bindings of this schema, in field order.
    pub fn bindings(&self) -> Vec<EnvBinding> {
        self.fields
            .iter()
            .map(|field| EnvBinding {
                env: self.env_key(field),
                schema: self.id,
                field: field.name,
            })
            .collect()
    }

    /// Render a dotenv-style template documenting every variable.
    ///
    /// Variables without a usable default are commented out.
    pub fn env_template(&self) -> String {
        let mut out = format!("# {} ({})\n", self.name, self.id);
        for field in &self.fields {
            let env = self.env_key(field);
            out.push_str(&format!("# {}: {}\n", field.name, field.shape));
            match field.default_value() {
                Some(Ok(Value::Null)) | None => out.push_str(&format!("# {env}=\n")),
                Some(Ok(Value::String(text))) => out.push_str(&format!("{env}={text}\n")),
                Some(Ok(value)) => out.push_str(&format!("{env}={value}\n")),
                Some(Err(_)) => out.push_str(&format!("# {env}=  (default unavailable)\n")),
            }
        }
        out
    }
}

/// Builder returned by [`SchemaDescriptor::builder`].
#[derive(Debug)]
pub struct SchemaDescriptorBuilder {
    schema: SchemaDescriptor,
}

impl SchemaDescriptorBuilder {
    pub fn prefix(mut self, prefix: &'static str) -> Self {
        self.schema.prefix = prefix;
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.schema.fields.push(field);
        self
    }

    pub fn build(self) -> SchemaDescriptor {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(_: Value) -> Result<(), serde_json::Error> {
        Ok(())
    }

    fn app_schema() -> SchemaDescriptor {
        SchemaDescriptor::builder("tests::App", "App", accept)
            .prefix("APP_")
            .field(
                FieldDescriptor::new("port", u16::shape())
                    .with_default(|| serde_json::to_value(8080u16)),
            )
            .field(FieldDescriptor::new("name", String::shape()))
            .field(
                FieldDescriptor::new("server_host", String::shape())
                    .with_env("SERVER_HOST")
                    .with_default(|| serde_json::to_value("0.0.0.0")),
            )
            .build()
    }

    #[test]
    fn test_prefixed_env_key() {
        let field = FieldDescriptor::new("log_path", PathBuf::shape());
        assert_eq!(resolve_env_key(&field, "APP_"), "APP_LOG_PATH");
        assert_eq!(resolve_env_key(&field, ""), "LOG_PATH");
    }

    #[test]
    fn test_custom_env_key_ignores_prefix() {
        let field = FieldDescriptor::new("server_host", String::shape()).with_env("SERVER_HOST");
        assert_eq!(resolve_env_key(&field, "APP_"), "SERVER_HOST");
    }

    #[test]
    fn test_shapes_from_types() {
        assert_eq!(
            <Vec<Vec<i32>>>::shape(),
            Shape::Sequence(Box::new(Shape::Sequence(Box::new(Shape::Scalar(
                ScalarKind::Int { signed: true, bits: 32 }
            )))))
        );
        assert_eq!(
            <(u16, u16)>::shape(),
            Shape::Tuple(vec![u16::shape(), u16::shape()])
        );
        assert_eq!(<[u8; 3]>::shape(), <(u8, u8, u8)>::shape());
        assert_eq!(
            <Option<PathBuf>>::shape(),
            Shape::Optional(Box::new(Shape::Scalar(ScalarKind::Path)))
        );
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(<HashMap<String, i64>>::shape().to_string(), "map<string, i64>");
        assert_eq!(<(u32, f64)>::shape().to_string(), "tuple<u32, f64>");
        assert_eq!(<Option<HashSet<bool>>>::shape().to_string(), "option<set<bool>>");
        assert_eq!(Shape::Tagged(&["dev", "prod"]).to_string(), r#"literal["dev", "prod"]"#);
    }

    #[test]
    fn test_requires_structure() {
        assert!(<Vec<i32>>::shape().requires_structure());
        assert!(<Option<(u8, u8)>>::shape().requires_structure());
        assert!(!String::shape().requires_structure());
        assert!(!Shape::Tagged(&["a"]).requires_structure());
    }

    #[test]
    fn test_bindings_follow_field_order() {
        let bindings = app_schema().bindings();
        let envs: Vec<_> = bindings.iter().map(|b| b.env.as_str()).collect();
        assert_eq!(envs, ["APP_PORT", "APP_NAME", "SERVER_HOST"]);
        assert!(bindings.iter().all(|b| b.schema == "tests::App"));
    }

    #[test]
    fn test_env_template() {
        let template = app_schema().env_template();
        assert!(template.starts_with("# App (tests::App)\n"));
        assert!(template.contains("# port: u16\nAPP_PORT=8080\n"));
        assert!(template.contains("# APP_NAME=\n"));
        assert!(template.contains("SERVER_HOST=0.0.0.0\n"));
    }
}
