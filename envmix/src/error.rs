//! Error types for environment variable configuration

/// Errors that can occur when building a configuration object.
///
/// A construction call stops at the first failing field, in declaration
/// order. Only a genuinely absent environment variable falls back to the
/// field's default; a present but malformed value is always an error.
#[derive(Debug, thiserror::Error)]
pub enum EnvMixError {
    /// A present environment variable could not be coerced into the field's shape.
    #[error("Failed to coerce environment variable '{env}' for field '{schema}.{field}' as {shape}: {source}")]
    Coerce {
        /// Display name of the schema
        schema: &'static str,
        /// Name of the field being resolved
        field: &'static str,
        /// Resolved environment variable name
        env: String,
        /// Declared shape of the field
        shape: String,
        /// Raw environment text that failed
        value: String,
        /// The failing value inside the raw text
        source: CoerceError,
    },

    /// Required field has no override, no environment value and no default.
    #[error("Environment variable '{env}' is required for field '{schema}.{field}' but not set")]
    Missing {
        /// Display name of the schema
        schema: &'static str,
        /// Name of the required field
        field: &'static str,
        /// Resolved environment variable name
        env: String,
    },

    /// Environment variable is set but does not hold valid Unicode.
    #[error("Environment variable '{env}' is not valid unicode")]
    NotUnicode {
        /// Name of the environment variable
        env: String,
    },

    /// A declared default could not be represented as a field value.
    #[error("Default value of field '{schema}.{field}' could not be serialized: {source}")]
    Default {
        /// Display name of the schema
        schema: &'static str,
        /// Name of the field
        field: &'static str,
        /// Serialization error
        source: serde_json::Error,
    },

    /// An override names a field the schema does not declare.
    #[error("Override '{field}' does not match any field of '{schema}'")]
    UnknownOverride {
        /// Display name of the schema
        schema: &'static str,
        /// Name given in the override map
        field: String,
    },

    /// An override value could not be serialized.
    #[error("Override '{field}' could not be serialized: {source}")]
    Override {
        /// Name given in the override map
        field: String,
        /// Serialization error
        source: serde_json::Error,
    },

    /// The assembled field map was rejected when constructing the object.
    #[error("Failed to construct '{schema}' from resolved fields: {source}")]
    DownstreamValidation {
        /// Display name of the schema
        schema: &'static str,
        /// Error reported by the deserializer
        source: serde_json::Error,
    },
}

/// A single value failed to coerce into its declared shape.
///
/// Inside composite values this describes the failing element, not the whole
/// environment text; the surrounding [`EnvMixError::Coerce`] carries both.
#[derive(Debug, thiserror::Error)]
pub enum CoerceError {
    /// Text is not one of the accepted boolean spellings.
    #[error("'{value}' is not a valid boolean (expected true/false, 1/0, yes/no or on/off)")]
    InvalidBoolean {
        /// Offending text
        value: String,
    },

    /// Text is not a number of the declared type.
    #[error("'{value}' is not a valid {shape}: {reason}")]
    InvalidNumber {
        /// Declared numeric shape
        shape: String,
        /// Offending text
        value: String,
        /// Parser message
        reason: String,
    },

    /// Structured value has the wrong form for the declared shape.
    #[error("'{value}' is not a valid {shape}: {reason}")]
    InvalidStructuredFormat {
        /// Declared shape
        shape: String,
        /// Offending text
        value: String,
        /// What was expected instead
        reason: String,
    },

    /// Tuple received the wrong number of elements.
    #[error("'{value}' has {found} elements but {shape} expects {expected}")]
    LengthMismatch {
        /// Declared tuple shape
        shape: String,
        /// Offending text
        value: String,
        /// Declared arity
        expected: usize,
        /// Number of elements given
        found: usize,
    },

    /// Text is not one of the allowed literal values.
    #[error("'{value}' is not one of {allowed:?}")]
    UnknownLiteral {
        /// Offending text
        value: String,
        /// The literal values the shape accepts
        allowed: Vec<&'static str>,
    },

    /// Nested object could not be built.
    #[error("invalid {schema} at '{path}': {source}")]
    NestedValidation {
        /// Display name of the nested schema
        schema: &'static str,
        /// Dotted path of the failing field, e.g. `db.port`
        path: String,
        /// Offending text
        value: String,
        /// Underlying failure
        source: NestedError,
    },
}

/// Cause of a [`CoerceError::NestedValidation`].
#[derive(Debug, thiserror::Error)]
pub enum NestedError {
    /// Text did not parse as JSON at all.
    #[error("malformed JSON: {0}")]
    Malformed(serde_json::Error),

    /// Text parsed but is not a JSON object.
    #[error("expected a JSON object")]
    NotAnObject,

    /// A field of the nested object failed to coerce.
    #[error(transparent)]
    Field(Box<CoerceError>),

    /// A nested default could not be serialized.
    #[error("default of '{field}' could not be serialized: {source}")]
    Default {
        /// Name of the nested field
        field: &'static str,
        /// Serialization error
        source: serde_json::Error,
    },

    /// The nested object was rejected by its deserializer.
    #[error(transparent)]
    Validation(serde_json::Error),
}

impl CoerceError {
    /// Offending text of this failure.
    pub fn value(&self) -> &str {
        match self {
            Self::InvalidBoolean { value }
            | Self::InvalidNumber { value, .. }
            | Self::InvalidStructuredFormat { value, .. }
            | Self::LengthMismatch { value, .. }
            | Self::UnknownLiteral { value, .. }
            | Self::NestedValidation { value, .. } => value,
        }
    }

    pub(crate) fn invalid_number(
        shape: impl ToString,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidNumber {
            shape: shape.to_string(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn structured(
        shape: impl ToString,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidStructuredFormat {
            shape: shape.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
