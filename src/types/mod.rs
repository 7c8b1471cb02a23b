//! Column type conversion.
//!
//! Every remote column type (`ttype`) is bound to a [`Type`] implementation in a
//! [`TypeRegistry`]. A type converts values in both directions:
//!
//! - `convert_to_wire`: native [`Value`] → JSON value sent to the server
//! - `convert_to_native`: JSON value received from the server → native [`Value`]
//!
//! The built-in registrations are:
//!
//! | Type name | Implementation |
//! |---|---|
//! | `binary` | [`BinaryType`] |
//! | `boolean` | [`BooleanType`] |
//! | `char`, `html`, `text` | [`TextType`] |
//! | `date` | [`DateType::date`] |
//! | `datetime` | [`DateType::datetime`] |
//! | `float`, `monetary` | [`FloatType`] |
//! | `integer` | [`IntegerType`] |
//! | `selection` | [`ScalarType`] |

use crate::context::Context;
use crate::value::{preview, Value};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

mod binary;
mod boolean;
mod date;
mod numeric;
mod text;

pub use binary::BinaryType;
pub use boolean::BooleanType;
pub use date::DateType;
pub use numeric::{FloatType, IntegerType};
pub use text::{ScalarType, TextType};

/// Longest value preview kept in a conversion error
const PREVIEW_LEN: usize = 64;

/// Type registry and conversion errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// No type is registered under this name
    NotRegistered { name: String },
    /// The value has the wrong shape for the target type
    InvalidType {
        value: String,
        kind: &'static str,
        type_name: String,
    },
    /// The value has the right shape but could not be converted
    Failed {
        value: String,
        type_name: String,
        reason: String,
    },
    /// The context names a timezone that cannot be resolved
    InvalidTimezone { timezone: String },
}

impl ConversionError {
    pub(crate) fn invalid_type(value: &Value, type_name: &str) -> Self {
        ConversionError::InvalidType {
            value: preview(&value.to_string(), PREVIEW_LEN),
            kind: value.kind(),
            type_name: type_name.to_string(),
        }
    }

    pub(crate) fn failed(value: &str, type_name: &str, reason: impl Into<String>) -> Self {
        ConversionError::Failed {
            value: preview(value, PREVIEW_LEN),
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::NotRegistered { name } => {
                write!(f, "Type '{}' is not registered", name)
            }
            ConversionError::InvalidType {
                value,
                kind,
                type_name,
            } => write!(
                f,
                "Could not convert {} value '{}' to type '{}'",
                kind, value, type_name
            ),
            ConversionError::Failed {
                value,
                type_name,
                reason,
            } => write!(
                f,
                "Could not convert value '{}' to type '{}': {}",
                value, type_name, reason
            ),
            ConversionError::InvalidTimezone { timezone } => {
                write!(f, "Unknown timezone '{}'", timezone)
            }
        }
    }
}

impl std::error::Error for ConversionError {}

/// A column type able to convert values in both directions
pub trait Type: Send + Sync {
    /// Registered name, used in error messages
    fn name(&self) -> &str;

    /// Native value → wire value
    fn convert_to_wire(&self, value: &Value, context: &Context) -> Result<JsonValue, ConversionError>;

    /// Wire value → native value
    fn convert_to_native(&self, value: &JsonValue, context: &Context) -> Result<Value, ConversionError>;
}

/// Name → type lookup table
#[derive(Clone)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<dyn Type>>,
}

impl TypeRegistry {
    /// An empty registry, without the built-in types.
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// A registry holding every built-in type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        let text: Arc<dyn Type> = Arc::new(TextType);
        let float: Arc<dyn Type> = Arc::new(FloatType);

        registry.register("binary", Arc::new(BinaryType));
        registry.register("boolean", Arc::new(BooleanType));
        registry.register("char", Arc::clone(&text));
        registry.register("date", Arc::new(DateType::date()));
        registry.register("datetime", Arc::new(DateType::datetime()));
        registry.register("float", Arc::clone(&float));
        registry.register("html", Arc::clone(&text));
        registry.register("integer", Arc::new(IntegerType));
        registry.register("monetary", float);
        registry.register("selection", Arc::new(ScalarType));
        registry.register("text", text);
        registry
    }

    /// Bind `name` to `ty`, replacing any previous registration.
    pub fn register(&mut self, name: impl Into<String>, ty: Arc<dyn Type>) {
        self.types.insert(name.into(), ty);
    }

    pub fn has(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Type>, ConversionError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| ConversionError::NotRegistered {
                name: name.to_string(),
            })
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

/// Dispatches conversions to the registered type
#[derive(Debug, Clone, Default)]
pub struct TypeConverter {
    registry: TypeRegistry,
}

impl TypeConverter {
    pub fn new(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn convert_to_wire(
        &self,
        type_name: &str,
        value: &Value,
        context: &Context,
    ) -> Result<JsonValue, ConversionError> {
        self.registry.get(type_name)?.convert_to_wire(value, context)
    }

    pub fn convert_to_native(
        &self,
        type_name: &str,
        value: &JsonValue,
        context: &Context,
    ) -> Result<Value, ConversionError> {
        self.registry.get(type_name)?.convert_to_native(value, context)
    }
}
