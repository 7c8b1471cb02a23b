use std::fmt;

/// Unknown model or field, or a field path that cannot be traversed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    ModelNotFound {
        model: String,
    },
    /// `path` is the dotted path traversed so far, including the failing segment
    FieldNotFound {
        model: String,
        path: String,
    },
    /// A non-terminal path segment is not a relational field
    NotAssociation {
        model: String,
        path: String,
    },
    /// A relational field points to a model the server does not know
    TargetModelNotFound {
        model: String,
        path: String,
        target: String,
    },
    /// The server answered a metadata request with an unexpected payload
    InvalidMetadata {
        model: String,
        reason: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::ModelNotFound { model } => write!(f, "Model '{}' not found", model),
            SchemaError::FieldNotFound { model, path } => {
                write!(f, "Field '{}' not found on model '{}'", path, model)
            }
            SchemaError::NotAssociation { model, path } => write!(
                f,
                "Field '{}' of model '{}' is not an association and cannot be traversed",
                path, model
            ),
            SchemaError::TargetModelNotFound {
                model,
                path,
                target,
            } => write!(
                f,
                "Target model '{}' of field '{}' (model '{}') not found",
                target, path, model
            ),
            SchemaError::InvalidMetadata { model, reason } => {
                write!(f, "Invalid metadata for model '{}': {}", model, reason)
            }
        }
    }
}

impl std::error::Error for SchemaError {}
