use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    #[error("failed to load schema {identifier}: {message}")]
    LoadFailed { identifier: String, message: String },

    #[error("invalid pattern for field {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("validator error: {0}")]
    Validator(String),
}

impl SchemaError {
    #[inline]
    pub fn load_failed(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::LoadFailed {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    #[inline]
    pub fn pattern(field: impl Into<String>, source: regex::Error) -> Self {
        SchemaError::InvalidPattern {
            field: field.into(),
            source,
        }
    }
}
