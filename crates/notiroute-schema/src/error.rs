/// Errors that can occur while compiling or loading schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema text is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The schema document root is not a JSON object.
    #[error("schema root must be an object, found {found}")]
    NotAnObject { found: &'static str },

    /// A property pattern is not a valid regular expression.
    #[error("invalid pattern for property '{property}': {source}")]
    InvalidPattern {
        property: String,
        #[source]
        source: regex::Error,
    },

    /// The schema file could not be loaded.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
