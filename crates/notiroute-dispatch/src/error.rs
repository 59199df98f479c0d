use std::path::PathBuf;

/// Errors raised while loading setup or decoding ingested messages.
///
/// Dispatch itself does not fail: payload and request problems are reported in
/// [`crate::DispatchReport`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A schema could not be compiled or loaded.
    #[error("schema error: {0}")]
    Schema(#[from] notiroute_schema::SchemaError),

    /// The setup file could not be read.
    #[error("failed reading setup {path}: {source}")]
    SetupRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The setup document is not valid.
    #[error("invalid setup document: {0}")]
    InvalidSetup(#[source] serde_json::Error),

    /// The message body is not a valid envelope.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    /// A notification envelope carried no content.
    #[error("envelope {} has no content", .envelope_id.as_deref().unwrap_or("<unknown>"))]
    MissingContent { envelope_id: Option<String> },

    /// The envelope content is not a notification request.
    #[error("invalid notification request: {0}")]
    InvalidRequest(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
