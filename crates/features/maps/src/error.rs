use std::borrow::Cow;
use vista_access::DirectoryError;
use vista_layers::LayerError;
use vista_storage::StorageError;

/// Everything a map operation can fail with. The HTTP layer maps each kind to a status.
#[vista_derive::vista_error]
pub enum MapServiceError {
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Never names the groups that would have granted access.
    #[error("Access denied{}: {message}", format_context(.context))]
    AccessDenied { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Directory unavailable{}: {source}", format_context(.context))]
    DirectoryUnavailable { source: DirectoryError, context: Option<Cow<'static, str>> },

    #[error("Unsupported format{}: {message}", format_context(.context))]
    UnsupportedFormat { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Malformed document{}: {message}", format_context(.context))]
    MalformedDocument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid name{}: {message}", format_context(.context))]
    InvalidName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },
}

impl MapServiceError {
    pub(crate) fn access_denied(message: impl Into<Cow<'static, str>>) -> Self {
        Self::AccessDenied { message: message.into(), context: None }
    }

    pub(crate) fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }

    /// Sorts a store failure into the service taxonomy.
    pub(crate) fn from_storage(err: StorageError, document: &str) -> Self {
        match err {
            StorageError::FileNotFound { .. } | StorageError::DirectoryNotFound { .. } => {
                Self::NotFound { message: format!("document '{document}'").into(), context: None }
            },
            StorageError::InvalidName { .. } | StorageError::PathTraversalAttempt { .. } => {
                Self::InvalidName { message: err.to_string().into(), context: None }
            },
            StorageError::Malformed { .. } => {
                Self::MalformedDocument { message: err.to_string().into(), context: None }
            },
            StorageError::Io { .. } => Self::Storage { source: err, context: None },
        }
    }
}

impl From<LayerError> for MapServiceError {
    fn from(err: LayerError) -> Self {
        Self::MalformedDocument { message: err.to_string().into(), context: None }
    }
}
