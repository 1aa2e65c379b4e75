//! Error types for infra-core

/// Result type for infra-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while synthesising resources
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required context variables were not defined
    #[error("Context variables {} were not defined", .keys.join(" and/or "))]
    MissingContext { keys: Vec<&'static str> },

    /// Two constructs in one stack used the same logical id
    #[error("Duplicate logical id in stack {stack}: {id}")]
    DuplicateId { stack: String, id: String },

    /// A construct id had no characters usable in a logical id
    #[error("Invalid logical id in stack {stack}: {id:?}")]
    InvalidId { stack: String, id: String },

    /// Merged properties are missing something the resource needs
    #[error("Invalid {resource} properties for {id}: {message}")]
    InvalidProps {
        resource: &'static str,
        id: String,
        message: String,
    },

    /// An alarm was created without a threshold or evaluation period
    #[error("Alarm {id} is missing {field}")]
    IncompleteAlarm { id: String, field: &'static str },

    /// App definition could not be parsed
    #[error("Invalid app definition: {0}")]
    InvalidApp(#[from] toml::de::Error),

    // Transparent wrappers for underlying crate errors
    /// Context error from infra-context
    #[error(transparent)]
    Context(#[from] infra_context::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_props(
        resource: &'static str,
        id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidProps {
            resource,
            id: id.into(),
            message: message.into(),
        }
    }
}
