use histograph_core_types::RequestId;
use thiserror::Error;

/// Result type alias using the structured error facility
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Caller input
    InvalidArgument,

    // Commit pipeline
    ObjectNotFound,
    GraphBuild,
    Identity,
    NoIdentityMapping,
    CommitIdExhausted,
    TaskCancelled,

    // Integration
    Serialization,
    Persistence,
    Configuration,
    Concurrency,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidArgument => "ERR_INVALID_ARGUMENT",
            ExErrorKind::ObjectNotFound => "ERR_OBJECT_NOT_FOUND",
            ExErrorKind::GraphBuild => "ERR_GRAPH_BUILD",
            ExErrorKind::Identity => "ERR_IDENTITY",
            ExErrorKind::NoIdentityMapping => "ERR_NO_IDENTITY_MAPPING",
            ExErrorKind::CommitIdExhausted => "ERR_COMMIT_ID_EXHAUSTED",
            ExErrorKind::TaskCancelled => "ERR_TASK_CANCELLED",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus free-form context
/// for debugging. Every public operation of the workspace returns this type.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity (global id) context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy of the commit pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistographError {
    /// Missing or empty author, absent root object, malformed properties
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Terminal commit requested for an identity that was never recorded
    #[error("Can't delete object that was never committed: {global_id}")]
    ObjectNotFound { global_id: String },

    /// The live graph could not be built from the root object
    #[error("Graph build failed: {reason}")]
    GraphBuildError { reason: String },

    /// The metamodel could not resolve an identity for an object
    #[error("Identity of {type_name} could not be resolved: {reason}")]
    IdentityError { type_name: String, reason: String },

    /// The object's type has no identity mapping at all
    #[error("No identity mapping for type {type_name}")]
    NoIdentityMapping { type_name: String },

    /// The commit id space is used up
    #[error("Commit id space exhausted")]
    CommitIdExhausted,

    /// Serialization or deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Invalid configuration source
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Conversion from HistographError to ExError
impl From<HistographError> for ExError {
    fn from(err: HistographError) -> Self {
        let message = err.to_string();
        match err {
            HistographError::InvalidArgument { .. } => {
                ExError::new(ExErrorKind::InvalidArgument).with_message(message)
            }
            HistographError::ObjectNotFound { global_id } => {
                ExError::new(ExErrorKind::ObjectNotFound)
                    .with_entity_id(global_id)
                    .with_message(message)
            }
            HistographError::GraphBuildError { .. } => {
                ExError::new(ExErrorKind::GraphBuild).with_message(message)
            }
            HistographError::IdentityError { .. } => {
                ExError::new(ExErrorKind::Identity).with_message(message)
            }
            HistographError::NoIdentityMapping { .. } => {
                ExError::new(ExErrorKind::NoIdentityMapping).with_message(message)
            }
            HistographError::CommitIdExhausted => {
                ExError::new(ExErrorKind::CommitIdExhausted).with_message(message)
            }
            HistographError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            HistographError::Configuration { .. } => {
                ExError::new(ExErrorKind::Configuration).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to HistographError
impl From<serde_json::Error> for HistographError {
    fn from(err: serde_json::Error) -> Self {
        HistographError::Serialization {
            message: err.to_string(),
        }
    }
}
