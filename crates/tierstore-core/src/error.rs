use thiserror::Error;

/// Canonical error type for tier and migration operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Record was not found in the queried tier.
    #[error("{entity} `{id}` was not found")]
    NotFound {
        /// Entity type name (e.g. `"record"`).
        entity: &'static str,
        /// Identifier of the missing entity.
        id: String,
    },

    /// Stored payload could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Backend failure distinct from absence.
    #[error("storage failed: {0}")]
    StorageFailed(String),

    /// I/O error occurred during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error occurred.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Validation error for input data.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Operation violates configuration or state rules.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Human-readable explanation of the invalid state.
        message: String,
    },

    /// A migration sub-pass could not query its candidates.
    #[error("migration {direction} failed: {source}")]
    MigrationFailed {
        /// Sub-pass that failed (`"hot→cold"` or `"cold→hot"`).
        direction: &'static str,
        /// Underlying query error.
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Creates a `NotFound` variant.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates an `InvalidState` variant.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Wraps a candidate-query error with the sub-pass it came from.
    #[must_use]
    pub fn migration_failed(direction: &'static str, source: CoreError) -> Self {
        Self::MigrationFailed {
            direction,
            source: Box::new(source),
        }
    }

    /// Returns true for the `NotFound` variant.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_eof() || err.is_syntax() || err.is_data() {
            Self::InvalidData(err.to_string())
        } else {
            Self::SerializationError(err.to_string())
        }
    }
}

/// Convenient result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
