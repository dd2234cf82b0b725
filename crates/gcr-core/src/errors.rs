use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by the recorder is classified by one of these
/// kinds. Each kind maps to a stable error code that callers can match on
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Startup (fatal)
    /// Opening or configuring the database connection failed
    Connection,
    /// Creating the schema failed
    Schema,
    /// Compiling a statement in the registry failed
    Prepare,

    // Codec
    /// A nested value could not be serialized to text
    Encode,
    /// Stored text could not be deserialized to a nested value
    Decode,

    // Row mapping
    /// A row's columns did not match the expected layout or types
    Scan,
    /// A query that expects data returned zero rows
    NotFound,

    // Writes
    /// An insert or update statement failed
    Exec,

    // Facade lifecycle
    /// The store was used before init, after close, or initialised twice
    Lifecycle,

    /// Caller supplied an argument that cannot be persisted
    InvalidInput,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Connection => "ERR_CONNECTION",
            ExErrorKind::Schema => "ERR_SCHEMA",
            ExErrorKind::Prepare => "ERR_PREPARE",
            ExErrorKind::Encode => "ERR_ENCODE",
            ExErrorKind::Decode => "ERR_DECODE",
            ExErrorKind::Scan => "ERR_SCAN",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Exec => "ERR_EXEC",
            ExErrorKind::Lifecycle => "ERR_LIFECYCLE",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
        }
    }

    /// Whether this kind aborts startup when raised during init
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExErrorKind::Connection | ExErrorKind::Schema | ExErrorKind::Prepare
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification plus the operation name and natural key that
/// were in flight, so a failure can be diagnosed from the error alone.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    field: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            field: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add natural key context (name, UID or hash)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add the name of the column or attribute involved
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
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

    /// Get the natural key context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the field context, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Shorthand for `kind() == ExErrorKind::NotFound`
    pub fn is_not_found(&self) -> bool {
        self.kind == ExErrorKind::NotFound
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
            write!(f, " (key: {})", entity_id)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Failures raised by the codec layer
///
/// Neither variant is retryable: the same input always fails the same way.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A value could not be serialized for its column
    #[error("cannot serialize {field}: {reason}")]
    Encode { field: &'static str, reason: String },

    /// Stored text could not be deserialized for its column
    #[error("cannot de-serialize {field} {text:?}: {reason}")]
    Decode {
        field: &'static str,
        text: String,
        reason: String,
    },
}

impl CodecError {
    /// Field (column) the failure belongs to
    pub fn field(&self) -> &'static str {
        match self {
            CodecError::Encode { field, .. } | CodecError::Decode { field, .. } => field,
        }
    }
}

impl From<CodecError> for ExError {
    fn from(err: CodecError) -> Self {
        let kind = match &err {
            CodecError::Encode { .. } => ExErrorKind::Encode,
            CodecError::Decode { .. } => ExErrorKind::Decode,
        };
        ExError::new(kind)
            .with_field(err.field())
            .with_message(err.to_string())
    }
}
