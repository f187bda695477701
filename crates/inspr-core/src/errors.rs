use inspr_core_types::RequestId;
use thiserror::Error;

use crate::model::EntityKind;

/// Result type alias using InsprError
pub type Result<T> = std::result::Result<T, InsprError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by the tree store, the managers, the diff engine
/// and the outer layers is classified into one of these kinds. The API layer
/// translates kinds into transport status codes; nothing here is fatal to
/// the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Lookup
    NotFound,
    AlreadyExists,

    // Validation
    InvalidName,
    InvalidApp,
    InvalidChannel,
    InvalidType,
    InvalidAlias,

    // Preconditions
    BadRequest,

    // Transactions
    Timeout,

    // Diff engine misuse (comparing unrelated trees)
    DiffMisaligned,

    // Outer layers
    InvalidManifest,
    InvalidConfig,
    Io,
    Serialization,

    // Post-condition failures
    InternalServer,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::InvalidName => "ERR_INVALID_NAME",
            ExErrorKind::InvalidApp => "ERR_INVALID_APP",
            ExErrorKind::InvalidChannel => "ERR_INVALID_CHANNEL",
            ExErrorKind::InvalidType => "ERR_INVALID_TYPE",
            ExErrorKind::InvalidAlias => "ERR_INVALID_ALIAS",
            ExErrorKind::BadRequest => "ERR_BAD_REQUEST",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::DiffMisaligned => "ERR_DIFF_MISALIGNED",
            ExErrorKind::InvalidManifest => "ERR_INVALID_MANIFEST",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::InternalServer => "ERR_INTERNAL_SERVER",
        }
    }

    /// Whether the kind reflects a caller-level programming error rather
    /// than a user-facing request failure
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            ExErrorKind::DiffMisaligned | ExErrorKind::InternalServer
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification, the operation and tree coordinates it
/// happened at, a human-readable message and the inner error it wraps.
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<String>,
    scope: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            scope: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity name context
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add tree scope context
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
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

    /// Wrap an inner error, preserving it as the cause
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the wrapped inner error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Walk to the innermost wrapped error
    pub fn root_cause(&self) -> &ExError {
        let mut current = self;
        while let Some(inner) = current.source.as_deref() {
            current = inner;
        }
        current
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
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(scope) = &self.scope {
            write!(f, " (scope: '{}')", scope)?;
        }
        if let Some(source) = &self.source {
            write!(f, " : {}", source)?;
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

/// Error taxonomy for tree store, manager and diff operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsprError {
    // ===== Lookup Errors =====
    /// A dotted app path does not resolve
    #[error("dApp not found for given query: '{query}'")]
    AppNotFound { query: String },

    /// A named entity is missing from an existing scope
    #[error("{entity} '{name}' not found in scope '{scope}'")]
    EntityNotFound {
        entity: EntityKind,
        scope: String,
        name: String,
    },

    /// Duplicate name within a scope
    #[error("{entity} '{name}' already exists in scope '{scope}'")]
    AlreadyExists {
        entity: EntityKind,
        scope: String,
        name: String,
    },

    // ===== Validation Errors =====
    /// Identifier grammar violation
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Malformed dotted scope
    #[error("invalid scope '{scope}'")]
    InvalidScope { scope: String },

    /// Names are immutable across updates
    #[error("dApp's name mustn't change when updating: '{current}' -> '{requested}'")]
    NameImmutable { current: String, requested: String },

    /// One or more structural violations in a dApp subtree
    #[error("invalid dApp '{name}': {}", reasons.join("; "))]
    InvalidApp { name: String, reasons: Vec<String> },

    /// Channel references something that does not exist or collides
    #[error("invalid channel '{name}': {reason}")]
    InvalidChannel { name: String, reason: String },

    /// Type structure violation
    #[error("invalid type '{name}': {reason}")]
    InvalidType { name: String, reason: String },

    /// Alias key or shape violation
    #[error("invalid alias '{name}': {reason}")]
    InvalidAlias { name: String, reason: String },

    // ===== Precondition Errors =====
    /// The root dApp cannot be deleted
    #[error("can't delete root dApp")]
    CannotDeleteRoot,

    /// The root dApp has no parent scope to hold aliases
    #[error("the root dApp has no parent scope")]
    RootHasNoParent,

    /// Deleting an entity that is still referenced
    #[error("{entity} '{name}' in scope '{scope}' cannot be deleted as it is being used by: {}", users.join(", "))]
    EntityInUse {
        entity: EntityKind,
        scope: String,
        name: String,
        users: Vec<String>,
    },

    /// Alias target is neither a channel nor a boundary entry of the parent
    #[error("alias target '{target}' doesn't exist in scope '{scope}'")]
    AliasTargetInvalid { scope: String, target: String },

    /// Alias created for a boundary the app does not declare
    #[error("target boundary '{boundary}' doesn't exist in dApp '{app}'")]
    BoundaryNotDeclared { app: String, boundary: String },

    /// Boundary resolution failed for one or more entries
    #[error("unable to resolve boundaries of dApp '{app}': {}", reasons.join("; "))]
    BoundaryUnresolved { app: String, reasons: Vec<String> },

    /// No broker is configured on the control plane
    #[error("there are no brokers installed")]
    NoBrokersAvailable,

    /// Broker registry mutation failure
    #[error("broker '{broker}': {reason}")]
    BrokerConfig { broker: String, reason: String },

    /// A read tool needed a leaf dApp
    #[error("dApp '{scope}' has no node")]
    NotANode { scope: String },

    // ===== Transaction Errors =====
    /// The single writer lock could not be acquired before the deadline
    #[error("timed out after {waited_ms}ms waiting for the tree transaction lock")]
    TransactionTimeout { waited_ms: u64 },

    // ===== Diff Errors =====
    /// Two trees are not comparable at a node (name or parent differ)
    #[error("trees are not diff-comparable at '{context}': {field} '{from}' != '{to}'")]
    DiffMisaligned {
        context: String,
        field: String,
        from: String,
        to: String,
    },

    // ===== Generic Errors =====
    /// Serialization error (JSON/TOML/YAML encoding or decoding)
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// Post-condition failure
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl InsprError {
    /// Classify this error into the canonical kind taxonomy
    pub fn kind(&self) -> ExErrorKind {
        match self {
            InsprError::AppNotFound { .. } | InsprError::EntityNotFound { .. } => {
                ExErrorKind::NotFound
            }
            InsprError::AlreadyExists { .. } => ExErrorKind::AlreadyExists,
            InsprError::InvalidName { .. }
            | InsprError::InvalidScope { .. }
            | InsprError::NameImmutable { .. } => ExErrorKind::InvalidName,
            InsprError::InvalidApp { .. } => ExErrorKind::InvalidApp,
            InsprError::InvalidChannel { .. } => ExErrorKind::InvalidChannel,
            InsprError::InvalidType { .. } => ExErrorKind::InvalidType,
            InsprError::InvalidAlias { .. } => ExErrorKind::InvalidAlias,
            InsprError::CannotDeleteRoot
            | InsprError::RootHasNoParent
            | InsprError::EntityInUse { .. }
            | InsprError::AliasTargetInvalid { .. }
            | InsprError::BoundaryNotDeclared { .. }
            | InsprError::BoundaryUnresolved { .. }
            | InsprError::NoBrokersAvailable
            | InsprError::BrokerConfig { .. }
            | InsprError::NotANode { .. } => ExErrorKind::BadRequest,
            InsprError::TransactionTimeout { .. } => ExErrorKind::Timeout,
            InsprError::DiffMisaligned { .. } => ExErrorKind::DiffMisaligned,
            InsprError::Serialization { .. } => ExErrorKind::Serialization,
            InsprError::Internal { .. } => ExErrorKind::InternalServer,
        }
    }
}

/// Conversion from InsprError to ExError
///
/// Lookup and naming variants keep their coordinates as structured fields;
/// everything else carries its rendered message.
impl From<InsprError> for ExError {
    fn from(err: InsprError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        let base = ExError::new(kind).with_message(message);
        match err {
            InsprError::AppNotFound { query } => base.with_scope(query),
            InsprError::EntityNotFound { scope, name, .. }
            | InsprError::AlreadyExists { scope, name, .. }
            | InsprError::EntityInUse { scope, name, .. } => {
                base.with_scope(scope).with_entity(name)
            }
            InsprError::InvalidName { name, .. }
            | InsprError::InvalidApp { name, .. }
            | InsprError::InvalidChannel { name, .. }
            | InsprError::InvalidType { name, .. }
            | InsprError::InvalidAlias { name, .. } => base.with_entity(name),
            InsprError::NameImmutable { current, .. } => base.with_entity(current),
            InsprError::AliasTargetInvalid { scope, target } => {
                base.with_scope(scope).with_entity(target)
            }
            InsprError::BoundaryNotDeclared { app, .. }
            | InsprError::BoundaryUnresolved { app, .. } => base.with_entity(app),
            InsprError::NotANode { scope } | InsprError::InvalidScope { scope } => {
                base.with_scope(scope)
            }
            InsprError::BrokerConfig { broker, .. } => base.with_entity(broker),
            InsprError::DiffMisaligned { context, .. } => base.with_scope(context),
            InsprError::CannotDeleteRoot
            | InsprError::RootHasNoParent
            | InsprError::NoBrokersAvailable
            | InsprError::TransactionTimeout { .. }
            | InsprError::Serialization { .. }
            | InsprError::Internal { .. } => base,
        }
    }
}
