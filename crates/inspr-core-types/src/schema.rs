//! Canonical schema constants for structured logging
//!
//! Every log event emitted by the tree store, the managers and the engine
//! uses these keys so that downstream log processing can rely on them.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRANSACTION_ID: &str = "transaction_id";

// Tree coordinates
pub const FIELD_SCOPE: &str = "scope";
pub const FIELD_ENTITY: &str = "entity";
pub const FIELD_ENTITY_KIND: &str = "entity_kind";

// Collection sizes
pub const FIELD_CHANGES_LEN: &str = "changes_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
