//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent across the commit pipeline.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Commit outcome
pub const FIELD_COMMIT_ID: &str = "commit_id";
pub const FIELD_CHANGE_COUNT: &str = "change_count";
pub const FIELD_SNAPSHOT_COUNT: &str = "snapshot_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
