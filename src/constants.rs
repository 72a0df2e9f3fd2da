//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

/// Time to wait for a pooled connection before failing a request
pub const DATABASE_ACQUIRE_TIMEOUT_SECONDS: u64 = 5;

// =============================================================================
// JUDGE DEFAULTS
// =============================================================================

/// Default address of the upstream judge
pub const DEFAULT_JUDGE_URL: &str = "http://localhost:8128";

/// Default time allowed to establish a judge connection
pub const DEFAULT_JUDGE_CONNECT_TIMEOUT_SECONDS: u64 = 5;

/// Default number of chunks buffered for a slow caller
pub const DEFAULT_RELAY_BUFFER_CHUNKS: usize = 64;

// =============================================================================
// CONTEST DEFAULTS
// =============================================================================

/// Default directory holding contest definitions
pub const DEFAULT_CONTEST_DATA: &str = "./contests";

/// Language recorded for answer-graded submissions
pub const ANSWER_LANGUAGE: &str = "answer";

// =============================================================================
// USER ROLES
// =============================================================================

/// User role identifiers
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const PARTICIPANT: &str = "participant";
}

// =============================================================================
// API VERSIONING
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// VALIDATION
// =============================================================================

/// Default maximum source code size in bytes (1 MB)
pub const DEFAULT_MAX_CODE_BYTES: usize = 1024 * 1024;

/// Maximum answer length in characters
pub const MAX_ANSWER_CHARS: u64 = 64 * 1024;

/// Maximum language name length
pub const MAX_LANGUAGE_NAME_LENGTH: u64 = 64;

/// Allowance for multipart framing and the non-code fields of a submission
pub const MULTIPART_OVERHEAD_BYTES: usize = 128 * 1024;
