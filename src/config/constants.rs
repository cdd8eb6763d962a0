//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Pagination
// =============================================================================

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Hard ceiling on items per page; larger requests are clamped
pub const MAX_PAGE_SIZE: u64 = 200;

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// Database
// =============================================================================

/// Defaults used to compose a Postgres URL when `DATABASE_URL` is unset
pub const DEFAULT_POSTGRES_HOST: &str = "localhost";
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;
pub const DEFAULT_POSTGRES_DB: &str = "app";
pub const DEFAULT_POSTGRES_USER: &str = "xmap";
pub const DEFAULT_POSTGRES_PASSWORD: &str = "xmap";

/// Default deadline for a single transaction in milliseconds (0 disables)
pub const DEFAULT_TX_TIMEOUT_MS: u64 = 5000;

// =============================================================================
// Cache (Redis)
// =============================================================================

/// Default Redis URL (for development)
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Time-to-live of a cached user entry (5 minutes)
pub const USER_CACHE_TTL_SECONDS: u64 = 300;

/// Versioned key namespace for cached users
pub const CACHE_PREFIX_USER: &str = "user:v1:id:";

/// Upper bound on establishing the Redis connection
pub const DEFAULT_CACHE_CONNECT_TIMEOUT_MS: u64 = 2000;

/// Upper bound on a single cache read or write
pub const DEFAULT_CACHE_OP_TIMEOUT_MS: u64 = 600;
