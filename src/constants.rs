//! # SDK Constants
//!
//! Wire-level constants shared by the HTTP client, the event runtime and the
//! configuration layer.

/// `User-Agent` sent with every platform request
pub const USER_AGENT: &str = "swo-extensions/1.0";

/// Statuses retried by the HTTP client
pub const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Maximum idle connections kept per host
pub const POOL_MAX_IDLE_PER_HOST: usize = 36;

/// Page size used when walking paginated collections
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Built-in configuration defaults
pub mod defaults {
    pub const API_BASE_URL: &str = "http://localhost:8000";
    pub const API_TOKEN: &str = "change-me!";
    pub const PRODUCTS_IDS: &str = "PRD-1111-1111";
    pub const PORTAL_BASE_URL: &str = "https://portal.s1.show";
    pub const KEY_VAULT_NAME: &str = "mpt-key-vault";
    pub const ORDERS_POLLING_INTERVAL_SECS: u64 = 120;
    pub const HTTP_TIMEOUT_MS: u64 = 60_000;
    pub const HTTP_MAX_RETRIES: u32 = 5;
    pub const HTTP_BACKOFF_FACTOR_MS: u64 = 100;
    pub const DISPATCHER_MAX_WORKERS: usize = 8;
    pub const DISPATCHER_TICK_MS: u64 = 500;
    pub const CONFIG_PATH: &str = "config/extension.toml";
}

/// Environment variable names read outside the `MPT_` config layer
pub mod env_vars {
    /// Prefix for configuration overrides, e.g. `MPT_API_TOKEN`
    pub const PREFIX: &str = "MPT";
    pub const CONFIG_PATH: &str = "MPT_CONFIG_PATH";
    pub const ENVIRONMENT: &str = "MPT_ENV";
    pub const APP_ENVIRONMENT: &str = "APP_ENV";
    /// Prefix of free-form extension variables
    pub const EXTENSION_PREFIX: &str = "EXT_";

    /// Extension variables holding JSON documents
    pub const JSON_EXTENSION_VARIABLES: [&str; 4] = [
        "EXT_WEBHOOKS_SECRETS",
        "EXT_AIRTABLE_BASES",
        "EXT_AIRTABLE_PRICING_BASES",
        "EXT_PRODUCT_SEGMENT",
    ];
}

/// Order types as reported by the platform
pub mod order_types {
    pub const PURCHASE: &str = "Purchase";
    pub const CHANGE: &str = "Change";
    pub const TERMINATION: &str = "Termination";
}

/// Order statuses used in order queries
pub mod order_statuses {
    pub const PROCESSING: &str = "processing";
}
