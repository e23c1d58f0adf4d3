//! Constants used throughout the connection resolution crates

// Project configuration
pub const CONFIG_FILENAME: &str = "malloy-config.json";
pub const CONNECTIONS_KEY: &str = "connections";
pub const KIND_KEY: &str = "is";

// Property reference shapes
pub const ENV_REFERENCE_KEY: &str = "env";
pub const SECRET_REFERENCE_KEY: &str = "secretKey";

// Built-in convenience alias added to the defaults
pub const ALIAS_CONNECTION_NAME: &str = "md";
pub const ALIAS_CONNECTION_KIND: &str = "duckdb";
pub const ALIAS_PROPERTY_NAME: &str = "databasePath";
pub const ALIAS_PROPERTY_VALUE: &str = "md:";

// Query defaults
pub const DEFAULT_ROW_LIMIT: u64 = 50;
