//! Connection resolution for Malloy documents
//!
//! Given the file being compiled and a set of configuration sources, the
//! [`ConnectionManager`] decides which named connections are reachable and hands
//! back a [`LookupConnection`] that produces live connections on demand.
//!
//! ## Key Components
//!
//! - **`connection`**: the `Connection` handle and the `LookupConnection` trait
//!   every lookup variant implements.
//! - **`factory`** / **`secrets`**: capabilities injected by the host.
//! - **`lookups`**: registry, settings (secret-resolving), merged and project-only
//!   lookups.
//! - **`cache`**: parsed project configuration keyed by canonical directory.
//! - **`manager`**: the orchestrator tying the above together.

pub mod cache;
pub mod connection;
pub mod factory;
pub mod lookups;
pub mod manager;
pub mod secrets;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheStats, ConfigCache, ConfigCacheEntry};
pub use connection::{Connection, LookupConnection};
pub use factory::ConnectionFactory;
pub use lookups::{
    MergedConnectionLookup, ProjectOnlyLookup, RegistryConnectionLookup,
    SettingsConnectionLookup,
};
pub use manager::{ConnectionManager, LookupRoute, ResolvedLookup};
pub use secrets::SecretResolver;
