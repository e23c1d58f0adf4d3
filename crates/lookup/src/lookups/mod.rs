//! Lookup variants
//!
//! All variants implement [`LookupConnection`](crate::LookupConnection); the
//! merged lookup composes two of them.

mod merged;
mod project_only;
mod registry;
mod settings;

pub use merged::MergedConnectionLookup;
pub use project_only::ProjectOnlyLookup;
pub use registry::RegistryConnectionLookup;
pub use settings::SettingsConnectionLookup;
