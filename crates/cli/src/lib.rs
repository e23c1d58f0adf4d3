//! Host-side pieces of the `malloy-conn` tool: settings loading, concrete secret
//! resolvers, a descriptor connection factory and the command implementations.

pub mod commands;
pub mod factory;
pub mod logging;
pub mod secrets;
pub mod settings;

pub use commands::Commands;
pub use factory::{DescribedConnection, DescriptorFactory};
pub use settings::HostSettings;
