//! Concrete secret resolvers for settings-based connections
//!
//! Settings entries refer to secrets as `{"secretKey": ID}`. The resolvers here
//! look those IDs up in the environment or through an external command, and can
//! be chained so the first store that knows a key wins.

mod resolver;

#[cfg(test)]
mod tests;

pub use resolver::{env_var_for_key, ChainResolver, CommandResolver, EnvSecretResolver};
