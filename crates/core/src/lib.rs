//! Core domain types, errors, and constants for Malloy connection resolution.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias shared by every crate in the
//!   workspace. Lookup failures, parse failures and factory failures all surface
//!   through it.
//! - **`types`**: the declarative connection model (`ConfigValue`,
//!   `ConnectionConfigEntry`, `ConfigDocument`) plus the small values that flow
//!   between discovery, the manager and connection factories.
//! - **`constants`**: file names and defaults.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    types::*,
};
