//! Author identity resolution for pair initials.
//!
//! The email for an author is taken from the first of:
//! 1. External lookup command (if configured)
//! 2. `email_addresses` override map
//! 3. `email_template`
//! 4. Username + email domain
//! 5. Name-derived address + email domain

pub mod lookup;
pub mod resolver;
pub mod store;
pub mod template;

pub use lookup::{CommandLookup, EmailLookup};
pub use resolver::{EmailSource, Pair, Resolver};
pub use store::ConfigStore;
pub use template::{EmailTemplate, TemplateContext};
