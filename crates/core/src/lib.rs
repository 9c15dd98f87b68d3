//! duet core library.
//!
//! This crate resolves pair-programming author initials to full git
//! identities: loading the YAML authors file, running the ordered email
//! strategy chain, and the small template engine used by `email_template`.

pub mod config;
pub mod errors;
pub mod identity;

// Re-exports for convenience.
pub use config::{AuthorsFile, EmailConfig};
pub use errors::{ConfigError, CoreError, LookupError, TemplateError};
pub use identity::{ConfigStore, EmailLookup, Pair};
