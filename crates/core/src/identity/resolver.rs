//! Email resolution for a single author.
//!
//! [`Resolver`] turns an author record into a [`Pair`], picking the email
//! from the first strategy that yields one:
//!
//! 1. External lookup command (an empty answer falls through)
//! 2. `email_addresses` override map
//! 3. `email_template`
//! 4. Username + email domain
//! 5. First initial + `.` + rest of the name + email domain, or the whole
//!    name + email domain for single-word names
//!
//! An error from strategy 1 or 3 aborts the lookup; later strategies are not
//! tried.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::lookup::EmailLookup;
use super::template::{EmailTemplate, TemplateContext};
use crate::config::AuthorsFile;
use crate::errors::LookupError;

/// A resolved author identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pair {
    pub name: String,
    pub email: String,
    pub initials: String,
    pub username: String,
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Which strategy produced an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailSource {
    Lookup,
    Override,
    Template,
    Username,
    Name,
}

/// Resolves initials against a borrowed authors file.
pub struct Resolver<'a> {
    file: &'a AuthorsFile,
    lookup: Option<&'a dyn EmailLookup>,
}

impl<'a> Resolver<'a> {
    pub fn new(file: &'a AuthorsFile, lookup: Option<&'a dyn EmailLookup>) -> Self {
        Self { file, lookup }
    }

    /// Look up `initials` and build the full [`Pair`].
    pub fn resolve(&self, initials: &str) -> Result<Pair, LookupError> {
        let record = self
            .file
            .authors
            .get(initials)
            .ok_or_else(|| LookupError::UnknownInitials(initials.to_string()))?;

        let (name, username) = split_record(record);
        let (email, source) = self.build_email(initials, &name, &username)?;
        debug!(initials, ?source, %email, "resolved author email");

        Ok(Pair {
            name,
            email,
            initials: initials.to_string(),
            username,
        })
    }

    /// Run the strategy chain for one author.
    pub fn build_email(
        &self,
        initials: &str,
        name: &str,
        username: &str,
    ) -> Result<(String, EmailSource), LookupError> {
        if let Some(lookup) = self.lookup {
            let email = lookup.lookup(initials, name, username)?;
            let email = email.trim();
            if !email.is_empty() {
                return Ok((email.to_string(), EmailSource::Lookup));
            }
            debug!(initials, "email lookup returned nothing, falling back");
        }

        if let Some(email) = self.file.email_addresses.get(initials) {
            return Ok((email.clone(), EmailSource::Override));
        }

        if let Some(source) = self.file.email_template.as_deref().filter(|t| !t.is_empty()) {
            let template = EmailTemplate::parse(source)?;
            let email = template.render(&TemplateContext { initials, name, username })?;
            return Ok((email, EmailSource::Template));
        }

        let domain = &self.file.email.domain;
        if !username.is_empty() {
            return Ok((format!("{}@{}", username.trim(), domain), EmailSource::Username));
        }

        Ok((email_from_name(name, domain), EmailSource::Name))
    }
}

/// Split `"Full Name[; username]"` on the first `;`.
pub fn split_record(record: &str) -> (String, String) {
    match record.split_once(';') {
        Some((name, username)) => (name.trim().to_string(), username.trim().to_string()),
        None => (record.trim().to_string(), String::new()),
    }
}

/// `"Alice Brown"` -> `a.brown@domain`, `"Cher"` -> `cher@domain`.
///
/// Only the first character of the first word is kept.
fn email_from_name(name: &str, domain: &str) -> String {
    match name.split_once(' ') {
        Some((first, rest)) => {
            let initial: String = first
                .trim()
                .chars()
                .next()
                .map(|c| c.to_lowercase().collect())
                .unwrap_or_default();
            format!("{}.{}@{}", initial, rest.trim().to_lowercase(), domain)
        }
        None => format!("{}@{}", name.trim().to_lowercase(), domain),
    }
}
