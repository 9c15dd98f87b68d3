//! Loaded authors configuration.
//!
//! [`ConfigStore`] owns an [`AuthorsFile`] and an optional external email
//! lookup. It is built once and never mutated; every lookup is computed
//! fresh from that immutable state.

use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use super::lookup::{CommandLookup, EmailLookup};
use super::resolver::{Pair, Resolver};
use crate::config::{AuthorsFile, EmailConfig};
use crate::errors::{ConfigError, LookupError};

/// Parsed authors file plus the optional external email lookup.
pub struct ConfigStore {
    file: AuthorsFile,
    lookup: Option<Box<dyn EmailLookup + Send + Sync>>,
}

impl ConfigStore {
    /// Wrap an already parsed authors file. No external lookup is attached.
    pub fn new(file: AuthorsFile) -> Self {
        Self { file, lookup: None }
    }

    /// Load the authors file at `path`.
    ///
    /// `email_lookup` is the path of an external lookup command; `None` or
    /// an empty string disables it.
    pub fn load<P: AsRef<Path>>(path: P, email_lookup: Option<&str>) -> Result<Self, ConfigError> {
        let file = AuthorsFile::load_from_file(path)?;
        Ok(Self::new(file).with_command_lookup(email_lookup))
    }

    /// Parse an in-memory authors document. `source_name` appears in parse
    /// errors in place of a file path.
    pub fn from_yaml_str(
        source_name: &str,
        contents: &str,
        email_lookup: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let file = AuthorsFile::parse(source_name, contents)?;
        Ok(Self::new(file).with_command_lookup(email_lookup))
    }

    /// Attach an external email lookup, replacing any existing one.
    pub fn with_email_lookup<L>(mut self, lookup: L) -> Self
    where
        L: EmailLookup + Send + Sync + 'static,
    {
        self.lookup = Some(Box::new(lookup));
        self
    }

    fn with_command_lookup(self, command: Option<&str>) -> Self {
        match command.map(str::trim).filter(|c| !c.is_empty()) {
            Some(command) => {
                info!(command, "using external email lookup");
                self.with_email_lookup(CommandLookup::new(command))
            }
            None => {
                debug!("no external email lookup configured");
                self
            }
        }
    }

    /// Resolve `initials` to a full [`Pair`].
    pub fn resolve_by_initials(&self, initials: &str) -> Result<Pair, LookupError> {
        self.resolver().resolve(initials)
    }

    /// Resolve every configured author, in sorted initials order. Stops at
    /// the first failure.
    pub fn resolve_all(&self) -> Result<Vec<Pair>, LookupError> {
        let resolver = self.resolver();
        self.initials()
            .into_iter()
            .map(|initials| resolver.resolve(initials))
            .collect()
    }

    /// All configured initials, sorted.
    pub fn initials(&self) -> Vec<&str> {
        let mut initials: Vec<&str> = self.file.authors.keys().map(String::as_str).collect();
        initials.sort_unstable();
        initials
    }

    pub fn email_config(&self) -> &EmailConfig {
        &self.file.email
    }

    pub fn authors_file(&self) -> &AuthorsFile {
        &self.file
    }

    pub fn has_email_lookup(&self) -> bool {
        self.lookup.is_some()
    }

    fn resolver(&self) -> Resolver<'_> {
        let lookup = self.lookup.as_deref().map(|l| l as &dyn EmailLookup);
        Resolver::new(&self.file, lookup)
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("file", &self.file)
            .field("email_lookup", &self.lookup.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    const AUTHORS: &str = r#"
authors:
  ab: Alice Brown
  cd: Cher
  ef: Eve Foo; efoo
  gh: Grace Hopper
email:
  domain: example.com
email_addresses:
  gh: grace@navy.mil
"#;

    fn store() -> ConfigStore {
        ConfigStore::from_yaml_str("test", AUTHORS, None).unwrap()
    }

    #[test]
    fn test_resolve_scenarios() {
        let store = store();
        assert_eq!(store.resolve_by_initials("ab").unwrap().email, "a.brown@example.com");
        assert_eq!(store.resolve_by_initials("cd").unwrap().email, "cher@example.com");
        assert_eq!(store.resolve_by_initials("ef").unwrap().email, "efoo@example.com");
        assert_eq!(store.resolve_by_initials("gh").unwrap().email, "grace@navy.mil");
    }

    #[test]
    fn test_unknown_initials() {
        let err = store().resolve_by_initials("zz").unwrap_err();
        assert!(matches!(err, LookupError::UnknownInitials(ref i) if i == "zz"));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let store = store();
        assert_eq!(
            store.resolve_by_initials("ef").unwrap(),
            store.resolve_by_initials("ef").unwrap()
        );
    }

    #[test]
    fn test_initials_sorted() {
        assert_eq!(store().initials(), vec!["ab", "cd", "ef", "gh"]);
    }

    #[test]
    fn test_resolve_all() {
        let pairs = store().resolve_all().unwrap();
        let emails: Vec<&str> = pairs.iter().map(|p| p.email.as_str()).collect();
        assert_eq!(
            emails,
            vec!["a.brown@example.com", "cher@example.com", "efoo@example.com", "grace@navy.mil"]
        );
    }

    #[test]
    fn test_lookup_short_circuits_other_strategies() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let store = store().with_email_lookup(
            move |initials: &str, _: &str, _: &str| -> Result<String, LookupError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(format!("{initials}@lookup.example"))
            },
        );

        let pair = store.resolve_by_initials("gh").unwrap();
        assert_eq!(pair.email, "gh@lookup.example");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lookup_not_called_for_unknown_initials() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let store = store().with_email_lookup(
            move |_: &str, _: &str, _: &str| -> Result<String, LookupError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(String::new())
            },
        );

        assert!(store.resolve_by_initials("zz").is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_lookup_command_is_disabled() {
        let store = ConfigStore::from_yaml_str("test", AUTHORS, Some("  ")).unwrap();
        assert!(!store.has_email_lookup());

        let store = ConfigStore::from_yaml_str("test", AUTHORS, Some("lookup-email")).unwrap();
        assert!(store.has_email_lookup());
    }

    #[test]
    fn test_debug_hides_lookup() {
        let rendered = format!("{:?}", store());
        assert!(rendered.contains("email_lookup: false"));
    }
}
