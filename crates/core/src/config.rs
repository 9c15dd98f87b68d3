//! YAML authors file schema and loader.
//!
//! The authors file format:
//!
//! ```yaml
//! authors:            # `pairs:` is accepted as a legacy synonym
//!   ab: Alice Brown; abrown
//!   cd: Cher
//! email:
//!   prefix: dev
//!   domain: example.com
//! email_addresses:
//!   cd: cher@example.org
//! email_template: "{{toLower .Username}}@example.com"
//! ```
//!
//! Only the YAML structure is checked here. Author records and the email
//! template are validated lazily, when a lookup needs them.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::errors::ConfigError;

/// Email defaults used by the username and name-derived strategies.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailConfig {
    /// Local-part prefix. Parsed for compatibility, not used by resolution.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub prefix: String,

    /// Domain appended to derived addresses.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub domain: String,
}

/// Parsed contents of an authors file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorsFile {
    /// Initials -> `"Full Name[; username]"`.
    #[serde(default, deserialize_with = "scalar_map")]
    pub authors: HashMap<String, String>,

    /// Email defaults.
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: EmailConfig,

    /// Initials -> literal email address.
    #[serde(default, deserialize_with = "scalar_map")]
    pub email_addresses: HashMap<String, String>,

    /// Template rendered against `{Initials, Name, Username}`.
    #[serde(default)]
    pub email_template: Option<String>,
}

impl AuthorsFile {
    /// Read and parse the authors file at `path`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading authors file");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&path.display().to_string(), &contents)
    }

    /// Parse an authors document. `source_name` is only used in error
    /// messages.
    pub fn parse(source_name: &str, contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            debug!(source = source_name, "authors file is empty");
            return Ok(Self::default());
        }

        let contents = rewrite_legacy_key(contents);
        let parse_failure = |e: serde_yaml::Error| ConfigError::ParseFailure {
            path: source_name.to_string(),
            detail: e.to_string(),
        };

        let value: Value = serde_yaml::from_str(&contents).map_err(parse_failure)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        let file: Self = serde_yaml::from_value(value).map_err(parse_failure)?;

        debug!(
            source = source_name,
            authors = file.authors.len(),
            email_addresses = file.email_addresses.len(),
            template = file.email_template.is_some(),
            "parsed authors file"
        );
        Ok(file)
    }
}

/// Rename a top-level `pairs:` key to `authors:`.
///
/// Only a key at the very start of a line matches; nested keys and values
/// that merely contain the word are left alone.
fn rewrite_legacy_key(contents: &str) -> Cow<'_, str> {
    static PAIRS_KEY: OnceLock<Regex> = OnceLock::new();
    let re = PAIRS_KEY.get_or_init(|| Regex::new(r"(?m)^pairs:").expect("valid pairs key pattern"));
    re.replace_all(contents, "authors:")
}

/// Treat an explicit YAML `null` (e.g. `authors:` with nothing under it) the
/// same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept any YAML scalar as text: `domain: 42` reads as `"42"` and an
/// empty value as `""`.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(Value::deserialize(deserializer)?)
}

/// A string map whose keys and values may be any YAML scalar.
fn scalar_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Mapping>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| Ok((scalar_text(key)?, scalar_text(value)?)))
        .collect()
}

fn scalar_text<E: serde::de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s),
        Value::Tagged(tagged) => scalar_text(tagged.value),
        Value::Sequence(_) => Err(E::custom("expected a string, found a sequence")),
        Value::Mapping(_) => Err(E::custom("expected a string, found a mapping")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
authors:
  ab: Alice Brown
  ef: Eve Foo; efoo
email:
  prefix: dev
  domain: example.com
email_addresses:
  gh: grace@navy.mil
email_template: "{{.Username}}@example.org"
"#
    }

    #[test]
    fn test_parse_full_file() {
        let file = AuthorsFile::parse("sample", sample_yaml()).unwrap();
        assert_eq!(file.authors.len(), 2);
        assert_eq!(file.authors["ef"], "Eve Foo; efoo");
        assert_eq!(file.email.prefix, "dev");
        assert_eq!(file.email.domain, "example.com");
        assert_eq!(file.email_addresses["gh"], "grace@navy.mil");
        assert_eq!(
            file.email_template.as_deref(),
            Some("{{.Username}}@example.org")
        );
    }

    #[test]
    fn test_legacy_pairs_key() {
        let legacy = "pairs:\n  ab: Alice Brown\nemail:\n  domain: example.com\n";
        let modern = "authors:\n  ab: Alice Brown\nemail:\n  domain: example.com\n";
        assert_eq!(
            AuthorsFile::parse("legacy", legacy).unwrap(),
            AuthorsFile::parse("modern", modern).unwrap()
        );
    }

    #[test]
    fn test_legacy_rewrite_is_line_anchored() {
        let text = "authors:\n  pp: Pat Pairs\n  nested: x\nemail_template: \"pairs: {{.Name}}\"\n";
        assert_eq!(rewrite_legacy_key(text), text);

        let text = "# comment\npairs:\n  ab: Alice\n";
        assert_eq!(rewrite_legacy_key(text), "# comment\nauthors:\n  ab: Alice\n");
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let file = AuthorsFile::parse("minimal", "authors:\n  cd: Cher\n").unwrap();
        assert_eq!(file.email, EmailConfig::default());
        assert!(file.email_addresses.is_empty());
        assert!(file.email_template.is_none());
    }

    #[test]
    fn test_null_sections_are_empty() {
        let file = AuthorsFile::parse("nulls", "authors:\nemail:\nemail_addresses:\n").unwrap();
        assert_eq!(file, AuthorsFile::default());
    }

    #[test]
    fn test_numeric_domain_is_text() {
        let file = AuthorsFile::parse("numeric", "email:\n  domain: 42\n  prefix: 7\n").unwrap();
        assert_eq!(file.email.domain, "42");
        assert_eq!(file.email.prefix, "7");
    }

    #[test]
    fn test_numeric_author_record_is_text() {
        let file = AuthorsFile::parse("numeric", "authors:\n  AB: 123\n  12: Twelve\n").unwrap();
        assert_eq!(file.authors["AB"], "123");
        assert_eq!(file.authors["12"], "Twelve");
    }

    #[test]
    fn test_bool_values_are_text() {
        let file =
            AuthorsFile::parse("bools", "authors:\n  NO: true\nemail:\n  domain: false\n").unwrap();
        assert_eq!(file.authors["NO"], "true");
        assert_eq!(file.email.domain, "false");
    }

    #[test]
    fn test_null_values_are_empty_text() {
        let file = AuthorsFile::parse("nulls", "email_addresses:\n  AB:\nemail:\n  domain: ~\n").unwrap();
        assert_eq!(file.email_addresses["AB"], "");
        assert_eq!(file.email.domain, "");
    }

    #[test]
    fn test_nested_value_is_parse_failure() {
        let result = AuthorsFile::parse("nested", "email:\n  domain:\n    - example.com\n");
        assert!(matches!(result, Err(ConfigError::ParseFailure { .. })));

        let result = AuthorsFile::parse("nested", "authors:\n  AB:\n    name: Alice\n");
        assert!(matches!(result, Err(ConfigError::ParseFailure { .. })));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let with_extras = "authors:\n  ab: Alice Brown\ngit_duet_extra: 1\nemail:\n  domain: example.com\n  signature: x\n";
        let clean = "authors:\n  ab: Alice Brown\nemail:\n  domain: example.com\n";
        assert_eq!(
            AuthorsFile::parse("extras", with_extras).unwrap(),
            AuthorsFile::parse("clean", clean).unwrap()
        );
    }

    #[test]
    fn test_empty_document() {
        let file = AuthorsFile::parse("empty", "").unwrap();
        assert!(file.authors.is_empty());
    }

    #[test]
    fn test_malformed_yaml_reports_source() {
        let result = AuthorsFile::parse("/tmp/broken.yml", "authors:\n  ab: [unclosed\n");
        match result {
            Err(ConfigError::ParseFailure { path, detail }) => {
                assert_eq!(path, "/tmp/broken.yml");
                assert!(!detail.is_empty());
            }
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_shape_is_parse_failure() {
        let result = AuthorsFile::parse("shape", "authors:\n  - Alice Brown\n");
        assert!(matches!(result, Err(ConfigError::ParseFailure { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".git-authors");
        std::fs::write(&path, sample_yaml()).unwrap();

        let file = AuthorsFile::load_from_file(&path).unwrap();
        assert_eq!(file.authors["ab"], "Alice Brown");
    }

    #[test]
    fn test_file_not_found() {
        let result = AuthorsFile::load_from_file("/nonexistent/.git-authors");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
