//! Terms: an identifier plus free-form options.
//!
//! A term is the payload of every step in an expression. For a repository
//! reference the identifier names the repository, for an edit it names the
//! editor, and for a translation it names the destination project space.
//! Options are interpreted by whichever handler consumes the term.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Term options, kept in key order so rendering is canonical.
pub type Options = BTreeMap<String, String>;

/// An identifier with key/value options, e.g. `internal(revision=42)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: Options,
}

impl Term {
    /// A term with no options.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            options: Options::new(),
        }
    }

    pub fn with_options(identifier: impl Into<String>, options: Options) -> Self {
        Self {
            identifier: identifier.into(),
            options,
        }
    }

    /// Returns a new term with `key` set to `value`, replacing any previous
    /// value for `key`.
    pub fn with_option(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut options = self.options.clone();
        options.insert(key.into(), value.into());
        Self {
            identifier: self.identifier.clone(),
            options,
        }
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_atom(f, &self.identifier)?;
        if self.options.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (idx, (key, value)) in self.options.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write_atom(f, key)?;
            f.write_str("=")?;
            write_atom(f, value)?;
        }
        f.write_str(")")
    }
}

/// Characters that may appear in an unquoted atom.
pub(crate) fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/' | ':' | '@' | '+' | '~')
}

fn write_atom(f: &mut fmt::Formatter<'_>, atom: &str) -> fmt::Result {
    if !atom.is_empty() && atom.chars().all(is_bare_char) {
        return f.write_str(atom);
    }
    f.write_str("\"")?;
    for c in atom.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            other => write!(f, "{other}")?,
        }
    }
    f.write_str("\"")
}
