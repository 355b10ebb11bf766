//! Revision identity.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// One commit in one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub rev_id: String,
    pub repository_name: String,
}

impl Revision {
    pub fn new(rev_id: impl Into<String>, repository_name: impl Into<String>) -> Self {
        Self {
            rev_id: rev_id.into(),
            repository_name: repository_name.into(),
        }
    }

    /// Parse `repository:revId`, the form used on command lines.
    pub fn parse_qualified(input: &str) -> Option<Self> {
        let (repository, rev_id) = input.split_once(':')?;
        if repository.is_empty() || rev_id.is_empty() {
            return None;
        }
        Some(Self::new(rev_id, repository))
    }
}

/// Repository first, so sorted collections group by repository.
impl Ord for Revision {
    fn cmp(&self, other: &Self) -> Ordering {
        self.repository_name
            .cmp(&other.repository_name)
            .then_with(|| self.rev_id.cmp(&other.rev_id))
    }
}

impl PartialOrd for Revision {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}", self.repository_name, self.rev_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_repository_then_rev_id() {
        assert_eq!(Revision::new("42", "internal").to_string(), "internal{42}");
    }

    #[test]
    fn parse_qualified_splits_on_first_colon() {
        assert_eq!(
            Revision::parse_qualified("public:abc:def"),
            Some(Revision::new("abc:def", "public"))
        );
        assert_eq!(Revision::parse_qualified("public"), None);
        assert_eq!(Revision::parse_qualified(":1"), None);
    }

    #[test]
    fn orders_by_repository_first() {
        let mut revs = vec![
            Revision::new("1", "public"),
            Revision::new("9", "internal"),
            Revision::new("2", "internal"),
        ];
        revs.sort();
        assert_eq!(
            revs,
            vec![
                Revision::new("2", "internal"),
                Revision::new("9", "internal"),
                Revision::new("1", "public"),
            ]
        );
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_string(&Revision::new("7", "internal")).expect("serialize");
        assert_eq!(json, r#"{"revId":"7","repositoryName":"internal"}"#);
    }
}
