//! Equivalence and migration records.
//!
//! Serialized field names (`rev1`/`rev2`, `fromRevision`/`toRevision`) are
//! the durable db file format.

use crate::revision::Revision;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Two revisions, normally in different repositories, with the same content.
///
/// The pair is unordered: construction stores the smaller revision first, so
/// `new(a, b) == new(b, a)` and the sorted db file is stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RepositoryEquivalence {
    rev1: Revision,
    rev2: Revision,
}

impl RepositoryEquivalence {
    pub fn new(a: Revision, b: Revision) -> Self {
        if b < a {
            Self { rev1: b, rev2: a }
        } else {
            Self { rev1: a, rev2: b }
        }
    }

    pub fn revisions(&self) -> (&Revision, &Revision) {
        (&self.rev1, &self.rev2)
    }

    /// The side of the pair opposite `revision`, if `revision` is a side.
    pub fn other_revision(&self, revision: &Revision) -> Option<&Revision> {
        if &self.rev1 == revision {
            Some(&self.rev2)
        } else if &self.rev2 == revision {
            Some(&self.rev1)
        } else {
            None
        }
    }

    pub fn has_repository(&self, repository_name: &str) -> bool {
        self.rev1.repository_name == repository_name || self.rev2.repository_name == repository_name
    }
}

impl<'de> Deserialize<'de> for RepositoryEquivalence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            rev1: Revision,
            rev2: Revision,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Self::new(raw.rev1, raw.rev2))
    }
}

impl fmt::Display for RepositoryEquivalence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == {}", self.rev1, self.rev2)
    }
}

/// A migration of `from_revision` that was submitted as `to_revision`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedMigration {
    pub from_revision: Revision,
    pub to_revision: Revision,
}

impl SubmittedMigration {
    pub fn new(from_revision: Revision, to_revision: Revision) -> Self {
        Self {
            from_revision,
            to_revision,
        }
    }
}
