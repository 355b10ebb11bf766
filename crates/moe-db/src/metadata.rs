//! Change-log facts about one commit, and the merge of several into one.
//!
//! When a migration squashes several source revisions into one commit in the
//! target repository, their metadata is concatenated so the target commit
//! keeps every author, description, and parent. A migrated commit also
//! carries a two-line provenance footer naming the source revision; later
//! runs read it back with [`migrated_rev_id`].

use crate::revision::Revision;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Separator between joined ids and authors.
pub const FIELD_SEPARATOR: &str = ", ";

/// Separator between joined descriptions.
pub const DESCRIPTION_SEPARATOR: &str = "\n-------------\n";

/// First line of the provenance footer.
pub const MOE_MIGRATION_MARKER: &str = "Created by MOE: https://github.com/google/moe";

/// Key of the second footer line, `MOE_MIGRATED_REVID=<revId>`.
pub const MOE_MIGRATED_REVID_KEY: &str = "MOE_MIGRATED_REVID";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("cannot concatenate an empty list of revision metadata")]
    Empty,
}

/// Metadata of one revision as reported by a repository adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionMetadata {
    pub id: String,
    pub author: String,
    pub date: DateTime<Utc>,
    pub description: String,
    /// Discovery order; duplicates are kept.
    #[serde(default)]
    pub parents: Vec<Revision>,
}

impl RevisionMetadata {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        date: DateTime<Utc>,
        description: impl Into<String>,
        parents: Vec<Revision>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            date,
            description: description.into(),
            parents,
        }
    }

    /// Source revision id recorded in this commit's provenance footer.
    pub fn migrated_rev_id(&self) -> Option<&str> {
        migrated_rev_id(&self.description)
    }
}

/// Merge `metadata` into one record, optionally stamping provenance.
///
/// ids and authors are joined with `", "`, descriptions with a dashed
/// separator line, parents are concatenated in order, and the date is the
/// latest input date. A single record without `migrated_from` comes back
/// unchanged.
pub fn concatenate(
    metadata: &[RevisionMetadata],
    migrated_from: Option<&Revision>,
) -> Result<RevisionMetadata, MetadataError> {
    let (first, rest) = metadata.split_first().ok_or(MetadataError::Empty)?;

    let mut merged = first.clone();
    for next in rest {
        merged.id.push_str(FIELD_SEPARATOR);
        merged.id.push_str(&next.id);
        merged.author.push_str(FIELD_SEPARATOR);
        merged.author.push_str(&next.author);
        merged.description.push_str(DESCRIPTION_SEPARATOR);
        merged.description.push_str(&next.description);
        merged.date = merged.date.max(next.date);
        merged.parents.extend(next.parents.iter().cloned());
    }

    if let Some(revision) = migrated_from {
        merged.description.push_str(DESCRIPTION_SEPARATOR);
        merged.description.push_str(&provenance_footer(revision));
    }

    Ok(merged)
}

/// The footer identifying `revision` as a migration source.
pub fn provenance_footer(revision: &Revision) -> String {
    format!(
        "{MOE_MIGRATION_MARKER}\n{MOE_MIGRATED_REVID_KEY}={}",
        revision.rev_id
    )
}

/// Recover the migrated source revision id from a commit description.
///
/// The last footer wins, so a commit that was migrated twice reports its
/// most recent source.
pub fn migrated_rev_id(description: &str) -> Option<&str> {
    migrated_revid_re()
        .captures_iter(description)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn migrated_revid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^MOE_MIGRATED_REVID=(\S+)\s*$").expect("migrated revid regex must compile")
    })
}
