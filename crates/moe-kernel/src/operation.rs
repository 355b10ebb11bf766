//! Operators and the operations that chain onto a prior expression.

use crate::error::ExpressionError;
use crate::term::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of expression operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Root reference to a named repository.
    Repository,

    /// In-place content transform within one project space.
    Edit,

    /// Transform from one project space into another.
    Translate,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Repository, Operator::Edit, Operator::Translate];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::Edit => "edit",
            Self::Translate => "translate",
        }
    }

    /// Suffix delimiter in the canonical text form. The root operator has none.
    pub fn delimiter(self) -> Option<char> {
        match self {
            Self::Repository => None,
            Self::Edit => Some('|'),
            Self::Translate => Some('>'),
        }
    }

    pub fn from_delimiter(c: char) -> Option<Self> {
        match c {
            '|' => Some(Self::Edit),
            '>' => Some(Self::Translate),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chained step: an operator applied with a term.
///
/// Deserialization goes through [`Operation::new`], so a decoded operation
/// obeys the same rules as a constructed one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "OperationFields")]
pub struct Operation {
    operator: Operator,
    term: Term,
}

#[derive(Deserialize)]
struct OperationFields {
    operator: Operator,
    term: Term,
}

impl TryFrom<OperationFields> for Operation {
    type Error = ExpressionError;

    fn try_from(fields: OperationFields) -> Result<Self, Self::Error> {
        Self::new(fields.operator, fields.term)
    }
}

impl Operation {
    /// Build an operation, rejecting the root operator and translations
    /// without a destination project space.
    pub fn new(operator: Operator, term: Term) -> Result<Self, ExpressionError> {
        match operator {
            Operator::Repository => Err(ExpressionError::NotChainable(operator)),
            Operator::Translate if term.identifier.is_empty() => {
                Err(ExpressionError::EmptyTranslateTarget)
            }
            Operator::Edit | Operator::Translate => Ok(Self { operator, term }),
        }
    }

    /// An edit operation. Any editor name is accepted.
    pub fn edit(term: Term) -> Self {
        Self {
            operator: Operator::Edit,
            term,
        }
    }

    #[cfg(test)]
    pub(crate) fn unchecked(operator: Operator, term: Term) -> Self {
        Self { operator, term }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Same operator, option added to the term.
    pub fn with_option(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            operator: self.operator,
            term: self.term.with_option(key, value),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(delimiter) = self.operator.delimiter() {
            write!(f, "{delimiter}")?;
        }
        write!(f, "{}", self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_operator_does_not_chain() {
        let err = Operation::new(Operator::Repository, Term::new("internal"))
            .expect_err("root operator must be rejected");
        assert_eq!(err, ExpressionError::NotChainable(Operator::Repository));
    }

    #[test]
    fn translate_requires_destination() {
        let err = Operation::new(Operator::Translate, Term::new(""))
            .expect_err("empty destination must be rejected");
        assert_eq!(err, ExpressionError::EmptyTranslateTarget);
    }

    #[test]
    fn delimiters_are_distinct_per_operator() {
        let edit = Operation::new(Operator::Edit, Term::new("scrub")).expect("edit op");
        let translate =
            Operation::new(Operator::Translate, Term::new("scrub")).expect("translate op");
        assert_eq!(edit.to_string(), "|scrub");
        assert_eq!(translate.to_string(), ">scrub");
        for op in Operator::ALL {
            if let Some(d) = op.delimiter() {
                assert_eq!(Operator::from_delimiter(d), Some(op));
            }
        }
    }

    #[test]
    fn decoding_applies_construction_rules() {
        let decoded: Operation =
            serde_json::from_str(r#"{"operator":"translate","term":{"identifier":"public"}}"#)
                .expect("valid translate should decode");
        assert_eq!(decoded.to_string(), ">public");

        for json in [
            r#"{"operator":"translate","term":{"identifier":""}}"#,
            r#"{"operator":"repository","term":{"identifier":"internal"}}"#,
        ] {
            let err = serde_json::from_str::<Operation>(json).expect_err("invalid operation");
            assert!(err.is_data(), "{json}: {err}");
        }
    }
}
