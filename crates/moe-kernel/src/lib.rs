//! # MOE Kernel
//!
//! The algebra of codebase expressions. An expression is a pure value that
//! says how a codebase is derived; evaluating it is the engine's job.
//!
//! ## Architecture
//!
//! ```text
//! Term            ← identifier + sorted options
//!     │
//! Operation       ← Operator (edit | translate) applied with a Term
//!     │
//! Expression      ← Repository root, then chained Operations
//!     │
//! parser          ← canonical text form, inverse of Display
//! ```
//!
//! Rendering is total and deterministic, and `parse(render(e)) == e` holds
//! for every expression the builders can construct.

pub mod error;
pub mod expression;
pub mod operation;
pub mod parser;
pub mod term;

pub use error::ExpressionError;
pub use expression::{
    EditExpression, Expression, REFERENCE_FROM_CODEBASE, REFERENCE_TO_CODEBASE, REVISION_OPTION,
    RepositoryExpression, TranslateExpression,
};
pub use operation::{Operation, Operator};
pub use term::{Options, Term};
