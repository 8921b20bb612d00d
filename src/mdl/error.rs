use thiserror::Error;

use crate::reaction::ReactionError;
use crate::sanitize::SanitizeError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MdlError {
    #[error("{what} block too short")]
    TooShort { what: &'static str },
    #[error("line {line}: invalid {field} '{value}'")]
    BadField {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: unknown element '{symbol}'")]
    UnknownElement { line: usize, symbol: String },
    #[error("bond references atom {atom}, but the block has {count} atoms")]
    BadAtomReference { atom: usize, count: usize },
    #[error("expected {expected} {what}, found {found}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("not a reaction block: expected '$RXN' header")]
    NotRxn,
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
    #[error(transparent)]
    Reaction(#[from] ReactionError),
}
