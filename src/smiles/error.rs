use thiserror::Error;

use crate::sanitize::SanitizeError;

/// Errors produced when parsing a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    #[error("unexpected end of SMILES")]
    UnexpectedEnd,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("invalid element '{text}' at position {pos}")]
    InvalidElement { pos: usize, text: String },
    /// A bracket atom `[` was opened but never closed with `]`.
    #[error("unclosed bracket atom starting at position {pos}")]
    UnclosedBracket { pos: usize },
    /// A ring-opening digit was never matched by a ring-closing digit.
    #[error("unclosed ring {digit}")]
    UnclosedRing { digit: u16 },
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    #[error("invalid charge at position {pos}")]
    InvalidCharge { pos: usize },
    #[error("ring bond {digit} at position {pos} has no atom to attach to")]
    InvalidRingBond { digit: u16, pos: usize },
    /// Ring closure to the atom it was opened on, or to an atom it is
    /// already bonded to.
    #[error("ring closure {digit} duplicates an existing bond")]
    DuplicateRingBond { digit: u16 },
    #[error("empty SMILES string")]
    EmptyInput,
    /// Two ring-closure bonds on the same digit specify conflicting bond types.
    #[error("conflicting bond types on ring closure {digit}")]
    RingBondConflict { digit: u16 },
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
}
