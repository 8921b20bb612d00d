use thiserror::Error;

use crate::smarts::SmartsError;

/// Error returned when parsing a reaction SMARTS string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactionSmartsError {
    #[error("no '>>' separator found in reaction SMARTS")]
    MissingSeparator,
    #[error("too many '>' separators in reaction SMARTS")]
    TooManySeparators,
    #[error("reaction has no reactant templates")]
    EmptyReactants,
    #[error("reaction has no product templates")]
    EmptyProducts,
    #[error("invalid {section} component: {source}")]
    InvalidComponent {
        section: &'static str,
        source: SmartsError,
    },
}

/// Error returned when running or sanitizing a reaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactionError {
    #[error("expected {expected} reactants, got {got}")]
    WrongReactantCount { expected: usize, got: usize },
    #[error("match combination count exceeds limit of {limit}")]
    TooManyCombinations { limit: usize },
    #[error("duplicate atom map number {map_num} in reactant templates")]
    DuplicateAtomMap { map_num: u16 },
    #[error("product atom map number {map_num} not found in reactants")]
    UnknownProductMap { map_num: u16 },
    #[error("{role} template {index} has no atoms")]
    EmptyTemplate { role: &'static str, index: usize },
    #[error("reaction has no reactant templates")]
    NoReactantTemplates,
    #[error("reaction has no product templates")]
    NoProductTemplates,
}
