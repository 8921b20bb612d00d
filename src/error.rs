use thiserror::Error;

use crate::descriptors::DescriptorError;
use crate::mdl::MdlError;
use crate::reaction::{ReactionError, ReactionSmartsError};
use crate::sanitize::SanitizeError;
use crate::smarts::SmartsError;
use crate::smiles::SmilesError;

/// Any failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Smiles(#[from] SmilesError),
    #[error(transparent)]
    Smarts(#[from] SmartsError),
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
    #[error(transparent)]
    Reaction(#[from] ReactionError),
    #[error(transparent)]
    ReactionSmarts(#[from] ReactionSmartsError),
    #[error(transparent)]
    Mdl(#[from] MdlError),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error("product index {index} out of range for {len} products")]
    ProductIndex { index: usize, len: usize },
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
