//! MDL molfiles and reaction files.
//!
//! Molecules are read from and written to V2000 or V3000 molblocks;
//! reactions go through `$RXN` blocks whose templates become SMARTS-style
//! query graphs. Coordinates are not kept: blocks are written with zeroed
//! positions.

mod ctab;
pub mod error;
mod molblock;
mod rxn;

pub use error::MdlError;
pub use molblock::{from_molblock, from_molblock_unsanitized, to_molblock, to_molblock_v3000};
pub use rxn::{from_rxn_block, to_rxn_block, RxnWriteOptions};
