//! Molecular graphs, SMILES/SMARTS, reaction templates and descriptors.
//!
//! ```
//! use molkit::reactions::{apply_reaction, rxn_from_smarts, ApplyOptions};
//! use molkit::smiles::from_smiles;
//!
//! let rxn = rxn_from_smarts("[C:1](=[O:2])[OH].[N;H2:3]>>[C:1](=[O:2])[N:3]").unwrap();
//! let acid = from_smiles("CC(=O)O").unwrap();
//! let amine = from_smiles("CN").unwrap();
//! let opts = ApplyOptions { as_smiles: true, ..Default::default() };
//! let groups = apply_reaction(&rxn, &[&acid, &amine], &opts).unwrap();
//! assert_eq!(groups.len(), 1);
//! ```

pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod canonical;
pub mod convert;
pub mod descriptors;
pub mod element;
pub mod error;
pub mod hydrogens;
pub mod kekulize;
pub mod logging;
pub mod mdl;
pub mod mol;
pub mod reaction;
pub mod reactions;
pub mod rings;
pub mod sanitize;
pub mod smarts;
pub mod smiles;
pub mod substruct;
pub mod valence;

pub use atom::{Atom, Chirality};
pub use bond::{Bond, BondOrder};
pub use element::Element;
pub use error::{Error, Result};
pub use kekulize::{kekulize, KekulizeError};
pub use mol::Mol;
pub use reaction::ChemicalReaction;
pub use rings::RingInfo;
pub use sanitize::{sanitize, SanitizeError};
pub use smarts::{from_smarts, SmartsError};
pub use smiles::{from_smiles, to_smiles, SmilesError};
