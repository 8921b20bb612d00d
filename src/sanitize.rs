use thiserror::Error;

use crate::aromaticity::{clear_aromaticity, set_aromaticity};
use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::kekulize::{kekulize, KekulizeError};
use crate::mol::Mol;
use crate::valence::{assign_implicit_hs, assign_radicals, check_valence};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error(transparent)]
    Kekulize(#[from] KekulizeError),
    #[error("explicit valence {valence} for atom {atom} ({symbol}) exceeds maximum {max}")]
    Valence {
        atom: usize,
        symbol: String,
        valence: u8,
        max: u8,
    },
}

/// Brings a freshly built molecule into its canonical internal form:
/// Kekulé bond orders, implicit hydrogens, radicals and aromatic flags.
/// Running it twice is a no-op.
pub fn sanitize(mol: &mut Mol<Atom, Bond>) -> Result<(), SanitizeError> {
    let has_unresolved = mol
        .bonds()
        .any(|e| mol.bond(e).order == BondOrder::Aromatic);
    if has_unresolved {
        assign_implicit_hs(mol);
        kekulize(mol)?;
    }
    clear_aromaticity(mol);
    assign_implicit_hs(mol);
    for idx in mol.atoms() {
        check_valence(mol, idx)?;
    }
    assign_radicals(mol);
    set_aromaticity(mol);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::{from_smiles_unsanitized, to_smiles};

    #[test]
    fn sanitize_is_idempotent() {
        let mut mol = from_smiles_unsanitized("c1ccc2[nH]ccc2c1").unwrap();
        sanitize(&mut mol).unwrap();
        let once = mol.clone();
        sanitize(&mut mol).unwrap();
        assert_eq!(once, mol);
    }

    #[test]
    fn aromatic_and_kekule_inputs_agree() {
        let mut a = from_smiles_unsanitized("c1ccccc1O").unwrap();
        let mut b = from_smiles_unsanitized("C1=CC=CC=C1O").unwrap();
        sanitize(&mut a).unwrap();
        sanitize(&mut b).unwrap();
        assert_eq!(to_smiles(&a), to_smiles(&b));
    }

    #[test]
    fn reports_valence_errors() {
        let mut mol = from_smiles_unsanitized("CF(C)C").unwrap();
        match sanitize(&mut mol) {
            Err(SanitizeError::Valence { atom, symbol, .. }) => {
                assert_eq!(atom, 1);
                assert_eq!(symbol, "F");
            }
            other => panic!("expected valence error, got {other:?}"),
        }
    }

    #[test]
    fn reports_kekulize_errors() {
        let mut mol = from_smiles_unsanitized("c1cccc1").unwrap();
        assert!(matches!(
            sanitize(&mut mol),
            Err(SanitizeError::Kekulize(_))
        ));
    }
}
