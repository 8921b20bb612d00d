mod builder;
pub mod error;
mod parse_tree;
mod tokenizer;
mod writer;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::sanitize::sanitize;
pub use error::SmilesError;
pub(crate) use builder::fold_explicit_hydrogens;
pub use writer::{to_smiles, to_smiles_with, to_smiles_with_rng, SmilesWriteOptions};

/// Parses SMILES into a molecule exactly as written: aromatic bonds stay
/// unresolved and no implicit hydrogens are assigned.
pub fn from_smiles_unsanitized(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = tokenizer::tokenize(trimmed)?;
    if tokens.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tree = parse_tree::build_parse_tree(&tokens)?;
    Ok(builder::build_mol(&tree))
}

/// Parses and sanitizes SMILES.
///
/// ```
/// let mol = molkit::smiles::from_smiles("c1ccccc1O").unwrap();
/// assert_eq!(mol.atom_count(), 7);
/// ```
pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mut mol = from_smiles_unsanitized(s)?;
    sanitize(&mut mol)?;
    Ok(mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;
    use crate::sanitize::SanitizeError;
    use petgraph::graph::NodeIndex;

    fn hs(smiles: &str) -> Vec<u8> {
        let mol = from_smiles(smiles).unwrap();
        mol.atoms().map(|i| mol.atom(i).total_h()).collect()
    }

    fn orders(smiles: &str) -> Vec<BondOrder> {
        let mol = from_smiles(smiles).unwrap();
        mol.bonds().map(|e| mol.bond(e).order).collect()
    }

    #[test]
    fn small_molecules() {
        assert_eq!(hs("C"), vec![4]);
        assert_eq!(hs("O"), vec![2]);
        assert_eq!(hs("N"), vec![3]);
        assert_eq!(hs("Cl"), vec![1]);
        assert_eq!(hs("C=C"), vec![2, 2]);
        assert_eq!(hs("C#C"), vec![1, 1]);
        assert_eq!(hs("CC(=O)O"), vec![3, 0, 0, 1]);
        assert_eq!(hs("CC(C)(C)C"), vec![3, 0, 3, 3, 3]);
        assert_eq!(hs("P"), vec![3]);
        assert_eq!(hs("B"), vec![3]);
        assert_eq!(hs("I"), vec![1]);
    }

    #[test]
    fn bond_orders() {
        assert_eq!(orders("C=C"), vec![BondOrder::Double]);
        assert_eq!(orders("C#N"), vec![BondOrder::Triple]);
        assert_eq!(orders("C-C"), vec![BondOrder::Single]);
    }

    #[test]
    fn rings() {
        let mol = from_smiles("C1CCCCC1").unwrap();
        assert_eq!(mol.bond_count(), 6);
        let mol = from_smiles("C%10CC%10").unwrap();
        assert_eq!(mol.bond_count(), 3);
        assert_eq!(hs("C1=CCCCC1"), vec![1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn brackets() {
        assert_eq!(hs("[NH4+]"), vec![4]);
        assert_eq!(hs("[OH-]"), vec![1]);
        assert_eq!(hs("[Fe+2]"), vec![0]);
        assert_eq!(hs("[CH4]"), vec![4]);
        let mol = from_smiles("[13CH4]").unwrap();
        assert_eq!(mol.atom(NodeIndex::new(0)).isotope, 13);
        let mol = from_smiles("[2H]O[2H]").unwrap();
        assert_eq!(mol.atom_count(), 3);
        let mol = from_smiles("[CH3:4]O").unwrap();
        assert_eq!(mol.atom(NodeIndex::new(0)).map_num, 4);
    }

    #[test]
    fn aromatic_inputs_kekulize() {
        for smi in ["c1ccccc1", "c1ccncc1", "c1ccoc1", "c1ccsc1", "c1cc[nH]c1"] {
            let mol = from_smiles(smi).unwrap();
            assert!(mol.bonds().all(|e| mol.bond(e).order != BondOrder::Aromatic));
            assert!(mol.atoms().all(|a| mol.atom(a).is_aromatic), "{smi}");
        }
        assert_eq!(hs("c1ccccc1"), vec![1; 6]);
        assert_eq!(hs("c1cc[nH]c1"), vec![1, 1, 1, 1, 1]);
    }

    #[test]
    fn hypervalent_atoms() {
        assert_eq!(hs("CS(C)=O"), vec![3, 0, 3, 0]);
        assert_eq!(hs("OP(O)(O)=O"), vec![1, 0, 1, 1, 0]);
        assert_eq!(hs("C[N+](=O)[O-]"), vec![3, 0, 0, 0]);
    }

    #[test]
    fn disconnected() {
        let mol = from_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(mol.fragments().len(), 2);
    }

    #[test]
    fn dummy_atoms() {
        let mol = from_smiles("*C(*)=O").unwrap();
        assert_eq!(mol.atom(NodeIndex::new(0)).atomic_num, 0);
        assert_eq!(hs("*C(*)=O"), vec![0, 0, 0, 0]);
    }

    #[test]
    fn errors() {
        assert_eq!(from_smiles(""), Err(SmilesError::EmptyInput));
        assert_eq!(from_smiles("   "), Err(SmilesError::EmptyInput));
        assert!(from_smiles("C(C").is_err());
        assert!(from_smiles("C)C").is_err());
        assert!(from_smiles("C1CC").is_err());
        assert!(from_smiles("[C").is_err());
        assert!(from_smiles("X").is_err());
        assert!(matches!(
            from_smiles("c1cccc1"),
            Err(SmilesError::Sanitize(SanitizeError::Kekulize(_)))
        ));
        assert!(matches!(
            from_smiles("C(C)(C)(C)(C)C"),
            Err(SmilesError::Sanitize(SanitizeError::Valence { .. }))
        ));
    }
}
