//! Explicit valence, implicit hydrogen assignment and valence checks.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::allowed_valences;
use crate::mol::Mol;
use crate::sanitize::SanitizeError;

/// Sum of bond orders at `idx`. Unresolved aromatic bonds count one.
pub fn explicit_valence(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    mol.bonds_of(idx)
        .map(|e| mol.bond(e).order.valence_contrib())
        .sum()
}

/// Explicit valence plus all attached hydrogens.
pub fn total_valence(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    explicit_valence(mol, idx) + mol.atom(idx).total_h()
}

fn has_unresolved_aromatic(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
    mol.bonds_of(idx)
        .any(|e| mol.bond(e).order == BondOrder::Aromatic)
}

/// Implicit hydrogens a bare atom would carry.
///
/// Takes the smallest allowed valence that fits the current bonds. On an
/// atom that still has unresolved aromatic bonds one hydrogen is given up,
/// since kekulization will add a double bond there.
pub fn implicit_h_count(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    let atom = mol.atom(idx);
    if atom.no_implicit || atom.is_dummy() {
        return 0;
    }
    let used = explicit_valence(mol, idx) + atom.explicit_h + atom.radical_electrons;
    let Some(&target) = allowed_valences(atom.atomic_num, atom.formal_charge)
        .iter()
        .find(|&&v| v >= used)
    else {
        return 0;
    };
    let h = target - used;
    if h > 0 && atom.is_aromatic && has_unresolved_aromatic(mol, idx) {
        h - 1
    } else {
        h
    }
}

pub fn assign_implicit_hs(mol: &mut Mol<Atom, Bond>) {
    let counts: Vec<u8> = mol.atoms().map(|idx| implicit_h_count(mol, idx)).collect();
    for (idx, h) in counts.into_iter().enumerate() {
        mol.atom_mut(NodeIndex::new(idx)).implicit_h = h;
    }
}

/// Bracket atoms below their lowest fitting valence carry the difference
/// as unpaired electrons (`[CH3]` is a methyl radical).
pub fn assign_radicals(mol: &mut Mol<Atom, Bond>) {
    let updates: Vec<(NodeIndex, u8)> = mol
        .atoms()
        .filter(|&idx| mol.atom(idx).no_implicit)
        .filter_map(|idx| {
            let atom = mol.atom(idx);
            let used = total_valence(mol, idx);
            let allowed = allowed_valences(atom.atomic_num, atom.formal_charge);
            let target = allowed.iter().find(|&&v| v >= used)?;
            Some((idx, target - used))
        })
        .collect();
    for (idx, radicals) in updates {
        mol.atom_mut(idx).radical_electrons = radicals;
    }
}

/// Fails when an atom's total valence exceeds its largest allowed valence.
pub fn check_valence(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> Result<(), SanitizeError> {
    let atom = mol.atom(idx);
    let allowed = allowed_valences(atom.atomic_num, atom.formal_charge);
    let Some(&max) = allowed.iter().max() else {
        return Ok(());
    };
    let valence = total_valence(mol, idx);
    if valence > max {
        return Err(SanitizeError::Valence {
            atom: idx.index(),
            symbol: atom.symbol().to_string(),
            valence,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::{from_smiles, from_smiles_unsanitized};

    fn hs(smiles: &str) -> Vec<u8> {
        let mol = from_smiles(smiles).unwrap();
        mol.atoms().map(|i| mol.atom(i).total_h()).collect()
    }

    #[test]
    fn bare_atoms_fill_lowest_valence() {
        assert_eq!(hs("CCO"), vec![3, 2, 1]);
        assert_eq!(hs("C=O"), vec![2, 0]);
        assert_eq!(hs("CS(=O)(=O)C"), vec![3, 0, 0, 0, 3]);
        assert_eq!(hs("c1ccncc1"), vec![1, 1, 1, 0, 1, 1]);
    }

    #[test]
    fn charges_shift_valence() {
        assert_eq!(hs("C[N+](C)(C)C"), vec![3, 0, 3, 3, 3]);
        assert_eq!(hs("CC(=O)[O-]"), vec![3, 0, 0, 0]);
    }

    #[test]
    fn lenient_aromatic_hydrogens_before_kekulization() {
        let mol = from_smiles_unsanitized("c1ccccc1").unwrap();
        for idx in mol.atoms() {
            assert_eq!(implicit_h_count(&mol, idx), 1);
        }
    }

    #[test]
    fn pentavalent_carbon_is_rejected() {
        let mol = from_smiles_unsanitized("C(C)(C)(C)(C)C").unwrap();
        assert!(check_valence(&mol, NodeIndex::new(0)).is_err());
    }

    #[test]
    fn bracket_radicals() {
        let mol = from_smiles("[CH3]").unwrap();
        assert_eq!(mol.atom(NodeIndex::new(0)).radical_electrons, 1);
        let mol = from_smiles("[CH4]").unwrap();
        assert_eq!(mol.atom(NodeIndex::new(0)).radical_electrons, 0);
    }
}
