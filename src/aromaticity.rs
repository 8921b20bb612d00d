//! Hückel aromaticity perception over the SSSR.
//!
//! Each atom donates a fixed number of pi electrons based on its element,
//! charge and bonding. A ring whose donations sum to 4n+2 is aromatic. Pairs
//! of fused rings that fail on their own are retried as one system, which
//! picks up azulene-like cores.

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;

const PI_CAPABLE: [u8; 9] = [
    5,  // B
    6,  // C
    7,  // N
    8,  // O
    15, // P
    16, // S
    33, // As
    34, // Se
    52, // Te
];

const ELECTRONEGATIVE: [u8; 4] = [7, 8, 16, 34];

/// Resets every atom and bond aromatic flag.
pub fn clear_aromaticity(mol: &mut Mol<Atom, Bond>) {
    let atoms: Vec<_> = mol.atoms().collect();
    for idx in atoms {
        mol.atom_mut(idx).is_aromatic = false;
    }
    let bonds: Vec<_> = mol.bonds().collect();
    for e in bonds {
        mol.bond_mut(e).is_aromatic = false;
    }
}

/// Recomputes aromatic flags from the Kekulé bond orders.
///
/// Expects implicit hydrogens to be assigned already.
pub fn set_aromaticity(mol: &mut Mol<Atom, Bond>) {
    clear_aromaticity(mol);
    let ring_info = RingInfo::sssr(mol);
    let (atoms, bonds) = find_aromatic(mol, &ring_info);
    for idx in atoms {
        mol.atom_mut(idx).is_aromatic = true;
    }
    for e in bonds {
        mol.bond_mut(e).is_aromatic = true;
    }
}

/// Aromatic atoms and bonds, without modifying the molecule.
pub fn find_aromatic(
    mol: &Mol<Atom, Bond>,
    ring_info: &RingInfo,
) -> (Vec<NodeIndex>, Vec<EdgeIndex>) {
    let electrons: Vec<Option<u8>> = mol
        .atoms()
        .map(|idx| pi_electrons(mol, idx, ring_info))
        .collect();

    let rings = ring_info.rings();
    let bond_rings = ring_info.bond_rings();
    let mut ring_aromatic = vec![false; rings.len()];
    for (i, ring) in rings.iter().enumerate() {
        ring_aromatic[i] = is_huckel_system(ring.iter().copied(), &electrons);
    }

    let mut fused_systems: Vec<(usize, usize)> = Vec::new();
    for i in 0..rings.len() {
        for j in (i + 1)..rings.len() {
            if ring_aromatic[i] || ring_aromatic[j] {
                continue;
            }
            let shares_bond = bond_rings[i].iter().any(|e| bond_rings[j].contains(e));
            if !shares_bond {
                continue;
            }
            let mut union: Vec<NodeIndex> = rings[i].clone();
            for &a in &rings[j] {
                if !union.contains(&a) {
                    union.push(a);
                }
            }
            if is_huckel_system(union.into_iter(), &electrons) {
                fused_systems.push((i, j));
            }
        }
    }

    let mut atom_flags = vec![false; mol.atom_count()];
    let mut bond_flags = vec![false; mol.bond_count()];
    let mut mark = |ring: usize| {
        for &a in &rings[ring] {
            atom_flags[a.index()] = true;
        }
        for &e in &bond_rings[ring] {
            bond_flags[e.index()] = true;
        }
    };
    for (i, &aromatic) in ring_aromatic.iter().enumerate() {
        if aromatic {
            mark(i);
        }
    }
    for (i, j) in fused_systems {
        mark(i);
        mark(j);
    }

    let atoms = atom_flags
        .iter()
        .enumerate()
        .filter(|(_, &f)| f)
        .map(|(i, _)| NodeIndex::new(i))
        .collect();
    let bonds = bond_flags
        .iter()
        .enumerate()
        .filter(|(_, &f)| f)
        .map(|(i, _)| EdgeIndex::new(i))
        .collect();
    (atoms, bonds)
}

fn is_huckel_system(atoms: impl Iterator<Item = NodeIndex>, electrons: &[Option<u8>]) -> bool {
    let mut total: u32 = 0;
    for a in atoms {
        match electrons[a.index()] {
            Some(e) => total += u32::from(e),
            None => return false,
        }
    }
    is_huckel(total)
}

fn is_huckel(pi: u32) -> bool {
    pi >= 2 && (pi - 2) % 4 == 0
}

/// Pi electrons an atom donates to any ring it sits in, or `None` when it
/// cannot take part in an aromatic system.
fn pi_electrons(mol: &Mol<Atom, Bond>, idx: NodeIndex, ring_info: &RingInfo) -> Option<u8> {
    let atom = mol.atom(idx);
    if !ring_info.is_ring_atom(idx) || !PI_CAPABLE.contains(&atom.atomic_num) {
        return None;
    }
    let connections = mol.degree(idx) + atom.total_h() as usize;
    if connections > 3 {
        return None;
    }

    let mut double = None;
    for e in mol.bonds_of(idx) {
        match mol.bond(e).order {
            BondOrder::Triple => return None,
            BondOrder::Double if double.is_some() => return None,
            BondOrder::Double => double = Some(e),
            _ => {}
        }
    }

    if let Some(e) = double {
        if ring_info.is_ring_bond_index(e) {
            return Some(1);
        }
        let other = mol.other_atom(e, idx)?;
        let partner = mol.atom(other).atomic_num;
        return (partner != atom.atomic_num && ELECTRONEGATIVE.contains(&partner)).then_some(0);
    }

    match (atom.atomic_num, atom.formal_charge) {
        (6, -1) => Some(2),
        (6, 1) => Some(0),
        (7 | 15 | 33, 0) if connections == 3 => Some(2),
        (7 | 15 | 33, -1) if connections == 2 => Some(2),
        (8 | 16 | 34 | 52, 0) if connections == 2 => Some(2),
        (5, 0) if connections == 3 => Some(0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn aromatic_atoms(smiles: &str) -> usize {
        let mol = from_smiles(smiles).unwrap();
        mol.atoms().filter(|&a| mol.atom(a).is_aromatic).count()
    }

    fn aromatic_bonds(smiles: &str) -> usize {
        let mol = from_smiles(smiles).unwrap();
        mol.bonds().filter(|&e| mol.bond(e).is_aromatic).count()
    }

    #[test]
    fn kekule_benzene_is_aromatic() {
        assert_eq!(aromatic_atoms("C1=CC=CC=C1"), 6);
        assert_eq!(aromatic_bonds("C1=CC=CC=C1"), 6);
    }

    #[test]
    fn heterocycles() {
        assert_eq!(aromatic_atoms("c1ccncc1"), 6);
        assert_eq!(aromatic_atoms("c1cc[nH]c1"), 5);
        assert_eq!(aromatic_atoms("c1ccoc1"), 5);
        assert_eq!(aromatic_atoms("c1ccsc1"), 5);
        assert_eq!(aromatic_atoms("O=c1cc[nH]cc1"), 6);
    }

    #[test]
    fn non_aromatic_rings() {
        assert_eq!(aromatic_atoms("C1=CCC=C1"), 0);
        assert_eq!(aromatic_atoms("C1CCCCC1"), 0);
        assert_eq!(aromatic_atoms("O=C1C=CC(=O)C=C1"), 0);
        assert_eq!(aromatic_atoms("C1=CC=CC=CC=C1"), 0);
    }

    #[test]
    fn fused_systems() {
        assert_eq!(aromatic_atoms("c1ccc2ccccc2c1"), 10);
        assert_eq!(aromatic_bonds("c1ccc2ccccc2c1"), 11);
        assert_eq!(aromatic_atoms("c1ccc2[nH]ccc2c1"), 9);
        assert_eq!(aromatic_atoms("C1=CC2=CC=CC=CC2=C1"), 10);
    }

    #[test]
    fn substituents_stay_aliphatic() {
        let mol = from_smiles("Cc1ccccc1").unwrap();
        assert!(!mol.atom(NodeIndex::new(0)).is_aromatic);
        assert_eq!(mol.bonds().filter(|&e| mol.bond(e).is_aromatic).count(), 6);
    }
}
