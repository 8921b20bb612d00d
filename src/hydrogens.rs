//! Conversion between hydrogens counted on atoms and hydrogens as graph
//! nodes.

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::{AtomId, Mol};
use crate::smiles::fold_explicit_hydrogens;

/// Returns a copy of `mol` where every attached hydrogen is its own atom.
///
/// Existing atoms keep their indices; the new hydrogens are appended. A
/// stereocenter's implicit-hydrogen slot is pointed at its first new
/// hydrogen.
pub fn add_hs(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let mut result = mol.clone();
    let heavy: Vec<_> = mol.atoms().collect();
    let mut first_h = vec![None; mol.atom_count()];

    for idx in heavy {
        let count = mol.atom(idx).total_h();
        if count == 0 {
            continue;
        }
        {
            let atom = result.atom_mut(idx);
            atom.explicit_h = 0;
            atom.implicit_h = 0;
        }
        for _ in 0..count {
            let h = result.add_atom(Atom {
                no_implicit: true,
                ..Atom::new(1)
            });
            result.add_bond(idx, h, Bond::single());
            first_h[idx.index()].get_or_insert(h);
        }
    }

    let stereo = mol
        .tetrahedral_stereo()
        .iter()
        .map(|st| {
            let mut st = *st;
            if let Some(h) = first_h[st.center.index()] {
                for slot in &mut st.neighbors {
                    if *slot == AtomId::Implicit {
                        *slot = AtomId::Node(h);
                    }
                }
            }
            st
        })
        .collect();
    result.set_tetrahedral_stereo(stereo);
    result
}

/// Returns a copy of `mol` with plain hydrogen atoms folded back into their
/// neighbor's hydrogen count.
///
/// Hydrogens carrying an isotope, charge or atom map, hydrogens bonded to
/// hydrogen and bridging hydrogens stay in the graph.
pub fn remove_hs(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let mut result = mol.clone();
    fold_explicit_hydrogens(&mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::{from_smiles, to_smiles};
    use petgraph::graph::NodeIndex;

    fn mol(s: &str) -> Mol<Atom, Bond> {
        from_smiles(s).unwrap_or_else(|e| panic!("bad SMILES {s:?}: {e}"))
    }

    fn h_nodes(m: &Mol<Atom, Bond>) -> usize {
        m.atoms().filter(|&i| m.atom(i).atomic_num == 1).count()
    }

    #[test]
    fn add_hs_methane() {
        let m = add_hs(&mol("C"));
        assert_eq!(m.atom_count(), 5);
        assert_eq!(m.bond_count(), 4);
        assert_eq!(m.atom(NodeIndex::new(0)).total_h(), 0);
        assert_eq!(m.degree(NodeIndex::new(0)), 4);
    }

    #[test]
    fn add_hs_counts() {
        assert_eq!(h_nodes(&add_hs(&mol("CC"))), 6);
        assert_eq!(h_nodes(&add_hs(&mol("O"))), 2);
        assert_eq!(h_nodes(&add_hs(&mol("c1ccccc1"))), 6);
        assert_eq!(h_nodes(&add_hs(&mol("[Fe+2]"))), 0);
    }

    #[test]
    fn add_hs_keeps_heavy_atom_indices() {
        let m = add_hs(&mol("CCO"));
        assert_eq!(m.atom(NodeIndex::new(0)).atomic_num, 6);
        assert_eq!(m.atom(NodeIndex::new(2)).atomic_num, 8);
        assert!(m.bond_between(NodeIndex::new(1), NodeIndex::new(2)).is_some());
    }

    #[test]
    fn add_hs_points_stereo_at_new_hydrogen() {
        let m = add_hs(&mol("F[C@H](Cl)Br"));
        let st = m.tetrahedral_stereo_for(NodeIndex::new(1)).unwrap();
        assert!(!st.neighbors.contains(&AtomId::Implicit));
        let h = st.neighbors[1];
        match h {
            AtomId::Node(idx) => assert_eq!(m.atom(idx).atomic_num, 1),
            AtomId::Implicit => panic!("implicit slot left behind"),
        }
    }

    #[test]
    fn round_trip() {
        for smi in ["CCO", "c1ccccc1O", "F[C@H](Cl)Br", "C[C@](F)(Cl)Br", "[NH4+]"] {
            let m = mol(smi);
            let back = remove_hs(&add_hs(&m));
            assert_eq!(to_smiles(&back), to_smiles(&m), "{smi}");
        }
    }

    #[test]
    fn remove_hs_keeps_labelled_hydrogens() {
        assert_eq!(h_nodes(&remove_hs(&mol("[2H]C"))), 1);
        assert_eq!(h_nodes(&remove_hs(&mol("[H+]"))), 1);
        assert_eq!(h_nodes(&remove_hs(&mol("[H][H]"))), 2);
    }

    #[test]
    fn empty_molecule() {
        let empty = Mol::<Atom, Bond>::new();
        assert_eq!(add_hs(&empty).atom_count(), 0);
        assert_eq!(remove_hs(&empty).atom_count(), 0);
    }
}
