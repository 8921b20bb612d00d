//! Atom and bond counts, weights and pattern-based counts.

use lazy_static::lazy_static;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::smarts::{count_matches, AtomExpr, BondExpr};

use super::pattern;

lazy_static! {
    static ref HBA: Mol<AtomExpr, BondExpr> = pattern(concat!(
        "[$([O,S;H1;v2;!$(*-*=[O,N,P,S])]),$([O,S;H0;v2]),$([O,S;-]),",
        "$([N;v3;!$(N-*=[O,N,P,S])]),n&H0&+0,$([o,s;+0;!$([o,s]:n);!$([o,s]:c:n)])]"
    ));
    static ref HBD: Mol<AtomExpr, BondExpr> =
        pattern("[N&!H0&v3,N&!H0&+1&v4,O&H1&+0,S&H1&+0,n&H1&+0]");
    static ref ROTATABLE: Mol<AtomExpr, BondExpr> = pattern(
        "[!$([NH]!@C(=O))&!D1&!$(*#*)]-&!@[!$([NH]!@C(=O))&!D1&!$(*#*)]"
    );
}

/// Hydrogens on `idx`, attached ones and hydrogen neighbors in the graph.
pub(crate) fn total_hs(mol: &Mol<Atom, Bond>, idx: petgraph::graph::NodeIndex) -> usize {
    let graph_hs = mol
        .neighbors(idx)
        .filter(|&n| mol.atom(n).atomic_num == 1)
        .count();
    mol.atom(idx).total_h() as usize + graph_hs
}

/// Average molecular weight, hydrogens included.
pub fn mw(mol: &Mol<Atom, Bond>) -> f64 {
    mol.atoms().map(|i| mol.atom(i).mass_with_h()).sum()
}

/// Fraction of carbons that are sp3.
pub fn fsp3(mol: &Mol<Atom, Bond>) -> f64 {
    let carbons: Vec<_> = mol
        .atoms()
        .filter(|&i| mol.atom(i).atomic_num == 6)
        .collect();
    if carbons.is_empty() {
        return 0.0;
    }
    let sp3 = carbons
        .iter()
        .filter(|&&i| {
            !mol.atom(i).is_aromatic
                && mol.bonds_of(i).all(|e| {
                    let bond = mol.bond(e);
                    bond.order == BondOrder::Single && !bond.is_aromatic
                })
        })
        .count();
    sp3 as f64 / carbons.len() as f64
}

/// Hydrogen-bond acceptors by pattern.
pub fn n_hba(mol: &Mol<Atom, Bond>) -> usize {
    count_matches(mol, &HBA)
}

/// Hydrogen-bond donors by pattern.
pub fn n_hbd(mol: &Mol<Atom, Bond>) -> usize {
    count_matches(mol, &HBD)
}

/// Nitrogen and oxygen atoms.
pub fn n_lipinski_hba(mol: &Mol<Atom, Bond>) -> usize {
    mol.atoms()
        .filter(|&i| matches!(mol.atom(i).atomic_num, 7 | 8))
        .count()
}

/// Hydrogens on nitrogen and oxygen.
pub fn n_lipinski_hbd(mol: &Mol<Atom, Bond>) -> usize {
    mol.atoms()
        .filter(|&i| matches!(mol.atom(i).atomic_num, 7 | 8))
        .map(|i| total_hs(mol, i))
        .sum()
}

pub fn n_no(mol: &Mol<Atom, Bond>) -> usize {
    n_lipinski_hba(mol)
}

pub fn n_nhoh(mol: &Mol<Atom, Bond>) -> usize {
    n_lipinski_hbd(mol)
}

/// Atoms other than carbon and hydrogen.
pub fn n_hetero_atoms(mol: &Mol<Atom, Bond>) -> usize {
    mol.atoms()
        .filter(|&i| !matches!(mol.atom(i).atomic_num, 1 | 6))
        .count()
}

pub fn n_heavy_atoms(mol: &Mol<Atom, Bond>) -> usize {
    mol.atoms().filter(|&i| mol.atom(i).atomic_num > 1).count()
}

/// Non-ring single bonds between non-terminal atoms, excluding triple-bond
/// ends and amide C-N bonds.
pub fn n_rotatable_bonds(mol: &Mol<Atom, Bond>) -> usize {
    count_matches(mol, &ROTATABLE)
}

pub fn n_radical_electrons(mol: &Mol<Atom, Bond>) -> usize {
    mol.atoms()
        .map(|i| mol.atom(i).radical_electrons as usize)
        .sum()
}

pub fn n_aromatic_atoms(mol: &Mol<Atom, Bond>) -> usize {
    mol.atoms().filter(|&i| mol.atom(i).is_aromatic).count()
}

/// Aromatic atoms over heavy atoms; zero for a molecule with no heavy
/// atoms.
pub fn n_aromatic_atoms_proportion(mol: &Mol<Atom, Bond>) -> f64 {
    let heavy = n_heavy_atoms(mol);
    if heavy == 0 {
        return 0.0;
    }
    n_aromatic_atoms(mol) as f64 / heavy as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn mol(s: &str) -> Mol<Atom, Bond> {
        from_smiles(s).unwrap()
    }

    const ASPIRIN: &str = "CC(=O)Oc1ccccc1C(=O)O";

    #[test]
    fn molecular_weight() {
        assert!((mw(&mol("O")) - 18.015).abs() < 1e-2);
        assert!((mw(&mol("CCO")) - 46.069).abs() < 1e-2);
        assert!((mw(&mol(ASPIRIN)) - 180.159).abs() < 1e-2);
    }

    #[test]
    fn fraction_sp3() {
        assert_eq!(fsp3(&mol("CCO")), 1.0);
        assert_eq!(fsp3(&mol("c1ccccc1")), 0.0);
        assert!((fsp3(&mol("Cc1ccccc1")) - 1.0 / 7.0).abs() < 1e-9);
        assert_eq!(fsp3(&mol("O")), 0.0);
    }

    #[test]
    fn donors_and_acceptors() {
        let aspirin = mol(ASPIRIN);
        assert_eq!(n_hba(&aspirin), 3);
        assert_eq!(n_hbd(&aspirin), 1);
        assert_eq!(n_lipinski_hba(&aspirin), 4);
        assert_eq!(n_lipinski_hbd(&aspirin), 1);

        let ethanolamine = mol("NCCO");
        assert_eq!(n_hbd(&ethanolamine), 2);
        assert_eq!(n_nhoh(&ethanolamine), 3);
        assert_eq!(n_no(&ethanolamine), 2);

        assert_eq!(n_hba(&mol("c1ccncc1")), 1);
        assert_eq!(n_hbd(&mol("c1cc[nH]c1")), 1);
    }

    #[test]
    fn atom_counts() {
        let aspirin = mol(ASPIRIN);
        assert_eq!(n_heavy_atoms(&aspirin), 13);
        assert_eq!(n_hetero_atoms(&aspirin), 4);
        assert_eq!(n_aromatic_atoms(&aspirin), 6);
        assert!((n_aromatic_atoms_proportion(&aspirin) - 6.0 / 13.0).abs() < 1e-9);
        assert_eq!(n_radical_electrons(&mol("[CH3]")), 1);
        assert_eq!(n_radical_electrons(&aspirin), 0);
    }

    #[test]
    fn rotatable_bonds() {
        assert_eq!(n_rotatable_bonds(&mol("CCCC")), 1);
        assert_eq!(n_rotatable_bonds(&mol("CC")), 0);
        assert_eq!(n_rotatable_bonds(&mol("C1CCCCC1")), 0);
        assert_eq!(n_rotatable_bonds(&mol("CC#CC")), 0);
        assert_eq!(n_rotatable_bonds(&mol("CNC(C)=O")), 0);
        assert_eq!(n_rotatable_bonds(&mol("CCCNC(C)=O")), 1);
        assert_eq!(n_rotatable_bonds(&mol(ASPIRIN)), 3);
    }
}
