//! Kekulization assigns alternating single and double bonds to aromatic
//! systems.
//!
//! Unresolved `BondOrder::Aromatic` bonds (from lowercase SMILES atoms or
//! `:` bonds) are replaced with `Single` or `Double` so that every aromatic
//! atom that needs a double bond receives exactly one. The assignment is a
//! maximum matching, found with augmenting paths and, if that gets stuck on
//! an odd cycle, an exhaustive search over the remaining atoms.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::allowed_valences;
use crate::mol::Mol;

const MAX_SEARCH_STEPS: usize = 200_000;

/// No valid Kekulé structure exists; lists the atoms left without a
/// double bond.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot kekulize aromatic system: unmatched atoms {atoms:?}")]
pub struct KekulizeError {
    pub atoms: Vec<usize>,
}

/// Resolves every aromatic bond order in place. Aromatic flags are left
/// untouched.
pub fn kekulize(mol: &mut Mol<Atom, Bond>) -> Result<(), KekulizeError> {
    let n = mol.atom_count();
    let mut adj: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![Vec::new(); n];
    let mut aromatic_edges = Vec::new();
    for e in mol.bonds() {
        if mol.bond(e).order != BondOrder::Aromatic {
            continue;
        }
        if let Some((a, b)) = mol.bond_endpoints(e) {
            adj[a.index()].push((b, e));
            adj[b.index()].push((a, e));
            aromatic_edges.push(e);
        }
    }
    if aromatic_edges.is_empty() {
        return Ok(());
    }

    let needs: Vec<bool> = (0..n)
        .map(|i| !adj[i].is_empty() && needs_double(mol, NodeIndex::new(i)))
        .collect();

    let mut matched: Vec<Option<EdgeIndex>> = vec![None; n];
    for start in 0..n {
        if needs[start] && matched[start].is_none() {
            augment(mol, &adj, &needs, &mut matched, NodeIndex::new(start));
        }
    }

    let unmatched: Vec<usize> = (0..n)
        .filter(|&i| needs[i] && matched[i].is_none())
        .collect();
    if !unmatched.is_empty() {
        let mut solved = vec![None; n];
        let mut steps = 0;
        if !exhaustive(mol, &adj, &needs, &mut solved, &mut steps) {
            return Err(KekulizeError { atoms: unmatched });
        }
        matched = solved;
    }

    for e in aromatic_edges {
        let double = mol
            .bond_endpoints(e)
            .is_some_and(|(a, _)| matched[a.index()] == Some(e));
        mol.bond_mut(e).order = if double {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
    }
    Ok(())
}

/// Whether an atom on unresolved aromatic bonds must take one of them as
/// a double bond.
fn needs_double(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
    let atom = mol.atom(idx);
    if atom.is_dummy() {
        return false;
    }
    let has_multiple = mol
        .bonds_of(idx)
        .any(|e| matches!(mol.bond(e).order, BondOrder::Double | BondOrder::Triple));
    if has_multiple {
        return false;
    }
    let used: u8 = mol
        .bonds_of(idx)
        .map(|e| mol.bond(e).order.valence_contrib())
        .sum::<u8>()
        + atom.explicit_h
        + atom.radical_electrons;
    allowed_valences(atom.atomic_num, atom.formal_charge)
        .iter()
        .find(|&&v| v >= used)
        .is_some_and(|&target| target > used)
}

fn augment(
    mol: &Mol<Atom, Bond>,
    adj: &[Vec<(NodeIndex, EdgeIndex)>],
    needs: &[bool],
    matched: &mut [Option<EdgeIndex>],
    start: NodeIndex,
) -> bool {
    let n = adj.len();
    let mut prev: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::from([start]);
    visited[start.index()] = true;

    while let Some(u) = queue.pop_front() {
        for &(v, e) in &adj[u.index()] {
            if !needs[v.index()] || visited[v.index()] || matched[u.index()] == Some(e) {
                continue;
            }
            visited[v.index()] = true;
            prev[v.index()] = Some((u, e));

            let Some(matched_e) = matched[v.index()] else {
                flip_path(matched, &prev, start, v);
                return true;
            };
            let Some(w) = mol.other_atom(matched_e, v) else {
                continue;
            };
            if !visited[w.index()] {
                visited[w.index()] = true;
                prev[w.index()] = Some((v, matched_e));
                queue.push_back(w);
            }
        }
    }
    false
}

fn flip_path(
    matched: &mut [Option<EdgeIndex>],
    prev: &[Option<(NodeIndex, EdgeIndex)>],
    start: NodeIndex,
    end: NodeIndex,
) {
    let mut cur = end;
    let mut is_new_match = true;
    while cur != start {
        let Some((p, e)) = prev[cur.index()] else {
            return;
        };
        if is_new_match {
            matched[cur.index()] = Some(e);
            matched[p.index()] = Some(e);
        }
        is_new_match = !is_new_match;
        cur = p;
    }
}

/// Backtracking perfect matching over the atoms that need a double bond,
/// always branching on the atom with the fewest free partners.
fn exhaustive(
    mol: &Mol<Atom, Bond>,
    adj: &[Vec<(NodeIndex, EdgeIndex)>],
    needs: &[bool],
    matched: &mut Vec<Option<EdgeIndex>>,
    steps: &mut usize,
) -> bool {
    *steps += 1;
    if *steps > MAX_SEARCH_STEPS {
        return false;
    }

    let mut best: Option<(usize, Vec<(NodeIndex, EdgeIndex)>)> = None;
    for i in 0..adj.len() {
        if !needs[i] || matched[i].is_some() {
            continue;
        }
        let options: Vec<(NodeIndex, EdgeIndex)> = adj[i]
            .iter()
            .copied()
            .filter(|&(v, _)| needs[v.index()] && matched[v.index()].is_none())
            .collect();
        if options.is_empty() {
            return false;
        }
        if best.as_ref().map_or(true, |(_, b)| options.len() < b.len()) {
            best = Some((i, options));
        }
    }
    let Some((atom, options)) = best else {
        return true;
    };

    for (partner, e) in options {
        matched[atom] = Some(e);
        matched[partner.index()] = Some(e);
        if exhaustive(mol, adj, needs, matched, steps) {
            return true;
        }
        matched[atom] = None;
        matched[partner.index()] = None;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles_unsanitized;

    fn kekulized(smiles: &str) -> Mol<Atom, Bond> {
        let mut mol = from_smiles_unsanitized(smiles).unwrap();
        kekulize(&mut mol).unwrap();
        mol
    }

    fn count_double(mol: &Mol<Atom, Bond>) -> usize {
        mol.bonds()
            .filter(|&e| mol.bond(e).order == BondOrder::Double)
            .count()
    }

    fn at_most_one_double_each(mol: &Mol<Atom, Bond>) -> bool {
        mol.atoms().all(|a| {
            mol.bonds_of(a)
                .filter(|&e| mol.bond(e).order == BondOrder::Double)
                .count()
                <= 1
        })
    }

    #[test]
    fn benzene() {
        let mol = kekulized("c1ccccc1");
        assert_eq!(count_double(&mol), 3);
        assert!(at_most_one_double_each(&mol));
        assert!(mol.bonds().all(|e| mol.bond(e).order != BondOrder::Aromatic));
    }

    #[test]
    fn fused_systems() {
        assert_eq!(count_double(&kekulized("c1ccc2ccccc2c1")), 5);
        assert_eq!(count_double(&kekulized("c1ccc2cc3ccccc3cc2c1")), 7);
        assert_eq!(count_double(&kekulized("c1ccc2[nH]ccc2c1")), 4);
    }

    #[test]
    fn heteroaromatics() {
        assert_eq!(count_double(&kekulized("c1ccncc1")), 3);
        assert_eq!(count_double(&kekulized("c1ccoc1")), 2);
        assert_eq!(count_double(&kekulized("Cn1cccc1")), 2);
        assert_eq!(count_double(&kekulized("O=c1cc[nH]cc1")), 3);
    }

    #[test]
    fn pyrrole_without_hydrogen_fails() {
        let mut mol = from_smiles_unsanitized("c1ccnc1").unwrap();
        let err = kekulize(&mut mol).unwrap_err();
        assert!(!err.atoms.is_empty());
    }

    #[test]
    fn odd_carbocycle_fails() {
        let mut mol = from_smiles_unsanitized("c1cccc1").unwrap();
        assert!(kekulize(&mut mol).is_err());
    }
}
