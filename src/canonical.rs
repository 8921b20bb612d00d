//! Canonical atom ranking.
//!
//! Atoms are first ordered by a local invariant, then the partition is
//! refined with neighbor ranks (Morgan) and tetrahedral parity until it
//! stops splitting. Remaining ties are broken by trying each tied atom as
//! the lowest of its class and keeping the trial whose full trace is
//! lexicographically smallest, so the result does not depend on input
//! atom numbering.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::{permutation_parity, AtomId, Mol, TetrahedralStereo};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct AtomInvariant {
    atomic_num: u8,
    degree: u8,
    total_h: u8,
    formal_charge: i8,
    is_aromatic: bool,
    isotope: u16,
    map_num: u16,
    radical_electrons: u8,
    aromatic_bonds: u8,
    singles: u8,
    doubles: u8,
    triples: u8,
}

fn atom_invariant(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> AtomInvariant {
    let atom = mol.atom(idx);
    let mut inv = AtomInvariant {
        atomic_num: atom.atomic_num,
        degree: mol.degree(idx) as u8,
        total_h: atom.total_h(),
        formal_charge: atom.formal_charge,
        is_aromatic: atom.is_aromatic,
        isotope: atom.isotope,
        map_num: atom.map_num,
        radical_electrons: atom.radical_electrons,
        aromatic_bonds: 0,
        singles: 0,
        doubles: 0,
        triples: 0,
    };
    for e in mol.bonds_of(idx) {
        match bond_class(mol.bond(e)) {
            1 => inv.singles += 1,
            2 => inv.doubles += 1,
            3 => inv.triples += 1,
            _ => inv.aromatic_bonds += 1,
        }
    }
    inv
}

fn bond_class(bond: &Bond) -> u8 {
    if bond.is_aromatic {
        return 4;
    }
    match bond.order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
    }
}

/// Rank of each key: the position of the first element of its class in
/// sorted order. Equal keys share a rank.
fn ranks_from_keys<K: Ord>(keys: &[K]) -> Vec<usize> {
    let n = keys.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let mut ranks = vec![0usize; n];
    for pos in 1..n {
        let (prev, cur) = (indices[pos - 1], indices[pos]);
        ranks[cur] = if keys[cur] == keys[prev] {
            ranks[prev]
        } else {
            pos
        };
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn neighbor_key(mol: &Mol<Atom, Bond>, idx: NodeIndex, ranks: &[usize]) -> Vec<(usize, u8)> {
    let mut key: Vec<(usize, u8)> = mol
        .bonds_of(idx)
        .filter_map(|e| {
            let other = mol.other_atom(e, idx)?;
            Some((ranks[other.index()], bond_class(mol.bond(e))))
        })
        .collect();
    key.sort_unstable();
    key
}

fn morgan_refine(mol: &Mol<Atom, Bond>, ranks: &mut Vec<usize>) {
    let mut distinct = count_distinct(ranks);
    loop {
        let keys: Vec<(usize, Vec<(usize, u8)>)> = mol
            .atoms()
            .map(|idx| (ranks[idx.index()], neighbor_key(mol, idx, ranks)))
            .collect();
        let refined = ranks_from_keys(&keys);
        let refined_distinct = count_distinct(&refined);
        if refined_distinct <= distinct {
            return;
        }
        *ranks = refined;
        distinct = refined_distinct;
    }
}

/// 1 or 2 for a center whose four slots have distinct ranks, 0 otherwise.
fn stereo_parity(stereo: &TetrahedralStereo, ranks: &[usize]) -> u8 {
    let n = ranks.len();
    let slot_ranks: [usize; 4] = std::array::from_fn(|i| match stereo.neighbors[i] {
        AtomId::Node(idx) => ranks.get(idx.index()).copied().unwrap_or(n),
        AtomId::Implicit => n,
    });
    let mut sorted = slot_ranks;
    sorted.sort_unstable();
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        return 0;
    }
    if permutation_parity(&slot_ranks, &sorted) {
        1
    } else {
        2
    }
}

fn chirality_refine(mol: &Mol<Atom, Bond>, ranks: &mut Vec<usize>) -> bool {
    if mol.tetrahedral_stereo().is_empty() {
        return false;
    }
    let mut parity = vec![0u8; ranks.len()];
    for st in mol.tetrahedral_stereo() {
        if let Some(p) = parity.get_mut(st.center.index()) {
            *p = stereo_parity(st, ranks);
        }
    }
    let keys: Vec<(usize, u8)> = ranks.iter().copied().zip(parity).collect();
    let refined = ranks_from_keys(&keys);
    if count_distinct(&refined) > count_distinct(ranks) {
        *ranks = refined;
        true
    } else {
        false
    }
}

fn refine_all(mol: &Mol<Atom, Bond>, ranks: &mut Vec<usize>) {
    morgan_refine(mol, ranks);
    while chirality_refine(mol, ranks) {
        morgan_refine(mol, ranks);
    }
}

type TraceEntry = (usize, AtomInvariant, Vec<(usize, u8)>, u8);

fn trace(mol: &Mol<Atom, Bond>, ranks: &[usize], invariants: &[AtomInvariant]) -> Vec<TraceEntry> {
    let mut entries: Vec<TraceEntry> = mol
        .atoms()
        .map(|idx| {
            let parity = mol
                .tetrahedral_stereo_for(idx)
                .map_or(0, |st| stereo_parity(st, ranks));
            (
                ranks[idx.index()],
                invariants[idx.index()].clone(),
                neighbor_key(mol, idx, ranks),
                parity,
            )
        })
        .collect();
    entries.sort();
    entries
}

/// Canonical rank of every atom, a permutation of `0..atom_count`.
pub fn canonical_ordering(mol: &Mol<Atom, Bond>) -> Vec<usize> {
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }

    let invariants: Vec<AtomInvariant> = mol.atoms().map(|idx| atom_invariant(mol, idx)).collect();
    let mut ranks = ranks_from_keys(&invariants);
    refine_all(mol, &mut ranks);

    while count_distinct(&ranks) < n {
        let Some(tied_rank) = lowest_tied_rank(&ranks) else {
            break;
        };
        let tied: Vec<usize> = (0..n).filter(|&i| ranks[i] == tied_rank).collect();

        let mut best: Option<(Vec<TraceEntry>, Vec<usize>)> = None;
        for &candidate in &tied {
            let mut trial = ranks.clone();
            for &other in &tied {
                if other != candidate {
                    trial[other] = tied_rank + 1;
                }
            }
            refine_all(mol, &mut trial);
            let t = trace(mol, &trial, &invariants);
            if best.as_ref().map_or(true, |(bt, _)| t < *bt) {
                best = Some((t, trial));
            }
        }
        match best {
            Some((_, trial)) => ranks = trial,
            None => break,
        }
    }

    ranks
}

fn lowest_tied_rank(ranks: &[usize]) -> Option<usize> {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).find(|w| w[0] == w[1]).map(|w| w[0])
}
