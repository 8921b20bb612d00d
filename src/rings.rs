//! Smallest set of smallest rings.
//!
//! Candidate cycles come from Horton's construction (shortest paths from
//! every atom to both ends of every bond); an independent set is then
//! picked greedily by size over GF(2) edge vectors.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
    bond_rings: Vec<Vec<EdgeIndex>>,
    atom_ring_count: Vec<usize>,
    bond_ring_count: Vec<usize>,
}

impl RingInfo {
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let num_expected = Self::expected_ring_count(mol);
        let rings = if num_expected == 0 {
            Vec::new()
        } else {
            let candidates = horton_candidates(mol);
            select_independent_rings(&candidates, num_expected, mol)
        };

        let mut atom_ring_count = vec![0; mol.atom_count()];
        let mut bond_ring_count = vec![0; mol.bond_count()];
        let mut bond_rings = Vec::with_capacity(rings.len());
        for ring in &rings {
            let edges = ring_edges(ring, mol);
            for &a in ring {
                atom_ring_count[a.index()] += 1;
            }
            for &e in &edges {
                bond_ring_count[e.index()] += 1;
            }
            bond_rings.push(edges);
        }

        Self {
            rings,
            bond_rings,
            atom_ring_count,
            bond_ring_count,
        }
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    /// Rings as atom cycles, smallest first.
    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    /// Rings as bond lists, parallel to [`RingInfo::rings`].
    pub fn bond_rings(&self) -> &[Vec<EdgeIndex>] {
        &self.bond_rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.num_atom_rings(atom) > 0
    }

    pub fn num_atom_rings(&self, atom: NodeIndex) -> usize {
        self.atom_ring_count.get(atom.index()).copied().unwrap_or(0)
    }

    pub fn is_ring_bond_index(&self, bond: EdgeIndex) -> bool {
        self.bond_ring_count.get(bond.index()).copied().unwrap_or(0) > 0
    }

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.rings.iter().any(|ring| {
            let len = ring.len();
            (0..len).any(|i| {
                let j = (i + 1) % len;
                (ring[i] == a && ring[j] == b) || (ring[i] == b && ring[j] == a)
            })
        })
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.rings
            .iter()
            .filter(|ring| ring.contains(&atom))
            .map(|ring| ring.len())
            .min()
    }

    pub fn atom_rings(&self, atom: NodeIndex) -> Vec<&Vec<NodeIndex>> {
        self.rings
            .iter()
            .filter(|ring| ring.contains(&atom))
            .collect()
    }

    /// Cyclomatic number: bonds - atoms + components.
    pub fn expected_ring_count<A, B>(mol: &Mol<A, B>) -> usize {
        let v = mol.atom_count();
        let e = mol.bond_count();
        let c = petgraph::algo::connected_components(mol.graph());
        (e + c).saturating_sub(v)
    }
}

fn ring_edges<A, B>(ring: &[NodeIndex], mol: &Mol<A, B>) -> Vec<EdgeIndex> {
    let len = ring.len();
    (0..len)
        .filter_map(|i| mol.bond_between(ring[i], ring[(i + 1) % len]))
        .collect()
}

fn horton_candidates<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let (dist, pred) = all_pairs_bfs(mol, n);

    let mut candidates: Vec<Vec<NodeIndex>> = Vec::new();
    for edge in mol.bonds() {
        let Some((u, v)) = mol.bond_endpoints(edge) else {
            continue;
        };
        for w in 0..n {
            let du = dist[w][u.index()];
            let dv = dist[w][v.index()];
            if du == u32::MAX || dv == u32::MAX || du.abs_diff(dv) > 1 {
                continue;
            }
            if du as usize + dv as usize + 1 < 3 {
                continue;
            }
            let path_u = reconstruct_path(&pred, w, u);
            let path_v = reconstruct_path(&pred, w, v);
            if path_u.is_empty() || path_v.is_empty() || paths_share_internal_node(&path_u, &path_v)
            {
                continue;
            }
            let mut ring = path_u;
            for &node in path_v[1..].iter().rev() {
                ring.push(node);
            }
            candidates.push(normalize_ring(&ring));
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

type BfsTables = (Vec<Vec<u32>>, Vec<Vec<Option<NodeIndex>>>);

fn all_pairs_bfs<A, B>(mol: &Mol<A, B>, n: usize) -> BfsTables {
    let mut dist = vec![vec![u32::MAX; n]; n];
    let mut pred = vec![vec![None; n]; n];
    for src in 0..n {
        dist[src][src] = 0;
        let mut queue = VecDeque::from([NodeIndex::new(src)]);
        while let Some(cur) = queue.pop_front() {
            let d = dist[src][cur.index()];
            for nb in mol.neighbors(cur) {
                if dist[src][nb.index()] == u32::MAX {
                    dist[src][nb.index()] = d + 1;
                    pred[src][nb.index()] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }
    }
    (dist, pred)
}

fn reconstruct_path(
    pred: &[Vec<Option<NodeIndex>>],
    src: usize,
    dst: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = vec![dst];
    let mut cur = dst;
    while cur.index() != src {
        match pred[src][cur.index()] {
            Some(p) => {
                path.push(p);
                cur = p;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

fn paths_share_internal_node(path_u: &[NodeIndex], path_v: &[NodeIndex]) -> bool {
    path_u[1..].iter().any(|node| path_v[1..].contains(node))
}

fn edge_bitvector<A, B>(ring: &[NodeIndex], mol: &Mol<A, B>) -> Vec<u64> {
    let mut bv = vec![0u64; mol.bond_count().div_ceil(64)];
    for e in ring_edges(ring, mol) {
        let idx = e.index();
        bv[idx / 64] |= 1u64 << (idx % 64);
    }
    bv
}

fn select_independent_rings<A, B>(
    candidates: &[Vec<NodeIndex>],
    num_needed: usize,
    mol: &Mol<A, B>,
) -> Vec<Vec<NodeIndex>> {
    let mut result = Vec::with_capacity(num_needed);
    let mut basis: Vec<Vec<u64>> = Vec::with_capacity(num_needed);

    for ring in candidates {
        if result.len() >= num_needed {
            break;
        }
        let bv = edge_bitvector(ring, mol);
        if bv.iter().all(|&w| w == 0) {
            continue;
        }
        if try_add_to_basis(&mut basis, bv) {
            result.push(ring.clone());
        }
    }
    result
}

/// Gaussian elimination over GF(2); basis rows are kept reduced so each
/// has a distinct pivot.
fn try_add_to_basis(basis: &mut Vec<Vec<u64>>, candidate: Vec<u64>) -> bool {
    let mut v = candidate;
    for row in basis.iter() {
        if let Some(p) = leading_bit(row) {
            if v[p / 64] & (1u64 << (p % 64)) != 0 {
                xor_into(&mut v, row);
            }
        }
    }
    let Some(pivot) = leading_bit(&v) else {
        return false;
    };
    for row in basis.iter_mut() {
        if row[pivot / 64] & (1u64 << (pivot % 64)) != 0 {
            xor_into(row, &v);
        }
    }
    basis.push(v);
    true
}

fn leading_bit(bv: &[u64]) -> Option<usize> {
    bv.iter()
        .enumerate()
        .find(|(_, &w)| w != 0)
        .map(|(i, &w)| i * 64 + w.trailing_zeros() as usize)
}

fn xor_into(a: &mut [u64], b: &[u64]) {
    for (aw, bw) in a.iter_mut().zip(b.iter()) {
        *aw ^= *bw;
    }
}

fn normalize_ring(ring: &[NodeIndex]) -> Vec<NodeIndex> {
    let Some(min_pos) = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, idx)| idx)
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };

    let len = ring.len();
    let mut normalized: Vec<NodeIndex> = (0..len).map(|i| ring[(min_pos + i) % len]).collect();
    if len > 2 && normalized[1] > normalized[len - 1] {
        normalized[1..].reverse();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn ring_sizes(smiles: &str) -> Vec<usize> {
        let mol = from_smiles(smiles).unwrap();
        let mut sizes: Vec<usize> = RingInfo::sssr(&mol).rings().iter().map(Vec::len).collect();
        sizes.sort();
        sizes
    }

    #[test]
    fn simple_rings() {
        assert_eq!(ring_sizes("C1CCCCC1"), vec![6]);
        assert_eq!(ring_sizes("C1CC1"), vec![3]);
        assert_eq!(ring_sizes("c1ccccc1"), vec![6]);
        assert!(ring_sizes("CCCC").is_empty());
    }

    #[test]
    fn fused_and_bridged() {
        assert_eq!(ring_sizes("c1ccc2ccccc2c1"), vec![6, 6]);
        assert_eq!(ring_sizes("c1ccc2cc3ccccc3cc2c1"), vec![6, 6, 6]);
        assert_eq!(ring_sizes("C1CC2CCC1C2"), vec![5, 5]);
        assert_eq!(ring_sizes("C1CCC2(CC1)CCC2"), vec![4, 6]);
    }

    #[test]
    fn cubane_has_five_rings() {
        assert_eq!(ring_sizes("C12C3C4C1C5C2C3C45"), vec![4, 4, 4, 4, 4]);
    }

    #[test]
    fn ring_membership_queries() {
        let mol = from_smiles("Cc1ccccc1").unwrap();
        let ri = RingInfo::sssr(&mol);
        let methyl = NodeIndex::new(0);
        let ipso = NodeIndex::new(1);
        assert!(!ri.is_ring_atom(methyl));
        assert!(ri.is_ring_atom(ipso));
        assert!(!ri.is_ring_bond(methyl, ipso));
        assert_eq!(ri.smallest_ring_size(ipso), Some(6));
        assert_eq!(ri.smallest_ring_size(methyl), None);
        let ring_bonds = mol.bonds().filter(|&e| ri.is_ring_bond_index(e)).count();
        assert_eq!(ring_bonds, 6);
    }

    #[test]
    fn fused_atoms_count_two_rings() {
        let mol = from_smiles("c1ccc2ccccc2c1").unwrap();
        let ri = RingInfo::sssr(&mol);
        let shared = mol.atoms().filter(|&a| ri.num_atom_rings(a) == 2).count();
        assert_eq!(shared, 2);
    }
}
