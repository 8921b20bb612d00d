use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::atom::Atom;
use crate::bond::Bond;

/// One slot of a tetrahedral stereo record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomId {
    Node(NodeIndex),
    /// The implicit hydrogen, or the lone pair of a three-coordinate center.
    Implicit,
}

/// Tetrahedral configuration around `center`.
///
/// Looking from `neighbors[0]` toward the center, `neighbors[1..]` run
/// anticlockwise; this is the SMILES `@` reading of the listed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TetrahedralStereo {
    pub center: NodeIndex,
    pub neighbors: [AtomId; 4],
}

impl TetrahedralStereo {
    /// True when `order` describes the same handedness as this record.
    /// `order` must hold the same four slots.
    pub fn is_ccw_for(&self, order: &[AtomId; 4]) -> bool {
        permutation_parity(&self.neighbors, order)
    }
}

pub struct Mol<A = Atom, B = Bond> {
    graph: UnGraph<A, B>,
    tetrahedral_stereo: Vec<TetrahedralStereo>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            tetrahedral_stereo: Vec::new(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    /// Removes a bond. Edge indices above `idx` may shift.
    pub fn remove_bond(&mut self, idx: EdgeIndex) -> Option<B> {
        self.graph.remove_edge(idx)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// The endpoint of `bond` that is not `atom`.
    pub fn other_atom(&self, bond: EdgeIndex, atom: NodeIndex) -> Option<NodeIndex> {
        let (a, b) = self.bond_endpoints(bond)?;
        if a == atom {
            Some(b)
        } else if b == atom {
            Some(a)
        } else {
            None
        }
    }

    pub fn tetrahedral_stereo(&self) -> &[TetrahedralStereo] {
        &self.tetrahedral_stereo
    }

    pub fn set_tetrahedral_stereo(&mut self, stereo: Vec<TetrahedralStereo>) {
        self.tetrahedral_stereo = stereo;
    }

    pub fn tetrahedral_stereo_for(&self, center: NodeIndex) -> Option<&TetrahedralStereo> {
        self.tetrahedral_stereo.iter().find(|s| s.center == center)
    }

    pub fn add_tetrahedral_stereo(&mut self, stereo: TetrahedralStereo) {
        self.remove_tetrahedral_stereo(stereo.center);
        self.tetrahedral_stereo.push(stereo);
    }

    pub fn remove_tetrahedral_stereo(&mut self, center: NodeIndex) {
        self.tetrahedral_stereo.retain(|s| s.center != center);
    }

    /// Connected components as lists of atoms, each in ascending index
    /// order. Components are ordered by their lowest atom.
    pub fn fragments(&self) -> Vec<Vec<NodeIndex>> {
        let n = self.atom_count();
        let mut seen = vec![false; n];
        let mut out = Vec::new();
        for start in self.atoms() {
            if seen[start.index()] {
                continue;
            }
            seen[start.index()] = true;
            let mut comp = vec![start];
            let mut queue = VecDeque::from([start]);
            while let Some(cur) = queue.pop_front() {
                for nb in self.neighbors(cur) {
                    if !seen[nb.index()] {
                        seen[nb.index()] = true;
                        comp.push(nb);
                        queue.push_back(nb);
                    }
                }
            }
            comp.sort();
            out.push(comp);
        }
        out
    }

    /// Converts atom and bond payloads while keeping indices and stereo.
    pub fn map<A2, B2>(
        &self,
        mut fa: impl FnMut(NodeIndex, &A) -> A2,
        mut fb: impl FnMut(EdgeIndex, &B) -> B2,
    ) -> Mol<A2, B2> {
        Mol {
            graph: self.graph.map(|i, a| fa(i, a), |e, b| fb(e, b)),
            tetrahedral_stereo: self.tetrahedral_stereo.clone(),
        }
    }
}

impl<A: Clone, B: Clone> Mol<A, B> {
    /// Builds a new molecule holding only atoms with `keep[i]` set.
    ///
    /// Returns the new molecule and the old-to-new index map. Stereo
    /// records survive only when their center and every neighbor survive.
    pub fn subgraph(&self, keep: &[bool]) -> (Mol<A, B>, Vec<Option<NodeIndex>>) {
        let mut out = Mol::new();
        let mut old_to_new = vec![None; self.atom_count()];
        for idx in self.atoms() {
            if keep.get(idx.index()).copied().unwrap_or(false) {
                old_to_new[idx.index()] = Some(out.add_atom(self.atom(idx).clone()));
            }
        }
        for e in self.bonds() {
            if let Some((a, b)) = self.bond_endpoints(e) {
                if let (Some(na), Some(nb)) = (old_to_new[a.index()], old_to_new[b.index()]) {
                    out.add_bond(na, nb, self.bond(e).clone());
                }
            }
        }
        for st in &self.tetrahedral_stereo {
            if let Some(remapped) = remap_stereo(st, &old_to_new) {
                out.tetrahedral_stereo.push(remapped);
            }
        }
        (out, old_to_new)
    }

    /// Removes the given atoms, renumbering the rest in their original
    /// order.
    pub fn remove_atoms(&mut self, remove: &[NodeIndex]) {
        let mut keep = vec![true; self.atom_count()];
        for idx in remove {
            if let Some(k) = keep.get_mut(idx.index()) {
                *k = false;
            }
        }
        let (out, _) = self.subgraph(&keep);
        *self = out;
    }

    /// One molecule per connected component.
    pub fn fragment_mols(&self) -> Vec<Mol<A, B>> {
        self.fragments()
            .into_iter()
            .map(|comp| {
                let mut keep = vec![false; self.atom_count()];
                for idx in comp {
                    keep[idx.index()] = true;
                }
                self.subgraph(&keep).0
            })
            .collect()
    }
}

pub(crate) fn remap_stereo(
    st: &TetrahedralStereo,
    old_to_new: &[Option<NodeIndex>],
) -> Option<TetrahedralStereo> {
    let center = old_to_new.get(st.center.index()).copied().flatten()?;
    let mut neighbors = [AtomId::Implicit; 4];
    for (slot, id) in neighbors.iter_mut().zip(st.neighbors.iter()) {
        *slot = match id {
            AtomId::Node(n) => AtomId::Node(old_to_new.get(n.index()).copied().flatten()?),
            AtomId::Implicit => AtomId::Implicit,
        };
    }
    Some(TetrahedralStereo { center, neighbors })
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            tetrahedral_stereo: self.tetrahedral_stereo.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        if self.atoms().any(|idx| self.atom(idx) != other.atom(idx)) {
            return false;
        }
        for idx in self.bonds() {
            if self.bond(idx) != other.bond(idx)
                || self.bond_endpoints(idx) != other.bond_endpoints(idx)
            {
                return false;
            }
        }
        self.tetrahedral_stereo == other.tetrahedral_stereo
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("tetrahedral_stereo", &self.tetrahedral_stereo)
            .finish()
    }
}

/// True when `to` is an even permutation of `from`.
pub(crate) fn permutation_parity<T: Eq>(from: &[T], to: &[T]) -> bool {
    let n = from.len();
    if n != to.len() {
        return true;
    }
    let perm: Vec<usize> = from
        .iter()
        .map(|f| to.iter().position(|t| t == f).unwrap_or(0))
        .collect();
    let mut visited = vec![false; n];
    let mut swaps = 0usize;
    for i in 0..n {
        if visited[i] {
            continue;
        }
        let mut cycle_len = 0;
        let mut j = i;
        while !visited[j] {
            visited[j] = true;
            j = perm[j];
            cycle_len += 1;
        }
        swaps += cycle_len - 1;
    }
    swaps % 2 == 0
}
