//! VF2-style subgraph matching over arbitrary atom and bond payloads.
//!
//! Callers supply the atom and bond tests as closures over indices, so the
//! same search serves SMARTS queries, reaction templates and
//! molecule-as-query lookups.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// `(query atom, target atom)` pairs, ordered by query atom index.
pub type AtomMapping = Vec<(NodeIndex, NodeIndex)>;

pub fn get_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> Option<AtomMapping> {
    Vf2::new(target, query, atom_match, bond_match, |_: &AtomMapping| true)
        .run(1)
        .into_iter()
        .next()
}

pub fn get_substruct_matches_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
) -> Vec<AtomMapping> {
    Vf2::new(target, query, atom_match, bond_match, |_: &AtomMapping| true).run(usize::MAX)
}

/// Like [`get_substruct_matches_with`], keeping only complete mappings
/// accepted by `filter`.
pub fn get_substruct_matches_with_filter<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, NodeIndex) -> bool,
    bond_match: impl Fn(EdgeIndex, EdgeIndex) -> bool,
    filter: impl Fn(&AtomMapping) -> bool,
    max_matches: usize,
) -> Vec<AtomMapping> {
    Vf2::new(target, query, atom_match, bond_match, filter).run(max_matches)
}

/// Drops mappings that cover the same set of target atoms as an earlier
/// one.
pub fn uniquify(matches: Vec<AtomMapping>) -> Vec<AtomMapping> {
    let mut seen: Vec<Vec<NodeIndex>> = Vec::new();
    let mut out = Vec::new();
    for m in matches {
        let mut key: Vec<NodeIndex> = m.iter().map(|&(_, t)| t).collect();
        key.sort();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(m);
        }
    }
    out
}

struct Vf2<'a, A1, B1, A2, B2, FA, FB, FF> {
    target: &'a Mol<A1, B1>,
    query: &'a Mol<A2, B2>,
    atom_match: FA,
    bond_match: FB,
    filter: FF,
    query_order: Vec<NodeIndex>,
    /// For each position in `query_order`, an earlier query atom bonded to
    /// it, if any.
    anchors: Vec<Option<NodeIndex>>,
    query_map: Vec<Option<NodeIndex>>,
    target_used: Vec<bool>,
}

impl<'a, A1, B1, A2, B2, FA, FB, FF> Vf2<'a, A1, B1, A2, B2, FA, FB, FF>
where
    FA: Fn(NodeIndex, NodeIndex) -> bool,
    FB: Fn(EdgeIndex, EdgeIndex) -> bool,
    FF: Fn(&AtomMapping) -> bool,
{
    fn new(
        target: &'a Mol<A1, B1>,
        query: &'a Mol<A2, B2>,
        atom_match: FA,
        bond_match: FB,
        filter: FF,
    ) -> Self {
        let (query_order, anchors) = search_order(query);
        Self {
            target,
            query,
            atom_match,
            bond_match,
            filter,
            query_order,
            anchors,
            query_map: vec![None; query.atom_count()],
            target_used: vec![false; target.atom_count()],
        }
    }

    fn run(&mut self, max_matches: usize) -> Vec<AtomMapping> {
        let mut results = Vec::new();
        if max_matches > 0 && self.query.atom_count() <= self.target.atom_count() {
            self.recurse(0, &mut results, max_matches);
        }
        results
    }

    fn recurse(&mut self, depth: usize, results: &mut Vec<AtomMapping>, max_matches: usize) {
        if depth == self.query_order.len() {
            let mapping: AtomMapping = self
                .query_map
                .iter()
                .enumerate()
                .filter_map(|(q, t)| t.map(|t| (NodeIndex::new(q), t)))
                .collect();
            if (self.filter)(&mapping) {
                results.push(mapping);
            }
            return;
        }

        let query_node = self.query_order[depth];
        let candidates: Vec<NodeIndex> = match self.anchors[depth] {
            Some(anchor) => match self.query_map[anchor.index()] {
                Some(t_anchor) => self.target.neighbors(t_anchor).collect(),
                None => Vec::new(),
            },
            None => self.target.atoms().collect(),
        };

        for target_node in candidates {
            if self.target_used[target_node.index()] || !self.is_feasible(query_node, target_node) {
                continue;
            }

            self.query_map[query_node.index()] = Some(target_node);
            self.target_used[target_node.index()] = true;

            self.recurse(depth + 1, results, max_matches);

            self.query_map[query_node.index()] = None;
            self.target_used[target_node.index()] = false;

            if results.len() >= max_matches {
                return;
            }
        }
    }

    fn is_feasible(&self, query_node: NodeIndex, target_node: NodeIndex) -> bool {
        if self.target.degree(target_node) < self.query.degree(query_node) {
            return false;
        }
        if !(self.atom_match)(target_node, query_node) {
            return false;
        }

        for q_bond in self.query.bonds_of(query_node) {
            let Some(q_neighbor) = self.query.other_atom(q_bond, query_node) else {
                continue;
            };
            let Some(t_mapped) = self.query_map[q_neighbor.index()] else {
                continue;
            };
            match self.target.bond_between(target_node, t_mapped) {
                Some(t_bond) if (self.bond_match)(t_bond, q_bond) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Breadth-first order over each query component, starting from its
/// highest-degree atom, so every atom after a component's first has an
/// already-placed neighbor.
fn search_order<A, B>(query: &Mol<A, B>) -> (Vec<NodeIndex>, Vec<Option<NodeIndex>>) {
    let n = query.atom_count();
    let mut order = Vec::with_capacity(n);
    let mut anchors = Vec::with_capacity(n);
    let mut placed = vec![false; n];

    let mut roots: Vec<NodeIndex> = query.atoms().collect();
    roots.sort_by_key(|&a| std::cmp::Reverse(query.degree(a)));

    for root in roots {
        if placed[root.index()] {
            continue;
        }
        placed[root.index()] = true;
        order.push(root);
        anchors.push(None);
        let mut queue = VecDeque::from([root]);
        while let Some(cur) = queue.pop_front() {
            for nb in query.neighbors(cur) {
                if !placed[nb.index()] {
                    placed[nb.index()] = true;
                    order.push(nb);
                    anchors.push(Some(cur));
                    queue.push_back(nb);
                }
            }
        }
    }
    (order, anchors)
}
