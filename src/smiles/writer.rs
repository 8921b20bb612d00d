use petgraph::graph::{EdgeIndex, NodeIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::canonical::canonical_ordering;
use crate::element::{allowed_valences, Element};
use crate::mol::{AtomId, Mol};

/// Controls how [`to_smiles_with`] renders a molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmilesWriteOptions {
    /// Traverse atoms in canonical rank order.
    pub canonical: bool,
    /// Write isotopes and tetrahedral stereo.
    pub isomeric: bool,
    /// Uppercase atoms with explicit `=` instead of aromatic notation.
    pub kekule: bool,
    pub all_bonds_explicit: bool,
    /// Write every atom in brackets with its hydrogen count.
    pub all_hs_explicit: bool,
    /// Random root and branch order. Overrides `canonical`.
    pub randomize: bool,
}

impl Default for SmilesWriteOptions {
    fn default() -> Self {
        Self {
            canonical: true,
            isomeric: true,
            kekule: false,
            all_bonds_explicit: false,
            all_hs_explicit: false,
            randomize: false,
        }
    }
}

/// Canonical isomeric SMILES.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> String {
    to_smiles_with(mol, &SmilesWriteOptions::default())
}

pub fn to_smiles_with(mol: &Mol<Atom, Bond>, opts: &SmilesWriteOptions) -> String {
    to_smiles_with_rng(mol, opts, &mut rand::thread_rng())
}

/// Like [`to_smiles_with`], drawing the random traversal from `rng` when
/// `opts.randomize` is set.
pub fn to_smiles_with_rng<R: Rng + ?Sized>(
    mol: &Mol<Atom, Bond>,
    opts: &SmilesWriteOptions,
    rng: &mut R,
) -> String {
    let n = mol.atom_count();
    let ranks: Vec<usize> = if opts.randomize {
        let mut perm: Vec<usize> = (0..n).collect();
        perm.shuffle(rng);
        perm
    } else if opts.canonical {
        canonical_ordering(mol)
    } else {
        (0..n).collect()
    };

    let mut fragments = mol.fragments();
    fragments.sort_by_key(|frag| frag.iter().map(|a| ranks[a.index()]).min());

    let writer = Writer { mol, opts, ranks: &ranks };
    fragments
        .iter()
        .filter_map(|frag| {
            let start = frag.iter().copied().min_by_key(|a| ranks[a.index()])?;
            Some(writer.write_fragment(start))
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Debug, Clone, Copy)]
struct RingBond {
    edge: EdgeIndex,
    other: NodeIndex,
}

#[derive(Default)]
struct Traversal {
    parent: Vec<Option<NodeIndex>>,
    children: Vec<Vec<NodeIndex>>,
    ring_opens: Vec<Vec<RingBond>>,
    ring_closes: Vec<Vec<RingBond>>,
}

struct Writer<'a> {
    mol: &'a Mol<Atom, Bond>,
    opts: &'a SmilesWriteOptions,
    ranks: &'a [usize],
}

impl Writer<'_> {
    fn write_fragment(&self, start: NodeIndex) -> String {
        let traversal = self.traverse(start);
        let mut digits: Vec<Option<EdgeIndex>> = Vec::new();
        let mut out = String::new();
        self.write_node(start, &traversal, &mut digits, &mut out);
        out
    }

    fn traverse(&self, start: NodeIndex) -> Traversal {
        let n = self.mol.atom_count();
        let mut t = Traversal {
            parent: vec![None; n],
            children: vec![Vec::new(); n],
            ring_opens: vec![Vec::new(); n],
            ring_closes: vec![Vec::new(); n],
        };
        let neighbor_lists: Vec<Vec<NodeIndex>> = self
            .mol
            .atoms()
            .map(|idx| {
                let mut nbs: Vec<NodeIndex> = self.mol.neighbors(idx).collect();
                nbs.sort_by_key(|nb| self.ranks[nb.index()]);
                nbs
            })
            .collect();

        let mut visited = vec![false; n];
        let mut seen_ring_edges: Vec<EdgeIndex> = Vec::new();
        let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];
        visited[start.index()] = true;

        while let Some(&mut (node, ref mut next)) = stack.last_mut() {
            let Some(&neighbor) = neighbor_lists[node.index()].get(*next) else {
                stack.pop();
                continue;
            };
            *next += 1;
            if !visited[neighbor.index()] {
                visited[neighbor.index()] = true;
                t.parent[neighbor.index()] = Some(node);
                t.children[node.index()].push(neighbor);
                stack.push((neighbor, 0));
            } else if t.parent[node.index()] != Some(neighbor) {
                let Some(edge) = self.mol.bond_between(node, neighbor) else {
                    continue;
                };
                if seen_ring_edges.contains(&edge) {
                    continue;
                }
                seen_ring_edges.push(edge);
                t.ring_opens[neighbor.index()].push(RingBond { edge, other: node });
                t.ring_closes[node.index()].push(RingBond {
                    edge,
                    other: neighbor,
                });
            }
        }
        t
    }

    fn write_node(
        &self,
        node: NodeIndex,
        t: &Traversal,
        digits: &mut Vec<Option<EdgeIndex>>,
        out: &mut String,
    ) {
        let closes = &t.ring_closes[node.index()];
        let opens = &t.ring_opens[node.index()];
        self.write_atom(node, t, out);

        let mut released = Vec::new();
        for rb in closes {
            let Some(digit) = digits.iter().position(|d| *d == Some(rb.edge)) else {
                continue;
            };
            self.write_bond(rb.edge, node, rb.other, out);
            write_ring_digit(digit + 1, out);
            released.push(digit);
        }
        for rb in opens {
            let digit = match digits.iter().position(Option::is_none) {
                Some(free) => {
                    digits[free] = Some(rb.edge);
                    free
                }
                None => {
                    digits.push(Some(rb.edge));
                    digits.len() - 1
                }
            };
            write_ring_digit(digit + 1, out);
        }
        for digit in released {
            digits[digit] = None;
        }

        let kids = &t.children[node.index()];
        for (i, &child) in kids.iter().enumerate() {
            let is_branch = i + 1 < kids.len();
            if is_branch {
                out.push('(');
            }
            if let Some(edge) = self.mol.bond_between(node, child) {
                self.write_bond(edge, node, child, out);
            }
            self.write_node(child, t, digits, out);
            if is_branch {
                out.push(')');
            }
        }
    }

    fn written_aromatic(&self, idx: NodeIndex) -> bool {
        !self.opts.kekule && self.mol.atom(idx).is_aromatic
    }

    fn write_bond(&self, edge: EdgeIndex, from: NodeIndex, to: NodeIndex, out: &mut String) {
        let bond = self.mol.bond(edge);
        let both_aromatic = self.written_aromatic(from) && self.written_aromatic(to);
        let explicit = self.opts.all_bonds_explicit;
        let symbol = match bond.order {
            _ if both_aromatic && bond.is_aromatic => {
                if explicit {
                    ":"
                } else {
                    ""
                }
            }
            BondOrder::Aromatic if both_aromatic && !explicit => "",
            BondOrder::Aromatic => ":",
            BondOrder::Single if both_aromatic || explicit => "-",
            BondOrder::Single => "",
            BondOrder::Double => "=",
            BondOrder::Triple => "#",
        };
        out.push_str(symbol);
    }

    /// Stereo mark for `node` given the order its neighbors are written in.
    fn chirality_mark(&self, node: NodeIndex, t: &Traversal) -> Option<&'static str> {
        if !self.opts.isomeric {
            return None;
        }
        let stereo = self.mol.tetrahedral_stereo_for(node)?;
        let mut order: Vec<AtomId> = Vec::with_capacity(4);
        if let Some(p) = t.parent[node.index()] {
            order.push(AtomId::Node(p));
        }
        if stereo.neighbors.contains(&AtomId::Implicit) {
            order.push(AtomId::Implicit);
        }
        order.extend(t.ring_closes[node.index()].iter().map(|rb| AtomId::Node(rb.other)));
        order.extend(t.ring_opens[node.index()].iter().map(|rb| AtomId::Node(rb.other)));
        order.extend(t.children[node.index()].iter().map(|&c| AtomId::Node(c)));

        let order: [AtomId; 4] = order.try_into().ok()?;
        if !order.iter().all(|slot| stereo.neighbors.contains(slot)) {
            return None;
        }
        Some(if stereo.is_ccw_for(&order) { "@" } else { "@@" })
    }

    fn write_atom(&self, node: NodeIndex, t: &Traversal, out: &mut String) {
        let atom = self.mol.atom(node);
        let aromatic = self.written_aromatic(node);
        let chirality = self.chirality_mark(node, t);
        let isotope = if self.opts.isomeric { atom.isotope } else { 0 };

        let symbol = match atom.element() {
            Some(e) if aromatic => e.symbol().to_ascii_lowercase(),
            Some(e) => e.symbol().to_string(),
            None => "*".to_string(),
        };

        if chirality.is_none() && isotope == 0 && self.can_write_bare(node, aromatic) {
            out.push_str(&symbol);
            return;
        }

        out.push('[');
        if isotope != 0 {
            out.push_str(&isotope.to_string());
        }
        out.push_str(&symbol);
        if let Some(mark) = chirality {
            out.push_str(mark);
        }
        let h = atom.total_h();
        if h > 0 {
            out.push('H');
            if h > 1 {
                out.push_str(&h.to_string());
            }
        }
        match atom.formal_charge {
            0 => {}
            1 => out.push('+'),
            -1 => out.push('-'),
            c if c > 0 => out.push_str(&format!("+{c}")),
            c => out.push_str(&format!("-{}", -c)),
        }
        if atom.map_num != 0 {
            out.push_str(&format!(":{}", atom.map_num));
        }
        out.push(']');
    }

    fn can_write_bare(&self, node: NodeIndex, aromatic: bool) -> bool {
        let atom = self.mol.atom(node);
        if self.opts.all_hs_explicit || atom.formal_charge != 0 || atom.map_num != 0 {
            return false;
        }
        if atom.is_dummy() {
            return atom.total_h() == 0;
        }
        let organic = atom.element().is_some_and(Element::is_organic_subset);
        if !organic || atom.radical_electrons != 0 {
            return false;
        }
        self.implied_h(node, aromatic) == Some(atom.total_h())
    }

    /// Hydrogens a reader would give this atom written without brackets.
    fn implied_h(&self, node: NodeIndex, aromatic: bool) -> Option<u8> {
        let mut used: u8 = 0;
        let mut has_aromatic_bond = false;
        for e in self.mol.bonds_of(node) {
            let other = self.mol.other_atom(e, node)?;
            let bond = self.mol.bond(e);
            let parsed_aromatic = aromatic
                && self.written_aromatic(other)
                && (bond.is_aromatic || bond.order == BondOrder::Aromatic);
            if parsed_aromatic {
                has_aromatic_bond = true;
                used += 1;
            } else {
                used += bond.order.valence_contrib();
            }
        }
        let atom = self.mol.atom(node);
        let target = allowed_valences(atom.atomic_num, 0)
            .iter()
            .copied()
            .find(|&v| v >= used)?;
        let h = target - used;
        Some(if aromatic && has_aromatic_bond && h > 0 {
            h - 1
        } else {
            h
        })
    }
}

fn write_ring_digit(digit: usize, out: &mut String) {
    if digit < 10 {
        out.push_str(&digit.to_string());
    } else {
        out.push_str(&format!("%{digit}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::{from_smiles, from_smiles_unsanitized};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn canon(s: &str) -> String {
        to_smiles(&from_smiles(s).unwrap())
    }

    fn with(s: &str, opts: SmilesWriteOptions) -> String {
        to_smiles_with(&from_smiles(s).unwrap(), &opts)
    }

    #[test]
    fn simple_chains() {
        assert_eq!(canon("OCC"), "CCO");
        assert_eq!(canon("C"), "C");
        assert_eq!(canon("[Na+].[Cl-]").len(), "[Na+].[Cl-]".len());
    }

    #[test]
    fn round_trips_are_stable() {
        for smi in [
            "c1ccccc1",
            "c1ccc2ccccc2c1",
            "c1cc[nH]c1",
            "O=c1cc[nH]cc1",
            "CC(=O)Oc1ccccc1C(=O)O",
            "C1CC2CCC1C2",
            "C12C3C4C1C5C2C3C45",
            "[13CH4]",
            "[NH4+]",
            "CC[N+](C)(C)C",
            "[O-]C(=O)CC",
            "c1ccc(-c2ccccc2)cc1",
            "C#N",
            "[CH3]",
            "*CC",
            "[CH3:1][OH:2]",
            "Cn1cnc2c1c(=O)n(C)c(=O)n2C",
        ] {
            let c1 = canon(smi);
            let c2 = canon(&c1);
            assert_eq!(c1, c2, "{smi}");
        }
    }

    #[test]
    fn aromatic_output_needs_bracket_for_pyrrole_nitrogen() {
        let s = canon("C1=CNC=C1");
        assert!(s.contains("[nH]"), "{s}");
    }

    #[test]
    fn biphenyl_link_is_explicit() {
        let s = canon("c1ccccc1c1ccccc1");
        assert!(s.contains('-'), "{s}");
    }

    #[test]
    fn kekule_output() {
        let s = with(
            "c1ccccc1",
            SmilesWriteOptions {
                kekule: true,
                ..Default::default()
            },
        );
        assert_eq!(s.matches('=').count(), 3);
        assert!(!s.contains('c'));
        assert_eq!(canon(&s), "c1ccccc1");
    }

    #[test]
    fn explicit_bonds_and_hydrogens() {
        let s = with(
            "CCO",
            SmilesWriteOptions {
                all_bonds_explicit: true,
                ..Default::default()
            },
        );
        assert_eq!(s, "C-C-O");
        let s = with(
            "CCO",
            SmilesWriteOptions {
                all_hs_explicit: true,
                ..Default::default()
            },
        );
        assert_eq!(s, "[CH3][CH2][OH]");
    }

    #[test]
    fn non_isomeric_drops_labels() {
        let s = with(
            "[13CH3][C@H](F)Cl",
            SmilesWriteOptions {
                isomeric: false,
                ..Default::default()
            },
        );
        assert!(!s.contains('@'));
        assert!(!s.contains("13"));
    }

    #[test]
    fn randomized_smiles_parse_to_same_molecule() {
        let mut rng = StdRng::seed_from_u64(7);
        let mol = from_smiles("CC(=O)Nc1ccc(O)cc1").unwrap();
        let expected = to_smiles(&mol);
        let opts = SmilesWriteOptions {
            randomize: true,
            ..Default::default()
        };
        for _ in 0..10 {
            let random = to_smiles_with_rng(&mol, &opts, &mut rng);
            assert_eq!(canon(&random), expected, "{random}");
        }
    }

    #[test]
    fn unsanitized_aromatic_orders() {
        let mol = from_smiles_unsanitized("c1ccccc1").unwrap();
        assert_eq!(to_smiles(&mol).matches('c').count(), 6);
    }

    #[test]
    fn ring_digits_are_reused() {
        let s = canon("C1CC1C1CC1");
        assert!(!s.contains('2'), "{s}");
    }
}
