use std::collections::{HashMap, HashSet};

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;

/// AST node for a SMARTS atom query expression.
///
/// Each variant is a primitive test or a logical combination of tests.
/// [`AtomExpr::matches`] evaluates the tree against one atom of a target
/// molecule.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomExpr {
    /// Matches any atom (`*`).
    True,
    /// Matches by element. `aromatic` is `None` for `#n` (either),
    /// `Some(true)` for lowercase (`c`), `Some(false)` for uppercase (`C`).
    Element { atomic_num: u8, aromatic: Option<bool> },
    /// `a`
    Aromatic,
    /// `A`
    Aliphatic,
    /// Mass number written before the symbol, `[13C]`.
    Isotope(u16),
    /// Explicit connections in the graph (`D`).
    Degree(u8),
    /// Graph neighbors that are not hydrogen (`d`).
    NonHDegree(u8),
    /// Bond order sum plus attached hydrogens (`v`).
    Valence(u8),
    /// Graph degree plus attached hydrogens (`X`).
    Connectivity(u8),
    /// Attached hydrogens plus hydrogen neighbors in the graph (`H`).
    TotalHCount(u8),
    /// Hydrogens carried on the atom rather than as graph nodes (`h<n>`).
    ImplicitHCount(u8),
    /// At least one hydrogen carried on the atom (bare `h`).
    HasImplicitH,
    /// Number of SSSR rings containing the atom (`R<n>`).
    RingMembership(u8),
    /// Size of the smallest SSSR ring containing the atom (`r<n>`).
    SmallestRingSize(u8),
    /// Number of ring bonds on the atom (`x`).
    RingBondCount(u8),
    Charge(i8),
    /// Neighbors other than carbon and hydrogen (`z<n>`).
    HeteroNeighborCount(u8),
    /// Aliphatic neighbors other than carbon and hydrogen (`Z<n>`).
    AliphaticHeteroNeighborCount(u8),
    /// `z`
    HasHeteroNeighbor,
    /// `Z`
    HasAliphaticHeteroNeighbor,
    /// `R` or `r` without a count.
    InRing,
    /// `R0`
    NotInRing,
    /// A recursive SMARTS sub-query (`$(...)`), matched by its first atom.
    Recursive(Mol<AtomExpr, BondExpr>),
    /// Atom map class (`:n`). Always matches; used for reaction mapping.
    AtomMapClass(u16),
    /// `@` or `@@`. Parity is checked on complete matches by the chiral
    /// matchers; as a primitive it always matches.
    Chirality(Chirality),
    And(Vec<AtomExpr>),
    Or(Vec<AtomExpr>),
    Not(Box<AtomExpr>),
}

/// AST node for a SMARTS bond query expression.
///
/// Implicit bonds in SMARTS default to [`BondExpr::SingleOrAromatic`].
#[derive(Debug, Clone, PartialEq)]
pub enum BondExpr {
    /// `~`
    True,
    /// `-`, a non-aromatic single bond.
    Single,
    /// `=`, a non-aromatic double bond.
    Double,
    /// `#`
    Triple,
    /// `:`
    Aromatic,
    /// `@`
    Ring,
    /// The unwritten bond between two SMARTS atoms.
    SingleOrAromatic,
    /// `/`, matched as a plain single bond.
    Up,
    /// `\`, matched as a plain single bond.
    Down,
    And(Vec<BondExpr>),
    Or(Vec<BondExpr>),
    Not(Box<BondExpr>),
}

/// Target-side data shared by every atom and bond test of one search.
pub struct MatchContext<'a> {
    pub mol: &'a Mol<Atom, Bond>,
    pub ring_info: &'a RingInfo,
    /// Target atoms matched by each recursive query, keyed by the address
    /// of the recursive query graph.
    pub recursive_matches: HashMap<usize, HashSet<NodeIndex>>,
}

impl<'a> MatchContext<'a> {
    pub fn new(mol: &'a Mol<Atom, Bond>, ring_info: &'a RingInfo) -> Self {
        Self {
            mol,
            ring_info,
            recursive_matches: HashMap::new(),
        }
    }
}

pub(crate) fn recursive_key(query: &Mol<AtomExpr, BondExpr>) -> usize {
    query as *const Mol<AtomExpr, BondExpr> as usize
}

fn non_h_degree(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    mol.neighbors(idx)
        .filter(|&nb| mol.atom(nb).atomic_num != 1)
        .count() as u8
}

fn hetero_neighbor_count(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    mol.neighbors(idx)
        .filter(|&nb| !matches!(mol.atom(nb).atomic_num, 1 | 6))
        .count() as u8
}

fn aliphatic_hetero_neighbor_count(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    mol.neighbors(idx)
        .filter(|&nb| {
            let nbr = mol.atom(nb);
            !matches!(nbr.atomic_num, 1 | 6) && !nbr.is_aromatic
        })
        .count() as u8
}

fn graph_h_count(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    mol.neighbors(idx)
        .filter(|&nb| mol.atom(nb).atomic_num == 1)
        .count() as u8
}

fn bond_order_sum(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    mol.bonds_of(idx)
        .map(|e| mol.bond(e).order.valence_contrib())
        .sum()
}

fn ring_bond_count(ctx: &MatchContext, idx: NodeIndex) -> u8 {
    ctx.mol
        .bonds_of(idx)
        .filter(|&e| ctx.ring_info.is_ring_bond_index(e))
        .count() as u8
}

impl AtomExpr {
    pub fn matches(&self, ctx: &MatchContext, idx: NodeIndex) -> bool {
        let atom = ctx.mol.atom(idx);
        match self {
            AtomExpr::True => true,
            AtomExpr::Element {
                atomic_num,
                aromatic,
            } => atom.atomic_num == *atomic_num && aromatic.map_or(true, |a| atom.is_aromatic == a),
            AtomExpr::Aromatic => atom.is_aromatic,
            AtomExpr::Aliphatic => !atom.is_aromatic,
            AtomExpr::Isotope(iso) => atom.isotope == *iso,
            AtomExpr::Degree(d) => ctx.mol.degree(idx) as u8 == *d,
            AtomExpr::NonHDegree(d) => non_h_degree(ctx.mol, idx) == *d,
            AtomExpr::Valence(v) => bond_order_sum(ctx.mol, idx) + atom.total_h() == *v,
            AtomExpr::Connectivity(x) => ctx.mol.degree(idx) as u8 + atom.total_h() == *x,
            AtomExpr::TotalHCount(h) => atom.total_h() + graph_h_count(ctx.mol, idx) == *h,
            AtomExpr::ImplicitHCount(h) => atom.total_h() == *h,
            AtomExpr::HasImplicitH => atom.total_h() > 0,
            AtomExpr::RingMembership(n) => ctx.ring_info.num_atom_rings(idx) as u8 == *n,
            AtomExpr::SmallestRingSize(r) => {
                ctx.ring_info.smallest_ring_size(idx).unwrap_or(0) as u8 == *r
            }
            AtomExpr::RingBondCount(x) => ring_bond_count(ctx, idx) == *x,
            AtomExpr::Charge(c) => atom.formal_charge == *c,
            AtomExpr::HeteroNeighborCount(n) => hetero_neighbor_count(ctx.mol, idx) == *n,
            AtomExpr::AliphaticHeteroNeighborCount(n) => {
                aliphatic_hetero_neighbor_count(ctx.mol, idx) == *n
            }
            AtomExpr::HasHeteroNeighbor => hetero_neighbor_count(ctx.mol, idx) > 0,
            AtomExpr::HasAliphaticHeteroNeighbor => {
                aliphatic_hetero_neighbor_count(ctx.mol, idx) > 0
            }
            AtomExpr::InRing => ctx.ring_info.is_ring_atom(idx),
            AtomExpr::NotInRing => !ctx.ring_info.is_ring_atom(idx),
            AtomExpr::Recursive(inner) => ctx
                .recursive_matches
                .get(&recursive_key(inner))
                .is_some_and(|set| set.contains(&idx)),
            AtomExpr::AtomMapClass(_) | AtomExpr::Chirality(_) => true,
            AtomExpr::And(exprs) => exprs.iter().all(|e| e.matches(ctx, idx)),
            AtomExpr::Or(exprs) => exprs.iter().any(|e| e.matches(ctx, idx)),
            AtomExpr::Not(expr) => !expr.matches(ctx, idx),
        }
    }

    /// The atom-map number carried by this expression, if any.
    pub fn map_num(&self) -> Option<u16> {
        match self {
            AtomExpr::AtomMapClass(n) => Some(*n),
            AtomExpr::And(parts) => parts.iter().find_map(AtomExpr::map_num),
            _ => None,
        }
    }

    /// Chirality tag carried at the top level of this expression.
    pub fn chirality(&self) -> Chirality {
        match self {
            AtomExpr::Chirality(c) => *c,
            AtomExpr::And(parts) => parts
                .iter()
                .map(AtomExpr::chirality)
                .find(|c| *c != Chirality::None)
                .unwrap_or_default(),
            _ => Chirality::None,
        }
    }

    /// Removes the atom-map primitive, leaving the rest of the query.
    pub fn without_map_num(&self) -> AtomExpr {
        match self {
            AtomExpr::AtomMapClass(_) => AtomExpr::True,
            AtomExpr::And(parts) => {
                let kept: Vec<AtomExpr> = parts
                    .iter()
                    .filter(|p| !matches!(p, AtomExpr::AtomMapClass(_)))
                    .cloned()
                    .collect();
                match kept.len() {
                    0 => AtomExpr::True,
                    1 => kept.into_iter().next().unwrap_or(AtomExpr::True),
                    _ => AtomExpr::And(kept),
                }
            }
            other => other.clone(),
        }
    }
}

fn is_aromatic_bond(bond: &Bond) -> bool {
    bond.is_aromatic || bond.order == BondOrder::Aromatic
}

impl BondExpr {
    pub fn matches(&self, ctx: &MatchContext, edge: EdgeIndex) -> bool {
        let bond = ctx.mol.bond(edge);
        match self {
            BondExpr::True => true,
            BondExpr::Single | BondExpr::Up | BondExpr::Down => {
                bond.order == BondOrder::Single && !is_aromatic_bond(bond)
            }
            BondExpr::Double => bond.order == BondOrder::Double && !is_aromatic_bond(bond),
            BondExpr::Triple => bond.order == BondOrder::Triple,
            BondExpr::Aromatic => is_aromatic_bond(bond),
            BondExpr::Ring => ctx.ring_info.is_ring_bond_index(edge),
            BondExpr::SingleOrAromatic => {
                bond.order == BondOrder::Single || is_aromatic_bond(bond)
            }
            BondExpr::And(exprs) => exprs.iter().all(|e| e.matches(ctx, edge)),
            BondExpr::Or(exprs) => exprs.iter().any(|e| e.matches(ctx, edge)),
            BondExpr::Not(expr) => !expr.matches(ctx, edge),
        }
    }

    /// The Kekulé or aromatic bond this query pins down, if it names
    /// exactly one.
    pub fn explicit_bond(&self) -> Option<Bond> {
        match self {
            BondExpr::Single | BondExpr::Up | BondExpr::Down => Some(Bond::single()),
            BondExpr::Double => Some(Bond::double()),
            BondExpr::Triple => Some(Bond::new(BondOrder::Triple)),
            BondExpr::Aromatic => Some(Bond::aromatic()),
            BondExpr::And(parts) => parts.iter().find_map(BondExpr::explicit_bond),
            _ => None,
        }
    }
}
