//! SMARTS queries: parsing, writing and substructure matching against
//! molecules.

mod error;
mod parser;
pub mod query;
mod writer;

pub use error::SmartsError;
pub use query::{AtomExpr, BondExpr, MatchContext};
pub use writer::to_smarts;

use std::collections::{HashMap, HashSet};

use petgraph::graph::NodeIndex;

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondOrder};
use crate::mol::{AtomId, Mol};
use crate::rings::RingInfo;
use crate::substruct::{get_substruct_matches_with_filter, uniquify, AtomMapping};

use query::recursive_key;

pub fn from_smarts(s: &str) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
    parser::parse(s)
}

pub fn has_substruct_match(target: &Mol<Atom, Bond>, query: &Mol<AtomExpr, BondExpr>) -> bool {
    get_substruct_match(target, query).is_some()
}

pub fn get_substruct_match(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
) -> Option<AtomMapping> {
    search(target, query, false, 1).into_iter().next()
}

/// Every mapping of `query` onto `target`, including the ones that differ
/// only by a symmetry of the query.
pub fn get_substruct_matches(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
) -> Vec<AtomMapping> {
    search(target, query, false, usize::MAX)
}

/// Mappings that cover distinct sets of target atoms.
pub fn get_unique_substruct_matches(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
) -> Vec<AtomMapping> {
    uniquify(get_substruct_matches(target, query))
}

/// Number of distinct target atom sets `query` matches.
pub fn count_matches(target: &Mol<Atom, Bond>, query: &Mol<AtomExpr, BondExpr>) -> usize {
    get_unique_substruct_matches(target, query).len()
}

pub fn has_substruct_match_chiral(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
) -> bool {
    !search(target, query, true, 1).is_empty()
}

/// Like [`get_substruct_matches`], also requiring the handedness of every
/// stereocenter in the query to agree with the target.
pub fn get_substruct_matches_chiral(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
) -> Vec<AtomMapping> {
    search(target, query, true, usize::MAX)
}

fn search(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
    use_chirality: bool,
    max_matches: usize,
) -> Vec<AtomMapping> {
    let ring_info = RingInfo::sssr(target);
    let mut recursive_matches = HashMap::new();
    pre_evaluate_recursive(target, &ring_info, query, &mut recursive_matches);
    let ctx = MatchContext {
        mol: target,
        ring_info: &ring_info,
        recursive_matches,
    };
    matches_in_context(&ctx, query, use_chirality, max_matches)
}

/// Target atoms that query atom 0 lands on in some match. Callers typing
/// atoms against a list of patterns pass one `ring_info` for all of them.
pub(crate) fn anchor_atoms(
    target: &Mol<Atom, Bond>,
    ring_info: &RingInfo,
    query: &Mol<AtomExpr, BondExpr>,
) -> HashSet<NodeIndex> {
    let mut recursive_matches = HashMap::new();
    pre_evaluate_recursive(target, ring_info, query, &mut recursive_matches);
    let ctx = MatchContext {
        mol: target,
        ring_info,
        recursive_matches,
    };
    matches_in_context(&ctx, query, false, usize::MAX)
        .iter()
        .filter_map(|m| m.first().map(|&(_, t)| t))
        .collect()
}

fn matches_in_context(
    ctx: &MatchContext,
    query: &Mol<AtomExpr, BondExpr>,
    use_chirality: bool,
    max_matches: usize,
) -> Vec<AtomMapping> {
    get_substruct_matches_with_filter(
        ctx.mol,
        query,
        |t, q| query.atom(q).matches(ctx, t),
        |t, q| query.bond(q).matches(ctx, t),
        |mapping| !use_chirality || stereo_agrees(ctx.mol, query, mapping),
        max_matches,
    )
}

fn pre_evaluate_recursive(
    target: &Mol<Atom, Bond>,
    ring_info: &RingInfo,
    query: &Mol<AtomExpr, BondExpr>,
    results: &mut HashMap<usize, HashSet<NodeIndex>>,
) {
    let mut inner_queries = Vec::new();
    for idx in query.atoms() {
        collect_recursive(query.atom(idx), &mut inner_queries);
    }
    for inner in inner_queries {
        let key = recursive_key(inner);
        if results.contains_key(&key) {
            continue;
        }
        pre_evaluate_recursive(target, ring_info, inner, results);
        let ctx = MatchContext {
            mol: target,
            ring_info,
            recursive_matches: std::mem::take(results),
        };
        let hits: HashSet<NodeIndex> = matches_in_context(&ctx, inner, false, usize::MAX)
            .into_iter()
            .filter_map(|m| m.first().map(|&(_, t)| t))
            .collect();
        *results = ctx.recursive_matches;
        results.insert(key, hits);
    }
}

fn collect_recursive<'a>(expr: &'a AtomExpr, out: &mut Vec<&'a Mol<AtomExpr, BondExpr>>) {
    match expr {
        AtomExpr::Recursive(inner) => out.push(inner),
        AtomExpr::And(parts) | AtomExpr::Or(parts) => {
            for p in parts {
                collect_recursive(p, out);
            }
        }
        AtomExpr::Not(inner) => collect_recursive(inner, out),
        _ => {}
    }
}

/// Checks every query stereocenter against the target record of its image.
/// A query slot for the implicit hydrogen stands for whichever target slot
/// the mapping leaves over.
fn stereo_agrees(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
    mapping: &AtomMapping,
) -> bool {
    let image = |q: NodeIndex| mapping.iter().find(|&&(qi, _)| qi == q).map(|&(_, t)| t);
    for q_stereo in query.tetrahedral_stereo() {
        let Some(t_center) = image(q_stereo.center) else {
            continue;
        };
        let Some(t_stereo) = target.tetrahedral_stereo_for(t_center) else {
            return false;
        };
        let mut order: Vec<Option<AtomId>> = q_stereo
            .neighbors
            .iter()
            .map(|slot| match slot {
                AtomId::Node(q) => image(*q).map(AtomId::Node),
                AtomId::Implicit => None,
            })
            .collect();
        let leftover: Vec<AtomId> = t_stereo
            .neighbors
            .iter()
            .copied()
            .filter(|slot| !order.contains(&Some(*slot)))
            .collect();
        let open = order.iter().filter(|s| s.is_none()).count();
        if open != leftover.len() || open > 1 {
            continue;
        }
        if let Some(slot) = order.iter_mut().find(|s| s.is_none()) {
            *slot = leftover.first().copied();
        }
        let Some(order) = order.into_iter().collect::<Option<Vec<AtomId>>>() else {
            continue;
        };
        let Ok(order) = <[AtomId; 4]>::try_from(order) else {
            continue;
        };
        if !t_stereo.is_ccw_for(&order) {
            return false;
        }
    }
    true
}

/// Turns a molecule into a query that matches on element, aromaticity,
/// charge, isotope and bond type.
pub fn mol_to_query(mol: &Mol<Atom, Bond>) -> Mol<AtomExpr, BondExpr> {
    mol.map(
        |idx, atom| {
            let mut parts = Vec::new();
            if atom.is_dummy() {
                parts.push(AtomExpr::True);
            } else {
                parts.push(AtomExpr::Element {
                    atomic_num: atom.atomic_num,
                    aromatic: Some(atom.is_aromatic),
                });
            }
            if atom.isotope != 0 {
                parts.insert(0, AtomExpr::Isotope(atom.isotope));
            }
            if mol.tetrahedral_stereo_for(idx).is_some() {
                parts.push(AtomExpr::Chirality(Chirality::Ccw));
            }
            if atom.formal_charge != 0 {
                parts.push(AtomExpr::Charge(atom.formal_charge));
            }
            if atom.map_num != 0 {
                parts.push(AtomExpr::AtomMapClass(atom.map_num));
            }
            if parts.len() == 1 {
                parts.remove(0)
            } else {
                AtomExpr::And(parts)
            }
        },
        |_, bond| {
            if bond.is_aromatic {
                return BondExpr::Aromatic;
            }
            match bond.order {
                BondOrder::Single => BondExpr::Single,
                BondOrder::Double => BondExpr::Double,
                BondOrder::Triple => BondExpr::Triple,
                BondOrder::Aromatic => BondExpr::Aromatic,
            }
        },
    )
}
