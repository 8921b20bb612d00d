use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Chirality;
use crate::element::Element;
use crate::mol::{AtomId, Mol};

use super::query::{AtomExpr, BondExpr};

const BARE_AROMATIC: [u8; 6] = [5, 6, 7, 8, 15, 16];

/// Writes a query graph as SMARTS, visiting atoms in index order.
///
/// Chirality marks are recomputed from the stereo records for the order
/// neighbors are written in.
pub fn to_smarts(mol: &Mol<AtomExpr, BondExpr>) -> String {
    mol.fragments()
        .iter()
        .filter_map(|frag| frag.first().map(|&start| write_fragment(mol, start)))
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Debug, Clone, Copy)]
struct RingBond {
    edge: EdgeIndex,
    other: NodeIndex,
}

struct Traversal {
    parent: Vec<Option<NodeIndex>>,
    children: Vec<Vec<NodeIndex>>,
    ring_opens: Vec<Vec<RingBond>>,
    ring_closes: Vec<Vec<RingBond>>,
}

fn traverse(mol: &Mol<AtomExpr, BondExpr>, start: NodeIndex) -> Traversal {
    let n = mol.atom_count();
    let mut t = Traversal {
        parent: vec![None; n],
        children: vec![Vec::new(); n],
        ring_opens: vec![Vec::new(); n],
        ring_closes: vec![Vec::new(); n],
    };
    let neighbor_lists: Vec<Vec<NodeIndex>> = mol
        .atoms()
        .map(|idx| {
            let mut nbs: Vec<NodeIndex> = mol.neighbors(idx).collect();
            nbs.sort();
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
            let Some(edge) = mol.bond_between(node, neighbor) else {
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

fn write_fragment(mol: &Mol<AtomExpr, BondExpr>, start: NodeIndex) -> String {
    let t = traverse(mol, start);
    let mut digits: Vec<Option<EdgeIndex>> = Vec::new();
    let mut out = String::new();
    write_node(mol, start, &t, &mut digits, &mut out);
    out
}

fn write_node(
    mol: &Mol<AtomExpr, BondExpr>,
    node: NodeIndex,
    t: &Traversal,
    digits: &mut Vec<Option<EdgeIndex>>,
    out: &mut String,
) {
    write_atom(mol, node, t, out);

    let mut released = Vec::new();
    for rb in &t.ring_closes[node.index()] {
        let Some(digit) = digits.iter().position(|d| *d == Some(rb.edge)) else {
            continue;
        };
        write_bond(mol.bond(rb.edge), out);
        write_ring_digit(digit + 1, out);
        released.push(digit);
    }
    for rb in &t.ring_opens[node.index()] {
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
        if let Some(edge) = mol.bond_between(node, child) {
            write_bond(mol.bond(edge), out);
        }
        write_node(mol, child, t, digits, out);
        if is_branch {
            out.push(')');
        }
    }
}

fn write_ring_digit(id: usize, out: &mut String) {
    if id <= 9 {
        out.push_str(&id.to_string());
    } else {
        out.push_str(&format!("%{id:02}"));
    }
}

fn chirality_mark(mol: &Mol<AtomExpr, BondExpr>, node: NodeIndex, t: &Traversal) -> Option<Chirality> {
    let stereo = mol.tetrahedral_stereo_for(node)?;
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
    Some(if stereo.is_ccw_for(&order) {
        Chirality::Ccw
    } else {
        Chirality::Cw
    })
}

fn write_atom(mol: &Mol<AtomExpr, BondExpr>, node: NodeIndex, t: &Traversal, out: &mut String) {
    let expr = mol.atom(node);
    let map_num = expr.map_num();
    let chirality = chirality_mark(mol, node, t);

    if map_num.is_none() && chirality.is_none() {
        if let Some(bare) = bare_form(expr) {
            out.push_str(&bare);
            return;
        }
    }

    let body = expr.without_map_num();
    out.push('[');
    let mut inner = String::new();
    write_expr(&body, chirality, &mut inner);
    if inner.is_empty() {
        inner.push('*');
    }
    out.push_str(&inner);
    if let Some(n) = map_num {
        out.push_str(&format!(":{n}"));
    }
    out.push(']');
}

fn bare_form(expr: &AtomExpr) -> Option<String> {
    match expr {
        AtomExpr::True => Some("*".into()),
        AtomExpr::Aromatic => Some("a".into()),
        AtomExpr::Aliphatic => Some("A".into()),
        AtomExpr::Element {
            atomic_num,
            aromatic: Some(true),
        } if BARE_AROMATIC.contains(atomic_num) => {
            Element::from_atomic_num(*atomic_num).map(|e| e.symbol().to_ascii_lowercase())
        }
        AtomExpr::Element {
            atomic_num,
            aromatic: Some(false),
        } => Element::from_atomic_num(*atomic_num)
            .filter(|e| e.is_organic_subset())
            .map(|e| e.symbol().to_string()),
        _ => None,
    }
}

fn write_expr(expr: &AtomExpr, chirality: Option<Chirality>, out: &mut String) {
    match expr {
        AtomExpr::And(parts) => {
            let low = parts.iter().any(|p| matches!(p, AtomExpr::Or(_)));
            let mut first = true;
            for part in parts {
                let mut piece = String::new();
                write_expr(part, chirality, &mut piece);
                if piece.is_empty() {
                    continue;
                }
                if !first {
                    if low {
                        out.push(';');
                    } else if !piece.starts_with(['@', '+', '-', 'H']) {
                        out.push('&');
                    }
                }
                out.push_str(&piece);
                first = false;
            }
        }
        AtomExpr::Or(parts) => {
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_expr(part, chirality, out);
            }
        }
        AtomExpr::Not(inner) => {
            out.push('!');
            write_expr(inner, chirality, out);
        }
        AtomExpr::Chirality(tag) => match chirality.unwrap_or(*tag) {
            Chirality::Ccw => out.push('@'),
            Chirality::Cw => out.push_str("@@"),
            Chirality::None => {}
        },
        primitive => write_primitive(primitive, out),
    }
}

fn write_primitive(expr: &AtomExpr, out: &mut String) {
    match expr {
        AtomExpr::True => out.push('*'),
        AtomExpr::Element {
            atomic_num,
            aromatic,
        } => {
            let symbol = Element::from_atomic_num(*atomic_num).map(Element::symbol);
            match (aromatic, symbol) {
                (Some(false), Some(s)) if *atomic_num != 1 => out.push_str(s),
                (Some(true), Some(s))
                    if Element::from_atomic_num(*atomic_num).is_some_and(Element::can_be_aromatic) =>
                {
                    out.push_str(&s.to_ascii_lowercase())
                }
                (Some(true), _) => out.push_str(&format!("#{atomic_num}&a")),
                _ => out.push_str(&format!("#{atomic_num}")),
            }
        }
        AtomExpr::Aromatic => out.push('a'),
        AtomExpr::Aliphatic => out.push('A'),
        AtomExpr::Isotope(iso) => out.push_str(&iso.to_string()),
        AtomExpr::Degree(d) => out.push_str(&format!("D{d}")),
        AtomExpr::NonHDegree(d) => out.push_str(&format!("d{d}")),
        AtomExpr::Valence(v) => out.push_str(&format!("v{v}")),
        AtomExpr::Connectivity(x) => out.push_str(&format!("X{x}")),
        AtomExpr::TotalHCount(h) => out.push_str(&format!("H{h}")),
        AtomExpr::ImplicitHCount(h) => out.push_str(&format!("h{h}")),
        AtomExpr::HasImplicitH => out.push('h'),
        AtomExpr::RingMembership(n) => out.push_str(&format!("R{n}")),
        AtomExpr::SmallestRingSize(r) => out.push_str(&format!("r{r}")),
        AtomExpr::RingBondCount(x) => out.push_str(&format!("x{x}")),
        AtomExpr::Charge(c) if *c < 0 => out.push_str(&format!("-{}", c.unsigned_abs())),
        AtomExpr::Charge(c) => out.push_str(&format!("+{c}")),
        AtomExpr::HeteroNeighborCount(n) => out.push_str(&format!("z{n}")),
        AtomExpr::AliphaticHeteroNeighborCount(n) => out.push_str(&format!("Z{n}")),
        AtomExpr::HasHeteroNeighbor => out.push('z'),
        AtomExpr::HasAliphaticHeteroNeighbor => out.push('Z'),
        AtomExpr::InRing => out.push('R'),
        AtomExpr::NotInRing => out.push_str("R0"),
        AtomExpr::Recursive(inner) => {
            out.push_str("$(");
            out.push_str(&to_smarts(inner));
            out.push(')');
        }
        AtomExpr::AtomMapClass(_) => {}
        AtomExpr::Chirality(_) | AtomExpr::And(_) | AtomExpr::Or(_) | AtomExpr::Not(_) => {
            write_expr(expr, None, out)
        }
    }
}


fn write_bond(bond: &BondExpr, out: &mut String) {
    match bond {
        BondExpr::SingleOrAromatic => {}
        BondExpr::True => out.push('~'),
        BondExpr::Single => out.push('-'),
        BondExpr::Double => out.push('='),
        BondExpr::Triple => out.push('#'),
        BondExpr::Aromatic => out.push(':'),
        BondExpr::Ring => out.push('@'),
        BondExpr::Up => out.push('/'),
        BondExpr::Down => out.push('\\'),
        BondExpr::Not(inner) => {
            out.push('!');
            write_bond(inner, out);
        }
        BondExpr::And(parts) => {
            let sep = if parts.iter().any(|p| matches!(p, BondExpr::Or(_))) {
                ';'
            } else {
                '&'
            };
            for (i, e) in parts.iter().enumerate() {
                if i > 0 {
                    out.push(sep);
                }
                write_bond(e, out);
            }
        }
        BondExpr::Or(parts) => {
            for (i, e) in parts.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_bond(e, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse;
    use super::*;

    fn round_trip(s: &str) -> String {
        to_smarts(&parse(s).unwrap())
    }

    #[test]
    fn simple_patterns_round_trip() {
        for s in ["CCO", "c1ccccc1", "C=O", "C#N", "*", "[#6]", "[N;H1]", "C~C", "[Cl]C"] {
            let once = round_trip(s);
            assert_eq!(round_trip(&once), once, "{s}");
        }
        assert_eq!(round_trip("CCO"), "CCO");
        assert_eq!(round_trip("c1ccccc1"), "c1ccccc1");
        assert_eq!(round_trip("[#6]"), "[#6]");
    }

    #[test]
    fn maps_go_last() {
        assert_eq!(round_trip("[C:1]"), "[C:1]");
        assert_eq!(round_trip("[*;h:1]"), "[*&h:1]");
        assert_eq!(round_trip("[*:1][*]"), "[*:1]*");
    }

    #[test]
    fn precedence_is_kept() {
        let once = round_trip("[C,N;H1]");
        assert_eq!(once, "[C,N;H1]");
        assert_eq!(
            parse(&once).unwrap().atom(NodeIndex::new(0)),
            parse("[C,N;H1]").unwrap().atom(NodeIndex::new(0))
        );
    }

    #[test]
    fn charges_and_hydrogens() {
        assert_eq!(round_trip("[NH4+]"), "[NH4+1]");
        assert_eq!(round_trip("[O-]"), "[O-1]");
        assert_eq!(round_trip("[H]"), "[#1]");
    }

    #[test]
    fn recursive_queries() {
        assert_eq!(round_trip("[$(CO)]C"), "[$(CO)]C");
    }

    #[test]
    fn stereo_marks_follow_output_order() {
        let q = parse("F[C@H](Cl)Br").unwrap();
        let out = to_smarts(&q);
        assert_eq!(out, "F[C@H1](Cl)Br");
        let back = parse(&out).unwrap();
        let a = q.tetrahedral_stereo_for(NodeIndex::new(1)).unwrap();
        let b = back.tetrahedral_stereo_for(NodeIndex::new(1)).unwrap();
        assert!(a.is_ccw_for(&b.neighbors));
    }

    #[test]
    fn ring_bond_symbols() {
        assert_eq!(round_trip("C1=CCCCC=1"), "C1=CCCCC=1");
        assert_eq!(round_trip("C1CC@1"), "C1CC@1");
    }
}
