use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::{AtomId, Mol, TetrahedralStereo};
use crate::smiles::parse_tree::{ParseAtom, ParseTree};
use crate::smiles::tokenizer::{BondToken, ChiralityToken};

pub fn build_mol(tree: &ParseTree) -> Mol<Atom, Bond> {
    let mut mol = Mol::new();
    let nodes: Vec<NodeIndex> = tree
        .atoms
        .iter()
        .map(|pa| mol.add_atom(atom_from_parse(pa)))
        .collect();

    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        for neighbor in &parse_atom.neighbors {
            let j = neighbor.atom_idx;
            if j <= i {
                continue;
            }
            let order = resolve_bond_order(
                neighbor.bond,
                parse_atom.token.is_aromatic,
                tree.atoms[j].token.is_aromatic,
            );
            mol.add_bond(nodes[i], nodes[j], Bond::new(order));
        }
    }

    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        if let Some(stereo) = stereo_from_parse(parse_atom, nodes[i], &nodes) {
            mol.add_tetrahedral_stereo(stereo);
        }
    }

    fold_explicit_hydrogens(&mut mol);
    mol
}

fn atom_from_parse(pa: &ParseAtom) -> Atom {
    let tok = &pa.token;
    Atom {
        atomic_num: tok.element.map_or(0, |e| e.atomic_num()),
        formal_charge: tok.charge,
        isotope: tok.isotope,
        explicit_h: tok.hcount.unwrap_or(0),
        no_implicit: tok.is_bracket,
        implicit_h: 0,
        radical_electrons: 0,
        is_aromatic: tok.is_aromatic,
        map_num: tok.atom_class,
    }
}

fn resolve_bond_order(bond: Option<BondToken>, from_aromatic: bool, to_aromatic: bool) -> BondOrder {
    match bond {
        Some(BondToken::Single | BondToken::Up | BondToken::Down) => BondOrder::Single,
        Some(BondToken::Double) => BondOrder::Double,
        Some(BondToken::Triple) => BondOrder::Triple,
        Some(BondToken::Aromatic) => BondOrder::Aromatic,
        None if from_aromatic && to_aromatic => BondOrder::Aromatic,
        None => BondOrder::Single,
    }
}

/// Reads `@`/`@@` against the written neighbor order. A bracket hydrogen,
/// or the lone pair of a three-coordinate center, sits right after the
/// preceding atom (first if there is none).
fn stereo_from_parse(
    pa: &ParseAtom,
    center: NodeIndex,
    nodes: &[NodeIndex],
) -> Option<TetrahedralStereo> {
    if pa.token.chirality == ChiralityToken::None {
        return None;
    }
    let mut order: Vec<AtomId> = pa
        .neighbors
        .iter()
        .map(|n| AtomId::Node(nodes[n.atom_idx]))
        .collect();
    let h = pa.token.hcount.unwrap_or(0);
    if h > 1 {
        return None;
    }
    if h == 1 || order.len() == 3 {
        let at = usize::from(pa.has_preceding);
        order.insert(at, AtomId::Implicit);
    }
    let mut neighbors: [AtomId; 4] = order.try_into().ok()?;
    if pa.token.chirality == ChiralityToken::Clockwise {
        neighbors.swap(2, 3);
    }
    Some(TetrahedralStereo { center, neighbors })
}

/// Removes plain `[H]` atoms bonded to a heavy atom and counts them on the
/// parent instead. Isotopic or charged hydrogens and H2 stay as nodes.
pub(crate) fn fold_explicit_hydrogens(mol: &mut Mol<Atom, Bond>) {
    let mut remove = Vec::new();
    let mut parents = Vec::new();
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        if atom.atomic_num != 1
            || atom.isotope != 0
            || atom.formal_charge != 0
            || atom.map_num != 0
            || atom.explicit_h != 0
            || mol.degree(idx) != 1
        {
            continue;
        }
        let Some(parent) = mol.neighbors(idx).next() else {
            continue;
        };
        if mol.atom(parent).atomic_num <= 1 {
            continue;
        }
        remove.push(idx);
        parents.push(parent);
    }
    if remove.is_empty() {
        return;
    }

    let mut stereo = mol.tetrahedral_stereo().to_vec();
    for st in &mut stereo {
        for slot in &mut st.neighbors {
            if matches!(slot, AtomId::Node(n) if remove.contains(n)) {
                *slot = AtomId::Implicit;
            }
        }
    }
    stereo.retain(|st| {
        st.neighbors
            .iter()
            .filter(|s| **s == AtomId::Implicit)
            .count()
            <= 1
    });
    mol.set_tetrahedral_stereo(stereo);

    for parent in parents {
        mol.atom_mut(parent).explicit_h += 1;
    }
    mol.remove_atoms(&remove);
}
