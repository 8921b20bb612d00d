//! MDL reaction files: `$RXN` (V2000) and `$RXN V3000`.

use std::fmt::Write;

use petgraph::graph::NodeIndex;

use crate::element::Element;
use crate::mol::Mol;
use crate::reaction::ChemicalReaction;
use crate::smarts::{AtomExpr, BondExpr};

use super::ctab::{self, Ctab, CtabAtom, CtabBond};
use super::error::MdlError;

/// How [`to_rxn_block`] lays out the reaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RxnWriteOptions {
    /// V2000 only: write agents as their own group instead of folding
    /// them into the reactants.
    pub separate_agents: bool,
    pub force_v3000: bool,
}

fn element(atomic_num: u8) -> AtomExpr {
    AtomExpr::Element {
        atomic_num,
        aromatic: None,
    }
}

fn atom_expr(atom: &CtabAtom, line: usize) -> Result<AtomExpr, MdlError> {
    let base = match atom.symbol.as_str() {
        "*" | "R" | "R#" => AtomExpr::True,
        "A" => AtomExpr::Not(Box::new(element(1))),
        "Q" => AtomExpr::Not(Box::new(AtomExpr::Or(vec![element(6), element(1)]))),
        symbol => element(
            Element::from_symbol(symbol)
                .ok_or_else(|| MdlError::UnknownElement {
                    line,
                    symbol: symbol.to_string(),
                })?
                .atomic_num(),
        ),
    };
    let mut parts = Vec::new();
    if atom.isotope != 0 {
        parts.push(AtomExpr::Isotope(atom.isotope));
    }
    parts.push(base);
    if atom.charge != 0 {
        parts.push(AtomExpr::Charge(atom.charge));
    }
    if atom.map_num != 0 {
        parts.push(AtomExpr::AtomMapClass(atom.map_num));
    }
    Ok(if parts.len() == 1 {
        parts.remove(0)
    } else {
        AtomExpr::And(parts)
    })
}

fn bond_expr(kind: u8, line: usize) -> Result<BondExpr, MdlError> {
    Ok(match kind {
        1 => BondExpr::Single,
        2 => BondExpr::Double,
        3 => BondExpr::Triple,
        4 => BondExpr::Aromatic,
        5 => BondExpr::Or(vec![BondExpr::Single, BondExpr::Double]),
        6 => BondExpr::SingleOrAromatic,
        7 => BondExpr::Or(vec![BondExpr::Double, BondExpr::Aromatic]),
        8 => BondExpr::True,
        other => {
            return Err(MdlError::BadField {
                line,
                field: "bond type",
                value: other.to_string(),
            })
        }
    })
}

fn ctab_to_template(ctab: &Ctab, first_line: usize) -> Result<Mol<AtomExpr, BondExpr>, MdlError> {
    let mut mol = Mol::new();
    for (i, atom) in ctab.atoms.iter().enumerate() {
        mol.add_atom(atom_expr(atom, first_line + i)?);
    }
    for bond in &ctab.bonds {
        mol.add_bond(
            NodeIndex::new(bond.begin),
            NodeIndex::new(bond.end),
            bond_expr(bond.kind, first_line)?,
        );
    }
    Ok(mol)
}

fn template_symbol(expr: &AtomExpr) -> String {
    match expr {
        AtomExpr::Element { atomic_num, .. } => Element::from_atomic_num(*atomic_num)
            .map_or("*", Element::symbol)
            .to_string(),
        AtomExpr::Not(inner) => match inner.as_ref() {
            AtomExpr::Element { atomic_num: 1, .. } => "A".to_string(),
            AtomExpr::Or(alts)
                if alts.len() == 2
                    && alts.contains(&element(6))
                    && alts.contains(&element(1)) =>
            {
                "Q".to_string()
            }
            _ => "*".to_string(),
        },
        AtomExpr::And(parts) => parts
            .iter()
            .map(template_symbol)
            .find(|s| s != "*")
            .unwrap_or_else(|| "*".to_string()),
        _ => "*".to_string(),
    }
}

fn template_atom(expr: &AtomExpr) -> CtabAtom {
    let mut atom = CtabAtom::new(template_symbol(expr));
    atom.map_num = expr.map_num().unwrap_or(0);
    let parts = match expr {
        AtomExpr::And(parts) => parts.as_slice(),
        single => std::slice::from_ref(single),
    };
    for part in parts {
        match part {
            AtomExpr::Charge(c) => atom.charge = *c,
            AtomExpr::Isotope(i) => atom.isotope = *i,
            _ => {}
        }
    }
    atom
}

fn bond_kind(expr: &BondExpr) -> u8 {
    match expr {
        BondExpr::Single | BondExpr::Up | BondExpr::Down => 1,
        BondExpr::Double => 2,
        BondExpr::Triple => 3,
        BondExpr::Aromatic => 4,
        BondExpr::SingleOrAromatic => 6,
        BondExpr::Or(alts) if alts.len() == 2 => {
            let has = |b: &BondExpr| alts.contains(b);
            if has(&BondExpr::Single) && has(&BondExpr::Double) {
                5
            } else if has(&BondExpr::Double) && has(&BondExpr::Aromatic) {
                7
            } else if has(&BondExpr::Single) && has(&BondExpr::Aromatic) {
                6
            } else {
                8
            }
        }
        BondExpr::And(_) => expr.explicit_bond().map_or(8, |b| {
            if b.is_aromatic {
                4
            } else {
                b.order.valence_contrib()
            }
        }),
        _ => 8,
    }
}

fn template_to_ctab(template: &Mol<AtomExpr, BondExpr>) -> Ctab {
    Ctab {
        atoms: template.atoms().map(|i| template_atom(template.atom(i))).collect(),
        bonds: template
            .bonds()
            .filter_map(|e| {
                let (a, b) = template.bond_endpoints(e)?;
                Some(CtabBond {
                    begin: a.index(),
                    end: b.index(),
                    kind: bond_kind(template.bond(e)),
                })
            })
            .collect(),
    }
}

/// Writes the reaction as an MDL RXN block.
///
/// V2000 output folds agents into the reactant group unless
/// `separate_agents` is set. V3000 output always keeps an AGENT section
/// when there are agents.
pub fn to_rxn_block(rxn: &ChemicalReaction, options: RxnWriteOptions) -> String {
    if options.force_v3000 {
        write_v3000_rxn(rxn)
    } else {
        write_v2000_rxn(rxn, options.separate_agents)
    }
}

fn write_v2000_rxn(rxn: &ChemicalReaction, separate_agents: bool) -> String {
    let mut reactants: Vec<&Mol<AtomExpr, BondExpr>> = rxn.reactant_templates().iter().collect();
    let agents: Vec<&Mol<AtomExpr, BondExpr>> = if separate_agents {
        rxn.agent_templates().iter().collect()
    } else {
        reactants.extend(rxn.agent_templates());
        Vec::new()
    };

    let mut out = String::from("$RXN\n\n      molkit\n\n");
    let _ = write!(
        out,
        "{:>3}{:>3}",
        reactants.len(),
        rxn.num_product_templates()
    );
    if !agents.is_empty() {
        let _ = write!(out, "{:>3}", agents.len());
    }
    out.push('\n');
    let groups = reactants
        .into_iter()
        .chain(rxn.product_templates())
        .chain(agents);
    for template in groups {
        out.push_str("$MOL\n");
        out.push_str(&ctab::write_v2000(&template_to_ctab(template), ""));
    }
    out
}

fn write_v3000_rxn(rxn: &ChemicalReaction) -> String {
    let mut out = String::from("$RXN V3000\n\n      molkit\n\n");
    let _ = write!(
        out,
        "M  V30 COUNTS {} {}",
        rxn.num_reactant_templates(),
        rxn.num_product_templates()
    );
    if rxn.num_agent_templates() > 0 {
        let _ = write!(out, " {}", rxn.num_agent_templates());
    }
    out.push('\n');
    for (section, templates) in [
        ("REACTANT", rxn.reactant_templates()),
        ("PRODUCT", rxn.product_templates()),
        ("AGENT", rxn.agent_templates()),
    ] {
        if section == "AGENT" && templates.is_empty() {
            continue;
        }
        let _ = writeln!(out, "M  V30 BEGIN {section}");
        for template in templates {
            ctab::write_v3000(&template_to_ctab(template), &mut out);
        }
        let _ = writeln!(out, "M  V30 END {section}");
    }
    out.push_str("M  END\n");
    out
}

/// Reads a `$RXN` or `$RXN V3000` block.
pub fn from_rxn_block(block: &str) -> Result<ChemicalReaction, MdlError> {
    let lines: Vec<&str> = block.lines().collect();
    let header = lines.first().map(|l| l.trim()).unwrap_or("");
    if !header.starts_with("$RXN") {
        return Err(MdlError::NotRxn);
    }
    if header.contains("V3000") {
        read_v3000_rxn(&lines)
    } else {
        read_v2000_rxn(&lines)
    }
}

fn read_v2000_rxn(lines: &[&str]) -> Result<ChemicalReaction, MdlError> {
    let counts = lines.get(4).ok_or(MdlError::TooShort { what: "RXN" })?;
    let count = |range: std::ops::Range<usize>, field: &'static str| -> Result<usize, MdlError> {
        let text = counts.get(range.start..range.end.min(counts.len())).unwrap_or("").trim();
        if text.is_empty() {
            return Ok(0);
        }
        text.parse().map_err(|_| MdlError::BadField {
            line: 5,
            field,
            value: text.to_string(),
        })
    };
    let num_reactants = count(0..3, "reactant count")?;
    let num_products = count(3..6, "product count")?;
    let num_agents = count(6..9, "agent count")?;

    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .skip(5)
        .filter(|(_, l)| l.trim_end() == "$MOL")
        .map(|(i, _)| i)
        .collect();
    let expected = num_reactants + num_products + num_agents;
    if starts.len() != expected {
        return Err(MdlError::CountMismatch {
            what: "$MOL blocks",
            expected,
            found: starts.len(),
        });
    }

    let mut rxn = ChemicalReaction::new();
    for (k, &start) in starts.iter().enumerate() {
        let end = starts.get(k + 1).copied().unwrap_or(lines.len());
        let body = &lines[start + 1..end];
        let template = ctab_to_template(&ctab::read_v2000(body, start + 2)?, start + 6)?;
        if k < num_reactants {
            rxn.add_reactant_template(template);
        } else if k < num_reactants + num_products {
            rxn.add_product_template(template);
        } else {
            rxn.add_agent_template(template);
        }
    }
    Ok(rxn)
}

fn read_v3000_rxn(lines: &[&str]) -> Result<ChemicalReaction, MdlError> {
    let mut rxn = ChemicalReaction::new();
    for section in ["REACTANT", "PRODUCT", "AGENT"] {
        let Some(begin) = ctab::find_v30(lines, 0, &format!("BEGIN {section}")) else {
            continue;
        };
        let end = ctab::find_v30(lines, begin, &format!("END {section}"))
            .ok_or(MdlError::Missing("END of RXN section"))?;
        let mut pos = begin;
        while let Some(ctab_begin) = ctab::find_v30(&lines[..end], pos, "BEGIN CTAB") {
            let ctab_end = ctab::find_v30(&lines[..end], ctab_begin, "END CTAB")
                .ok_or(MdlError::Missing("END CTAB"))?;
            let table = ctab::read_v3000(&lines[ctab_begin..=ctab_end], ctab_begin + 1)?;
            let template = ctab_to_template(&table, ctab_begin + 1)?;
            match section {
                "REACTANT" => rxn.add_reactant_template(template),
                "PRODUCT" => rxn.add_product_template(template),
                _ => rxn.add_agent_template(template),
            };
            pos = ctab_end + 1;
        }
    }
    Ok(rxn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reaction::{from_reaction_smarts, to_reaction_smarts};

    fn rxn(s: &str) -> ChemicalReaction {
        from_reaction_smarts(s).unwrap()
    }

    #[test]
    fn v2000_layout() {
        let block = to_rxn_block(&rxn("[C:1][Br:2]>>[C:1][O:2]"), RxnWriteOptions::default());
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines[0], "$RXN");
        assert_eq!(lines[4], "  1  1");
        assert_eq!(lines[5], "$MOL");
        assert_eq!(block.matches("$MOL").count(), 2);
    }

    #[test]
    fn v2000_round_trip() {
        let original = rxn("[C:1][Br:2].[OH-:3]>>[C:1][O:3].[Br-:2]");
        let block = to_rxn_block(&original, RxnWriteOptions::default());
        let back = from_rxn_block(&block).unwrap();
        assert_eq!(back.num_reactant_templates(), 2);
        assert_eq!(back.num_product_templates(), 2);
        assert_eq!(
            to_reaction_smarts(&back),
            "[#6:1][#35:2].[#8-1:3]>>[#6:1][#8:3].[#35-1:2]"
        );
    }

    #[test]
    fn agents_fold_into_reactants_unless_separated() {
        let original = rxn("[C:1]=[C:2]>[Pd]>[C:1][C:2]");
        let folded = from_rxn_block(&to_rxn_block(&original, RxnWriteOptions::default())).unwrap();
        assert_eq!(folded.num_reactant_templates(), 2);
        assert_eq!(folded.num_agent_templates(), 0);

        let options = RxnWriteOptions {
            separate_agents: true,
            ..Default::default()
        };
        let block = to_rxn_block(&original, options);
        assert_eq!(block.lines().nth(4), Some("  1  1  1"));
        let separated = from_rxn_block(&block).unwrap();
        assert_eq!(separated.num_reactant_templates(), 1);
        assert_eq!(separated.num_agent_templates(), 1);
    }

    #[test]
    fn v3000_round_trip_keeps_agents() {
        let original = rxn("[C:1]=[C:2]>[Pd]>[C:1][C:2]");
        let options = RxnWriteOptions {
            force_v3000: true,
            ..Default::default()
        };
        let block = to_rxn_block(&original, options);
        assert!(block.starts_with("$RXN V3000\n"));
        assert!(block.contains("M  V30 COUNTS 1 1 1\n"));
        assert!(block.contains("M  V30 BEGIN AGENT\n"));
        let back = from_rxn_block(&block).unwrap();
        assert_eq!(back.num_reactant_templates(), 1);
        assert_eq!(back.num_product_templates(), 1);
        assert_eq!(back.num_agent_templates(), 1);
        assert_eq!(to_reaction_smarts(&back), "[#6:1]=[#6:2]>[#46]>[#6:1][#6:2]");
    }

    #[test]
    fn wildcards() {
        let original = rxn("[*:1]>>[*:1][*]");
        let back = from_rxn_block(&to_rxn_block(&original, RxnWriteOptions::default())).unwrap();
        let template = back.product_template(0).unwrap();
        assert_eq!(template.atom(NodeIndex::new(1)), &AtomExpr::True);

        let mut ctab = Ctab::default();
        ctab.atoms.push(CtabAtom::new("A"));
        ctab.atoms.push(CtabAtom::new("Q"));
        let template = ctab_to_template(&ctab, 1).unwrap();
        assert_eq!(template_symbol(template.atom(NodeIndex::new(0))), "A");
        assert_eq!(template_symbol(template.atom(NodeIndex::new(1))), "Q");
    }

    #[test]
    fn query_bond_types() {
        for kind in 1..=8 {
            assert_eq!(bond_kind(&bond_expr(kind, 1).unwrap()), kind);
        }
        assert!(bond_expr(9, 1).is_err());
    }

    #[test]
    fn charge_and_isotope() {
        let original = rxn("[13C:1][Br:2]>>[13C:1][O-:2]");
        let block = to_rxn_block(&original, RxnWriteOptions::default());
        assert!(block.contains("M  ISO  1   1  13"));
        assert!(block.contains("M  CHG  1   2  -1"));
        let back = from_rxn_block(&block).unwrap();
        let product = back.product_template(0).unwrap();
        assert_eq!(
            product.atom(NodeIndex::new(1)),
            &AtomExpr::And(vec![
                element(8),
                AtomExpr::Charge(-1),
                AtomExpr::AtomMapClass(2)
            ])
        );
    }

    #[test]
    fn rejects_non_rxn_input() {
        assert_eq!(from_rxn_block("CCO"), Err(MdlError::NotRxn));
        assert_eq!(from_rxn_block(""), Err(MdlError::NotRxn));
    }

    #[test]
    fn mol_block_count_must_match() {
        let block = "$RXN\n\n      molkit\n\n  1  1\n$MOL\n\n     molkit\n\n  0  0  0  0  0  0  0  0  0  0999 V2000\nM  END\n";
        assert_eq!(
            from_rxn_block(block),
            Err(MdlError::CountMismatch {
                what: "$MOL blocks",
                expected: 2,
                found: 1
            })
        );
    }
}
