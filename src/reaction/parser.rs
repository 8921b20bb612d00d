use crate::mol::Mol;
use crate::smarts::{from_smarts, AtomExpr, BondExpr};

use super::error::ReactionSmartsError;
use super::ChemicalReaction;

pub fn parse_reaction_smarts(s: &str) -> Result<ChemicalReaction, ReactionSmartsError> {
    let (reactant_text, agent_text, product_text) = split_reaction(s.trim())?;

    let reactants = parse_section(reactant_text, "reactant")?;
    if reactants.is_empty() {
        return Err(ReactionSmartsError::EmptyReactants);
    }
    let products = parse_section(product_text, "product")?;
    if products.is_empty() {
        return Err(ReactionSmartsError::EmptyProducts);
    }
    let agents = parse_section(agent_text, "agent")?;

    let mut rxn = ChemicalReaction::new();
    for t in reactants {
        rxn.add_reactant_template(t);
    }
    for t in agents {
        rxn.add_agent_template(t);
    }
    for t in products {
        rxn.add_product_template(t);
    }
    Ok(rxn)
}

/// Byte offsets of `target` that sit outside brackets and parentheses.
fn top_level_positions(s: &str, target: char) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut bracket_depth = 0u32;
    let mut paren_depth = 0u32;
    for (i, ch) in s.char_indices() {
        match ch {
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            '(' => paren_depth += 1,
            ')' => paren_depth = paren_depth.saturating_sub(1),
            c if c == target && bracket_depth == 0 && paren_depth == 0 => positions.push(i),
            _ => {}
        }
    }
    positions
}

fn split_reaction(s: &str) -> Result<(&str, &str, &str), ReactionSmartsError> {
    let positions = top_level_positions(s, '>');
    match positions.as_slice() {
        [] | [_] => Err(ReactionSmartsError::MissingSeparator),
        &[first, second] => Ok((&s[..first], &s[first + 1..second], &s[second + 1..])),
        _ => Err(ReactionSmartsError::TooManySeparators),
    }
}

fn split_on_dot(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for pos in top_level_positions(s, '.') {
        parts.push(&s[start..pos]);
        start = pos + 1;
    }
    parts.push(&s[start..]);
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

fn parse_section(
    text: &str,
    section: &'static str,
) -> Result<Vec<Mol<AtomExpr, BondExpr>>, ReactionSmartsError> {
    let mut mols = Vec::new();
    for comp in split_on_dot(text) {
        for sub in split_on_dot(strip_component_group(comp)) {
            let mol = from_smarts(sub)
                .map_err(|source| ReactionSmartsError::InvalidComponent { section, source })?;
            mols.push(mol);
        }
    }
    Ok(mols)
}

/// Removes one pair of component-group parentheses, `(A.B)` -> `A.B`.
fn strip_component_group(s: &str) -> &str {
    let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) else {
        return s;
    };
    let mut depth = 1i32;
    for ch in inner.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return s;
                }
            }
            _ => {}
        }
    }
    inner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_simple_reaction() {
        let (r, a, p) = split_reaction("[C:1][Br:2]>>[C:1][OH]").unwrap();
        assert_eq!((r, a, p), ("[C:1][Br:2]", "", "[C:1][OH]"));
    }

    #[test]
    fn split_with_agents() {
        let (r, a, p) = split_reaction("[C:1]=[C:2]>[Pd]>[C:1][C:2]").unwrap();
        assert_eq!((r, a, p), ("[C:1]=[C:2]", "[Pd]", "[C:1][C:2]"));
    }

    #[test]
    fn separator_errors() {
        assert_eq!(split_reaction("[C][Br]"), Err(ReactionSmartsError::MissingSeparator));
        assert_eq!(split_reaction("[C]>[Br]"), Err(ReactionSmartsError::MissingSeparator));
        assert_eq!(
            split_reaction("[C:1]>[A]>[B]>[C:1]"),
            Err(ReactionSmartsError::TooManySeparators)
        );
    }

    #[test]
    fn gt_inside_recursive_smarts_is_not_a_separator() {
        let (r, _, p) = split_reaction("[$(C>C)]>>C").unwrap();
        assert_eq!(r, "[$(C>C)]");
        assert_eq!(p, "C");
    }

    #[test]
    fn split_on_dot_respects_brackets() {
        assert_eq!(split_on_dot("[C:1]Br.[N:2]"), vec!["[C:1]Br", "[N:2]"]);
        assert_eq!(split_on_dot("[C.C]"), vec!["[C.C]"]);
        assert!(split_on_dot("").is_empty());
    }

    #[test]
    fn component_groups() {
        assert_eq!(strip_component_group("(A.B)"), "A.B");
        assert_eq!(strip_component_group("A.B"), "A.B");
        assert_eq!(strip_component_group("(A(=O).B)"), "A(=O).B");
        assert_eq!(strip_component_group("(A)(B)"), "(A)(B)");
    }

    #[test]
    fn parse_parenthesized_reaction() {
        let rxn = parse_reaction_smarts("([C:1](=O)[OH].[NH2:2][C:3])>>[C:1](=O)[N:2][C:3]")
            .unwrap();
        assert_eq!(rxn.num_reactant_templates(), 2);
        assert_eq!(rxn.num_product_templates(), 1);
    }

    #[test]
    fn bad_component_reports_section() {
        match parse_reaction_smarts("[C:1]>>[C:1](") {
            Err(ReactionSmartsError::InvalidComponent { section, .. }) => {
                assert_eq!(section, "product")
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
