use crate::mol::Mol;
use crate::smarts::{to_smarts, AtomExpr, BondExpr};

use super::ChemicalReaction;

/// Writes `reactants>agents>products`, or `reactants>>products` when there
/// are no agents.
pub fn to_reaction_smarts(rxn: &ChemicalReaction) -> String {
    format!(
        "{}>{}>{}",
        join(rxn.reactant_templates()),
        join(rxn.agent_templates()),
        join(rxn.product_templates())
    )
}

fn join(templates: &[Mol<AtomExpr, BondExpr>]) -> String {
    templates.iter().map(to_smarts).collect::<Vec<_>>().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reaction::from_reaction_smarts;

    fn round(s: &str) -> String {
        to_reaction_smarts(&from_reaction_smarts(s).unwrap())
    }

    #[test]
    fn writes_double_separator_without_agents() {
        assert_eq!(round("[C:1][Br:2]>>[C:1][OH]"), "[C:1][Br:2]>>[C:1][OH1]");
    }

    #[test]
    fn writes_agents_between_separators() {
        assert_eq!(round("[C:1]=[C:2]>[Pd]>[C:1][C:2]"), "[C:1]=[C:2]>[Pd]>[C:1][C:2]");
    }

    #[test]
    fn multi_component() {
        assert_eq!(round("[C:1]Br.[N:2]>>[C:1][N:2]"), "[C:1]Br.[N:2]>>[C:1][N:2]");
        assert_eq!(round("[*;h:1]>>[*:1][*]"), "[*&h:1]>>[*:1]*");
    }
}
