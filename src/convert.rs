//! Conversions between text formats and molecules, plus the clean-up
//! steps reaction outputs usually need.

use tracing::debug;

use crate::aromaticity::clear_aromaticity;
use crate::atom::Atom;
use crate::bond::Bond;
use crate::hydrogens::add_hs;
use crate::kekulize::kekulize;
use crate::mol::Mol;
use crate::sanitize::{sanitize, SanitizeError};
use crate::smarts::{self, mol_to_query, AtomExpr, BondExpr, SmartsError};
use crate::smiles::{self, fold_explicit_hydrogens, SmilesError, SmilesWriteOptions};
use crate::valence::assign_implicit_hs;

pub use crate::mdl::{from_molblock, to_molblock};

/// Options for [`to_mol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToMolOptions {
    pub sanitize: bool,
    /// Turn attached hydrogens into graph atoms.
    pub add_hs: bool,
    /// Resolve aromatic bonds and drop the aromatic flags.
    pub kekulize: bool,
}

impl Default for ToMolOptions {
    fn default() -> Self {
        Self {
            sanitize: true,
            add_hs: false,
            kekulize: false,
        }
    }
}

/// Parses SMILES into a molecule.
///
/// ```
/// use molkit::convert::{to_mol, ToMolOptions};
///
/// let opts = ToMolOptions { add_hs: true, ..Default::default() };
/// let water = to_mol("O", opts).unwrap();
/// assert_eq!(water.atom_count(), 3);
/// ```
pub fn to_mol(smiles: &str, opts: ToMolOptions) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mut mol = if opts.sanitize {
        smiles::from_smiles(smiles)?
    } else {
        smiles::from_smiles_unsanitized(smiles)?
    };
    if opts.kekulize {
        if !opts.sanitize {
            assign_implicit_hs(&mut mol);
            kekulize(&mut mol).map_err(SanitizeError::from)?;
        }
        clear_aromaticity(&mut mol);
    }
    if opts.add_hs {
        mol = add_hs(&mol);
    }
    Ok(mol)
}

pub fn to_smiles(mol: &Mol<Atom, Bond>, opts: &SmilesWriteOptions) -> String {
    smiles::to_smiles_with(mol, opts)
}

/// Writes `mol` as a SMARTS pattern that matches itself.
pub fn to_smarts(mol: &Mol<Atom, Bond>) -> String {
    smarts::to_smarts(&mol_to_query(mol))
}

pub fn from_smarts(s: &str) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
    smarts::from_smarts(s)
}

/// Returns a sanitized copy of `mol`, or `None` when it cannot be
/// sanitized.
///
/// With `sanifix`, a failed kekulization is retried with one extra
/// hydrogen on each aromatic nitrogen in turn, which repairs pyrrole-type
/// nitrogens written as bare `n`.
pub fn sanitize_mol(mol: &Mol<Atom, Bond>, sanifix: bool) -> Option<Mol<Atom, Bond>> {
    let mut out = mol.clone();
    let err = match sanitize(&mut out) {
        Ok(()) => return Some(out),
        Err(e) => e,
    };
    debug!("sanitization failed: {err}");
    if !sanifix || !matches!(err, SanitizeError::Kekulize(_)) {
        return None;
    }

    let candidates: Vec<_> = mol
        .atoms()
        .filter(|&idx| {
            let atom = mol.atom(idx);
            atom.atomic_num == 7 && atom.is_aromatic && atom.explicit_h == 0
        })
        .collect();
    for idx in candidates {
        let mut fixed = mol.clone();
        {
            let atom = fixed.atom_mut(idx);
            atom.explicit_h = 1;
            atom.no_implicit = true;
        }
        if sanitize(&mut fixed).is_ok() {
            debug!("sanifix: added H to aromatic N {}", idx.index());
            return Some(fixed);
        }
    }
    None
}

/// Replaces dummy atoms (`*`) by hydrogen and folds those hydrogens into
/// their neighbors.
pub fn remove_dummies(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let mut out = mol.clone();
    let dummies: Vec<_> = out.atoms().filter(|&i| out.atom(i).is_dummy()).collect();
    if dummies.is_empty() {
        return out;
    }
    for idx in dummies {
        *out.atom_mut(idx) = Atom {
            no_implicit: true,
            ..Atom::new(1)
        };
    }
    fold_explicit_hydrogens(&mut out);
    assign_implicit_hs(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::{from_smiles_unsanitized, to_smiles as write};

    fn canon(s: &str) -> String {
        write(&smiles::from_smiles(s).unwrap())
    }

    #[test]
    fn to_mol_options() {
        let mol = to_mol("c1ccccc1", ToMolOptions::default()).unwrap();
        assert!(mol.atoms().all(|i| mol.atom(i).is_aromatic));

        let opts = ToMolOptions {
            kekulize: true,
            ..Default::default()
        };
        let mol = to_mol("c1ccccc1", opts).unwrap();
        assert!(mol.atoms().all(|i| !mol.atom(i).is_aromatic));
        assert!(mol.bonds().all(|e| !mol.bond(e).is_aromatic));

        let opts = ToMolOptions {
            sanitize: false,
            kekulize: true,
            ..Default::default()
        };
        let mol = to_mol("c1ccccc1", opts).unwrap();
        assert!(mol.atoms().all(|i| !mol.atom(i).is_aromatic));

        let opts = ToMolOptions {
            add_hs: true,
            ..Default::default()
        };
        assert_eq!(to_mol("CC", opts).unwrap().atom_count(), 8);
        assert!(to_mol("C(", ToMolOptions::default()).is_err());
    }

    #[test]
    fn kekule_smiles_output() {
        let opts = SmilesWriteOptions {
            kekule: true,
            ..Default::default()
        };
        let out = to_smiles(&smiles::from_smiles("c1ccccc1").unwrap(), &opts);
        assert!(out.contains('='));
        assert!(!out.contains('c'));
    }

    #[test]
    fn smarts_of_a_molecule() {
        assert_eq!(to_smarts(&smiles::from_smiles("CC(=O)O").unwrap()), "C-C(=O)-O");
        assert!(from_smarts("[C;!R]").is_ok());
        assert!(from_smarts("[C").is_err());
    }

    #[test]
    fn sanitize_mol_plain() {
        let mol = from_smiles_unsanitized("c1ccccc1").unwrap();
        assert!(sanitize_mol(&mol, false).is_some());
        let bad = from_smiles_unsanitized("FC(F)(F)(F)F").unwrap();
        assert!(sanitize_mol(&bad, true).is_none());
    }

    #[test]
    fn sanifix_repairs_pyrrole_nitrogen() {
        let mol = from_smiles_unsanitized("c1ccnc1").unwrap();
        assert!(sanitize_mol(&mol, false).is_none());
        let fixed = sanitize_mol(&mol, true).unwrap();
        assert_eq!(write(&fixed), canon("c1cc[nH]c1"));
    }

    #[test]
    fn dummies_become_hydrogens() {
        let mol = smiles::from_smiles("*CCO").unwrap();
        assert_eq!(write(&remove_dummies(&mol)), canon("CCO"));

        let mol = smiles::from_smiles("*c1ccccc1").unwrap();
        assert_eq!(write(&remove_dummies(&mol)), canon("c1ccccc1"));

        let mol = smiles::from_smiles("[NH3+]*").unwrap();
        assert_eq!(write(&remove_dummies(&mol)), canon("[NH4+]"));

        let mol = smiles::from_smiles("CCO").unwrap();
        assert_eq!(remove_dummies(&mol), mol);
    }
}
