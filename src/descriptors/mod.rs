//! Molecular descriptors.
//!
//! Each descriptor is a plain function of a sanitized molecule. They can
//! also be looked up by name, either the snake-case name used here
//! (`tpsa`, `clogp`) or the RDKit name (`TPSA`, `MolLogP`), and computed
//! for many molecules at once into a [`DescriptorTable`].

mod constitutional;
mod crippen;
mod esol;
mod qed;
mod rings;
mod tpsa;

use std::io;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::smarts::{from_smarts, AtomExpr, BondExpr};

pub use constitutional::{
    fsp3, mw, n_aromatic_atoms, n_aromatic_atoms_proportion, n_hba, n_hbd, n_heavy_atoms,
    n_hetero_atoms, n_lipinski_hba, n_lipinski_hbd, n_nhoh, n_no, n_radical_electrons,
    n_rotatable_bonds,
};
pub use crippen::{clogp, crippen_contribs};
pub use esol::{esol, esol_from_data, EsolInput};
pub use qed::{qed, qed_from_properties, QedProperties, QED_WEIGHTS};
pub use rings::{
    n_aliphatic_carbocycles, n_aliphatic_heterocycles, n_aliphatic_rings, n_aromatic_carbocycles,
    n_aromatic_heterocycles, n_aromatic_rings, n_rings, n_saturated_carbocycles,
    n_saturated_heterocycles, n_saturated_rings,
};
pub use tpsa::{tpsa, tpsa_contribs};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("unknown descriptor: {0}")]
    UnknownDescriptor(String),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

pub type DescriptorFn = fn(&Mol<Atom, Bond>) -> f64;

pub(crate) fn pattern(smarts: &str) -> Mol<AtomExpr, BondExpr> {
    from_smarts(smarts).expect("built-in SMARTS pattern")
}

macro_rules! as_f64 {
    ($f:path) => {{
        fn wrapped(mol: &Mol<Atom, Bond>) -> f64 {
            $f(mol) as f64
        }
        wrapped as DescriptorFn
    }};
}

/// `(name, RDKit name, function)`.
const REGISTRY: &[(&str, &str, DescriptorFn)] = &[
    ("mw", "MolWt", mw),
    ("fsp3", "FractionCSP3", fsp3),
    ("n_hba", "NumHAcceptors", as_f64!(n_hba)),
    ("n_hbd", "NumHDonors", as_f64!(n_hbd)),
    ("n_lipinski_hba", "NOCount", as_f64!(n_lipinski_hba)),
    ("n_lipinski_hbd", "NHOHCount", as_f64!(n_lipinski_hbd)),
    ("n_no", "NumNO", as_f64!(n_no)),
    ("n_nhoh", "NumNHOH", as_f64!(n_nhoh)),
    ("n_rings", "RingCount", as_f64!(n_rings)),
    ("n_hetero_atoms", "NumHeteroatoms", as_f64!(n_hetero_atoms)),
    ("n_heavy_atoms", "HeavyAtomCount", as_f64!(n_heavy_atoms)),
    ("n_rotatable_bonds", "NumRotatableBonds", as_f64!(n_rotatable_bonds)),
    ("n_radical_electrons", "NumRadicalElectrons", as_f64!(n_radical_electrons)),
    ("tpsa", "TPSA", tpsa),
    ("qed", "qed", qed),
    ("clogp", "MolLogP", clogp),
    ("esol", "ESOL", esol),
    ("n_aromatic_atoms", "NumAromaticAtoms", as_f64!(n_aromatic_atoms)),
    ("n_aromatic_atoms_proportion", "AromaticProportion", n_aromatic_atoms_proportion),
    ("n_aliphatic_carbocycles", "NumAliphaticCarbocycles", as_f64!(n_aliphatic_carbocycles)),
    ("n_aliphatic_heterocycles", "NumAliphaticHeterocycles", as_f64!(n_aliphatic_heterocycles)),
    ("n_aliphatic_rings", "NumAliphaticRings", as_f64!(n_aliphatic_rings)),
    ("n_aromatic_carbocycles", "NumAromaticCarbocycles", as_f64!(n_aromatic_carbocycles)),
    ("n_aromatic_heterocycles", "NumAromaticHeterocycles", as_f64!(n_aromatic_heterocycles)),
    ("n_aromatic_rings", "NumAromaticRings", as_f64!(n_aromatic_rings)),
    ("n_saturated_carbocycles", "NumSaturatedCarbocycles", as_f64!(n_saturated_carbocycles)),
    ("n_saturated_heterocycles", "NumSaturatedHeterocycles", as_f64!(n_saturated_heterocycles)),
    ("n_saturated_rings", "NumSaturatedRings", as_f64!(n_saturated_rings)),
];

/// Descriptors computed when no explicit set is given.
pub const DEFAULT_DESCRIPTORS: &[&str] = &[
    "mw",
    "fsp3",
    "n_lipinski_hba",
    "n_lipinski_hbd",
    "n_rings",
    "n_hetero_atoms",
    "n_heavy_atoms",
    "n_rotatable_bonds",
    "n_radical_electrons",
    "tpsa",
    "qed",
    "clogp",
    "n_aliphatic_carbocycles",
    "n_aliphatic_heterocycles",
    "n_aliphatic_rings",
    "n_aromatic_carbocycles",
    "n_aromatic_heterocycles",
    "n_aromatic_rings",
    "n_saturated_carbocycles",
    "n_saturated_heterocycles",
    "n_saturated_rings",
];

/// Every registered name, snake-case first.
pub fn descriptor_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|&(name, _, _)| name)
}

/// Looks a descriptor up by its snake-case or RDKit name.
///
/// ```
/// use molkit::descriptors::any_descriptor;
/// use molkit::smiles::from_smiles;
///
/// let tpsa = any_descriptor("TPSA").unwrap();
/// let ethanol = from_smiles("CCO").unwrap();
/// assert!((tpsa(&ethanol) - 20.23).abs() < 1e-6);
/// ```
pub fn any_descriptor(name: &str) -> Result<DescriptorFn, DescriptorError> {
    REGISTRY
        .iter()
        .find(|&&(short, rdkit, _)| short == name || rdkit == name)
        .map(|&(_, _, f)| f)
        .ok_or_else(|| DescriptorError::UnknownDescriptor(name.to_string()))
}

fn resolve(names: &[&str]) -> Result<Vec<DescriptorFn>, DescriptorError> {
    names.iter().map(|name| any_descriptor(name)).collect()
}

/// Computes `names` (or [`DEFAULT_DESCRIPTORS`] when empty) for one
/// molecule, in order.
pub fn compute_many_descriptors(
    mol: &Mol<Atom, Bond>,
    names: &[&str],
) -> Result<Vec<(String, f64)>, DescriptorError> {
    let names = if names.is_empty() {
        DEFAULT_DESCRIPTORS
    } else {
        names
    };
    let funcs = resolve(names)?;
    Ok(names
        .iter()
        .zip(funcs)
        .map(|(name, f)| (name.to_string(), f(mol)))
        .collect())
}

/// One row of descriptor values per molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl DescriptorTable {
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = f64> + '_> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(move |row| row[idx]))
    }

    /// Writes a header line and one record per row.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        self.write_records(writer, None::<(&str, &[&str])>)
    }

    /// Like [`write_csv`](Self::write_csv), with a leading `id_header`
    /// column holding `ids[i]` on row `i`. Rows without an id get an empty
    /// field.
    pub fn write_csv_with_ids<W: io::Write, S: AsRef<str>>(
        &self,
        writer: W,
        id_header: &str,
        ids: &[S],
    ) -> Result<(), csv::Error> {
        self.write_records(writer, Some((id_header, ids)))
    }

    fn write_records<W: io::Write, S: AsRef<str>>(
        &self,
        writer: W,
        ids: Option<(&str, &[S])>,
    ) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = Vec::with_capacity(self.columns.len() + 1);
        if let Some((id_header, _)) = ids {
            header.push(id_header);
        }
        header.extend(self.columns.iter().map(String::as_str));
        wtr.write_record(&header)?;
        for (i, row) in self.rows.iter().enumerate() {
            let mut record = Vec::with_capacity(row.len() + 1);
            if let Some((_, ids)) = ids {
                record.push(ids.get(i).map_or("", |s| s.as_ref()).to_string());
            }
            record.extend(row.iter().map(|v| v.to_string()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Computes `names` for every molecule on a rayon pool of `n_jobs` threads
/// (all cores when `None`). Row order follows `mols`.
pub fn batch_compute_many_descriptors(
    mols: &[Mol<Atom, Bond>],
    names: &[&str],
    n_jobs: Option<usize>,
) -> Result<DescriptorTable, DescriptorError> {
    let names = if names.is_empty() {
        DEFAULT_DESCRIPTORS
    } else {
        names
    };
    let funcs = resolve(names)?;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = n_jobs {
        builder = builder.num_threads(n);
    }
    let pool = builder
        .build()
        .map_err(|e| DescriptorError::ThreadPool(e.to_string()))?;

    info!(
        molecules = mols.len(),
        descriptors = names.len(),
        threads = pool.current_num_threads(),
        "computing descriptors"
    );
    let rows: Vec<Vec<f64>> = pool.install(|| {
        mols.par_iter()
            .map(|mol| funcs.iter().map(|f| f(mol)).collect())
            .collect()
    });
    debug!(rows = rows.len(), "descriptors done");

    Ok(DescriptorTable {
        columns: names.iter().map(|s| s.to_string()).collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn mols(smiles: &[&str]) -> Vec<Mol<Atom, Bond>> {
        smiles.iter().map(|s| from_smiles(s).unwrap()).collect()
    }

    #[test]
    fn lookup_by_either_name() {
        let ethanol = from_smiles("CCO").unwrap();
        let a = any_descriptor("MolLogP").unwrap();
        let b = any_descriptor("clogp").unwrap();
        assert_eq!(a(&ethanol), b(&ethanol));
        assert_eq!(any_descriptor("NumHDonors").unwrap()(&ethanol), 1.0);
        assert_eq!(
            any_descriptor("NotADescriptor").unwrap_err(),
            DescriptorError::UnknownDescriptor("NotADescriptor".into())
        );
    }

    #[test]
    fn registry_names_are_unique() {
        let mut names: Vec<_> = REGISTRY
            .iter()
            .flat_map(|&(a, b, _)| [a, b])
            .collect();
        let len = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), len);
        for name in DEFAULT_DESCRIPTORS {
            assert!(descriptor_names().any(|n| n == *name), "{name}");
        }
    }

    #[test]
    fn compute_many_default_set() {
        let ethanol = from_smiles("CCO").unwrap();
        let values = compute_many_descriptors(&ethanol, &[]).unwrap();
        let names: Vec<_> = values.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, DEFAULT_DESCRIPTORS);
        let tpsa = values.iter().find(|(n, _)| n == "tpsa").unwrap().1;
        assert!((tpsa - 20.23).abs() < 1e-6);
    }

    #[test]
    fn compute_many_unknown_name() {
        let ethanol = from_smiles("CCO").unwrap();
        assert!(compute_many_descriptors(&ethanol, &["mw", "bogus"]).is_err());
    }

    #[test]
    fn batch_keeps_row_order() {
        let input = mols(&["C", "CC", "CCC", "CCCC", "c1ccccc1"]);
        let table = batch_compute_many_descriptors(&input, &["n_heavy_atoms", "TPSA"], Some(2))
            .unwrap();
        assert_eq!(table.columns, vec!["n_heavy_atoms", "TPSA"]);
        let heavy: Vec<f64> = table.column("n_heavy_atoms").unwrap().collect();
        assert_eq!(heavy, vec![1.0, 2.0, 3.0, 4.0, 6.0]);
        assert!(table.column("mw").is_none());
    }

    #[test]
    fn batch_writes_csv() {
        let input = mols(&["CCO", "O"]);
        let table = batch_compute_many_descriptors(&input, &["n_heavy_atoms", "n_hbd"], None)
            .unwrap();
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "n_heavy_atoms,n_hbd\n3,1\n1,0\n");
    }

    #[test]
    fn csv_with_leading_ids() {
        let input = mols(&["CCO", "O"]);
        let table = batch_compute_many_descriptors(&input, &["n_heavy_atoms"], Some(1)).unwrap();
        let mut out = Vec::new();
        table
            .write_csv_with_ids(&mut out, "smiles", &["CCO", "O"])
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "smiles,n_heavy_atoms\nCCO,3\nO,1\n");

        let mut out = Vec::new();
        table.write_csv_with_ids(&mut out, "id", &["a"]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id,n_heavy_atoms\na,3\n,1\n");
    }
}
