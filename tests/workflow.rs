use std::fs::File;

use tempdir::TempDir;

use molkit::descriptors::batch_compute_many_descriptors;
use molkit::hydrogens::{add_hs, remove_hs};
use molkit::mdl::{from_molblock, to_molblock};
use molkit::reactions::{
    apply_reaction, rxn_from_block_file, rxn_from_smarts, rxn_to_block_file, ApplyOptions,
};
use molkit::smiles::from_smiles;

#[test]
fn batch_descriptors_through_csv_file() {
    let dir = TempDir::new("molkit-workflow").unwrap();
    let path = dir.path().join("descriptors.csv");

    let mols: Vec<_> = ["CCO", "c1ccccc1", "CC(=O)Oc1ccccc1C(=O)O"]
        .iter()
        .map(|s| from_smiles(s).unwrap())
        .collect();
    let table =
        batch_compute_many_descriptors(&mols, &["n_heavy_atoms", "n_aromatic_rings"], Some(2))
            .unwrap();
    table.write_csv(File::create(&path).unwrap()).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["n_heavy_atoms", "n_aromatic_rings"]);

    let rows: Vec<Vec<f64>> = rdr
        .records()
        .map(|r| r.unwrap().iter().map(|v| v.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows, vec![vec![3.0, 0.0], vec![6.0, 1.0], vec![13.0, 1.0]]);
}

#[test]
fn reaction_survives_rxn_file() {
    let dir = TempDir::new("molkit-workflow").unwrap();
    let path = dir.path().join("amide.rxn");

    let rxn = rxn_from_smarts("[C:1](=[O:2])[OH].[N;H2:3]>>[C:1](=[O:2])[N:3]").unwrap();
    rxn_to_block_file(&rxn, &path, false, false).unwrap();
    let reread = rxn_from_block_file(&path, false).unwrap();

    let acid = from_smiles("CC(=O)O").unwrap();
    let amine = from_smiles("CN").unwrap();
    let opts = ApplyOptions {
        as_smiles: true,
        ..Default::default()
    };
    let before = apply_reaction(&rxn, &[&acid, &amine], &opts).unwrap();
    let after = apply_reaction(&reread, &[&acid, &amine], &opts).unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(
        before[0][0].as_ref().and_then(|p| p.as_smiles()),
        after[0][0].as_ref().and_then(|p| p.as_smiles())
    );
}

#[test]
fn molblock_with_explicit_hydrogens() {
    let mol = from_smiles("OC(=O)c1ccccc1").unwrap();
    let with_hs = add_hs(&mol);
    assert_eq!(with_hs.atom_count(), 15);

    let back = remove_hs(&from_molblock(&to_molblock(&with_hs)).unwrap());
    assert_eq!(back.atom_count(), mol.atom_count());
    let hs = |m: &molkit::Mol<molkit::Atom, molkit::Bond>| -> Vec<u8> {
        m.atoms().map(|i| m.atom(i).total_h()).collect()
    };
    assert_eq!(hs(&back), hs(&mol));
}
