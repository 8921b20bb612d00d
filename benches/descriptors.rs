use criterion::{black_box, criterion_group, criterion_main, Criterion};

use molkit::descriptors::{
    batch_compute_many_descriptors, clogp, compute_many_descriptors, qed, tpsa,
};
use molkit::smiles::from_smiles;
use molkit::{Atom, Bond, Mol};

const CAFFEINE: &str = "Cn1cnc2c1c(=O)n(C)c(=O)n2C";
const ATORVASTATIN: &str =
    "CC(C)c1c(C(=O)Nc2ccccc2)c(-c2ccccc2)c(-c2ccc(F)cc2)n1CC[C@@H](O)C[C@@H](O)CC(=O)O";

fn library() -> Vec<Mol<Atom, Bond>> {
    [
        "CCO",
        "CC(=O)Oc1ccccc1C(=O)O",
        CAFFEINE,
        ATORVASTATIN,
        "c1ccc2ccccc2c1",
        "CN1CCC[C@H]1c1cccnc1",
        "OC[C@H]1OC(O)[C@H](O)[C@@H](O)[C@@H]1O",
        "CC(C)Cc1ccc(cc1)C(C)C(=O)O",
    ]
    .iter()
    .cycle()
    .take(64)
    .map(|s| from_smiles(s).unwrap())
    .collect()
}

fn bench_single(c: &mut Criterion) {
    let mol = from_smiles(ATORVASTATIN).unwrap();

    let mut group = c.benchmark_group("atorvastatin");
    group.bench_function("tpsa", |b| b.iter(|| black_box(tpsa(&mol))));
    group.bench_function("clogp", |b| b.iter(|| black_box(clogp(&mol))));
    group.bench_function("qed", |b| b.iter(|| black_box(qed(&mol))));
    group.bench_function("default_set", |b| {
        b.iter(|| black_box(compute_many_descriptors(&mol, &[]).unwrap()))
    });
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mols = library();

    let mut group = c.benchmark_group("batch_64");
    group.sample_size(10);
    group.bench_function("one_thread", |b| {
        b.iter(|| black_box(batch_compute_many_descriptors(&mols, &[], Some(1)).unwrap()))
    });
    group.bench_function("all_threads", |b| {
        b.iter(|| black_box(batch_compute_many_descriptors(&mols, &[], None).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_single, bench_batch);
criterion_main!(benches);
