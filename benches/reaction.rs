use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use molkit::reactions::{
    apply_reaction_with_rng, find_reactant_position, rxn_from_block, rxn_from_smarts,
    rxn_to_block, ApplyOptions, ATTACHING_RXN,
};
use molkit::smiles::from_smiles;

const ATORVASTATIN: &str =
    "CC(C)c1c(C(=O)Nc2ccccc2)c(-c2ccccc2)c(-c2ccc(F)cc2)n1CC[C@@H](O)C[C@@H](O)CC(=O)O";

fn bench_amide_coupling(c: &mut Criterion) {
    let rxn = rxn_from_smarts("[C:1](=[O:2])[OH].[N;H2:3]>>[C:1](=[O:2])[N:3]").unwrap();
    let acid = from_smiles("OC(=O)c1ccccc1").unwrap();
    let amine = from_smiles("NCc1ccccc1").unwrap();
    let opts = ApplyOptions {
        as_smiles: true,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("apply_amide_coupling", |b| {
        b.iter(|| black_box(apply_reaction_with_rng(&rxn, &[&acid, &amine], &opts, &mut rng).unwrap()))
    });
}

fn bench_attach(c: &mut Criterion) {
    let mol = from_smiles(ATORVASTATIN).unwrap();
    let opts = ApplyOptions {
        single_product_group: true,
        as_smiles: true,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("attach_atorvastatin", |b| {
        b.iter(|| black_box(apply_reaction_with_rng(&ATTACHING_RXN, &[&mol], &opts, &mut rng).unwrap()))
    });
}

fn bench_reactant_position(c: &mut Criterion) {
    let rxn = rxn_from_smarts("[c:1][Br,I:2].[N;H2;!$(NC=O):3]>>[c:1][N:3]").unwrap();
    let mol = from_smiles(ATORVASTATIN).unwrap();

    c.bench_function("find_reactant_position", |b| {
        b.iter(|| black_box(find_reactant_position(&rxn, &mol)))
    });
}

fn bench_rxn_block(c: &mut Criterion) {
    let rxn = rxn_from_smarts("[C:1][Br:2].[OH-:3]>>[C:1][O:3].[Br-:2]").unwrap();
    let block = rxn_to_block(&rxn, false, false);

    let mut group = c.benchmark_group("rxn_block");
    group.bench_function("write", |b| b.iter(|| black_box(rxn_to_block(&rxn, false, false))));
    group.bench_function("read", |b| b.iter(|| black_box(rxn_from_block(&block, true).unwrap())));
    group.finish();
}

criterion_group!(
    benches,
    bench_amide_coupling,
    bench_attach,
    bench_reactant_position,
    bench_rxn_block,
);
criterion_main!(benches);
