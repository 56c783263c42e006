use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use atom_mapping::{
    config::{CliqueMode, MatchConfig, MatchMode},
    graph::from_parts,
    matcher::{AtomMatcher, BondMatcher},
    molecule::{Atom, Bond, BondOrder, Element, Molecule},
    MatchEngine,
};

/// A carbon chain of `n` atoms, closed into a ring if `ring` is set, with an
/// oxygen on the second atom.
fn hydrocarbon(n: usize, ring: bool) -> Molecule {
    let mut atoms = vec![Atom::new(Element::CARBON); n];
    atoms.push(Atom::new(Element::OXYGEN));
    let mut bonds: Vec<_> = (1..n)
        .map(|i| (i - 1, i, Bond::new(BondOrder::Single)))
        .collect();
    if ring && n > 2 {
        bonds.push((n - 1, 0, Bond::new(BondOrder::Single)));
    }
    bonds.push((1, n, Bond::new(BondOrder::Double)));
    Molecule::from_graph(from_parts(atoms, bonds).expect("generated graph is simple"))
}

pub fn generated_pairs(c: &mut Criterion) {
    // Define a new criterion benchmark group of generated molecule pairs.
    let mut group = c.benchmark_group("generated_pairs");
    let modes = [
        ("substructure", MatchConfig::new(MatchMode::FirstSubgraph)),
        ("mcs", MatchConfig::default()),
        (
            "mcs_disconnected",
            MatchConfig::default().with_clique_mode(CliqueMode::Disconnected),
        ),
    ];

    for n in [4, 6, 8] {
        let chain = hydrocarbon(n, false);
        let ring = hydrocarbon(n + 2, true);
        for (label, config) in &modes {
            let engine = MatchEngine::new(config.clone());
            group.bench_with_input(BenchmarkId::new(*label, n), &n, |b, _| {
                b.iter(|| {
                    engine
                        .run(
                            chain.graph(),
                            ring.graph(),
                            &AtomMatcher::element(),
                            &BondMatcher::order(),
                        )
                        .expect("generated inputs are well formed")
                });
            });
        }
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = generated_pairs
}
criterion_main!(benches);
