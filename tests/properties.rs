//! Properties every match run must satisfy, checked on random small graphs.

use std::collections::HashSet;

use quickcheck::{quickcheck, Arbitrary, Gen};

use atom_mapping::{
    config::{CliqueMode, MatchConfig, MatchMode},
    graph::{from_parts, LabeledGraph},
    matcher::{LabelEq, Relaxed},
    Mapping, MappingQuery, MatchEngine, MatchResults,
};

#[derive(Clone, Debug)]
struct SmallGraph {
    labels: Vec<bool>,
    edges: Vec<(usize, usize)>,
}

impl Arbitrary for SmallGraph {
    fn arbitrary(g: &mut Gen) -> Self {
        let n = usize::arbitrary(g) % 6;
        let labels: Vec<bool> = (0..n).map(|_| bool::arbitrary(g)).collect();
        let mut edges = Vec::new();
        if n > 1 {
            for _ in 0..usize::arbitrary(g) % (2 * n) {
                let u = usize::arbitrary(g) % n;
                let v = usize::arbitrary(g) % n;
                let e = (u.min(v), u.max(v));
                if u != v && !edges.contains(&e) {
                    edges.push(e);
                }
            }
        }
        Self { labels, edges }
    }
}

impl SmallGraph {
    fn graph(&self) -> LabeledGraph<bool, ()> {
        from_parts(
            self.labels.clone(),
            self.edges.iter().map(|&(u, v)| (u, v, ())),
        )
        .unwrap()
    }

    fn adjacent(&self, u: usize, v: usize) -> bool {
        self.edges.contains(&(u.min(v), u.max(v)))
    }

    /// The same graph plus one node of `label` with no edges.
    fn with_isolated(&self, label: bool) -> SmallGraph {
        let mut labels = self.labels.clone();
        labels.push(label);
        Self {
            labels,
            edges: self.edges.clone(),
        }
    }

    /// Are the nodes in `nodes` joined into one piece by edges among them?
    fn spans_one_piece(&self, nodes: &[usize]) -> bool {
        let Some(&first) = nodes.first() else {
            return true;
        };
        let mut reached = vec![first];
        let mut stack = vec![first];
        while let Some(u) = stack.pop() {
            for &v in nodes {
                if !reached.contains(&v) && self.adjacent(u, v) {
                    reached.push(v);
                    stack.push(v);
                }
            }
        }
        reached.len() == nodes.len()
    }
}

fn mcs(s: &SmallGraph, t: &SmallGraph, clique_mode: CliqueMode) -> MatchResults {
    MatchEngine::new(MatchConfig::default().with_clique_mode(clique_mode))
        .run(&s.graph(), &t.graph(), &LabelEq, &LabelEq)
        .unwrap()
}

/// Labels agree and adjacency is preserved in both directions.
fn is_common_induced_subgraph(m: &Mapping, s: &SmallGraph, t: &SmallGraph) -> bool {
    let pairs: Vec<_> = m.iter().collect();
    pairs.iter().all(|&(a, b)| s.labels[a] == t.labels[b])
        && pairs.iter().all(|&(a1, b1)| {
            pairs
                .iter()
                .filter(|&&(a2, _)| a2 != a1)
                .all(|&(a2, b2)| s.adjacent(a1, a2) == t.adjacent(b1, b2))
        })
}

/// Size of the maximum common induced subgraph, by exhaustive search.
fn brute_force_mcis(s: &SmallGraph, t: &SmallGraph) -> usize {
    fn go(
        i: usize,
        s: &SmallGraph,
        t: &SmallGraph,
        map: &mut Vec<Option<usize>>,
        used: &mut [bool],
    ) -> usize {
        if i == s.labels.len() {
            return map.iter().flatten().count();
        }
        map.push(None);
        let mut best = go(i + 1, s, t, map, used);
        map.pop();

        for j in 0..t.labels.len() {
            if used[j] || s.labels[i] != t.labels[j] {
                continue;
            }
            let consistent = map.iter().enumerate().all(|(k, image)| match image {
                Some(tk) => s.adjacent(i, k) == t.adjacent(j, *tk),
                None => true,
            });
            if consistent {
                map.push(Some(j));
                used[j] = true;
                best = best.max(go(i + 1, s, t, map, used));
                used[j] = false;
                map.pop();
            }
        }
        best
    }
    go(0, s, t, &mut Vec::new(), &mut vec![false; t.labels.len()])
}

quickcheck! {
    fn prop_upper_bound(s: SmallGraph, t: SmallGraph) -> bool {
        let results = mcs(&s, &t, CliqueMode::Connected);
        results.max_size() <= s.labels.len().min(t.labels.len())
    }

    fn prop_mappings_are_valid_and_distinct(s: SmallGraph, t: SmallGraph) -> bool {
        let results = mcs(&s, &t, CliqueMode::Connected);
        let distinct: HashSet<&Mapping> = results.all_mappings().iter().collect();
        distinct.len() == results.len()
            && results.all_mappings().iter().all(|m| {
                let targets: HashSet<usize> = m.iter().map(|(_, b)| b).collect();
                targets.len() == m.len()
                    && m.len() == results.max_size()
                    && is_common_induced_subgraph(m, &s, &t)
            })
    }

    fn prop_disconnected_mode_is_exact(s: SmallGraph, t: SmallGraph) -> bool {
        mcs(&s, &t, CliqueMode::Disconnected).max_size() == brute_force_mcis(&s, &t)
    }

    fn prop_connected_never_beats_disconnected(s: SmallGraph, t: SmallGraph) -> bool {
        mcs(&s, &t, CliqueMode::Connected).max_size()
            <= mcs(&s, &t, CliqueMode::Disconnected).max_size()
    }

    fn prop_connected_mappings_are_one_piece(s: SmallGraph, t: SmallGraph) -> bool {
        mcs(&s, &t, CliqueMode::Connected).all_mappings().iter().all(|m| {
            let nodes: Vec<usize> = m.iter().map(|(a, _)| a).collect();
            s.spans_one_piece(&nodes)
        })
    }

    fn prop_isolated_node_never_shrinks(s: SmallGraph, t: SmallGraph, label: bool) -> bool {
        let grown = s.with_isolated(label);
        [CliqueMode::Connected, CliqueMode::Disconnected]
            .into_iter()
            .all(|mode| mcs(&grown, &t, mode).max_size() >= mcs(&s, &t, mode).max_size())
    }

    fn prop_size_is_deterministic(s: SmallGraph, t: SmallGraph) -> bool {
        let first = mcs(&s, &t, CliqueMode::Connected).max_size();
        first == mcs(&s, &t, CliqueMode::Connected).max_size()
    }

    fn prop_self_match(s: SmallGraph) -> bool {
        let results = mcs(&s, &s, CliqueMode::Disconnected);
        s.labels.is_empty() || (results.is_subgraph() && results.max_size() == s.labels.len())
    }

    fn prop_relaxing_edges_never_shrinks(s: SmallGraph, t: SmallGraph) -> bool {
        let strict = mcs(&s, &t, CliqueMode::Connected);
        let relaxed = MatchEngine::default()
            .run(&s.graph(), &t.graph(), &LabelEq, &Relaxed(LabelEq))
            .unwrap();
        relaxed.max_size() >= strict.max_size()
    }

    fn prop_subgraph_search_agrees_with_mcs(s: SmallGraph, t: SmallGraph) -> bool {
        if s.labels.len() > t.labels.len() || s.labels.is_empty() {
            return true;
        }
        let first = MatchEngine::new(MatchConfig::new(MatchMode::FirstSubgraph))
            .run(&s.graph(), &t.graph(), &LabelEq, &LabelEq)
            .unwrap();
        let exact = mcs(&s, &t, CliqueMode::Disconnected);
        first.is_subgraph() == exact.is_subgraph()
    }
}
