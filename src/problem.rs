//! The read-only inputs of one match run, shared by every search component.

use crate::{
    error::{MatchError, Side},
    graph::{GraphView, LabeledGraph},
    mapping::{Mapping, MappingError},
    matcher::{EdgeMatcher, NodeMatcher, Topology},
};

/// How two node pairs relate once both are in a mapping.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Link {
    /// Both graphs join the pairs by matching edges (a c-edge).
    Bonded,
    /// The pairs may coexist without a matching edge (a d-edge).
    Unbonded,
}

/// Both input graphs, indexed, plus the caller's matchers.
pub struct MatchProblem<'a, N, E, M, B> {
    source: GraphView<'a, N, E>,
    target: GraphView<'a, N, E>,
    nodes: &'a M,
    edges: &'a B,
}

impl<'a, N, E, M, B> MatchProblem<'a, N, E, M, B>
where
    M: NodeMatcher<N>,
    B: EdgeMatcher<E>,
{
    /// Index both graphs, failing on malformed input.
    pub fn new(
        source: &'a LabeledGraph<N, E>,
        target: &'a LabeledGraph<N, E>,
        nodes: &'a M,
        edges: &'a B,
    ) -> Result<Self, MatchError> {
        Ok(Self {
            source: GraphView::new(source, Side::Source)?,
            target: GraphView::new(target, Side::Target)?,
            nodes,
            edges,
        })
    }

    pub fn source(&self) -> &GraphView<'a, N, E> {
        &self.source
    }

    pub fn target(&self) -> &GraphView<'a, N, E> {
        &self.target
    }

    pub fn topology(&self) -> Topology {
        self.edges.topology()
    }

    /// The largest mapping any search could possibly return.
    pub fn max_possible(&self) -> usize {
        self.source.node_count().min(self.target.node_count())
    }

    /// Is `mapping` a single fragment, its pairs joined through
    /// [`Link::Bonded`] links? Mappings of fewer than two pairs always are.
    pub fn is_bonded_fragment(&self, mapping: &Mapping) -> bool {
        let oriented = self.forward();
        let pairs: Vec<_> = mapping.iter().collect();
        if pairs.len() < 2 {
            return true;
        }

        let mut reached = vec![false; pairs.len()];
        let mut stack = vec![0];
        reached[0] = true;
        while let Some(i) = stack.pop() {
            for j in 0..pairs.len() {
                if !reached[j] && oriented.link(pairs[i], pairs[j]) == Some(Link::Bonded) {
                    reached[j] = true;
                    stack.push(j);
                }
            }
        }
        reached.into_iter().all(|r| r)
    }

    /// Source as query, target as data.
    pub fn forward(&self) -> Oriented<'_, 'a, N, E, M, B> {
        Oriented {
            problem: self,
            swapped: false,
        }
    }

    /// The smaller graph as query, so that recursion runs over fewer nodes.
    pub fn smaller_first(&self) -> Oriented<'_, 'a, N, E, M, B> {
        Oriented {
            problem: self,
            swapped: self.source.node_count() > self.target.node_count(),
        }
    }
}

/// A [`MatchProblem`] seen from one direction: searches map `query` nodes
/// onto `data` nodes and never need to know whether that means source onto
/// target or the reverse.
pub struct Oriented<'p, 'a, N, E, M, B> {
    problem: &'p MatchProblem<'a, N, E, M, B>,
    swapped: bool,
}

impl<'p, 'a, N, E, M, B> Oriented<'p, 'a, N, E, M, B>
where
    M: NodeMatcher<N>,
    B: EdgeMatcher<E>,
{
    pub fn query(&self) -> &'p GraphView<'a, N, E> {
        if self.swapped {
            &self.problem.target
        } else {
            &self.problem.source
        }
    }

    pub fn data(&self) -> &'p GraphView<'a, N, E> {
        if self.swapped {
            &self.problem.source
        } else {
            &self.problem.target
        }
    }

    pub fn is_swapped(&self) -> bool {
        self.swapped
    }

    pub fn source_count(&self) -> usize {
        self.problem.source.node_count()
    }

    pub fn target_count(&self) -> usize {
        self.problem.target.node_count()
    }

    pub fn topology(&self) -> Topology {
        self.problem.topology()
    }

    /// May query node `q` map onto data node `d`?
    pub fn nodes_match(&self, q: usize, d: usize) -> bool {
        let (ql, dl) = (self.query().label(q), self.data().label(d));
        if self.swapped {
            self.problem.nodes.matches(dl, ql)
        } else {
            self.problem.nodes.matches(ql, dl)
        }
    }

    fn edges_match(&self, qe: &E, de: &E) -> bool {
        if self.swapped {
            self.problem.edges.matches(de, qe)
        } else {
            self.problem.edges.matches(qe, de)
        }
    }

    /// Relation between pairs `(q1, d1)` and `(q2, d2)`, or `None` if they
    /// cannot both be in one mapping. Pairs sharing a node on either side are
    /// never compatible.
    pub fn link(&self, (q1, d1): (usize, usize), (q2, d2): (usize, usize)) -> Option<Link> {
        if q1 == q2 || d1 == d2 {
            return None;
        }
        let strict = self.topology() == Topology::Strict;
        match (self.query().edge(q1, q2), self.data().edge(d1, d2)) {
            (Some(qe), Some(de)) => {
                if self.edges_match(qe, de) {
                    Some(Link::Bonded)
                } else if strict {
                    None
                } else {
                    Some(Link::Unbonded)
                }
            }
            (None, None) => Some(Link::Unbonded),
            _ if strict => None,
            _ => Some(Link::Unbonded),
        }
    }

    /// Turn `(query, data)` pairs into a source-to-target [`Mapping`].
    pub fn to_mapping(
        &self,
        pairs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Mapping, MappingError> {
        if self.swapped {
            Mapping::from_pairs(pairs.into_iter().map(|(q, d)| (d, q)))
        } else {
            Mapping::from_pairs(pairs)
        }
    }

    /// Turn a source-to-target [`Mapping`] into `(query, data)` pairs.
    pub fn pairs_of(&self, mapping: &Mapping) -> Vec<(usize, usize)> {
        if self.swapped {
            mapping.iter().map(|(s, t)| (t, s)).collect()
        } else {
            mapping.iter().collect()
        }
    }
}
