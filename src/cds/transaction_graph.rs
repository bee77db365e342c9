/*
 * Copyright (c) Facebook, Inc. and its affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */
use crate::cds::error::{CdsError, CdsResult};
use crate::cds::literal::{canonical_edge, literal_to_index, Edge, LiteralId};
use crate::cds::triangular_matrix::TriangularMatrix;
use rand::seq::SliceRandom;
use rand::Rng;
use roaring::RoaringBitmap;

/// Maximum number of disjoint complement-cliques (independent sets in
/// `G`) the heuristic in `complement_cliques` will return.
pub const COMPLEMENT_CLIQUE_COUNT: usize = 5;

/// Literal graph over `2*n_concrete` nodes: edge queries, neighbor
/// queries, and the clique-disjointness predicate that is the hot path
/// of the whole engine. Built once, as the complement of a conflict
/// edge set, and treated as read-only for the remainder of a solve.
pub struct TransactionGraph {
    n_concrete: i64,
    matrix: TriangularMatrix,
    num_edges: usize,
}

impl TransactionGraph {
    /// Builds the transaction graph as the complement of `conflicts`
    /// over `2*n_concrete` literal nodes.
    pub fn from_conflicts(n_concrete: i64, conflicts: &[Edge]) -> CdsResult<Self> {
        let n = (2 * n_concrete) as usize;
        let mut matrix = TriangularMatrix::new(n);
        for (a, b) in conflicts {
            let ia = literal_to_index(*a, n_concrete)?;
            let ib = literal_to_index(*b, n_concrete)?;
            matrix.set(ia, ib, true)?;
        }
        matrix.flip();
        let num_edges = matrix.popcount();
        Ok(Self {
            n_concrete,
            matrix,
            num_edges,
        })
    }

    pub fn n_concrete(&self) -> i64 {
        self.n_concrete
    }

    pub fn n_nodes(&self) -> usize {
        self.matrix.n()
    }

    pub fn n_edges(&self) -> usize {
        self.num_edges
    }

    fn idx(&self, l: LiteralId) -> CdsResult<usize> {
        literal_to_index(l, self.n_concrete)
    }

    /// All literals `±1..±n_concrete`, negatives first then positives —
    /// i.e. in index order.
    pub fn all_literals(&self) -> Vec<LiteralId> {
        let mut v = Vec::with_capacity(self.n_nodes());
        for i in (1..=self.n_concrete).rev() {
            v.push(LiteralId::new(-i));
        }
        for i in 1..=self.n_concrete {
            v.push(LiteralId::new(i));
        }
        v
    }

    fn literal_for_index(&self, idx: usize) -> LiteralId {
        let idx = idx as i64;
        if idx < self.n_concrete {
            LiteralId::new(idx - self.n_concrete)
        } else {
            LiteralId::new(idx - self.n_concrete + 1)
        }
    }

    pub fn has_edge(&self, a: LiteralId, b: LiteralId) -> CdsResult<bool> {
        let ia = self.idx(a)?;
        let ib = self.idx(b)?;
        self.matrix.get(ia, ib)
    }

    /// Adds the edge `(a,b)` if absent. Idempotent: returns `false` if
    /// the edge was already present.
    pub fn add_edge(&mut self, a: LiteralId, b: LiteralId) -> CdsResult<bool> {
        let ia = self.idx(a)?;
        let ib = self.idx(b)?;
        if self.matrix.get(ia, ib)? {
            return Ok(false);
        }
        self.matrix.set(ia, ib, true)?;
        self.num_edges += 1;
        Ok(true)
    }

    pub fn remove_edge(&mut self, a: LiteralId, b: LiteralId) -> CdsResult<bool> {
        let ia = self.idx(a)?;
        let ib = self.idx(b)?;
        if !self.matrix.get(ia, ib)? {
            return Ok(false);
        }
        self.matrix.set(ia, ib, false)?;
        self.num_edges -= 1;
        Ok(true)
    }

    pub fn neighbors(&self, l: LiteralId) -> CdsResult<Vec<LiteralId>> {
        let _ = self.idx(l)?;
        let mut out = Vec::new();
        for other in self.all_literals() {
            if other == l {
                continue;
            }
            if self.has_edge(l, other)? {
                out.push(other);
            }
        }
        Ok(out)
    }

    /// Like `neighbors`, restricted to the supplied node set.
    pub fn neighbors_filtered(
        &self,
        l: LiteralId,
        subgraph_nodes: &[LiteralId],
    ) -> CdsResult<Vec<LiteralId>> {
        let mut out = Vec::new();
        for &other in subgraph_nodes {
            if other == l {
                continue;
            }
            if self.has_edge(l, other)? {
                out.push(other);
            }
        }
        Ok(out)
    }

    /// Like `neighbors`, restricted to the endpoints of `subgraph_edges`.
    pub fn neighbors_via_edges(&self, l: LiteralId, subgraph_edges: &[Edge]) -> Vec<LiteralId> {
        let mut out = Vec::new();
        for &(a, b) in subgraph_edges {
            if a == l {
                out.push(b);
            } else if b == l {
                out.push(a);
            }
        }
        out
    }

    pub fn non_neighbors(&self, l: LiteralId) -> CdsResult<Vec<LiteralId>> {
        let _ = self.idx(l)?;
        let mut out = Vec::new();
        for other in self.all_literals() {
            if other == l {
                continue;
            }
            if !self.has_edge(l, other)? {
                out.push(other);
            }
        }
        Ok(out)
    }

    pub fn count_neighbors(&self, l: LiteralId) -> CdsResult<usize> {
        let _ = self.idx(l)?;
        let mut n = 0;
        for other in self.all_literals() {
            if other != l && self.has_edge(l, other)? {
                n += 1;
            }
        }
        Ok(n)
    }

    pub fn all_edges(&self) -> Vec<Edge> {
        let n = self.n_nodes();
        let mut out = Vec::with_capacity(self.num_edges);
        for i in 0..n {
            for j in (i + 1)..n {
                if self.matrix.get(i, j).unwrap_or(false) {
                    out.push(canonical_edge(
                        self.literal_for_index(i),
                        self.literal_for_index(j),
                    ));
                }
            }
        }
        out
    }

    pub fn edges_where<F>(&self, mut pred: F) -> Vec<Edge>
    where
        F: FnMut(Edge) -> bool,
    {
        self.all_edges().into_iter().filter(|&e| pred(e)).collect()
    }

    pub fn induced_subgraph_edges(&self, nodes: &[LiteralId]) -> Vec<Edge> {
        let mut out = Vec::new();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                if self.has_edge(nodes[i], nodes[j]).unwrap_or(false) {
                    out.push(canonical_edge(nodes[i], nodes[j]));
                }
            }
        }
        out
    }

    pub fn unique_nodes_of(edges: &[Edge]) -> Vec<LiteralId> {
        let mut set = std::collections::BTreeSet::new();
        for &(a, b) in edges {
            set.insert(a);
            set.insert(b);
        }
        set.into_iter().collect()
    }

    /// Returns the complement of this graph (edge <-> non-edge, no
    /// self loops introduced). Applying `complement()` twice restores
    /// the original adjacency bit-for-bit.
    pub fn complement(&self) -> Self {
        let mut matrix = self.matrix.clone();
        matrix.flip();
        let num_edges = matrix.popcount();
        Self {
            n_concrete: self.n_concrete,
            matrix,
            num_edges,
        }
    }

    /// The clique-disjointness predicate: the fundamental hot-path
    /// primitive. Two edges are clique-disjoint unless their four (or
    /// fewer) endpoints induce a complete subgraph of `G`.
    pub fn clique_disjoint(&self, e1: Edge, e2: Edge) -> CdsResult<bool> {
        let (u, v) = e1;
        let (p, q) = e2;
        if e1 == e2 {
            return Ok(false);
        }
        let shared = (u == p || u == q) as u8 + (v == p || v == q) as u8;
        match shared {
            0 => {
                // four distinct endpoints: disjoint unless all 4 cross edges present.
                let all_present = self.has_edge(u, p)?
                    && self.has_edge(u, q)?
                    && self.has_edge(v, p)?
                    && self.has_edge(v, q)?;
                Ok(!all_present)
            }
            1 => {
                // exactly one shared endpoint; compare the two non-shared endpoints.
                let (shared_lit, other1) = if u == p || u == q { (u, v) } else { (v, u) };
                let other2 = if p == shared_lit { q } else { p };
                Ok(!self.has_edge(other1, other2)?)
            }
            _ => Ok(false), // identical edge, both endpoints shared
        }
    }

    /// A CDS check over a list of edges: every pair must be
    /// clique-disjoint. O(m^2).
    pub fn is_clique_disjoint_set(&self, edges: &[Edge]) -> CdsResult<bool> {
        for i in 0..edges.len() {
            for j in (i + 1)..edges.len() {
                if !self.clique_disjoint(edges[i], edges[j])? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Produces up to `COMPLEMENT_CLIQUE_COUNT` disjoint independent
    /// sets of `G` (cliques of the complement graph), sorted by size
    /// descending. See spec.md §4.2.
    pub fn complement_cliques(&self, rng: &mut impl Rng) -> CdsResult<Vec<Vec<LiteralId>>> {
        let mut literals = self.all_literals();
        literals.shuffle(rng);
        let mut degrees: Vec<(LiteralId, usize)> = Vec::with_capacity(literals.len());
        for l in literals {
            degrees.push((l, self.count_neighbors(l)?));
        }
        degrees.sort_by_key(|&(_, deg)| deg);

        let mut cliques: Vec<Vec<LiteralId>> = vec![Vec::new(); COMPLEMENT_CLIQUE_COUNT];
        let mut membership: Vec<RoaringBitmap> = vec![RoaringBitmap::new(); COMPLEMENT_CLIQUE_COUNT];
        for (l, _deg) in degrees {
            let lidx = self.idx(l)? as u32;
            for k in 0..COMPLEMENT_CLIQUE_COUNT {
                let has_edge_to_member = {
                    let mut found = false;
                    for m in membership[k].iter() {
                        if self.has_edge(l, self.literal_for_index(m as usize))? {
                            found = true;
                            break;
                        }
                    }
                    found
                };
                if !has_edge_to_member {
                    cliques[k].push(l);
                    membership[k].insert(lidx);
                    break;
                }
            }
        }
        cliques.sort_by_key(|c| std::cmp::Reverse(c.len()));
        Ok(cliques.into_iter().filter(|c| !c.is_empty()).collect())
    }

    /// Validates `edges` as a CDS in this graph: pairwise clique-disjoint
    /// and every edge is an actual edge of `G`.
    pub fn validate_cds(&self, edges: &[Edge]) -> CdsResult<()> {
        for &(a, b) in edges {
            if !self.has_edge(a, b)? {
                return Err(CdsError::InvalidInitialSolution(format!(
                    "({}, {}) is not an edge of the graph",
                    a, b
                )));
            }
        }
        if !self.is_clique_disjoint_set(edges)? {
            return Err(CdsError::InvalidInitialSolution(
                "edge set is not clique-disjoint".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i64) -> LiteralId {
        LiteralId::new(v)
    }

    #[test]
    fn complement_of_no_conflicts_is_complete_minus_self() {
        // n_concrete = 2, conflicts = [] (spec.md S3)
        let g = TransactionGraph::from_conflicts(2, &[]).unwrap();
        assert_eq!(g.n_nodes(), 4);
        // all 6 pairs should be edges.
        assert_eq!(g.n_edges(), 6);
    }

    #[test]
    fn forced_disjoint_pair_s2() {
        let conflicts = vec![
            (lit(1), lit(2)),
            (lit(-1), lit(-2)),
        ];
        let g = TransactionGraph::from_conflicts(2, &conflicts).unwrap();
        assert!(!g.has_edge(lit(1), lit(2)).unwrap());
        assert!(!g.has_edge(lit(-1), lit(-2)).unwrap());
        assert!(g.has_edge(lit(1), lit(-2)).unwrap());
        assert!(g.has_edge(lit(-1), lit(2)).unwrap());
        assert!(g.has_edge(lit(-1), lit(1)).unwrap());
        assert!(g.has_edge(lit(-2), lit(2)).unwrap());
    }

    #[test]
    fn subgraph_restriction_s4() {
        let g = TransactionGraph::from_conflicts(3, &[]).unwrap();
        let e1 = canonical_edge(lit(1), lit(2));
        let e2 = canonical_edge(lit(1), lit(3));
        // share endpoint +1; disjoint iff (2,3) not an edge -- but it is.
        assert!(!g.clique_disjoint(e1, e2).unwrap());
    }

    #[test]
    fn clique_disjoint_symmetry() {
        let g = TransactionGraph::from_conflicts(3, &[]).unwrap();
        let e1 = canonical_edge(lit(1), lit(2));
        let e2 = canonical_edge(lit(2), lit(3));
        assert_eq!(
            g.clique_disjoint(e1, e2).unwrap(),
            g.clique_disjoint(e2, e1).unwrap()
        );
    }

    #[test]
    fn add_edge_is_idempotent() {
        let mut g = TransactionGraph::from_conflicts(2, &[(lit(1), lit(2))]).unwrap();
        let before = g.n_edges();
        assert!(!g.has_edge(lit(1), lit(2)).unwrap());
        assert!(g.add_edge(lit(1), lit(2)).unwrap());
        assert!(!g.add_edge(lit(1), lit(2)).unwrap());
        assert_eq!(g.n_edges(), before + 1);
    }

    #[test]
    fn complement_twice_is_identity() {
        let g = TransactionGraph::from_conflicts(3, &[(lit(1), lit(2))]).unwrap();
        let g2 = g.complement().complement();
        assert_eq!(g.n_edges(), g2.n_edges());
        for &e in &g.all_edges() {
            assert!(g2.has_edge(e.0, e.1).unwrap());
        }
    }

    #[test]
    fn num_edges_equals_popcount() {
        let g = TransactionGraph::from_conflicts(4, &[(lit(1), lit(2)), (lit(-3), lit(4))]).unwrap();
        assert_eq!(g.n_edges(), g.all_edges().len());
    }
}
