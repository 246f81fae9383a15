//! The mutable elimination graph.
//!
//! [`ElimGraph`] owns the vertex array and the adjacency-record arena.
//! Neighbor lists are intrusive singly-linked lists of arena records, kept
//! strictly sorted by neighbor index at all times; the incremental
//! fill-score rule depends on merge-walks over two sorted lists and must not
//! be replaced by hash-set membership.
//!
//! Per-vertex scores are maintained incrementally:
//!
//! - `fill_score(v)`: the exact number of unordered pairs of current
//!   neighbors of `v` that are not themselves adjacent,
//! - `elim_score(v)`: `log10 k(v) + Σ log10 k(u)` over current neighbors,
//!   the log-size of the clique created if `v` were eliminated now.

use crate::graph::arena::{AdjArena, NIL};
use crate::model::GraphicalModel;
use crate::types::FillEdge;
use bitvec::prelude::*;

/// Raised when the adjacency-record arena hits its record budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PoolExhausted;

#[derive(Debug, Clone, Copy)]
struct VertexState {
    degree: u32,
    log_k: f64,
    fill_score: i64,
    elim_score: f64,
    head: u32,
}

/// A destructively-mutated undirected graph supporting simulated variable
/// elimination with incrementally maintained per-vertex scores.
///
/// Eliminated vertices keep their own neighbor list frozen as of the moment
/// of elimination; this is the neighborhood-at-elimination bookkeeping the
/// fill-edge post-pass and the width replay checks consume.
#[derive(Debug, Clone)]
pub(crate) struct ElimGraph {
    vertices: Vec<VertexState>,
    arena: AdjArena,
    eliminated: BitVec,
    /// Vertices whose fill score or degree changed this iteration.
    changed: Vec<u32>,
    changed_mark: BitVec,
    /// Reusable adjacency mask for pair enumeration.
    scratch_mask: BitVec,
    /// Per-iteration scratch for fill edges to add.
    fill_u: Vec<u32>,
    fill_v: Vec<u32>,
}

impl ElimGraph {
    /// Build the primal graph of a model, with initial scores populated.
    ///
    /// `edge_budget` bounds the total number of adjacency records the run may
    /// ever hold; the initial primal edges always fit. `fill_scratch_capacity`
    /// sizes the per-iteration fill buffers up front.
    pub fn from_model(
        model: &GraphicalModel,
        edge_budget: Option<usize>,
        fill_scratch_capacity: usize,
    ) -> Self {
        let n = model.num_variables();
        let edges = model.primal_edges();
        let mut adj: Vec<Vec<u32>> = vec![Vec::new(); n];
        for &(u, v) in &edges {
            adj[u].push(v as u32);
            adj[v].push(u as u32);
        }
        for list in &mut adj {
            list.sort_unstable();
        }

        let budget = edge_budget.map(|b| b.max(2 * edges.len()));
        let mut arena = AdjArena::with_capacity(2 * edges.len(), budget);
        let mut vertices = Vec::with_capacity(n);
        for v in 0..n {
            let mut head = NIL;
            for &w in adj[v].iter().rev() {
                head = arena
                    .acquire(w, -1, head)
                    .expect("initial primal records fit the arena budget");
            }
            vertices.push(VertexState {
                degree: adj[v].len() as u32,
                log_k: model.log10_domain_size(v),
                fill_score: 0,
                elim_score: 0.0,
                head,
            });
        }

        let mut graph = Self {
            vertices,
            arena,
            eliminated: bitvec![0; n],
            changed: Vec::new(),
            changed_mark: bitvec![0; n],
            scratch_mask: bitvec![0; n],
            fill_u: Vec::with_capacity(fill_scratch_capacity),
            fill_v: Vec::with_capacity(fill_scratch_capacity),
        };
        graph.compute_initial_scores();
        graph
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn degree(&self, v: usize) -> usize {
        self.vertices[v].degree as usize
    }

    pub fn fill_score(&self, v: usize) -> i64 {
        self.vertices[v].fill_score
    }

    pub fn elim_score(&self, v: usize) -> f64 {
        self.vertices[v].elim_score
    }

    pub fn log_k(&self, v: usize) -> f64 {
        self.vertices[v].log_k
    }

    #[allow(dead_code)]
    pub fn is_eliminated(&self, v: usize) -> bool {
        self.eliminated[v]
    }

    /// Current neighbors of `v` in ascending order. For an eliminated vertex
    /// this is its neighborhood frozen at elimination time.
    #[allow(dead_code)]
    pub fn neighbors(&self, v: usize) -> Neighbors<'_> {
        Neighbors {
            graph: self,
            cursor: self.vertices[v].head,
        }
    }

    /// Whether `u` and `v` are adjacent. Walks the shorter sorted list.
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        if u == v {
            return false;
        }
        let (from, to) = if self.vertices[u].degree <= self.vertices[v].degree {
            (u, v)
        } else {
            (v, u)
        };
        let target = to as u32;
        let mut c = self.vertices[from].head;
        while c != NIL {
            let r = self.arena.get(c);
            if r.neighbor == target {
                return true;
            }
            if r.neighbor > target {
                return false;
            }
            c = r.next;
        }
        false
    }

    /// Insert the edge `u - v` stamped with `iteration` into both sorted
    /// neighbor lists, updating degrees and elimination scores. A no-op
    /// (returning `Ok(false)`) if the edge already exists.
    pub fn add_edge(&mut self, u: usize, v: usize, iteration: i32) -> Result<bool, PoolExhausted> {
        if u == v || self.has_edge(u, v) {
            return Ok(false);
        }
        // A failure between the two half-insertions leaves the lists
        // asymmetric; the engine discards the whole graph on pool exhaustion.
        self.insert_half(u, v, iteration)?;
        self.insert_half(v, u, iteration)?;
        self.vertices[u].degree += 1;
        self.vertices[v].degree += 1;
        self.vertices[u].elim_score += self.vertices[v].log_k;
        self.vertices[v].elim_score += self.vertices[u].log_k;
        Ok(true)
    }

    /// Remove the edge `u - v`, returning both records to the arena.
    /// Returns false if the edge was not present.
    #[allow(dead_code)]
    pub fn remove_edge(&mut self, u: usize, v: usize) -> bool {
        if !self.remove_half(u, v) {
            return false;
        }
        let other = self.remove_half(v, u);
        debug_assert!(other, "both halves of an edge must be present");
        self.vertices[u].degree -= 1;
        self.vertices[v].degree -= 1;
        self.vertices[u].elim_score -= self.vertices[v].log_k;
        self.vertices[v].elim_score -= self.vertices[u].log_k;
        true
    }

    /// Simulate the elimination of `x` at `iteration`.
    ///
    /// Connects every non-adjacent pair of current neighbors of `x` with a
    /// fill edge stamped `iteration` (appended to `fills`), then detaches `x`
    /// from every live neighbor's list. All fill edges enter the adjacency
    /// lists before any score walk runs, so the incremental rule's
    /// same-iteration stamp guard sees a consistent picture. `x`'s own list
    /// is left frozen.
    pub fn eliminate(
        &mut self,
        x: usize,
        iteration: i32,
        fills: &mut Vec<FillEdge>,
    ) -> Result<(), PoolExhausted> {
        debug_assert!(!self.eliminated[x], "vertex {} eliminated twice", x);

        // Enumerate missing pairs among N(x) against the pre-fill adjacency.
        self.fill_u.clear();
        self.fill_v.clear();
        let mut ca = self.vertices[x].head;
        while ca != NIL {
            let ra = self.arena.get(ca);
            let a = ra.neighbor as usize;
            self.mask_neighbors(a, true);
            let mut cb = ra.next;
            while cb != NIL {
                let rb = self.arena.get(cb);
                if !self.scratch_mask[rb.neighbor as usize] {
                    self.fill_u.push(a as u32);
                    self.fill_v.push(rb.neighbor);
                }
                cb = rb.next;
            }
            self.mask_neighbors(a, false);
            ca = ra.next;
        }

        let n_fills = self.fill_u.len();
        for i in 0..n_fills {
            let (a, b) = (self.fill_u[i] as usize, self.fill_v[i] as usize);
            let added = self.add_edge(a, b, iteration)?;
            debug_assert!(added);
            fills.push(FillEdge::new(a, b, iteration as usize));
        }
        for i in 0..n_fills {
            let (a, b) = (self.fill_u[i] as usize, self.fill_v[i] as usize);
            self.adjust_scores_for_edge_addition(a, b, iteration);
        }

        // Removal deltas: pairs (x, w) at z with w outside N(x) stop being
        // observable, and x's domain leaves every neighbor's clique.
        let log_k_x = self.vertices[x].log_k;
        let mut c = self.vertices[x].head;
        while c != NIL {
            let r = self.arena.get(c);
            let z = r.neighbor as usize;
            let outside = self.count_exclusive_neighbors(z, x);
            self.vertices[z].fill_score -= outside;
            self.mark_changed(z);
            let removed = self.remove_half(z, x);
            debug_assert!(removed);
            self.vertices[z].degree -= 1;
            self.vertices[z].elim_score -= log_k_x;
            c = r.next;
        }

        self.vertices[x].fill_score = 0;
        self.eliminated.set(x, true);
        Ok(())
    }

    /// Incremental fill-score update after the edge `u - v` was inserted
    /// during `iteration`. Comparative merge-walk over the two sorted
    /// neighbor lists:
    ///
    /// - a neighbor of `u` not adjacent to `v` makes the pair `(v, w)` at `u`
    ///   newly observable: `fill_score(u) += 1` (and symmetrically for `v`);
    /// - a common neighbor `w` whose edges to both `u` and `v` predate this
    ///   iteration had the missing pair `(u, v)` counted: `fill_score(w) -= 1`,
    ///   applied only on the `u < v` half-walk so chains of fill edges added
    ///   around one elimination decrement each triple exactly once.
    pub fn adjust_scores_for_edge_addition(&mut self, u: usize, v: usize, iteration: i32) {
        let un = u as u32;
        let vn = v as u32;
        let mut cu = self.vertices[u].head;
        let mut cv = self.vertices[v].head;
        loop {
            if cv == NIL {
                // Everything left in u's list is adjacent to u but not to v.
                while cu != NIL {
                    let r = self.arena.get(cu);
                    if r.neighbor != vn {
                        self.vertices[u].fill_score += 1;
                        self.mark_changed(u);
                    }
                    cu = r.next;
                }
                return;
            }
            let rv = self.arena.get(cv);
            if rv.neighbor == un {
                cv = rv.next;
                continue;
            }
            if cu == NIL {
                while cv != NIL {
                    let r = self.arena.get(cv);
                    if r.neighbor != un {
                        self.vertices[v].fill_score += 1;
                        self.mark_changed(v);
                    }
                    cv = r.next;
                }
                return;
            }
            let ru = self.arena.get(cu);
            if ru.neighbor == vn {
                cu = ru.next;
                continue;
            }
            if ru.neighbor < rv.neighbor {
                self.vertices[u].fill_score += 1;
                self.mark_changed(u);
                cu = ru.next;
            } else if ru.neighbor > rv.neighbor {
                self.vertices[v].fill_score += 1;
                self.mark_changed(v);
                cv = rv.next;
            } else {
                if u < v && ru.iteration_added < iteration && rv.iteration_added < iteration {
                    let w = ru.neighbor as usize;
                    self.vertices[w].fill_score -= 1;
                    self.mark_changed(w);
                }
                cu = ru.next;
                cv = rv.next;
            }
        }
    }

    /// Move the accumulated score-change set into `out`, clearing the marks.
    pub fn take_changed(&mut self, out: &mut Vec<u32>) {
        out.clear();
        for &v in &self.changed {
            self.changed_mark.set(v as usize, false);
        }
        std::mem::swap(&mut self.changed, out);
    }

    fn mark_changed(&mut self, v: usize) {
        if !self.changed_mark[v] {
            self.changed_mark.set(v, true);
            self.changed.push(v as u32);
        }
    }

    fn mask_neighbors(&mut self, v: usize, value: bool) {
        let mut c = self.vertices[v].head;
        while c != NIL {
            let r = self.arena.get(c);
            self.scratch_mask.set(r.neighbor as usize, value);
            c = r.next;
        }
    }

    /// Count neighbors of `z` that are neither `x` nor adjacent to `x`.
    fn count_exclusive_neighbors(&self, z: usize, x: usize) -> i64 {
        let xn = x as u32;
        let mut count = 0i64;
        let mut cz = self.vertices[z].head;
        let mut cx = self.vertices[x].head;
        while cz != NIL {
            let rz = self.arena.get(cz);
            if rz.neighbor == xn {
                cz = rz.next;
                continue;
            }
            while cx != NIL && self.arena.get(cx).neighbor < rz.neighbor {
                cx = self.arena.get(cx).next;
            }
            if cx == NIL || self.arena.get(cx).neighbor != rz.neighbor {
                count += 1;
            }
            cz = rz.next;
        }
        count
    }

    fn insert_half(&mut self, from: usize, to: usize, iteration: i32) -> Result<(), PoolExhausted> {
        let target = to as u32;
        let head = self.vertices[from].head;
        if head == NIL || self.arena.get(head).neighbor > target {
            let idx = self
                .arena
                .acquire(target, iteration, head)
                .ok_or(PoolExhausted)?;
            self.vertices[from].head = idx;
            return Ok(());
        }
        let mut prev = head;
        loop {
            let r = self.arena.get(prev);
            debug_assert_ne!(r.neighbor, target, "duplicate edge insertion");
            if r.next == NIL || self.arena.get(r.next).neighbor > target {
                let idx = self
                    .arena
                    .acquire(target, iteration, r.next)
                    .ok_or(PoolExhausted)?;
                self.arena.set_next(prev, idx);
                return Ok(());
            }
            prev = r.next;
        }
    }

    fn remove_half(&mut self, from: usize, to: usize) -> bool {
        let target = to as u32;
        let head = self.vertices[from].head;
        if head == NIL {
            return false;
        }
        let rh = self.arena.get(head);
        if rh.neighbor == target {
            self.vertices[from].head = rh.next;
            self.arena.release(head);
            return true;
        }
        let mut prev = head;
        loop {
            let next = self.arena.get(prev).next;
            if next == NIL {
                return false;
            }
            let rn = self.arena.get(next);
            if rn.neighbor == target {
                self.arena.set_next(prev, rn.next);
                self.arena.release(next);
                return true;
            }
            if rn.neighbor > target {
                return false;
            }
            prev = next;
        }
    }

    fn compute_initial_scores(&mut self) {
        let n = self.vertices.len();
        for v in 0..n {
            let mut es = self.vertices[v].log_k;
            let mut c = self.vertices[v].head;
            while c != NIL {
                let r = self.arena.get(c);
                es += self.vertices[r.neighbor as usize].log_k;
                c = r.next;
            }
            self.vertices[v].elim_score = es;
        }
        for v in 0..n {
            let mut missing = 0i64;
            let mut ca = self.vertices[v].head;
            while ca != NIL {
                let ra = self.arena.get(ca);
                let a = ra.neighbor as usize;
                self.mask_neighbors(a, true);
                let mut cb = ra.next;
                while cb != NIL {
                    let rb = self.arena.get(cb);
                    if !self.scratch_mask[rb.neighbor as usize] {
                        missing += 1;
                    }
                    cb = rb.next;
                }
                self.mask_neighbors(a, false);
                ca = ra.next;
            }
            self.vertices[v].fill_score = missing;
        }
    }

    /// Full consistency check of every maintained invariant, by brute force.
    /// Test builds only; quadratic and worse.
    #[cfg(test)]
    pub fn check_invariants(&self) {
        for v in 0..self.vertices.len() {
            if self.eliminated[v] {
                continue;
            }
            let nbrs: Vec<usize> = self.neighbors(v).collect();
            // Sorted strictly ascending, degree consistent.
            assert!(
                nbrs.windows(2).all(|w| w[0] < w[1]),
                "neighbor list of {} not strictly sorted: {:?}",
                v,
                nbrs
            );
            assert_eq!(self.degree(v), nbrs.len(), "degree mismatch at {}", v);
            // Both halves present, only live neighbors.
            for &w in &nbrs {
                assert!(!self.eliminated[w], "{} still lists eliminated {}", v, w);
                assert!(
                    self.neighbors(w).any(|x| x == v),
                    "edge {}-{} missing its reverse half",
                    v,
                    w
                );
            }
            // Exact fill score.
            let mut missing = 0i64;
            for (i, &a) in nbrs.iter().enumerate() {
                for &b in &nbrs[i + 1..] {
                    if !self.has_edge(a, b) {
                        missing += 1;
                    }
                }
            }
            assert_eq!(
                self.fill_score(v),
                missing,
                "fill score of {} drifted from the exact count",
                v
            );
            // Elimination score.
            let es: f64 = self.log_k(v) + nbrs.iter().map(|&w| self.log_k(w)).sum::<f64>();
            assert!(
                (self.elim_score(v) - es).abs() < 1e-9,
                "elim score of {} drifted: {} vs {}",
                v,
                self.elim_score(v),
                es
            );
        }
    }
}

/// Iterator over the sorted neighbor list of one vertex.
#[allow(dead_code)]
pub(crate) struct Neighbors<'a> {
    graph: &'a ElimGraph,
    cursor: u32,
}

impl Iterator for Neighbors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cursor == NIL {
            return None;
        }
        let r = self.graph.arena.get(self.cursor);
        self.cursor = r.next;
        Some(r.neighbor as usize)
    }
}
