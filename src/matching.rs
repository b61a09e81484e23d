//! Matching State
//!
//! The shared bookkeeping every heuristic mutates: the arc-to-color map, the
//! per-color mate maps and their arc-valued counterparts, and the running
//! total weight. A color is a matching index in `[0, b)`; `UNCOLORED` marks
//! arcs outside every matching.
//!
//! `set_edge_color` and `unset_edge_color` keep all maps consistent. The
//! Misra–Gries module is the one exception: it rotates raw colors first and
//! registers mates in a final sweep.
//!

use crate::graph::Snapshot;
use crate::util::*;

pub struct MatchingState {
    pub num_matchings: ColorIndex,
    /// per arc id; `UNCOLORED` by default
    pub edge_color: Vec<ColorIndex>,
    /// mate[c][v] is v's mate in matching c
    pub mate: Vec<Vec<Option<VertexIndex>>>,
    /// the arc realizing mate[c][v]; kept for the coloring algorithms
    pub arc_to_mate: Vec<Vec<Option<ArcIndex>>>,
    pub total_weight: Weight,
}

impl MatchingState {
    pub fn new() -> Self {
        Self {
            num_matchings: 0,
            edge_color: Vec::new(),
            mate: Vec::new(),
            arc_to_mate: Vec::new(),
            total_weight: 0,
        }
    }

    /// (re)initialise for a run with `b` matchings over `n` vertices and `m` arcs
    pub fn reset(&mut self, b: ColorIndex, n: usize, m: usize) {
        self.num_matchings = b;
        self.edge_color.clear();
        self.edge_color.resize(m, UNCOLORED);
        self.mate.clear();
        self.mate.resize(b as usize, vec![None; n]);
        self.arc_to_mate.clear();
        self.arc_to_mate.resize(b as usize, vec![None; n]);
        self.total_weight = 0;
    }

    #[inline]
    pub fn mate_of(&self, c: ColorIndex, v: VertexIndex) -> Option<VertexIndex> {
        self.mate[c as usize][v as usize]
    }

    /// Mate entries are overwritten, not merged: the cd-path inversion of the
    /// coloring algorithms recolors chains arc by arc and transiently points
    /// an entry away from its old arc; `unset_edge_color` of that old arc
    /// then leaves the newer entry untouched.
    pub fn set_edge_color(&mut self, graph: &Snapshot, arc: ArcIndex, c: ColorIndex) {
        debug_assert!((c as usize) < self.mate.len());
        debug_assert_eq!(self.edge_color[arc as usize], UNCOLORED, "arc is already colored");
        let (tail, head) = graph.endpoints(arc);

        self.edge_color[arc as usize] = c;
        self.mate[c as usize][tail as usize] = Some(head);
        self.mate[c as usize][head as usize] = Some(tail);
        self.arc_to_mate[c as usize][tail as usize] = Some(arc);
        self.arc_to_mate[c as usize][head as usize] = Some(arc);
    }

    /// inverse of `set_edge_color`; mate entries already pointing to a
    /// different arc at the same endpoint are left alone
    pub fn unset_edge_color(&mut self, graph: &Snapshot, arc: ArcIndex) {
        let c = self.edge_color[arc as usize];
        if c == UNCOLORED {
            return;
        }
        debug_assert!((c as usize) < self.mate.len());
        self.edge_color[arc as usize] = UNCOLORED;
        let (tail, head) = graph.endpoints(arc);
        if self.mate[c as usize][tail as usize] == Some(head) {
            self.mate[c as usize][tail as usize] = None;
        }
        if self.mate[c as usize][head as usize] == Some(tail) {
            self.mate[c as usize][head as usize] = None;
        }
        if self.arc_to_mate[c as usize][tail as usize] == Some(arc) {
            self.arc_to_mate[c as usize][tail as usize] = None;
        }
        if self.arc_to_mate[c as usize][head as usize] == Some(arc) {
            self.arc_to_mate[c as usize][head as usize] = None;
        }
    }

    /// smallest color in which both endpoints are unmatched; `mate.len()` when none
    pub fn matching_free_color(&self, lop: VertexIndex, rop: VertexIndex) -> ColorIndex {
        let mut c = 0;
        while (c as usize) < self.mate.len() {
            if self.mate[c as usize][lop as usize].is_none() && self.mate[c as usize][rop as usize].is_none() {
                break;
            }
            c += 1;
        }
        c
    }

    pub fn deliver(&self) -> Weight {
        self.total_weight
    }

    /// verifies the matching invariants, reporting violations on stderr;
    /// never aborts — a report here signals a bug in the producing algorithm
    pub fn sanity_check(&self, graph: &Snapshot) {
        let n = graph.vertex_count();
        let b = self.num_matchings as usize;
        let mut matchings_per_node = vec![0u32; n];
        let mut colors_per_node = vec![0u32; n * b];
        let mut arc_matchings = vec![0u32; graph.arc_count()];
        let mut weight_check: Weight = 0;

        graph.iterate_arcs(|arc| {
            let c = self.edge_color[arc as usize];
            if (c as usize) < b {
                let (s, t) = graph.endpoints(arc);
                matchings_per_node[s as usize] += 1;
                colors_per_node[s as usize * b + c as usize] += 1;
                matchings_per_node[t as usize] += 1;
                colors_per_node[t as usize * b + c as usize] += 1;
                weight_check += graph.weight(arc);
            }
        });

        for bi in 0..b {
            for v in 0..n as VertexIndex {
                let Some(m) = self.mate[bi][v as usize] else {
                    continue;
                };
                if self.mate[bi][m as usize] != Some(v) {
                    eprintln!(
                        "error! in matching #{} mate of {} is {}, but the reverse does not hold",
                        bi, v, m
                    );
                }
                if let Some(arc) = graph.find_arc(v, m) {
                    arc_matchings[arc as usize] += 1;
                }
            }
        }

        graph.iterate_arcs(|arc| {
            if arc_matchings[arc as usize] > 2 {
                eprintln!("error: arc {} matched {} times", arc, arc_matchings[arc as usize]);
            }
        });

        for v in 0..n {
            if matchings_per_node[v] > self.num_matchings {
                eprintln!("error: node {} matched {} times!", v, matchings_per_node[v]);
            }
            for c in 0..b {
                if colors_per_node[v * b + c] > 1 {
                    eprintln!(
                        "error: color {} adjacent to node {} {} times!",
                        c,
                        v,
                        colors_per_node[v * b + c]
                    );
                }
            }
        }

        if weight_check != self.total_weight {
            eprintln!(
                "warning: weight check differs from weight computed by algorithm: weight check = {}",
                weight_check
            );
        }
    }
}

impl Default for MatchingState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SnapshotBuilder;

    fn path_graph() -> Snapshot {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 1);
        builder.add_arc(2, 3, 10);
        builder.add_arc(3, 4, 1);
        builder.build()
    }

    #[test]
    fn set_and_unset_edge_color() {
        let g = path_graph();
        let mut state = MatchingState::new();
        state.reset(2, g.vertex_count(), g.arc_count());

        state.set_edge_color(&g, 1, 0);
        assert_eq!(state.edge_color[1], 0);
        assert_eq!(state.mate_of(0, 2), Some(3));
        assert_eq!(state.mate_of(0, 3), Some(2));
        assert_eq!(state.arc_to_mate[0][2], Some(1));

        state.unset_edge_color(&g, 1);
        assert_eq!(state.edge_color[1], UNCOLORED);
        assert_eq!(state.mate_of(0, 2), None);
        assert_eq!(state.mate_of(0, 3), None);
    }

    #[test]
    fn unset_leaves_reassigned_mates_alone() {
        let g = path_graph();
        let mut state = MatchingState::new();
        state.reset(1, g.vertex_count(), g.arc_count());

        state.set_edge_color(&g, 0, 0);
        // simulate a reassignment at vertex 2: its mate entry now belongs to
        // the arc (2,3), not to (1,2)
        state.mate[0][2] = Some(3);
        state.arc_to_mate[0][2] = Some(1);
        state.unset_edge_color(&g, 0);
        // the entry at vertex 1 is cleared, the reassigned one survives
        assert_eq!(state.mate_of(0, 1), None);
        assert_eq!(state.mate_of(0, 2), Some(3));
        assert_eq!(state.arc_to_mate[0][2], Some(1));
    }

    #[test]
    fn matching_free_color_finds_smallest() {
        let g = path_graph();
        let mut state = MatchingState::new();
        state.reset(2, g.vertex_count(), g.arc_count());
        assert_eq!(state.matching_free_color(2, 3), 0);
        state.set_edge_color(&g, 1, 0);
        assert_eq!(state.matching_free_color(2, 3), 1);
        state.unset_edge_color(&g, 1);
        state.set_edge_color(&g, 0, 0);
        // vertex 2 busy in color 0, vertex 3 free everywhere
        assert_eq!(state.matching_free_color(2, 3), 1);
        assert_eq!(state.matching_free_color(3, 4), 0);
    }
}
