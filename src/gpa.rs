//! GPA
//!
//! Path-growing assembly: arcs are offered heaviest first (ties broken by a
//! seeded shuffle) to a PathSet, which accretes them into edge-disjoint
//! paths and cycles. Each path then yields its maximum-weight matching by
//! dynamic programming; a cycle is tried with both its first and its last
//! arc removed and the heavier linearization wins. The round's matching is
//! applied and the leftover arcs feed the next round, b rounds in all.
//!
//! Optional improvement per round: ROMA (iterated 1-for-2 swaps over a
//! shuffled vertex set, revisiting only vertices a swap touched) or a plain
//! local swap pass.
//!

use crate::algorithm::MatchingHeuristic;
use crate::config::MatchingConfig;
use crate::graph::Snapshot;
use crate::matching::MatchingState;
use crate::path_set::{Path, PathSet};
use crate::swap;
use crate::util::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use std::collections::VecDeque;

pub struct Gpa {
    config: MatchingConfig,
    swaps: bool,
    do_global_swaps: bool,
    num_roma: i32,

    state: MatchingState,
    all_vertices: Vec<VertexIndex>,
    matched_in_round: Vec<ArcIndex>,
}

impl Gpa {
    pub fn new(config: &MatchingConfig, swaps: bool, do_global_swaps: bool, num_roma: i32) -> Self {
        Self {
            config: config.clone(),
            swaps,
            do_global_swaps,
            num_roma,
            state: MatchingState::new(),
            all_vertices: Vec::new(),
            matched_in_round: Vec::new(),
        }
    }

    fn local_swaps(&mut self, graph: &Snapshot, round: ColorIndex) -> bool {
        swap::local_swaps(
            graph,
            &mut self.state,
            &self.matched_in_round,
            round,
            self.config.swaps_reverse_sort,
        )
    }

    /// Iterated local improvement: attempt a swap at every matched vertex,
    /// then keep revisiting only the vertices whose matching changed, up to
    /// `num_roma` rounds or until a fixpoint.
    fn roma(&mut self, graph: &Snapshot, round: ColorIndex, rng: &mut Xoshiro256StarStar) -> bool {
        let mut succ = false;
        self.all_vertices.shuffle(rng);
        let mut current_vertices = self.all_vertices.clone();
        let mut changed: Vec<VertexIndex> = Vec::new();
        let mut l = 0;
        while !current_vertices.is_empty() && l < self.num_roma {
            l += 1;
            for &v in &current_vertices {
                let Some(mate) = self.state.mate_of(round, v) else {
                    continue;
                };
                let Some(arc) = graph.find_arc(v, mate) else {
                    continue;
                };
                if swap::swap_subroutine(graph, &mut self.state, arc, round) {
                    succ = true;
                    let (s, t) = graph.endpoints(arc);
                    changed.push(s);
                    changed.push(t);
                    if let Some(m) = self.state.mate_of(round, s) {
                        changed.push(m);
                    }
                    if let Some(m) = self.state.mate_of(round, t) {
                        changed.push(m);
                    }
                }
            }
            std::mem::swap(&mut current_vertices, &mut changed);
            changed.clear();
        }
        succ
    }

    fn extract_paths_apply_matching(&mut self, graph: &Snapshot, pathset: &PathSet, round: ColorIndex) {
        let n = graph.vertex_count();
        for v in 0..n as VertexIndex {
            let p = *pathset.get_path(v);
            if !p.is_active() || p.tail() != v || p.length() == 0 {
                continue;
            }

            if p.is_cycle() {
                let mut unpacked = unpack_path(pathset, &p);

                // split once at the front, once at the back, keep the heavier
                let first = unpacked.pop_front().expect("cycle has at least two arcs");
                let (first_matching, first_rating) = maximum_weight_matching(graph, &unpacked);

                unpacked.push_front(first);
                let _last = unpacked.pop_back().expect("cycle has at least two arcs");
                let (second_matching, second_rating) = maximum_weight_matching(graph, &unpacked);

                if first_rating > second_rating {
                    self.apply_matching(graph, &first_matching, round);
                } else {
                    self.apply_matching(graph, &second_matching, round);
                }
            } else if p.length() == 1 {
                // a single arc is matched directly
                let arc = if pathset.next_vertex(p.tail()) == p.head() {
                    pathset.edge_to_next(p.tail())
                } else {
                    pathset.edge_to_prev(p.tail())
                };
                let arc = arc.expect("a length-one path stores its arc at the tail");
                self.state.set_edge_color(graph, arc, round);
                self.state.total_weight += graph.weight(arc);
                self.matched_in_round.push(arc);
            } else {
                let unpacked = unpack_path(pathset, &p);
                let (matching, _) = maximum_weight_matching(graph, &unpacked);
                self.apply_matching(graph, &matching, round);
            }
        }
    }

    fn apply_matching(&mut self, graph: &Snapshot, matched: &[ArcIndex], round: ColorIndex) {
        for &arc in matched {
            self.state.set_edge_color(graph, arc, round);
            self.matched_in_round.push(arc);
            self.state.total_weight += graph.weight(arc);
        }
    }
}

/// Unroll a path (or cycle) into the sequence of its arcs. For a cycle the
/// start is the vertex after the tail; the arc connecting it back to the
/// tail is emitted first, read from whichever link slot holds it.
fn unpack_path(pathset: &PathSet, p: &Path) -> VecDeque<ArcIndex> {
    let mut unpacked = VecDeque::new();
    let head = p.head();
    let mut prev = p.tail();
    let mut current = prev;

    if prev == head {
        current = pathset.next_vertex(prev);
        let closing = if pathset.next_vertex(current) == prev {
            pathset.edge_to_next(current)
        } else {
            pathset.edge_to_prev(current)
        };
        unpacked.push_back(closing.expect("cycle vertices have both slots linked"));
    }

    while current != head {
        let next;
        if pathset.next_vertex(current) == prev {
            next = pathset.prev_vertex(current);
            unpacked.push_back(pathset.edge_to_prev(current).expect("interior slot is linked"));
        } else {
            next = pathset.next_vertex(current);
            unpacked.push_back(pathset.edge_to_next(current).expect("interior slot is linked"));
        }
        prev = current;
        current = next;
    }
    unpacked
}

/// Maximum-weight matching on a linear arc sequence by dynamic programming:
/// every second arc may be taken, ratings carry the best achievable weight
/// and decisions whether the arc at each index participates.
fn maximum_weight_matching(graph: &Snapshot, unpacked_path: &VecDeque<ArcIndex>) -> (Vec<ArcIndex>, Weight) {
    let k = unpacked_path.len();
    let mut matched_edges = Vec::new();
    if k == 1 {
        matched_edges.push(unpacked_path[0]);
        return (matched_edges, 0);
    }

    let mut ratings = vec![0 as Weight; k];
    let mut decision = vec![false; k];
    decision[0] = true;
    ratings[0] = graph.weight(unpacked_path[0]);
    ratings[1] = ratings[0].max(graph.weight(unpacked_path[1]));
    decision[1] = graph.weight(unpacked_path[1]) >= ratings[0];

    for i in 2..k {
        let weight = graph.weight(unpacked_path[i]);
        if weight + ratings[i - 2] > ratings[i - 1] {
            decision[i] = true;
            ratings[i] = weight + ratings[i - 2];
        } else {
            decision[i] = false;
            ratings[i] = ratings[i - 1];
        }
    }

    let final_rating = ratings[k - 1];
    let mut i = k as i64 - 1;
    while i >= 0 {
        if decision[i as usize] {
            matched_edges.push(unpacked_path[i as usize]);
            i -= 2;
        } else {
            i -= 1;
        }
    }
    (matched_edges, final_rating)
}

impl MatchingHeuristic for Gpa {
    fn prepare(&mut self, graph: &Snapshot, num_matchings: ColorIndex) -> bool {
        if num_matchings == 0 {
            return false;
        }
        self.state.reset(num_matchings, graph.vertex_count(), graph.arc_count());
        self.all_vertices.clear();
        self.matched_in_round.clear();
        true
    }

    fn run(&mut self, graph: &mut Snapshot) {
        let n = graph.vertex_count();
        let b = self.state.num_matchings;

        let mut edges: Vec<ArcIndex> = Vec::with_capacity(graph.arc_count());
        graph.iterate_arcs(|arc| {
            if graph.weight(arc) > 0 {
                edges.push(arc);
            }
        });

        if self.num_roma > 0 {
            self.all_vertices = (0..n as VertexIndex).collect();
        }

        let mut rng = Xoshiro256StarStar::seed_from_u64(self.config.seed);

        // shuffle for random tie breaking, then sort stably by weight
        edges.shuffle(&mut rng);
        edges.sort_by(|&lop, &rop| graph.weight(rop).cmp(&graph.weight(lop)));

        let mut edges_remaining: Vec<ArcIndex> = Vec::with_capacity(edges.len());
        for bi in 0..b {
            let mut pathset = PathSet::new(n);
            for &arc in &edges {
                if self.state.edge_color[arc as usize] < b {
                    continue;
                }
                pathset.add_if_applicable(graph, arc);
                edges_remaining.push(arc);
            }
            self.extract_paths_apply_matching(graph, &pathset, bi);
            if self.num_roma > 0 {
                self.roma(graph, bi, &mut rng);
            } else if self.swaps && !self.do_global_swaps {
                self.local_swaps(graph, bi);
            }
            self.matched_in_round.clear();
            std::mem::swap(&mut edges, &mut edges_remaining);
            edges_remaining.clear();
        }

        if self.config.sanity_check {
            self.state.sanity_check(graph);
        }
    }

    fn deliver(&self) -> Weight {
        self.state.deliver()
    }

    fn name(&self) -> String {
        let mut name = String::from("GPA");
        if self.num_roma > 0 {
            name += &format!(" + ROMA {}", self.num_roma);
        } else if self.swaps {
            name += if self.do_global_swaps {
                " + global swaps"
            } else {
                " + local swaps"
            };
        }
        name
    }

    fn short_name(&self) -> String {
        let mut name = String::from("gpa");
        if self.num_roma > 0 {
            name += &format!("_roma-{}", self.num_roma);
        } else if self.swaps {
            name += if self.do_global_swaps {
                "_swaps-global"
            } else {
                "_swaps-local"
            };
        }
        name
    }
}
