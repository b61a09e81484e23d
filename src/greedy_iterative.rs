//! Greedy-Iterative
//!
//! b independent sort-and-match passes: arcs sorted by weight descending,
//! each round greedily matches whatever is still free, and the arcs left
//! over feed the next round.
//!

use crate::algorithm::MatchingHeuristic;
use crate::config::MatchingConfig;
use crate::graph::Snapshot;
use crate::matching::MatchingState;
use crate::swap;
use crate::util::*;

pub struct GreedyIterative {
    config: MatchingConfig,
    swaps: bool,
    do_global_swaps: bool,
    state: MatchingState,
    matched_in_round: Vec<ArcIndex>,
}

impl GreedyIterative {
    pub fn new(config: &MatchingConfig, swaps: bool, do_global_swaps: bool) -> Self {
        Self {
            config: config.clone(),
            swaps,
            do_global_swaps,
            state: MatchingState::new(),
            matched_in_round: Vec::new(),
        }
    }
}

impl MatchingHeuristic for GreedyIterative {
    fn prepare(&mut self, graph: &Snapshot, num_matchings: ColorIndex) -> bool {
        if num_matchings == 0 {
            return false;
        }
        self.state.reset(num_matchings, graph.vertex_count(), graph.arc_count());
        self.matched_in_round.clear();
        true
    }

    fn run(&mut self, graph: &mut Snapshot) {
        let mut edges: Vec<ArcIndex> = Vec::with_capacity(graph.arc_count());
        graph.iterate_arcs(|arc| {
            if graph.weight(arc) > 0 {
                edges.push(arc);
            }
        });
        edges.sort_by(|&lop, &rop| graph.weight(rop).cmp(&graph.weight(lop)));

        let mut remaining_edges: Vec<ArcIndex> = Vec::with_capacity(edges.len());
        self.matched_in_round.reserve(edges.len());
        for bi in 0..self.state.num_matchings {
            for &arc in &edges {
                if self.state.edge_color[arc as usize] != UNCOLORED {
                    continue;
                }
                let (s, t) = graph.endpoints(arc);
                if self.state.mate_of(bi, s).is_some() || self.state.mate_of(bi, t).is_some() {
                    // at least one endpoint is taken this round
                    remaining_edges.push(arc);
                } else {
                    self.state.set_edge_color(graph, arc, bi);
                    self.state.total_weight += graph.weight(arc);
                    self.matched_in_round.push(arc);
                }
            }

            if self.swaps && !self.do_global_swaps {
                let swapped = swap::local_swaps(
                    graph,
                    &mut self.state,
                    &self.matched_in_round,
                    bi,
                    self.config.swaps_reverse_sort,
                );
                // a successful swap colors arcs outside this round's working
                // set, so keep the full sorted list instead of shrinking
                if !swapped {
                    std::mem::swap(&mut edges, &mut remaining_edges);
                }
            } else {
                std::mem::swap(&mut edges, &mut remaining_edges);
            }
            self.matched_in_round.clear();
            remaining_edges.clear();
        }

        if self.swaps && self.do_global_swaps {
            swap::global_swaps(graph, &mut self.state, self.config.swaps_reverse_sort);
        }

        if self.config.sanity_check {
            self.state.sanity_check(graph);
        }
    }

    fn deliver(&self) -> Weight {
        self.state.deliver()
    }

    fn name(&self) -> String {
        let mut name = String::from("greedy_iterative");
        if self.swaps {
            name += "-swaps";
            name += if self.do_global_swaps { "-global" } else { "-local" };
        }
        name
    }

    fn short_name(&self) -> String {
        self.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SnapshotBuilder;

    fn run(graph: &mut Snapshot, config: &MatchingConfig, b: ColorIndex, swaps: bool, global: bool) -> Weight {
        let mut algo = GreedyIterative::new(config, swaps, global);
        assert!(algo.prepare(graph, b));
        algo.run(graph);
        algo.deliver()
    }

    #[test]
    fn greedy_takes_heaviest_on_path() {
        // weights 1, 10, 1: the middle edge wins and no swap can beat it
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 1);
        builder.add_arc(2, 3, 10);
        builder.add_arc(3, 4, 1);
        let mut g = builder.build();
        let config = MatchingConfig::default();
        assert_eq!(run(&mut g, &config, 1, false, false), 10);
        assert_eq!(run(&mut g, &config, 1, true, false), 10);
    }

    #[test]
    fn local_swap_replaces_middle_edge() {
        // 2 + 2 > 3
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 2);
        builder.add_arc(2, 3, 3);
        builder.add_arc(3, 4, 2);
        let mut g = builder.build();
        let mut config = MatchingConfig::default();
        config.sanity_check = true;
        assert_eq!(run(&mut g, &config, 1, false, false), 3);
        assert_eq!(run(&mut g, &config, 1, true, false), 4);
        // a global swap needs a color free on both endpoints, which a single
        // matching cannot offer
        assert_eq!(run(&mut g, &config, 1, true, true), 3);
    }

    #[test]
    fn disjoint_edges_are_both_matched() {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 5);
        builder.add_arc(3, 4, 5);
        let mut g = builder.build();
        let config = MatchingConfig::default();
        assert_eq!(run(&mut g, &config, 1, false, false), 10);
    }

    #[test]
    fn star_with_two_rounds_takes_two_heaviest() {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 10);
        builder.add_arc(1, 3, 20);
        builder.add_arc(1, 4, 30);
        builder.add_arc(1, 5, 40);
        let mut g = builder.build();
        let config = MatchingConfig::default();
        assert_eq!(run(&mut g, &config, 2, false, false), 70);
    }

    #[test]
    fn prepare_fails_without_matchings() {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 5);
        let g = builder.build();
        let config = MatchingConfig::default();
        let mut algo = GreedyIterative::new(&config, false, false);
        assert!(!algo.prepare(&g, 0));
    }
}
