//! bGreedy
//!
//! First pass: greedily take every arc, heaviest first, as long as both
//! endpoints still have matched-degree below the bound; everything else is
//! stashed and deactivated. The surviving subgraph is degree-bounded, so
//! Misra–Gries partitions it into proper color classes.
//!
//! Color variant: the coloring may need one color too many, in which case
//! the lightest class is dropped and the surplus class relabeled into its
//! place. Extend variant: the bound is lowered by one up front and the spare
//! color budget is spent on a greedy fill-in pass over the stashed arcs.
//!

use crate::algorithm::MatchingHeuristic;
use crate::config::MatchingConfig;
use crate::graph::Snapshot;
use crate::matching::MatchingState;
use crate::misra_gries::MisraGries;
use crate::swap;
use crate::util::*;

pub struct GreedyBMatching {
    config: MatchingConfig,
    do_extend: bool,
    do_global_swaps: bool,
    state: MatchingState,
}

impl GreedyBMatching {
    pub fn new(config: &MatchingConfig, do_extend: bool, do_global_swaps: bool) -> Self {
        Self {
            config: config.clone(),
            do_extend,
            do_global_swaps,
            state: MatchingState::new(),
        }
    }

    /// The coloring of the bounded subgraph used one color more than the
    /// budget: drop the class of smallest total weight and relabel the last
    /// class into the freed id.
    fn postprocess(&mut self, graph: &Snapshot) {
        let b = self.state.num_matchings;

        let mut color_weight = vec![0 as Weight; b as usize + 1];
        {
            let edge_color = &self.state.edge_color;
            graph.iterate_arcs(|arc| {
                let c = edge_color[arc as usize];
                debug_assert!(c <= b, "every active arc belongs to the colored subgraph here");
                color_weight[c as usize] += graph.weight(arc);
            });
        }

        // first minimum on ties, so earlier classes are preferred for removal
        let mut min_color: ColorIndex = 0;
        for c in 1..color_weight.len() {
            if color_weight[c] < color_weight[min_color as usize] {
                min_color = c as ColorIndex;
            }
        }
        let min_weight = color_weight[min_color as usize];
        self.state.total_weight -= min_weight;

        {
            let edge_color = &mut self.state.edge_color;
            graph.iterate_arcs(|arc| {
                let c = edge_color[arc as usize];
                if c == min_color {
                    edge_color[arc as usize] = UNCOLORED;
                } else if c == b {
                    edge_color[arc as usize] = min_color;
                }
            });
        }

        if min_color < b {
            let rows = &mut self.state.mate;
            rows.swap(min_color as usize, b as usize);
        }
    }

    fn greedy_extend(&mut self, graph: &Snapshot, edges: &mut Vec<ArcIndex>) {
        let mut remaining_edges: Vec<ArcIndex> = Vec::with_capacity(edges.len());
        for bi in 0..self.state.num_matchings {
            for &arc in edges.iter() {
                if self.state.edge_color[arc as usize] != UNCOLORED {
                    continue;
                }
                let (s, t) = graph.endpoints(arc);
                if self.state.mate_of(bi, s).is_some() || self.state.mate_of(bi, t).is_some() {
                    remaining_edges.push(arc);
                } else {
                    self.state.set_edge_color(graph, arc, bi);
                    self.state.total_weight += graph.weight(arc);
                }
            }
            std::mem::swap(edges, &mut remaining_edges);
            remaining_edges.clear();
        }
    }
}

impl MatchingHeuristic for GreedyBMatching {
    fn prepare(&mut self, graph: &Snapshot, num_matchings: ColorIndex) -> bool {
        if num_matchings == 0 {
            return false;
        }
        self.state.reset(num_matchings, graph.vertex_count(), graph.arc_count());
        true
    }

    fn run(&mut self, graph: &mut Snapshot) {
        let b = self.state.num_matchings;
        let n = graph.vertex_count();

        let mut edges: Vec<ArcIndex> = Vec::with_capacity(graph.arc_count());
        let mut zero_weight: Vec<ArcIndex> = Vec::new();
        graph.iterate_arcs(|arc| {
            if graph.weight(arc) > 0 {
                edges.push(arc);
            } else {
                zero_weight.push(arc);
            }
        });
        for &arc in &zero_weight {
            graph.deactivate_arc(arc);
        }
        edges.sort_by(|&lop, &rop| graph.weight(rop).cmp(&graph.weight(lop)));

        debug_assert!(b >= 1);
        let bound = if self.do_extend { b - 1 } else { b };

        let mut num_matched = vec![0 as ColorIndex; n];
        let mut stashed: Vec<ArcIndex> = Vec::with_capacity(edges.len());
        for &arc in &edges {
            let (tail, head) = graph.endpoints(arc);
            if num_matched[head as usize] < bound && num_matched[tail as usize] < bound {
                num_matched[head as usize] += 1;
                num_matched[tail as usize] += 1;
                self.state.total_weight += graph.weight(arc);
            } else {
                stashed.push(arc);
                graph.deactivate_arc(arc);
            }
        }

        let mut mg = MisraGries::new(bound);
        mg.prepare(graph);
        mg.run(graph);
        let num_colors = mg.num_colors();
        let mg_state = mg.into_state();
        self.state.edge_color = mg_state.edge_color;
        self.state.mate = mg_state.mate;

        if !self.do_extend {
            // the coloring gets one color beyond the budget; fold it back
            if b + 1 == num_colors {
                self.postprocess(graph);
            }
            self.state.mate.truncate(b as usize);
        }

        for &arc in &stashed {
            graph.activate_arc(arc);
        }
        for &arc in &zero_weight {
            graph.activate_arc(arc);
        }

        if self.do_extend {
            self.greedy_extend(graph, &mut stashed);
        }

        if self.do_global_swaps {
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
        match (self.do_extend, self.do_global_swaps) {
            (true, true) => "bGreedy&Extend + global swaps".into(),
            (true, false) => "bGreedy&Extend".into(),
            (false, true) => "bGreedy&Color + global swaps".into(),
            (false, false) => "bGreedy&Color".into(),
        }
    }

    fn short_name(&self) -> String {
        match (self.do_extend, self.do_global_swaps) {
            (true, true) => "bgreedy_extend-swaps-global".into(),
            (true, false) => "bgreedy_extend".into(),
            (false, true) => "bgreedy_color-swaps-global".into(),
            (false, false) => "bgreedy_color".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SnapshotBuilder;

    fn triangle() -> Snapshot {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 10);
        builder.add_arc(2, 3, 20);
        builder.add_arc(1, 3, 30);
        builder.build()
    }

    fn run(graph: &mut Snapshot, do_extend: bool, b: ColorIndex) -> Weight {
        let mut config = MatchingConfig::default();
        config.sanity_check = true;
        let mut algo = GreedyBMatching::new(&config, do_extend, false);
        assert!(algo.prepare(graph, b));
        algo.run(graph);
        algo.deliver()
    }

    #[test]
    fn triangle_keeps_heaviest_edge() {
        let mut g = triangle();
        assert_eq!(run(&mut g, false, 1), 30);
        // all arcs are active again afterwards
        let mut count = 0;
        g.iterate_arcs(|_| count += 1);
        assert_eq!(count, 3);
    }

    #[test]
    fn star_with_two_colors_takes_two_heaviest() {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 10);
        builder.add_arc(1, 3, 20);
        builder.add_arc(1, 4, 30);
        builder.add_arc(1, 5, 40);
        let mut g = builder.build();
        assert_eq!(run(&mut g, false, 2), 70);
    }

    #[test]
    fn extend_variant_fills_the_spare_color() {
        // bound drops to 1, the coloring uses one color, and the fill-in
        // pass matches what the bounded pass had to leave out
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 8);
        builder.add_arc(3, 4, 7);
        builder.add_arc(2, 3, 5);
        let mut g = builder.build();
        assert_eq!(run(&mut g, true, 2), 20);
    }

    #[test]
    fn extend_with_single_matching_degenerates_to_greedy() {
        let mut g = triangle();
        assert_eq!(run(&mut g, true, 1), 30);
    }

    #[test]
    fn disjoint_edges_are_both_matched() {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 5);
        builder.add_arc(3, 4, 5);
        let mut g = builder.build();
        assert_eq!(run(&mut g, false, 1), 10);
    }

    #[test]
    fn zero_weight_arcs_never_match() {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 0);
        builder.add_arc(2, 3, 4);
        let mut g = builder.build();
        assert_eq!(run(&mut g, false, 1), 4);
        assert!(g.is_active(0));
    }
}
