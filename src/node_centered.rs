//! Node-Centered matching
//!
//! Vertices are ranked by an aggregate of their incident arc weights and
//! served in that order, each taking its heaviest still-assignable arcs. A
//! global weight threshold can hold back light arcs in the first pass; a
//! second pass then offers the held-back arcs to whatever capacity is left.
//!

use crate::algorithm::MatchingHeuristic;
use crate::config::{AggregateKind, MatchingConfig};
use crate::graph::Snapshot;
use crate::matching::MatchingState;
use crate::util::*;

pub struct NodeCentered {
    config: MatchingConfig,
    aggregate: AggregateKind,
    threshold: f64,
    state: MatchingState,
}

impl NodeCentered {
    pub fn new(config: &MatchingConfig, aggregate: AggregateKind, threshold: f64) -> Self {
        Self {
            config: config.clone(),
            aggregate,
            threshold,
            state: MatchingState::new(),
        }
    }

    /// vertex priority key over the descending-sorted incident weights
    fn aggregate_weights(&self, weights: &[Weight]) -> Weight {
        let b = self.state.num_matchings as usize;
        let size = weights.len();
        debug_assert!(size > 0);
        if size == 1 {
            return weights[0];
        }
        match self.aggregate {
            AggregateKind::Max => weights[0],
            AggregateKind::Avg => weights.iter().sum::<Weight>() / size as Weight,
            AggregateKind::Median => {
                if size % 2 != 0 {
                    weights[size / 2]
                } else {
                    (weights[size / 2] + weights[size / 2 - 1]) / 2
                }
            }
            AggregateKind::BSum => weights.iter().take(b).sum(),
            AggregateKind::Sum => weights.iter().sum(),
        }
    }

    fn first_free_matching_color(lop: &[bool], rop: &[bool]) -> ColorIndex {
        let mut c = 0;
        while c < lop.len() && !(lop[c] && rop[c]) {
            c += 1;
        }
        c as ColorIndex
    }
}

impl MatchingHeuristic for NodeCentered {
    fn prepare(&mut self, graph: &Snapshot, num_matchings: ColorIndex) -> bool {
        if num_matchings == 0 {
            return false;
        }
        self.state.reset(num_matchings, graph.vertex_count(), graph.arc_count());
        true
    }

    fn run(&mut self, graph: &mut Snapshot) {
        let n = graph.vertex_count();
        let b = self.state.num_matchings;

        let mut global_max: Weight = 0;
        let mut edges: Vec<Vec<ArcIndex>> = vec![Vec::new(); n];
        let mut node_keys: Vec<Weight> = vec![0; n];
        let mut weight_scratch: Vec<Weight> = Vec::new();
        let mut nodes: Vec<VertexIndex> = Vec::with_capacity(n);
        for v in 0..n as VertexIndex {
            let incident = &mut edges[v as usize];
            graph.iterate_incident_arcs(v, |a| {
                if graph.weight(a) > 0 {
                    incident.push(a);
                }
            });
            incident.sort_by(|&lop, &rop| graph.weight(rop).cmp(&graph.weight(lop)));
            nodes.push(v);
            if let Some(&heaviest) = incident.first() {
                global_max = global_max.max(graph.weight(heaviest));
                weight_scratch.clear();
                weight_scratch.extend(incident.iter().map(|&a| graph.weight(a)));
                node_keys[v as usize] = self.aggregate_weights(&weight_scratch);
            }
        }

        nodes.sort_by(|&lop, &rop| node_keys[rop as usize].cmp(&node_keys[lop as usize]));

        let global_threshold: Weight = if self.threshold > 0.0 {
            (global_max as f64 * self.threshold) as Weight
        } else {
            0
        };

        let mut num_matching = vec![0 as ColorIndex; n];
        let mut free_colors: Vec<Vec<bool>> = vec![vec![true; b as usize]; n];

        for &v in &nodes {
            for &arc in &edges[v as usize] {
                if num_matching[v as usize] >= b || graph.weight(arc) < global_threshold {
                    break;
                }
                if self.state.edge_color[arc as usize] != UNCOLORED {
                    continue;
                }
                let (s, t) = graph.endpoints(arc);
                let color = Self::first_free_matching_color(&free_colors[s as usize], &free_colors[t as usize]);
                if color < b {
                    self.state.set_edge_color(graph, arc, color);
                    num_matching[s as usize] += 1;
                    free_colors[s as usize][color as usize] = false;
                    num_matching[t as usize] += 1;
                    free_colors[t as usize][color as usize] = false;
                    self.state.total_weight += graph.weight(arc);
                }
            }
        }

        if self.threshold > 0.0 {
            // recover arcs the threshold held back wherever capacity is left
            let mut left_edges: Vec<ArcIndex> = Vec::new();
            graph.iterate_arcs(|arc| {
                if self.state.edge_color[arc as usize] < b || graph.weight(arc) == 0 {
                    return;
                }
                let (s, t) = graph.endpoints(arc);
                if num_matching[s as usize] >= b || num_matching[t as usize] >= b {
                    return;
                }
                left_edges.push(arc);
            });
            left_edges.sort_by(|&lop, &rop| graph.weight(rop).cmp(&graph.weight(lop)));

            for &arc in &left_edges {
                let (s, t) = graph.endpoints(arc);
                if num_matching[s as usize] >= b
                    || num_matching[t as usize] >= b
                    || self.state.edge_color[arc as usize] < b
                {
                    continue;
                }
                let color = Self::first_free_matching_color(&free_colors[s as usize], &free_colors[t as usize]);
                if color < b {
                    self.state.set_edge_color(graph, arc, color);
                    free_colors[s as usize][color as usize] = false;
                    free_colors[t as usize][color as usize] = false;
                    num_matching[s as usize] += 1;
                    num_matching[t as usize] += 1;
                    self.state.total_weight += graph.weight(arc);
                }
            }
        }

        if self.config.sanity_check {
            self.state.sanity_check(graph);
        }
    }

    fn deliver(&self) -> Weight {
        self.state.deliver()
    }

    fn name(&self) -> String {
        let mut name = format!("node_centered-{}", self.aggregate);
        if self.threshold > 0.0 {
            name += &format!(" + threshold {}", self.threshold);
        }
        name
    }

    fn short_name(&self) -> String {
        let mut name = format!("NC-{}", self.aggregate);
        if self.threshold > 0.0 {
            name += &format!("+t{}", self.threshold);
        }
        name
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}
