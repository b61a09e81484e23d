//! k-Edge-Coloring
//!
//! The Vizing mechanics of Misra–Gries, restricted to k = b colors. Arcs are
//! offered heaviest first; an arc whose endpoints are both saturated, or for
//! which no free color can be arranged, simply stays uncolored. The fan is
//! grown from the colored arcs of one endpoint and the cd-path is inverted
//! iteratively through the arc-valued mate maps.
//!
//! Orthogonal variants: common-color (take a color free at both endpoints
//! without any fan work), lightest-color (prefer the free color whose class
//! has accumulated the least weight), and long rotation (when d is already
//! free at the root, rotate the whole fan instead of inverting).
//!

use crate::algorithm::MatchingHeuristic;
use crate::config::MatchingConfig;
use crate::graph::Snapshot;
use crate::matching::MatchingState;
use crate::util::*;

pub struct KEdgeColoring {
    config: MatchingConfig,
    find_common_color: bool,
    use_lightest_color: bool,
    rotate_long: bool,

    state: MatchingState,
    num_colors: ColorIndex,
    /// matched-degree per vertex
    matched: Vec<ColorIndex>,

    color_weights: Vec<Weight>,
    /// color ids sorted ascending by accumulated class weight
    colors_by_weight: Vec<ColorIndex>,

    fan: Vec<ArcIndex>,
    colored_arcs: Vec<ArcIndex>,
    colored_arcs_other: Vec<ArcIndex>,
}

impl KEdgeColoring {
    pub fn new(config: &MatchingConfig, common_color: bool, lightest_color: bool, max_rotate: bool) -> Self {
        Self {
            config: config.clone(),
            find_common_color: common_color,
            use_lightest_color: lightest_color,
            rotate_long: max_rotate,
            state: MatchingState::new(),
            num_colors: 0,
            matched: Vec::new(),
            color_weights: Vec::new(),
            colors_by_weight: Vec::new(),
            fan: Vec::new(),
            colored_arcs: Vec::new(),
            colored_arcs_other: Vec::new(),
        }
    }

    pub fn num_colors(&self) -> ColorIndex {
        self.num_colors
    }

    fn is_free_color(&self, u: VertexIndex, color: ColorIndex) -> bool {
        if color == UNCOLORED {
            return false;
        }
        debug_assert!((color as usize) < self.state.arc_to_mate.len());
        self.state.arc_to_mate[color as usize][u as usize].is_none()
    }

    fn find_free_color(&self, u: VertexIndex) -> ColorIndex {
        let b = self.state.num_matchings;
        if self.use_lightest_color {
            for &c in &self.colors_by_weight {
                if self.is_free_color(u, c) {
                    return c;
                }
            }
            UNCOLORED
        } else {
            let mut c = 0;
            while c < b && !self.is_free_color(u, c) {
                c += 1;
            }
            if c < b {
                c
            } else {
                UNCOLORED
            }
        }
    }

    /// Fan construction over the colored arcs of `x`: keep appending any arc
    /// whose color is free at the far endpoint of the current last arc; stop
    /// for good once an appended arc's far endpoint is saturated.
    fn quicker_fan(&mut self, graph: &Snapshot, x: VertexIndex, xy: ArcIndex) {
        self.fan.clear();
        self.fan.push(xy);

        self.colored_arcs.clear();
        {
            let edge_color = &self.state.edge_color;
            let colored_arcs = &mut self.colored_arcs;
            graph.iterate_incident_arcs(x, |a| {
                if edge_color[a as usize] != UNCOLORED {
                    colored_arcs.push(a);
                }
            });
        }

        let b = self.state.num_matchings;
        loop {
            let mut extended = false;
            self.colored_arcs_other.clear();
            let mut i = 0;
            while i < self.colored_arcs.len() {
                let a = self.colored_arcs[i];
                let last_far = graph.other(*self.fan.last().expect("fan is non-empty"), x);
                if self.is_free_color(last_far, self.state.edge_color[a as usize]) {
                    self.fan.push(a);
                    if self.matched[graph.other(a, x) as usize] == b {
                        extended = false;
                        break;
                    }
                    i += 1;
                    extended = true;
                } else {
                    self.colored_arcs_other.push(a);
                    i += 1;
                }
            }
            if !extended {
                break;
            }
            std::mem::swap(&mut self.colored_arcs, &mut self.colored_arcs_other);
        }
    }

    /// Walk from `x` along arcs alternately colored d and c, recoloring each
    /// to the other color. The arc-valued mate maps drive the walk, so this
    /// needs no visited bookkeeping.
    fn invert_cd_path(&mut self, graph: &Snapshot, x: VertexIndex, c: ColorIndex, d: ColorIndex) {
        let mut x = x;
        let mut arc_to_recolor = self.state.arc_to_mate[d as usize][x as usize];
        let mut next_color = c;

        while let Some(arc) = arc_to_recolor {
            x = graph.other(arc, x);
            let next_arc = self.state.arc_to_mate[next_color as usize][x as usize];

            self.state.unset_edge_color(graph, arc);
            self.state.set_edge_color(graph, arc, next_color);

            arc_to_recolor = next_arc;
            next_color = if next_color == c { d } else { c };
        }
    }

    /// shift each fan arc's color onto its predecessor; the arc at `len - 1`
    /// ends up uncolored for the caller to place d on
    fn rotate_fan(&mut self, graph: &Snapshot, len: usize) {
        if len == 0 {
            return;
        }
        let mut previous = self.fan[0];
        for i in 1..len {
            let next = self.fan[i];
            let c = self.state.edge_color[next as usize];
            self.state.unset_edge_color(graph, next);
            self.state.set_edge_color(graph, previous, c);
            previous = next;
        }
    }

    /// Returns the color assigned, `TRY_OTHER_ENDPOINT` when the fan's last
    /// far endpoint has no free color (the caller retries from the other
    /// side), or `UNCOLORED` when x itself has none.
    fn color_edge(&mut self, graph: &Snapshot, xy: ArcIndex, x: VertexIndex) -> ColorIndex {
        let b = self.state.num_matchings;
        if self.find_common_color {
            let (tail, head) = graph.endpoints(xy);
            let c_common = self.state.matching_free_color(tail, head);
            if c_common < b {
                self.state.set_edge_color(graph, xy, c_common);
                return c_common;
            }
        }

        let c = self.find_free_color(x);
        if c >= b {
            return UNCOLORED;
        }

        self.quicker_fan(graph, x, xy);
        debug_assert!(!self.fan.is_empty());

        let last_far = graph.other(*self.fan.last().expect("fan is non-empty"), x);
        let d = self.find_free_color(last_far);
        if d >= b {
            return TRY_OTHER_ENDPOINT;
        }

        if !self.rotate_long || !self.is_free_color(x, d) {
            if c != d {
                self.invert_cd_path(graph, x, c, d);
            }
            let w = self
                .fan
                .iter()
                .position(|&a| self.is_free_color(graph.other(a, x), d));
            let Some(w) = w else {
                unreachable!("after the inversion some fan arc has d free at its far endpoint");
            };
            self.rotate_fan(graph, w + 1);
            self.state.set_edge_color(graph, self.fan[w], d);
        } else {
            let len = self.fan.len();
            self.rotate_fan(graph, len);
            self.state.set_edge_color(graph, self.fan[len - 1], d);
        }
        c.max(d)
    }

    fn edge_coloring(&mut self, graph: &mut Snapshot) -> ColorIndex {
        let b = self.state.num_matchings;
        let mut colors: ColorIndex = 0;

        let mut edges: Vec<ArcIndex> = Vec::with_capacity(graph.arc_count());
        let mut zero_weight: Vec<ArcIndex> = Vec::new();
        graph.iterate_arcs(|arc| {
            if graph.weight(arc) > 0 {
                edges.push(arc);
            } else {
                zero_weight.push(arc);
            }
        });
        // zero-weight arcs carry no matching weight; hide them for good
        for &arc in &zero_weight {
            graph.deactivate_arc(arc);
        }
        edges.sort_by(|&lop, &rop| graph.weight(rop).cmp(&graph.weight(lop)));

        for &a in &edges {
            let (tail, head) = graph.endpoints(a);
            if self.matched[tail as usize] >= b || self.matched[head as usize] >= b {
                continue;
            }
            let mut c = self.color_edge(graph, a, tail);
            if c == TRY_OTHER_ENDPOINT {
                debug_assert_eq!(self.state.edge_color[a as usize], UNCOLORED);
                c = self.color_edge(graph, a, head);
            }
            if c < b {
                colors = colors.max(c + 1);
                self.state.total_weight += graph.weight(a);
                self.matched[tail as usize] += 1;
                self.matched[head as usize] += 1;

                if self.use_lightest_color {
                    self.color_weights[c as usize] += graph.weight(a);
                    // one bubble pass keeps the ordering incremental
                    let mut swapped = false;
                    for i in 0..(b as usize).saturating_sub(1) {
                        let (lo, hi) = (self.colors_by_weight[i], self.colors_by_weight[i + 1]);
                        if self.color_weights[lo as usize] > self.color_weights[hi as usize] {
                            self.colors_by_weight.swap(i, i + 1);
                            swapped = true;
                        } else if swapped {
                            break;
                        }
                    }
                }
            }
        }
        colors
    }
}

impl MatchingHeuristic for KEdgeColoring {
    fn prepare(&mut self, graph: &Snapshot, num_matchings: ColorIndex) -> bool {
        if num_matchings == 0 {
            return false;
        }
        self.state.reset(num_matchings, graph.vertex_count(), graph.arc_count());
        self.num_colors = 0;
        self.matched.clear();
        self.matched.resize(graph.vertex_count(), 0);
        if self.use_lightest_color {
            self.color_weights.clear();
            self.color_weights.resize(num_matchings as usize, 0);
            self.colors_by_weight.clear();
            self.colors_by_weight.extend(0..num_matchings);
        }
        true
    }

    fn run(&mut self, graph: &mut Snapshot) {
        self.num_colors = self.edge_coloring(graph);
        if self.config.sanity_check {
            self.state.sanity_check(graph);
        }
    }

    fn deliver(&self) -> Weight {
        self.state.deliver()
    }

    fn name(&self) -> String {
        let mut flags: Vec<&str> = Vec::new();
        if self.find_common_color {
            flags.push("CC");
        }
        if self.use_lightest_color {
            flags.push("LC");
        }
        if self.rotate_long {
            flags.push("RL");
        }
        if flags.is_empty() {
            "k-Edge Coloring".into()
        } else {
            format!("k-Edge Coloring ({})", flags.join(", "))
        }
    }

    fn short_name(&self) -> String {
        let mut name = String::from("k-EC");
        if self.find_common_color {
            name += "+CC";
        }
        if self.use_lightest_color {
            name += "-LC";
        }
        if self.rotate_long {
            name += "-RL";
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SnapshotBuilder;

    fn run_variant(
        graph: &mut Snapshot,
        b: ColorIndex,
        cc: bool,
        lc: bool,
        rl: bool,
    ) -> (Weight, ColorIndex) {
        let mut config = MatchingConfig::default();
        config.sanity_check = true;
        let mut algo = KEdgeColoring::new(&config, cc, lc, rl);
        assert!(algo.prepare(graph, b));
        algo.run(graph);
        (algo.deliver(), algo.num_colors())
    }

    #[test]
    fn triangle_with_one_color_keeps_heaviest() {
        for &(cc, lc, rl) in &[(false, false, false), (true, false, false), (false, false, true), (true, true, true)] {
            let mut builder = SnapshotBuilder::new();
            builder.add_arc(1, 2, 10);
            builder.add_arc(2, 3, 20);
            builder.add_arc(1, 3, 30);
            let mut g = builder.build();
            let (weight, colors) = run_variant(&mut g, 1, cc, lc, rl);
            assert_eq!(weight, 30);
            assert!(colors <= 1);
        }
    }

    #[test]
    fn star_with_two_colors_takes_two_heaviest() {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 10);
        builder.add_arc(1, 3, 20);
        builder.add_arc(1, 4, 30);
        builder.add_arc(1, 5, 40);
        let mut g = builder.build();
        let (weight, colors) = run_variant(&mut g, 2, true, false, false);
        assert_eq!(weight, 70);
        assert!(colors <= 2);
    }

    #[test]
    fn path_of_three_edges_uses_fan_recoloring() {
        // heaviest-first order forces the middle edge before one side edge;
        // with two colors everything must still be colored
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 3);
        builder.add_arc(2, 3, 5);
        builder.add_arc(3, 4, 4);
        let mut g = builder.build();
        for &(cc, rl) in &[(false, false), (true, false), (false, true), (true, true)] {
            let (weight, colors) = run_variant(&mut g, 2, cc, false, rl);
            assert_eq!(weight, 12);
            assert!(colors <= 2);
        }
    }

    fn clique5() -> Snapshot {
        let mut builder = SnapshotBuilder::new();
        let mut w = 1;
        for u in 1..=5u32 {
            for v in (u + 1)..=5 {
                builder.add_arc(u, v, w);
                w += 1;
            }
        }
        builder.build()
    }

    #[test]
    fn colors_never_exceed_budget_on_a_clique() {
        for &(cc, lc, rl) in &[(false, false, false), (true, false, false), (false, true, false), (true, true, true)] {
            let mut g = clique5();
            let (_, colors) = run_variant(&mut g, 3, cc, lc, rl);
            assert!(colors <= 3);
        }
    }

    #[test]
    fn zero_weight_arcs_stay_deactivated() {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 0);
        builder.add_arc(2, 3, 4);
        let mut g = builder.build();
        let (weight, _) = run_variant(&mut g, 1, true, false, false);
        assert_eq!(weight, 4);
        assert!(!g.is_active(0));
        assert!(g.is_active(1));
    }
}
