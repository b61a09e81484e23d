//! Misra–Gries edge coloring
//!
//! A constructive proof of Vizing's theorem, driven to produce a proper edge
//! coloring with Δ+1 colors one edge at a time: build a maximal fan at the
//! tail of an uncolored arc, invert the cd-alternating path when the far
//! free color collides at the tail, shrink the fan to the prefix whose last
//! far endpoint has d free, rotate, and place d.
//!
//! Colors are written straight into `edge_color` while the fans rotate; the
//! mate maps are registered in one sweep at the end. Scratch arrays are reset
//! through touched lists so each step pays for what it touched, not for Δ.
//!

use crate::graph::Snapshot;
use crate::matching::MatchingState;
use crate::util::*;

pub struct MisraGries {
    fix_delta: ColorIndex,
    /// number of usable colors, max degree + 1
    delta: ColorIndex,
    max_color: ColorIndex,
    state: MatchingState,

    /// free colors at the far endpoint of the current fan's last arc
    free_color: Vec<bool>,
    /// free colors at the vertex whose arcs are being colored
    locally_free_color: Vec<bool>,
    touched_free_color: Vec<ColorIndex>,
    touched_locally_free_color: Vec<ColorIndex>,
    touched_path: Vec<VertexIndex>,
    visited_path: Vec<bool>,

    fan: Vec<ArcIndex>,
    fan_marked: Vec<bool>,

    outgoing_scratch: Vec<ArcIndex>,
    incident_scratch: Vec<ArcIndex>,
}

impl MisraGries {
    /// `max_degree` 0 means: compute the maximum degree from the snapshot
    pub fn new(max_degree: ColorIndex) -> Self {
        Self {
            fix_delta: max_degree,
            delta: 0,
            max_color: 0,
            state: MatchingState::new(),
            free_color: Vec::new(),
            locally_free_color: Vec::new(),
            touched_free_color: Vec::new(),
            touched_locally_free_color: Vec::new(),
            touched_path: Vec::new(),
            visited_path: Vec::new(),
            fan: Vec::new(),
            fan_marked: Vec::new(),
            outgoing_scratch: Vec::new(),
            incident_scratch: Vec::new(),
        }
    }

    pub fn prepare(&mut self, graph: &Snapshot) -> bool {
        let n = graph.vertex_count();
        self.delta = if self.fix_delta > 0 {
            self.fix_delta
        } else {
            (0..n as VertexIndex)
                .map(|v| graph.degree(v, true))
                .max()
                .unwrap_or(0) as ColorIndex
        };
        self.delta += 1;
        self.max_color = 0;
        self.state.reset(self.delta, n, graph.arc_count());
        self.free_color.clear();
        self.free_color.resize(self.delta as usize, true);
        self.locally_free_color.clear();
        self.locally_free_color.resize(self.delta as usize, true);
        self.visited_path.clear();
        self.visited_path.resize(n, false);
        self.fan_marked.clear();
        self.fan_marked.resize(n, false);
        self.touched_free_color.clear();
        self.touched_locally_free_color.clear();
        self.touched_path.clear();
        self.fan.clear();
        true
    }

    pub fn run(&mut self, graph: &Snapshot) {
        let n = graph.vertex_count();
        let mut out_arcs = std::mem::take(&mut self.outgoing_scratch);
        for v in 0..n as VertexIndex {
            // free colors of this vertex
            {
                let edge_color = &self.state.edge_color;
                let locally_free = &mut self.locally_free_color;
                let touched = &mut self.touched_locally_free_color;
                graph.iterate_incident_arcs(v, |a| {
                    let c = edge_color[a as usize];
                    if c != UNCOLORED {
                        locally_free[c as usize] = false;
                        touched.push(c);
                    }
                });
            }

            // it suffices to start from outgoing arcs only: every arc is
            // outgoing for exactly one of its endpoints
            out_arcs.clear();
            graph.iterate_outgoing_arcs(v, |a| out_arcs.push(a));
            for &xy in &out_arcs {
                if self.state.edge_color[xy as usize] != UNCOLORED {
                    continue;
                }
                self.color_one_edge(graph, v, xy);
            }

            for &c in &self.touched_locally_free_color {
                self.locally_free_color[c as usize] = true;
            }
            self.touched_locally_free_color.clear();
        }
        self.outgoing_scratch = out_arcs;

        // register mates from the finished coloring
        self.max_color = 0;
        let mut colored: Vec<(ArcIndex, ColorIndex)> = Vec::new();
        graph.iterate_arcs(|a| {
            let c = self.state.edge_color[a as usize];
            if c != UNCOLORED {
                colored.push((a, c));
            }
        });
        for (a, c) in colored {
            debug_assert!(c < self.delta);
            let (s, t) = graph.endpoints(a);
            self.state.mate[c as usize][s as usize] = Some(t);
            self.state.mate[c as usize][t as usize] = Some(s);
            if c > self.max_color {
                self.max_color = c;
            }
        }
    }

    pub fn num_colors(&self) -> ColorIndex {
        self.max_color + 1
    }

    pub fn into_state(self) -> MatchingState {
        self.state
    }

    fn color_one_edge(&mut self, graph: &Snapshot, v: VertexIndex, xy: ArcIndex) {
        self.maximal_fan(graph, v, xy);

        let c_color = first_free(&self.locally_free_color);
        // free_color was filled during fan growth for the last fan endpoint
        let d_color = first_free(&self.free_color);

        // path inversion and fan shrinking are only necessary when d is
        // not also free at v
        if !self.locally_free_color[d_color as usize] {
            self.invert_cd_path(graph, d_color, c_color, v);
            self.locally_free_color[d_color as usize] = true;
            self.locally_free_color[c_color as usize] = false;
            self.touched_locally_free_color.push(c_color);

            self.shrink_fan(graph, c_color, v);

            for &u in &self.touched_path {
                self.visited_path[u as usize] = false;
            }
            self.touched_path.clear();
        }

        // rotate and place d on the fan's last arc
        let rot_edge = *self.fan.last().expect("fan contains at least the starting arc");
        let prev = self.state.edge_color[rot_edge as usize];
        self.rotate_fan();
        if prev != UNCOLORED {
            debug_assert!(prev < self.delta);
            self.free_color[prev as usize] = true;
        }
        self.state.edge_color[rot_edge as usize] = d_color;
        self.locally_free_color[d_color as usize] = false;

        for &c in &self.touched_free_color {
            self.free_color[c as usize] = true;
        }
        self.touched_free_color.clear();
        for &a in &self.fan {
            let (s, t) = graph.endpoints(a);
            self.fan_marked[s as usize] = false;
            self.fan_marked[t as usize] = false;
        }
        self.fan_marked[v as usize] = false;
        self.fan.clear();

        self.touched_locally_free_color.push(d_color);
    }

    /// Grow the fan at `s` starting with `xy`: repeatedly append any incident
    /// arc whose color is free at the far endpoint of the current last arc.
    /// `free_color` tracks the last far endpoint's free colors throughout.
    fn maximal_fan(&mut self, graph: &Snapshot, s: VertexIndex, xy: ArcIndex) {
        let t = graph.other(xy, s);
        self.fan.clear();
        self.fill_far_free_colors(graph, t);
        self.fan_marked[t as usize] = true;
        self.fan.push(xy);

        let mut incident = std::mem::take(&mut self.incident_scratch);
        incident.clear();
        graph.iterate_incident_arcs(s, |a| incident.push(a));

        loop {
            let size_before = self.fan.len();
            for idx in 0..incident.len() {
                let a = incident[idx];
                let target = graph.other(a, s);
                if self.fan_marked[target as usize] {
                    continue;
                }
                let c = self.state.edge_color[a as usize];
                if c != UNCOLORED && self.free_color[c as usize] {
                    // the fan end moves to target: rebuild its free colors
                    for &el in &self.touched_free_color {
                        self.free_color[el as usize] = true;
                    }
                    self.touched_free_color.clear();
                    self.fill_far_free_colors(graph, target);
                    self.fan.push(a);
                    self.fan_marked[target as usize] = true;
                }
            }
            // maximality needs another pass whenever something was appended
            if self.fan.len() == size_before {
                break;
            }
        }
        self.incident_scratch = incident;
    }

    fn fill_far_free_colors(&mut self, graph: &Snapshot, v: VertexIndex) {
        let edge_color = &self.state.edge_color;
        let free = &mut self.free_color;
        let touched = &mut self.touched_free_color;
        graph.iterate_incident_arcs(v, |a| {
            let c = edge_color[a as usize];
            if c != UNCOLORED {
                free[c as usize] = false;
                touched.push(c);
            }
        });
    }

    /// Invert the maximal alternating path of colors {c, d} starting at
    /// `start` with a c-colored arc: every c-arc on it becomes d and vice
    /// versa. Visited vertices are recorded in `touched_path` for the fan
    /// shrinking step. The {c, d} subgraph has maximum degree two, so the
    /// walk is a simple path.
    fn invert_cd_path(&mut self, graph: &Snapshot, c: ColorIndex, d: ColorIndex, start: VertexIndex) {
        debug_assert_ne!(c, d);
        let mut want = c;
        let mut other = d;
        let mut current = start;
        self.visited_path[current as usize] = true;
        self.touched_path.push(current);
        loop {
            let mut next_arc: Option<ArcIndex> = None;
            {
                let edge_color = &self.state.edge_color;
                let visited = &self.visited_path;
                graph.iterate_incident_arcs(current, |a| {
                    if next_arc.is_none()
                        && edge_color[a as usize] == want
                        && !visited[graph.other(a, current) as usize]
                    {
                        next_arc = Some(a);
                    }
                });
            }
            let Some(a) = next_arc else {
                break;
            };
            let target = graph.other(a, current);
            self.state.edge_color[a as usize] = other;
            self.visited_path[target as usize] = true;
            self.touched_path.push(target);
            current = target;
            std::mem::swap(&mut want, &mut other);
        }
    }

    /// After the inversion, some fan arc may now carry color c. Keep the fan
    /// prefix up to the arc before it, unless that arc's far endpoint lies on
    /// the inverted path (then the whole fan is still valid).
    fn shrink_fan(&mut self, graph: &Snapshot, c: ColorIndex, root: VertexIndex) {
        let mut vindex = 0usize;
        let mut fan_edge_found = false;
        for i in 0..self.fan.len() {
            if self.state.edge_color[self.fan[i] as usize] == c {
                debug_assert!(i > 0, "the fan's first arc is uncolored");
                fan_edge_found = true;
                vindex = i - 1;
                break;
            }
        }
        if !fan_edge_found {
            return;
        }

        let v = graph.other(self.fan[vindex], root);
        if !self.touched_path.contains(&v) {
            for &a in &self.fan[vindex + 1..] {
                let far = graph.other(a, root);
                self.fan_marked[far as usize] = false;
            }
            self.fan.truncate(vindex + 1);
        }
    }

    /// each fan arc takes the color of its successor; the last arc is left
    /// uncolored for the caller to place d on
    fn rotate_fan(&mut self) {
        for i in 0..self.fan.len() - 1 {
            self.state.edge_color[self.fan[i] as usize] = self.state.edge_color[self.fan[i + 1] as usize];
        }
        let last = *self.fan.last().expect("fan is never empty here");
        self.state.edge_color[last as usize] = UNCOLORED;
    }
}

fn first_free(colors: &[bool]) -> ColorIndex {
    let mut i = 0;
    while i < colors.len() && !colors[i] {
        i += 1;
    }
    i as ColorIndex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SnapshotBuilder;

    fn assert_proper_coloring(graph: &Snapshot, state: &MatchingState, max_colors: ColorIndex) {
        let n = graph.vertex_count();
        for v in 0..n as VertexIndex {
            let mut seen = vec![false; max_colors as usize];
            graph.iterate_incident_arcs(v, |a| {
                let c = state.edge_color[a as usize];
                if c != UNCOLORED {
                    assert!(c < max_colors, "color {} out of range at vertex {}", c, v);
                    assert!(!seen[c as usize], "color {} repeated at vertex {}", c, v);
                    seen[c as usize] = true;
                }
            });
        }
    }

    fn color_all(graph: &Snapshot) -> MisraGries {
        let mut mg = MisraGries::new(0);
        assert!(mg.prepare(graph));
        mg.run(graph);
        // every arc must be colored
        graph.iterate_arcs(|a| {
            assert_ne!(mg.state.edge_color[a as usize], UNCOLORED, "arc {} left uncolored", a);
        });
        mg
    }

    #[test]
    fn colors_a_triangle_with_three_colors() {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 1);
        builder.add_arc(2, 3, 1);
        builder.add_arc(1, 3, 1);
        let g = builder.build();
        let mg = color_all(&g);
        // Δ = 2, so at most 3 colors
        assert!(mg.num_colors() <= 3);
        assert_proper_coloring(&g, &mg.state, mg.delta);
    }

    #[test]
    fn colors_a_star_with_degree_colors() {
        let mut builder = SnapshotBuilder::new();
        for leaf in 2..=5 {
            builder.add_arc(1, leaf, 1);
        }
        let g = builder.build();
        let mg = color_all(&g);
        assert_eq!(mg.num_colors(), 4);
        assert_proper_coloring(&g, &mg.state, mg.delta);
    }

    #[test]
    fn colors_k4_within_delta_plus_one() {
        let mut builder = SnapshotBuilder::new();
        for u in 1..=4u32 {
            for v in (u + 1)..=4 {
                builder.add_arc(u, v, 1);
            }
        }
        let g = builder.build();
        let mg = color_all(&g);
        // Δ = 3: Vizing guarantees at most 4 colors
        assert!(mg.num_colors() <= 4);
        assert_proper_coloring(&g, &mg.state, mg.delta);
    }

    #[test]
    fn colors_a_long_even_cycle() {
        let mut builder = SnapshotBuilder::new();
        let n = 10u32;
        for v in 1..=n {
            builder.add_arc(v, v % n + 1, 1);
        }
        let g = builder.build();
        let mg = color_all(&g);
        assert!(mg.num_colors() <= 3);
        assert_proper_coloring(&g, &mg.state, mg.delta);
    }

    #[test]
    fn mates_match_the_coloring() {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 1);
        builder.add_arc(2, 3, 1);
        builder.add_arc(3, 4, 1);
        let g = builder.build();
        let mg = color_all(&g);
        let mut colored = 0;
        g.iterate_arcs(|a| {
            let c = mg.state.edge_color[a as usize];
            let (s, t) = g.endpoints(a);
            assert_eq!(mg.state.mate_of(c, s), Some(t));
            assert_eq!(mg.state.mate_of(c, t), Some(s));
            colored += 1;
        });
        assert_eq!(colored, 3);
    }

    #[test]
    fn respects_a_fixed_degree_bound() {
        // two disjoint edges, forced bound 1: colors stay below 2
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 1);
        builder.add_arc(3, 4, 1);
        let g = builder.build();
        let mut mg = MisraGries::new(1);
        assert!(mg.prepare(&g));
        mg.run(&g);
        assert_eq!(mg.num_colors(), 1);
    }
}
