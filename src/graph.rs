//! Graph Snapshot
//!
//! An immutable undirected graph with integer-weighted arcs and dense, stable
//! vertex and arc ids. Each unordered edge is represented by exactly one arc;
//! traversal exposes it through the tail's outgoing view and the head's
//! incoming view. Arcs can be deactivated, which hides them from all iteration
//! without changing any id.
//!

use crate::util::*;

pub struct Snapshot {
    tails: Vec<VertexIndex>,
    heads: Vec<VertexIndex>,
    weights: Vec<Weight>,
    active: Vec<bool>,
    /// arcs whose tail is v, in insertion order
    outgoing: Vec<Vec<ArcIndex>>,
    /// arcs whose head is v, in insertion order
    incoming: Vec<Vec<ArcIndex>>,
}

impl Snapshot {
    pub fn vertex_count(&self) -> usize {
        self.outgoing.len()
    }

    /// number of arcs ever added; deactivated arcs keep their id and count here
    pub fn arc_count(&self) -> usize {
        self.tails.len()
    }

    #[inline]
    pub fn weight(&self, arc: ArcIndex) -> Weight {
        self.weights[arc as usize]
    }

    #[inline]
    pub fn tail(&self, arc: ArcIndex) -> VertexIndex {
        self.tails[arc as usize]
    }

    #[inline]
    pub fn head(&self, arc: ArcIndex) -> VertexIndex {
        self.heads[arc as usize]
    }

    #[inline]
    pub fn endpoints(&self, arc: ArcIndex) -> (VertexIndex, VertexIndex) {
        (self.tails[arc as usize], self.heads[arc as usize])
    }

    /// the endpoint of `arc` other than `v`
    #[inline]
    pub fn other(&self, arc: ArcIndex, v: VertexIndex) -> VertexIndex {
        let tail = self.tails[arc as usize];
        if tail == v {
            self.heads[arc as usize]
        } else {
            debug_assert_eq!(self.heads[arc as usize], v, "vertex is not an endpoint of this arc");
            tail
        }
    }

    #[inline]
    pub fn is_active(&self, arc: ArcIndex) -> bool {
        self.active[arc as usize]
    }

    pub fn deactivate_arc(&mut self, arc: ArcIndex) {
        self.active[arc as usize] = false;
    }

    pub fn activate_arc(&mut self, arc: ArcIndex) {
        self.active[arc as usize] = true;
    }

    pub fn degree(&self, v: VertexIndex, include_deactivated: bool) -> usize {
        let out = &self.outgoing[v as usize];
        let inc = &self.incoming[v as usize];
        if include_deactivated {
            out.len() + inc.len()
        } else {
            out.iter().chain(inc.iter()).filter(|&&a| self.active[a as usize]).count()
        }
    }

    /// any active arc between u and v, in either orientation
    pub fn find_arc(&self, u: VertexIndex, v: VertexIndex) -> Option<ArcIndex> {
        for &a in &self.outgoing[u as usize] {
            if self.active[a as usize] && self.heads[a as usize] == v {
                return Some(a);
            }
        }
        for &a in &self.outgoing[v as usize] {
            if self.active[a as usize] && self.heads[a as usize] == u {
                return Some(a);
            }
        }
        None
    }

    pub fn iterate_arcs(&self, mut func: impl FnMut(ArcIndex)) {
        for arc in 0..self.tails.len() {
            if self.active[arc] {
                func(arc as ArcIndex);
            }
        }
    }

    pub fn iterate_outgoing_arcs(&self, v: VertexIndex, mut func: impl FnMut(ArcIndex)) {
        for &a in &self.outgoing[v as usize] {
            if self.active[a as usize] {
                func(a);
            }
        }
    }

    pub fn iterate_incoming_arcs(&self, v: VertexIndex, mut func: impl FnMut(ArcIndex)) {
        for &a in &self.incoming[v as usize] {
            if self.active[a as usize] {
                func(a);
            }
        }
    }

    /// outgoing arcs first, then incoming, matching the scan order the
    /// algorithms rely on for deterministic candidate selection
    pub fn iterate_incident_arcs(&self, v: VertexIndex, mut func: impl FnMut(ArcIndex)) {
        self.iterate_outgoing_arcs(v, &mut func);
        self.iterate_incoming_arcs(v, &mut func);
    }
}

#[derive(Default)]
pub struct SnapshotBuilder {
    num_vertices: usize,
    arcs: Vec<(VertexIndex, VertexIndex, Weight)>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// grows the vertex set to cover both endpoints
    pub fn add_arc(&mut self, tail: VertexIndex, head: VertexIndex, weight: Weight) {
        let needed = tail.max(head) as usize + 1;
        if needed > self.num_vertices {
            self.num_vertices = needed;
        }
        self.arcs.push((tail, head, weight));
    }

    pub fn build(self) -> Snapshot {
        let n = self.num_vertices;
        let m = self.arcs.len();
        let mut snapshot = Snapshot {
            tails: Vec::with_capacity(m),
            heads: Vec::with_capacity(m),
            weights: Vec::with_capacity(m),
            active: vec![true; m],
            outgoing: vec![Vec::new(); n],
            incoming: vec![Vec::new(); n],
        };
        for (id, (tail, head, weight)) in self.arcs.into_iter().enumerate() {
            snapshot.tails.push(tail);
            snapshot.heads.push(head);
            snapshot.weights.push(weight);
            snapshot.outgoing[tail as usize].push(id as ArcIndex);
            snapshot.incoming[head as usize].push(id as ArcIndex);
        }
        log::debug!("snapshot built: {} vertices, {} arcs", n, m);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Snapshot {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 10);
        builder.add_arc(2, 3, 20);
        builder.add_arc(1, 3, 30);
        builder.build()
    }

    #[test]
    fn snapshot_basic_accessors() {
        let g = triangle();
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.arc_count(), 3);
        assert_eq!(g.weight(2), 30);
        assert_eq!(g.endpoints(1), (2, 3));
        assert_eq!(g.other(0, 1), 2);
        assert_eq!(g.other(0, 2), 1);
    }

    #[test]
    fn snapshot_incident_iteration_order() {
        let g = triangle();
        let mut seen = vec![];
        g.iterate_incident_arcs(1, |a| seen.push(a));
        // outgoing (1,2), (1,3) first; vertex 1 has no incoming arcs
        assert_eq!(seen, vec![0, 2]);
        seen.clear();
        g.iterate_incident_arcs(3, |a| seen.push(a));
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn snapshot_deactivation_hides_arcs() {
        let mut g = triangle();
        g.deactivate_arc(2);
        assert_eq!(g.degree(1, false), 1);
        assert_eq!(g.degree(1, true), 2);
        assert_eq!(g.find_arc(1, 3), None);
        let mut count = 0;
        g.iterate_arcs(|_| count += 1);
        assert_eq!(count, 2);
        g.activate_arc(2);
        assert_eq!(g.find_arc(1, 3), Some(2));
        assert_eq!(g.find_arc(3, 1), Some(2));
    }
}
