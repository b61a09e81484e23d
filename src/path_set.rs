//! Path Set
//!
//! The growing collection of edge-disjoint simple paths and cycles GPA
//! assembles before each matching round. Every vertex starts as a trivial
//! path of length zero; offering an arc whose endpoints are both path
//! endpoints either joins two paths or closes an odd-length path into a
//! cycle. Paths are doubly linked through per-vertex next/prev slots, with
//! the connecting arc stored alongside each slot.
//!
//! Only the endpoints of a path are guaranteed to map to its representative
//! in `vertex_to_path`; interior vertices may point at absorbed entries.
//! Lookups therefore always go through an endpoint.
//!

use crate::graph::Snapshot;
use crate::util::*;

#[derive(Clone, Copy)]
pub struct Path {
    head: VertexIndex,
    tail: VertexIndex,
    length: u32,
    active: bool,
}

impl Path {
    fn init(v: VertexIndex) -> Self {
        Self {
            head: v,
            tail: v,
            length: 0,
            active: true,
        }
    }

    pub fn head(&self) -> VertexIndex {
        self.head
    }

    pub fn tail(&self) -> VertexIndex {
        self.tail
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn is_endpoint(&self, v: VertexIndex) -> bool {
        v == self.tail || v == self.head
    }

    pub fn is_cycle(&self) -> bool {
        self.tail == self.head && self.length > 0
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

pub struct PathSet {
    no_of_paths: u32,
    /// representative vertex of the path owning each vertex; authoritative
    /// for endpoints only
    vertex_to_path: Vec<VertexIndex>,
    paths: Vec<Path>,
    next: Vec<VertexIndex>,
    prev: Vec<VertexIndex>,
    next_edge: Vec<Option<ArcIndex>>,
    prev_edge: Vec<Option<ArcIndex>>,
}

impl PathSet {
    pub fn new(n: usize) -> Self {
        Self {
            no_of_paths: n as u32,
            vertex_to_path: (0..n as VertexIndex).collect(),
            paths: (0..n as VertexIndex).map(Path::init).collect(),
            next: (0..n as VertexIndex).collect(),
            prev: (0..n as VertexIndex).collect(),
            next_edge: vec![None; n],
            prev_edge: vec![None; n],
        }
    }

    pub fn get_path(&self, v: VertexIndex) -> &Path {
        &self.paths[self.vertex_to_path[v as usize] as usize]
    }

    pub fn path_count(&self) -> u32 {
        self.no_of_paths
    }

    pub fn next_vertex(&self, v: VertexIndex) -> VertexIndex {
        self.next[v as usize]
    }

    pub fn prev_vertex(&self, v: VertexIndex) -> VertexIndex {
        self.prev[v as usize]
    }

    pub fn edge_to_next(&self, v: VertexIndex) -> Option<ArcIndex> {
        self.next_edge[v as usize]
    }

    pub fn edge_to_prev(&self, v: VertexIndex) -> Option<ArcIndex> {
        self.prev_edge[v as usize]
    }

    fn is_endpoint(&self, v: VertexIndex) -> bool {
        self.next[v as usize] == v || self.prev[v as usize] == v
    }

    /// hook `neighbor` into v's free link slot, preferring next
    fn splice(&mut self, v: VertexIndex, neighbor: VertexIndex, arc: ArcIndex) {
        if self.next[v as usize] == v {
            self.next[v as usize] = neighbor;
            self.next_edge[v as usize] = Some(arc);
        } else {
            self.prev[v as usize] = neighbor;
            self.prev_edge[v as usize] = Some(arc);
        }
    }

    /// Offer an arc. Accepted when both endpoints are path endpoints and
    /// either lie on different (non-cycle) paths, which are joined, or on the
    /// same path of odd length, which is closed into a cycle. Returns whether
    /// the arc was taken.
    pub fn add_if_applicable(&mut self, graph: &Snapshot, arc: ArcIndex) -> bool {
        let s = graph.head(arc);
        let t = graph.tail(arc);

        if !self.is_endpoint(s) || !self.is_endpoint(t) {
            return false;
        }

        let source_id = self.vertex_to_path[s as usize];
        let target_id = self.vertex_to_path[t as usize];
        if self.paths[source_id as usize].is_cycle() || self.paths[target_id as usize].is_cycle() {
            return false;
        }

        if source_id != target_id {
            // joining two paths; the source path absorbs the target and the
            // new far endpoint's mapping migrates to the source
            let target_path = self.paths[target_id as usize];
            let source_path = &mut self.paths[source_id as usize];
            source_path.length += target_path.length + 1;

            if source_path.head == s && target_path.head == t {
                self.vertex_to_path[target_path.tail as usize] = source_id;
                source_path.head = target_path.tail;
            } else if source_path.head == s && target_path.tail == t {
                self.vertex_to_path[target_path.head as usize] = source_id;
                source_path.head = target_path.head;
            } else if source_path.tail == s && target_path.head == t {
                self.vertex_to_path[target_path.tail as usize] = source_id;
                source_path.tail = target_path.tail;
            } else if source_path.tail == s && target_path.tail == t {
                self.vertex_to_path[target_path.head as usize] = source_id;
                source_path.tail = target_path.head;
            }

            self.splice(s, t, arc);
            self.splice(t, s, arc);

            self.paths[target_id as usize].active = false;
            self.no_of_paths -= 1;
            true
        } else if self.paths[source_id as usize].length % 2 == 1 {
            // both endpoints on the same odd-length path: close the cycle
            let (head, tail) = {
                let path = &self.paths[source_id as usize];
                (path.head, path.tail)
            };
            self.paths[source_id as usize].length += 1;

            self.splice(head, tail, arc);
            self.splice(tail, head, arc);

            self.paths[source_id as usize].tail = head;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Snapshot, SnapshotBuilder};

    fn path4() -> Snapshot {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 1);
        builder.add_arc(2, 3, 1);
        builder.add_arc(3, 4, 1);
        builder.add_arc(4, 1, 1);
        builder.build()
    }

    #[test]
    fn joins_paths_at_endpoints() {
        let g = path4();
        let mut ps = PathSet::new(g.vertex_count());
        assert!(ps.add_if_applicable(&g, 0));
        assert!(ps.add_if_applicable(&g, 1));
        let p = ps.get_path(1);
        assert!(p.is_active());
        assert_eq!(p.length(), 2);
        assert!(!p.is_cycle());
        assert!(p.is_endpoint(1));
        assert!(p.is_endpoint(3));
        assert_eq!(ps.path_count(), g.vertex_count() as u32 - 2);
    }

    #[test]
    fn rejects_arcs_at_interior_vertices() {
        // a path 1-2-3 makes 2 interior; the chord (2,4) must be refused
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 1);
        builder.add_arc(2, 3, 1);
        builder.add_arc(2, 4, 1);
        let g = builder.build();
        let mut ps = PathSet::new(g.vertex_count());
        assert!(ps.add_if_applicable(&g, 0));
        assert!(ps.add_if_applicable(&g, 1));
        assert!(!ps.add_if_applicable(&g, 2));
    }

    #[test]
    fn closes_odd_path_into_cycle() {
        let g = path4();
        let mut ps = PathSet::new(g.vertex_count());
        for arc in 0..3 {
            assert!(ps.add_if_applicable(&g, arc));
        }
        // length 3 is odd: the closing arc is accepted
        assert!(ps.add_if_applicable(&g, 3));
        let p = ps.get_path(1);
        assert!(p.is_cycle());
        assert_eq!(p.length(), 4);
    }

    #[test]
    fn rejects_odd_cycles_and_finished_cycles() {
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 1);
        builder.add_arc(2, 3, 1);
        builder.add_arc(1, 3, 1);
        builder.add_arc(3, 4, 1);
        let g = builder.build();
        let mut ps = PathSet::new(g.vertex_count());
        assert!(ps.add_if_applicable(&g, 0));
        assert!(ps.add_if_applicable(&g, 1));
        // closing a length-2 path would make an odd cycle
        assert!(!ps.add_if_applicable(&g, 2));

        // close an even cycle, then try to extend it
        let mut builder = SnapshotBuilder::new();
        builder.add_arc(1, 2, 1);
        builder.add_arc(2, 3, 1);
        builder.add_arc(3, 4, 1);
        builder.add_arc(4, 1, 1);
        builder.add_arc(4, 5, 1);
        let g3 = builder.build();
        let mut ps3 = PathSet::new(g3.vertex_count());
        for arc in 0..4 {
            assert!(ps3.add_if_applicable(&g3, arc));
        }
        assert!(!ps3.add_if_applicable(&g3, 4));
    }

    #[test]
    fn linked_list_traverses_the_whole_path() {
        let g = path4();
        let mut ps = PathSet::new(g.vertex_count());
        ps.add_if_applicable(&g, 0);
        ps.add_if_applicable(&g, 1);
        ps.add_if_applicable(&g, 2);
        let p = *ps.get_path(1);
        // walk from the tail and count edges
        let mut seen = 0;
        let mut prev = p.tail();
        let mut current = p.tail();
        while seen < p.length() {
            let next = if ps.next_vertex(current) != prev && ps.next_vertex(current) != current {
                ps.next_vertex(current)
            } else {
                ps.prev_vertex(current)
            };
            prev = current;
            current = next;
            seen += 1;
        }
        assert!(p.is_endpoint(current));
        assert_eq!(seen, 3);
    }
}
