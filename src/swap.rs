//! Swap Kernel
//!
//! The shared 1-for-2 improvement move: take one matched arc out of a
//! matching and replace it by two heavier unmatched arcs, one per endpoint.
//! Used as a local pass over freshly matched arcs, as a global pass over
//! every colored arc, and by GPA's ROMA iteration.
//!

use crate::graph::Snapshot;
use crate::matching::MatchingState;
use crate::util::*;

/// Try to replace `arc` (matched in `round`) by two uncolored arcs, one
/// incident to each endpoint, whose far endpoints are free in `round` and
/// distinct from each other, maximizing weight on each side. Applies the
/// replacement and returns true when the two together outweigh `arc`.
pub fn swap_subroutine(graph: &Snapshot, state: &mut MatchingState, arc: ArcIndex, round: ColorIndex) -> bool {
    let (s, t) = graph.endpoints(arc);
    let mut lop: Option<ArcIndex> = None;
    let mut lop_weight: Weight = 0;
    let mut lop_target: VertexIndex = 0;
    let mut rop: Option<ArcIndex> = None;
    let mut rop_weight: Weight = 0;

    {
        let st = &*state;
        let mut consider = |candidate: ArcIndex, far: VertexIndex, is_lop: bool| {
            if st.edge_color[candidate as usize] != UNCOLORED || st.mate_of(round, far).is_some() {
                return;
            }
            let weight = graph.weight(candidate);
            if is_lop {
                if weight > lop_weight {
                    lop = Some(candidate);
                    lop_weight = weight;
                    lop_target = far;
                }
            } else if weight > rop_weight {
                // reject triangle replacements: the far endpoints of the two
                // replacement arcs must not coincide
                if lop_weight > 0 && far == lop_target {
                    return;
                }
                rop = Some(candidate);
                rop_weight = weight;
            }
        };
        graph.iterate_outgoing_arcs(s, |a| consider(a, graph.head(a), true));
        graph.iterate_incoming_arcs(s, |a| consider(a, graph.tail(a), true));
        graph.iterate_outgoing_arcs(t, |a| consider(a, graph.head(a), false));
        graph.iterate_incoming_arcs(t, |a| consider(a, graph.tail(a), false));
    }

    if lop_weight > 0 && rop_weight > 0 && lop_weight + rop_weight > graph.weight(arc) {
        let (lop, rop) = (lop.expect("lop_weight > 0"), rop.expect("rop_weight > 0"));
        let (s1, t1) = graph.endpoints(lop);
        let (s2, t2) = graph.endpoints(rop);
        debug_assert!(s1 != s2 && s1 != t2 && t1 != s2 && t1 != t2);
        state.unset_edge_color(graph, arc);
        state.set_edge_color(graph, lop, round);
        state.set_edge_color(graph, rop, round);
        state.total_weight = state.total_weight - graph.weight(arc) + lop_weight + rop_weight;
        return true;
    }
    false
}

/// One swap attempt per arc matched this round, in insertion order or in
/// reverse when `reverse` is set.
pub fn local_swaps(
    graph: &Snapshot,
    state: &mut MatchingState,
    matched_in_round: &[ArcIndex],
    round: ColorIndex,
    reverse: bool,
) -> bool {
    let mut succ = false;
    if reverse {
        for &arc in matched_in_round.iter().rev() {
            succ |= swap_subroutine(graph, state, arc, round);
        }
    } else {
        for &arc in matched_in_round {
            succ |= swap_subroutine(graph, state, arc, round);
        }
    }
    succ
}

/// After all matchings exist: revisit every colored arc in weight order
/// (ascending under `reverse`) and attempt a swap in a color that is still
/// free on both of its endpoints.
pub fn global_swaps(graph: &Snapshot, state: &mut MatchingState, reverse: bool) {
    let mut edges: Vec<ArcIndex> = Vec::new();
    graph.iterate_arcs(|arc| {
        if state.edge_color[arc as usize] < state.num_matchings {
            edges.push(arc);
        }
    });

    if reverse {
        edges.sort_by(|&lop, &rop| graph.weight(lop).cmp(&graph.weight(rop)));
    } else {
        edges.sort_by(|&lop, &rop| graph.weight(rop).cmp(&graph.weight(lop)));
    }

    for &arc in &edges {
        let (s, t) = graph.endpoints(arc);
        let round = state.matching_free_color(s, t);
        if round < state.num_matchings {
            swap_subroutine(graph, state, arc, round);
        }
    }
}
