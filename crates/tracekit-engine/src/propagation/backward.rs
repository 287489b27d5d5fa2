//! Backward propagation: where did the origin's inflow come from.

use super::forward::collect;
use super::view::ComponentView;

/// Backward `[count, biomass]` shares from `origin` to every ancestor.
///
/// Mirror of the forward pass: reverse topological order, incoming edges,
/// weights normalized by each node's inflow.
pub fn backward_shares(view: &ComponentView, origin: usize) -> Vec<(usize, [f64; 2])> {
    let n = view.len();
    let mut acc = vec![[0.0f64; 2]; n];
    let mut reached = vec![false; n];
    acc[origin] = [1.0, 1.0];
    reached[origin] = true;

    for &v in view.order[..=view.position[origin]].iter().rev() {
        if !reached[v] {
            continue;
        }
        let carried = acc[v];
        for edge in &view.in_edges[v] {
            let slot = &mut acc[edge.peer];
            slot[0] += carried[0] * edge.weight[0];
            slot[1] += carried[1] * edge.weight[1];
            reached[edge.peer] = true;
        }
    }

    collect(acc, reached, origin)
}
