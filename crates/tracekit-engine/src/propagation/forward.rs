//! Forward propagation: where did the origin's outflow end up.

use tracekit_core::constants::{MAX_SHARE, MIN_SHARE};

use super::view::ComponentView;

/// Forward `[count, biomass]` shares from `origin` to every node it reaches.
///
/// `share(O, T)` is the sum over all paths `O -> .. -> T` of the product of
/// outflow fractions along the path, computed in one pass over the
/// topological order starting at `O`.
pub fn forward_shares(view: &ComponentView, origin: usize) -> Vec<(usize, [f64; 2])> {
    let n = view.len();
    let mut acc = vec![[0.0f64; 2]; n];
    let mut reached = vec![false; n];
    acc[origin] = [1.0, 1.0];
    reached[origin] = true;

    for &u in &view.order[view.position[origin]..] {
        if !reached[u] {
            continue;
        }
        let carried = acc[u];
        for edge in &view.out_edges[u] {
            let slot = &mut acc[edge.peer];
            slot[0] += carried[0] * edge.weight[0];
            slot[1] += carried[1] * edge.weight[1];
            reached[edge.peer] = true;
        }
    }

    collect(acc, reached, origin)
}

pub(super) fn collect(
    acc: Vec<[f64; 2]>,
    reached: Vec<bool>,
    origin: usize,
) -> Vec<(usize, [f64; 2])> {
    acc.into_iter()
        .zip(reached)
        .enumerate()
        .filter(|&(u, (_, hit))| hit && u != origin)
        .map(|(u, (shares, _))| (u, [clamp(shares[0]), clamp(shares[1])]))
        .collect()
}

/// Absorb rounding drift.
fn clamp(share: f64) -> f64 {
    if share.is_nan() {
        MIN_SHARE
    } else {
        share.clamp(MIN_SHARE, MAX_SHARE)
    }
}
