//! Decides which sink owns each comment cluster.
//!
//! Attribution runs whenever a new sink is about to become visible. The
//! buffered clusters are assigned either to the incoming sink (they sit above
//! its entry) or to one of the sinks already on the stack (they trail that
//! entry). Ownership is decided by indentation: a cluster's column sum is
//! compared with each candidate's depth scaled by the cluster length.

use super::buffer::Cluster;
use super::sink::{Depth, SinkStack};

/// Owner chosen for one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    /// The sink being opened; the cluster lies above its entry.
    Incoming,
    /// A sink already on the stack, by index; the cluster lies below its entry.
    Visible(usize),
}

/// Assign every cluster, in buffer order.
///
/// A cluster that directly follows the last structural token (no blank line in
/// between) belongs to the most recent visible sink. Once any cluster goes to
/// the incoming sink, all later clusters follow it: comments never hop back
/// above a boundary they have already crossed.
pub(crate) fn attribute(clusters: &[Cluster], visible: &SinkStack, incoming: Depth) -> Vec<Target> {
    let mut crossed = false;
    clusters
        .iter()
        .enumerate()
        .map(|(i, cluster)| {
            let target = if crossed {
                Target::Incoming
            } else if i == 0 && !cluster.after_blank {
                visible
                    .top()
                    .map_or(Target::Incoming, |(index, _)| Target::Visible(index))
            } else {
                nearest(cluster, visible, incoming)
            };
            crossed |= target == Target::Incoming;
            target
        })
        .collect()
}

/// The candidate whose scaled depth is closest to the cluster's weight.
///
/// The incoming sink is considered first, then visible sinks from most recent.
/// On equal distance the deeper candidate wins; at equal depth the incoming
/// sink and then the more recent sink keep it. Visible depths shrink going
/// down the stack, so the scan stops at the first score at or below the
/// weight.
fn nearest(cluster: &Cluster, visible: &SinkStack, incoming: Depth) -> Target {
    let len = cluster.len();
    let weight = cluster.weight;
    let mut best = Target::Incoming;
    let mut best_distance = incoming.distance(weight, len);
    let mut best_depth = incoming.low;
    for (index, sink) in visible.iter_recent() {
        let score = sink.depth.score(weight, len);
        let distance = score.abs_diff(weight);
        if distance < best_distance || (distance == best_distance && sink.depth.low > best_depth) {
            best = Target::Visible(index);
            best_distance = distance;
            best_depth = sink.depth.low;
        }
        if score <= weight {
            break;
        }
    }
    best
}
