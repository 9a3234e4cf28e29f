use crate::event::{CommentKind, Mark};

/// A comment or blank-line marker waiting for attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pending {
    pub kind: CommentKind,
    pub text: String,
    pub mark: Mark,
}

impl Pending {
    pub fn is_blank(&self) -> bool {
        self.kind == CommentKind::Blank
    }
}

/// A maximal run of comment lines with no blank line inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cluster {
    pub lines: Vec<Pending>,
    /// Sum of the columns of `lines`.
    pub weight: usize,
    /// A blank marker precedes this cluster in the buffer.
    pub after_blank: bool,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

/// Split a drained buffer into clusters, dropping the blank markers.
pub(crate) fn partition(buffer: Vec<Pending>) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut current: Option<Cluster> = None;
    let mut seen_blank = false;
    for pending in buffer {
        if pending.is_blank() {
            seen_blank = true;
            clusters.extend(current.take());
            continue;
        }
        let cluster = current.get_or_insert_with(|| Cluster {
            lines: Vec::new(),
            weight: 0,
            after_blank: seen_blank,
        });
        cluster.weight += pending.mark.col;
        cluster.lines.push(pending);
    }
    clusters.extend(current);
    clusters
}

/// Split off the trailing part of `buffer` that lies left of `bound`.
///
/// Walks back from the end over blank markers and comments whose column is
/// below `bound`; the returned tail keeps its original order.
pub(crate) fn split_outdented(buffer: &mut Vec<Pending>, bound: usize) -> Vec<Pending> {
    let keep = buffer
        .iter()
        .rposition(|p| !p.is_blank() && p.mark.col >= bound)
        .map_or(0, |i| i + 1);
    buffer.split_off(keep)
}
