use super::arena::EntryId;

/// Recipient of attributed comment clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SinkTarget {
    Entry(EntryId),
    Header,
    Footer,
}

/// Indentation a sink claims, as an inclusive column range.
///
/// Ordinary sinks sit at one column; the closing boundary of a flow
/// collection spans the columns between its delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Depth {
    pub low: usize,
    pub high: usize,
}

impl Depth {
    pub fn at(col: usize) -> Self {
        Self {
            low: col,
            high: col,
        }
    }

    pub fn between(a: usize, b: usize) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Score of a cluster of `len` lines against this depth: the nearest point of
    /// `low * len ..= high * len` to the cluster's column sum.
    pub fn score(self, weight: usize, len: usize) -> usize {
        weight.clamp(self.low * len, self.high * len)
    }

    pub fn distance(self, weight: usize, len: usize) -> usize {
        self.score(weight, len).abs_diff(weight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sink {
    pub target: SinkTarget,
    pub depth: Depth,
    /// Stands for the end of its target rather than its start, so clusters
    /// assigned to it while incoming land below the target.
    pub closing: bool,
}

impl Sink {
    pub fn new(target: SinkTarget, depth: Depth) -> Self {
        Self {
            target,
            depth,
            closing: false,
        }
    }

    pub fn closing(target: SinkTarget, depth: Depth) -> Self {
        Self {
            target,
            depth,
            closing: true,
        }
    }

    pub fn header() -> Self {
        Self::new(SinkTarget::Header, Depth::at(0))
    }

    pub fn footer() -> Self {
        Self::new(SinkTarget::Footer, Depth::at(0))
    }
}

/// Sinks still visible to the attribution engine, oldest first.
#[derive(Debug, Default)]
pub(crate) struct SinkStack {
    sinks: Vec<Sink>,
}

impl SinkStack {
    pub fn push(&mut self, sink: Sink) {
        self.sinks.push(sink);
    }

    pub fn top(&self) -> Option<(usize, &Sink)> {
        self.sinks.len().checked_sub(1).map(|i| (i, &self.sinks[i]))
    }

    pub fn get(&self, index: usize) -> Option<&Sink> {
        self.sinks.get(index)
    }

    /// Most recent first, with stack indices.
    pub fn iter_recent(&self) -> impl Iterator<Item = (usize, &Sink)> {
        self.sinks.iter().enumerate().rev()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Pop every sink at least as deep as `depth`, returning them most recent first.
    pub fn obscure(&mut self, depth: Depth) -> Vec<Sink> {
        let keep = self
            .sinks
            .iter()
            .rposition(|sink| sink.depth.low < depth.low)
            .map_or(0, |i| i + 1);
        let mut obscured = self.sinks.split_off(keep);
        obscured.reverse();
        obscured
    }

    pub fn drain(&mut self) -> Vec<Sink> {
        let mut all = core::mem::take(&mut self.sinks);
        all.reverse();
        all
    }
}
