//! Collapses chains of collinear, touching segments.

use crate::segment::LineSegment;
use log::{debug, trace, warn};

/// Segment count above which merging is skipped when none is configured.
pub const DEFAULT_MERGE_THRESHOLD: usize = 20_000;

/// Fuses collinear segments that share an endpoint into single segments.
///
/// The rendered picture is unchanged; only the number of segments drops. Pairwise
/// comparison is quadratic, so inputs larger than the threshold pass through as is.
#[derive(Clone, Copy, Debug)]
pub struct SegmentMerger {
    threshold: usize,
}

impl Default for SegmentMerger {
    fn default() -> Self {
        Self::new(DEFAULT_MERGE_THRESHOLD)
    }
}

impl SegmentMerger {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Merges `segments`, keeping the order of the surviving anchors.
    ///
    /// Each unconsumed segment in turn becomes an anchor. Later segments identical to
    /// it are dropped; later segments that touch it and have the same slope are folded
    /// into it, after which the scan restarts just past the anchor since the longer
    /// segment may now touch others.
    pub fn merge(&self, segments: &[LineSegment]) -> Vec<LineSegment> {
        if segments.len() > self.threshold {
            warn!(
                "skipping merge: {} segments exceed threshold {}",
                segments.len(),
                self.threshold
            );
            return segments.to_vec();
        }

        let mut pending: Vec<Option<LineSegment>> = segments.iter().copied().map(Some).collect();
        let mut merged = Vec::with_capacity(segments.len());

        for i in 0..pending.len() {
            let Some(mut anchor) = pending[i].take() else {
                continue;
            };

            let mut j = i + 1;
            while j < pending.len() {
                let slot = pending[j];
                match slot {
                    Some(candidate) if candidate == anchor => {
                        pending[j] = None;
                        j += 1;
                    }
                    Some(candidate)
                        if anchor.is_joined(&candidate) && anchor.is_parallel(&candidate) =>
                    {
                        trace!("folding {candidate} into {anchor}");
                        anchor = anchor.union(&candidate);
                        pending[j] = None;
                        j = i + 1;
                    }
                    _ => j += 1,
                }
            }

            merged.push(anchor);
        }

        debug!("merged {} segments into {}", segments.len(), merged.len());
        merged
    }
}
