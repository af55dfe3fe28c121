use std::collections::HashMap;

use crate::beat::BeatData;
use crate::dataset::Dataset;
use crate::grid::GridPosition;

/// Continuation lookup over a validated dataset.
///
/// Templates are indexed once by derived start position. A position with no
/// entry simply has no continuations; callers treat that as exhaustion.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyProvider {
    by_start: HashMap<GridPosition, Vec<BeatData>>,
    len: usize,
}

impl AdjacencyProvider {
    pub fn new(dataset: &Dataset) -> Self {
        let mut by_start: HashMap<GridPosition, Vec<BeatData>> = HashMap::new();
        let mut len = 0;
        for template in dataset.templates() {
            // Validated templates always resolve; blanks never reach a dataset.
            if let Some(start) = template.start_position() {
                by_start.entry(start).or_default().push(template.clone());
                len += 1;
            }
        }
        Self { by_start, len }
    }

    /// Every template starting at `end_position`, in dataset order.
    pub fn get_next_options(&self, end_position: GridPosition) -> &[BeatData] {
        self.by_start
            .get(&end_position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Start positions that have at least one continuation, sorted.
    pub fn positions(&self) -> Vec<GridPosition> {
        let mut out: Vec<GridPosition> = self.by_start.keys().copied().collect();
        out.sort();
        out
    }

    pub fn has_options(&self, position: GridPosition) -> bool {
        self.by_start.contains_key(&position)
    }

    /// Total indexed templates.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
