use serde::{Deserialize, Serialize};

/// Index into the category list of the palette.
pub type CategoryIndex = usize;

/// Index into a [`StackTable`].
pub type StackIndex = usize;

/// Where a sample sits relative to the current selection and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionState {
    #[default]
    Selected,
    BeforeSelected,
    AfterSelected,
    FilteredOutByTransform,
    /// Samples hidden by the active-tab filter are never drawn.
    FilteredOutByActiveTab,
}

impl SelectionState {
    /// Number of states that own a fill buffer.
    pub const FILL_SLOTS: usize = 4;

    /// Slot of this state in a per-category buffer table.
    ///
    /// `FilteredOutByActiveTab` has no slot.
    #[inline]
    #[must_use]
    pub fn fill_slot(self) -> Option<usize> {
        match self {
            Self::Selected => Some(0),
            Self::BeforeSelected => Some(1),
            Self::AfterSelected => Some(2),
            Self::FilteredOutByTransform => Some(3),
            Self::FilteredOutByActiveTab => None,
        }
    }
}

/// Per-sample columns of a thread, sorted by time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleTable {
    /// Sample timestamps in milliseconds, non-decreasing.
    pub time: Vec<f64>,
    /// Originating stack of each sample; `None` when the stack was dropped.
    pub stack: Vec<Option<StackIndex>>,
}

impl SampleTable {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Copy of the samples in `start..end`.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Self {
        Self {
            time: self.time[start..end].to_vec(),
            stack: self.stack[start..end].to_vec(),
        }
    }
}

/// Category of every stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackTable {
    pub category: Vec<CategoryIndex>,
}

impl StackTable {
    #[inline]
    #[must_use]
    pub fn category_of(&self, stack: StackIndex) -> Option<CategoryIndex> {
        self.category.get(stack).copied()
    }
}

/// An unfiltered thread: its samples, stacks and optional CPU usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub samples: SampleTable,
    pub stack_table: StackTable,
    /// CPU usage (0 – 100) of the interval ending at each sample.
    /// `None` when the source recorded no CPU deltas.
    pub cpu_percentage: Option<Vec<u8>>,
}

impl Thread {
    /// Whether the thread carries any CPU usage information.
    #[inline]
    #[must_use]
    pub fn has_cpu_usage(&self) -> bool {
        self.cpu_percentage.is_some()
    }

    /// CPU ratio in `[0, 1]` of the interval ending at `sample_index`.
    ///
    /// Without CPU data every interval counts as fully busy. Past the end of
    /// the buffer nothing was measured, so the ratio is zero.
    #[must_use]
    pub fn cpu_ratio(&self, sample_index: usize) -> f64 {
        match &self.cpu_percentage {
            None => 1.0,
            Some(percentages) => percentages
                .get(sample_index)
                .map_or(0.0, |&pct| f64::from(pct.min(100)) / 100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_tab_filter_has_no_slot() {
        assert_eq!(SelectionState::FilteredOutByActiveTab.fill_slot(), None);
        let slots: Vec<_> = [
            SelectionState::Selected,
            SelectionState::BeforeSelected,
            SelectionState::AfterSelected,
            SelectionState::FilteredOutByTransform,
        ]
        .iter()
        .filter_map(|s| s.fill_slot())
        .collect();
        assert_eq!(slots, vec![0, 1, 2, 3]);
    }

    #[test]
    fn cpu_ratio_without_data_is_one() {
        let thread = Thread::default();
        assert_eq!(thread.cpu_ratio(0), 1.0);
        assert_eq!(thread.cpu_ratio(42), 1.0);
    }

    #[test]
    fn cpu_ratio_scales_percentages() {
        let thread = Thread {
            cpu_percentage: Some(vec![0, 50, 100]),
            ..Thread::default()
        };
        assert_eq!(thread.cpu_ratio(1), 0.5);
        assert_eq!(thread.cpu_ratio(2), 1.0);
        assert_eq!(thread.cpu_ratio(3), 0.0);
    }

    #[test]
    fn selection_state_parses_kebab_case() {
        let state: SelectionState = serde_json::from_str("\"filtered-out-by-transform\"").unwrap();
        assert_eq!(state, SelectionState::FilteredOutByTransform);
    }
}
