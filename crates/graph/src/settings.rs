use std::cmp::Ordering;
use std::fmt;

use activity_core::{CategoryIndex, SampleTable, SelectionState, Thread};
use activity_theme::CategoryDrawStyle;

use crate::positions::{PixelMapping, PrecomputedPositions};

/// Orders two range-filtered sample indexes the way same-time samples are
/// drawn on screen.
pub type SampleComparator = Box<dyn Fn(usize, usize) -> Ordering + Send + Sync>;

/// Canvas size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub device_pixel_ratio: f64,
}

/// Everything the host hands to the graph for one render.
///
/// Owned by the caller; the accumulator and the querier only ever borrow it.
pub struct RenderedComponentSettings {
    pub canvas: CanvasGeometry,
    /// The unfiltered thread. Sample categories and CPU usage are aligned
    /// to its sample table.
    pub full_thread: Thread,
    /// The visible samples, starting at `sample_index_offset` in the full
    /// thread.
    pub range_filtered_samples: SampleTable,
    pub sample_index_offset: usize,
    /// Category of every sample of the full thread.
    pub sample_categories: Vec<CategoryIndex>,
    /// Selection state of every range-filtered sample.
    pub samples_selected_states: Vec<SelectionState>,
    /// Nominal sampling interval in milliseconds.
    pub interval: f64,
    pub range_start: f64,
    pub range_end: f64,
    pub x_pixels_per_ms: f64,
    pub tree_order_sample_comparator: Option<SampleComparator>,
    /// Draw style of every category, indexed by category id.
    pub category_draw_styles: Vec<CategoryDrawStyle>,
}

impl RenderedComponentSettings {
    /// Settings for the part of `full_thread` that falls inside
    /// `[range_start, range_end]`, with every sample selected. A sample at
    /// exactly `range_end` is visible and lands on the last pixel.
    pub fn new(
        full_thread: Thread,
        sample_categories: Vec<CategoryIndex>,
        canvas: CanvasGeometry,
        (range_start, range_end): (f64, f64),
        interval: f64,
        category_draw_styles: Vec<CategoryDrawStyle>,
    ) -> Self {
        let times = &full_thread.samples.time;
        let start = times.partition_point(|&t| t < range_start);
        let end = times.partition_point(|&t| t <= range_end).max(start);
        let range_filtered_samples = full_thread.samples.slice(start, end);
        let duration = range_end - range_start;
        let x_pixels_per_ms = if duration > 0.0 {
            canvas.pixel_width as f64 / duration
        } else {
            0.0
        };

        Self {
            canvas,
            samples_selected_states: vec![SelectionState::Selected; end - start],
            range_filtered_samples,
            sample_index_offset: start,
            full_thread,
            sample_categories,
            interval,
            range_start,
            range_end,
            x_pixels_per_ms,
            tree_order_sample_comparator: None,
            category_draw_styles,
        }
    }

    /// Number of visible samples.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.range_filtered_samples.len()
    }

    pub fn pixel_mapping(&self) -> PixelMapping {
        PixelMapping {
            range_start: self.range_start,
            x_pixels_per_ms: self.x_pixels_per_ms,
            canvas_pixel_width: self.canvas.pixel_width,
        }
    }

    pub fn precompute_positions(&self) -> PrecomputedPositions {
        PrecomputedPositions::compute(
            &self.full_thread.samples.time,
            self.sample_index_offset,
            self.sample_count(),
            self.interval,
            &self.pixel_mapping(),
        )
    }

    /// CPU ratios of the intervals ending at, and right after, the visible
    /// sample `sample`.
    #[inline]
    pub fn cpu_ratios_around(&self, sample: usize) -> (f64, f64) {
        let full_index = self.sample_index_offset + sample;
        (
            self.full_thread.cpu_ratio(full_index),
            self.full_thread.cpu_ratio(full_index + 1),
        )
    }

    /// Category of the visible sample `sample`, as drawn.
    #[inline]
    pub fn sample_category(&self, sample: usize) -> Option<CategoryIndex> {
        self.sample_categories
            .get(self.sample_index_offset + sample)
            .copied()
    }

    #[inline]
    pub fn selected_state(&self, sample: usize) -> SelectionState {
        self.samples_selected_states
            .get(sample)
            .copied()
            .unwrap_or_default()
    }

    /// Time between a visible sample and the one before it, or the nominal
    /// interval for the first sample of the thread.
    pub fn sample_duration(&self, sample: usize) -> f64 {
        let times = &self.full_thread.samples.time;
        match self.sample_index_offset + sample {
            0 => self.interval,
            i => times[i] - times[i - 1],
        }
    }
}

impl fmt::Debug for RenderedComponentSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedComponentSettings")
            .field("canvas", &self.canvas)
            .field("sample_index_offset", &self.sample_index_offset)
            .field("sample_count", &self.sample_count())
            .field("interval", &self.interval)
            .field("range", &(self.range_start..self.range_end))
            .field("x_pixels_per_ms", &self.x_pixels_per_ms)
            .field("has_comparator", &self.tree_order_sample_comparator.is_some())
            .field("categories", &self.category_draw_styles.len())
            .finish_non_exhaustive()
    }
}
