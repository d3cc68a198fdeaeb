//! Rasterizes CPU usage per category into stacked, smoothed pixel columns.
//!
//! The pass runs in a fixed order: positions, raw accumulation into one
//! buffer per (category, selection state), stacking, smoothing, and a
//! second stacking over the smoothed buffers. Every buffer is allocated by
//! the pass and handed over to the returned [`ComputationResult`].

use activity_core::{CategoryIndex, SelectionState};
use activity_theme::{CategoryDrawStyle, Color};
use tracing::{debug, warn};

use crate::kernel::{box_blur_passes, BOX_BLUR_RADII};
use crate::positions::PrecomputedPositions;
use crate::query::ActivityFillGraphQuerier;
use crate::settings::RenderedComponentSettings;

/// One stacked band of the graph: a category drawn in one selection state.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFill {
    pub category: CategoryIndex,
    pub selection_state: SelectionState,
    pub fill_style: Color,
    /// Height this fill adds at each device pixel; smoothed once the pass
    /// completes.
    pub per_pixel_contribution: Vec<f32>,
    /// Running sum of contributions of this fill and every fill below it.
    pub accumulated_upper_edge: Vec<f32>,
}

/// Output of one accumulation pass. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputationResult {
    /// Fills in stacking order, bottom first.
    pub fills: Vec<CategoryFill>,
    /// Stacked CPU ratio per pixel before smoothing.
    pub average_cpu_per_pixel: Vec<f32>,
    /// Stacked height per pixel after smoothing, as drawn.
    pub upper_graph_edge: Vec<f32>,
    pub positions: PrecomputedPositions,
}

impl ComputationResult {
    /// A querier resolving clicks against this result.
    pub fn querier<'a>(
        &'a self,
        settings: &'a RenderedComponentSettings,
    ) -> ActivityFillGraphQuerier<'a> {
        ActivityFillGraphQuerier::new(settings, self)
    }
}

/// Stacking order of the selection states inside one category band.
const FILL_ORDER: [SelectionState; SelectionState::FILL_SLOTS] = [
    SelectionState::BeforeSelected,
    SelectionState::Selected,
    SelectionState::AfterSelected,
    SelectionState::FilteredOutByTransform,
];

/// Raw per-pixel CPU ratio, one buffer per category and fill slot.
#[derive(Debug)]
struct PercentageBuffers {
    buffers: Vec<[Vec<f32>; SelectionState::FILL_SLOTS]>,
}

impl PercentageBuffers {
    fn new(category_count: usize, width: usize) -> Self {
        Self {
            buffers: (0..category_count)
                .map(|_| std::array::from_fn(|_| vec![0.0; width]))
                .collect(),
        }
    }

    fn get_mut(&mut self, category: CategoryIndex, state: SelectionState) -> Option<&mut [f32]> {
        let slot = state.fill_slot()?;
        self.buffers
            .get_mut(category)
            .map(|slots| slots[slot].as_mut_slice())
    }

    fn take(&mut self, category: CategoryIndex, state: SelectionState) -> Option<Vec<f32>> {
        let slot = state.fill_slot()?;
        self.buffers
            .get_mut(category)
            .map(|slots| std::mem::take(&mut slots[slot]))
    }
}

/// Run the full accumulation pass over `settings`.
pub fn compute_activity_graph_fills(settings: &RenderedComponentSettings) -> ComputationResult {
    let width = settings.canvas.pixel_width;
    let positions = settings.precompute_positions();

    let mut buffers = PercentageBuffers::new(settings.category_draw_styles.len(), width);
    accumulate_sample_categories(settings, &positions, &mut buffers);

    let mut fills = category_fills(&settings.category_draw_styles, &mut buffers, width);

    let average_cpu_per_pixel = accumulate_upper_edge(&mut fills, width);

    let mut scratch = vec![0.0; width];
    for fill in &mut fills {
        box_blur_passes(&mut fill.per_pixel_contribution, &mut scratch, &BOX_BLUR_RADII);
    }

    let upper_graph_edge = accumulate_upper_edge(&mut fills, width);

    debug!(
        samples = settings.sample_count(),
        width,
        fills = fills.len(),
        "Computed activity graph fills"
    );

    ComputationResult {
        fills,
        average_cpu_per_pixel,
        upper_graph_edge,
        positions,
    }
}

fn accumulate_sample_categories(
    settings: &RenderedComponentSettings,
    positions: &PrecomputedPositions,
    buffers: &mut PercentageBuffers,
) {
    if positions.is_empty() || settings.canvas.pixel_width == 0 {
        return;
    }

    let mut unstyled = 0usize;
    for sample in 0..positions.len() {
        let state = settings.selected_state(sample);
        if state == SelectionState::FilteredOutByActiveTab {
            continue;
        }

        let (before_ratio, after_ratio) = settings.cpu_ratios_around(sample);
        if before_ratio == 0.0 && after_ratio == 0.0 {
            continue;
        }

        let Some(category) = settings.sample_category(sample) else {
            unstyled += 1;
            continue;
        };
        let Some(buffer) = buffers.get_mut(category, state) else {
            unstyled += 1;
            continue;
        };

        let sample_position = positions.sample_positions[sample];
        accumulate_in_buffer(
            buffer,
            positions.halfway_positions[sample],
            sample_position,
            before_ratio,
        );
        accumulate_in_buffer(
            buffer,
            sample_position,
            positions.halfway_positions[sample + 1],
            after_ratio,
        );
    }

    if unstyled > 0 {
        warn!("{unstyled} samples have a category without a draw style; not drawn.");
    }
}

/// Add `ratio` over the fractional pixel interval `[start, end)`.
///
/// Partially covered pixels at either end receive their covered fraction,
/// so the buffer gains exactly `ratio * (end - start)` in total.
///
/// # Panics
/// If `end` truncates to an index past the end of `buffer`.
pub fn accumulate_in_buffer(buffer: &mut [f32], start: f64, end: f64, ratio: f64) {
    let int_start = start as usize;
    let int_end = end as usize;

    if int_start == int_end {
        buffer[int_start] += (ratio * (end - start)) as f32;
        return;
    }

    for pixel in &mut buffer[int_start..=int_end] {
        *pixel += ratio as f32;
    }
    buffer[int_start] -= (ratio * (start - int_start as f64)) as f32;
    buffer[int_end] -= (ratio * (1.0 - (end - int_end as f64))) as f32;
}

/// Fills ordered bottom to top: categories by descending gravity, then the
/// fixed selection-state order inside each category.
fn category_fills(
    styles: &[CategoryDrawStyle],
    buffers: &mut PercentageBuffers,
    width: usize,
) -> Vec<CategoryFill> {
    let mut ordered: Vec<&CategoryDrawStyle> = styles.iter().collect();
    ordered.sort_by(|a, b| b.gravity.total_cmp(&a.gravity));

    let mut seen = vec![false; buffers.buffers.len()];
    let mut fills = Vec::with_capacity(ordered.len() * FILL_ORDER.len());
    for style in ordered {
        match seen.get_mut(style.category) {
            Some(flag) if !*flag => *flag = true,
            _ => continue,
        }
        for state in FILL_ORDER {
            let Some(per_pixel_contribution) = buffers.take(style.category, state) else {
                continue;
            };
            let fill_style = match state {
                SelectionState::Selected => style.selected_fill_style,
                SelectionState::FilteredOutByTransform => {
                    style.filtered_out_by_transform_fill_style
                }
                _ => style.unselected_fill_style,
            };
            fills.push(CategoryFill {
                category: style.category,
                selection_state: state,
                fill_style,
                per_pixel_contribution,
                accumulated_upper_edge: vec![0.0; width],
            });
        }
    }
    fills
}

/// Stack the fills' contributions in order and return the top edge.
fn accumulate_upper_edge(fills: &mut [CategoryFill], width: usize) -> Vec<f32> {
    let mut running = vec![0.0; width];
    for fill in fills {
        for (edge, contribution) in running.iter_mut().zip(&fill.per_pixel_contribution) {
            *edge += contribution;
        }
        fill.accumulated_upper_edge.copy_from_slice(&running);
    }
    running
}
