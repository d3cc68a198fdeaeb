//! Maps a click on the activity graph back to the sample drawn there.
//!
//! Lookups never touch the accumulation buffers mutably; one querier can
//! serve any number of lookups against a finished [`ComputationResult`].

use activity_core::{CategoryIndex, SelectionState};
use tracing::error;

use crate::fills::{accumulate_in_buffer, ComputationResult};
use crate::kernel::{SmoothingKernel, SMOOTHING_RADIUS};
use crate::settings::RenderedComponentSettings;

/// Average CPU usage under a pixel column, and the sampled time it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuRatioInTimeRange {
    /// Unsmoothed stacked CPU ratio at the pixel.
    pub cpu_ratio: f32,
    /// Summed duration of the samples contributing to the pixel, in ms.
    pub time_range: f64,
}

/// Result of a successful lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoveredPixelState {
    /// Range-filtered index of the sample under the pointer, if any.
    pub sample: Option<usize>,
    pub cpu_ratio_in_time_range: Option<CpuRatioInTimeRange>,
}

/// How much one sample adds to one pixel column after smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleContribution {
    pub sample: usize,
    pub contribution: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CategoryUnderPointer {
    category: CategoryIndex,
    category_lower_edge: f32,
    y_percentage: f64,
}

/// Resolves pointer positions on the graph to samples.
pub struct ActivityFillGraphQuerier<'a> {
    settings: &'a RenderedComponentSettings,
    result: &'a ComputationResult,
    kernel: SmoothingKernel,
}

impl<'a> ActivityFillGraphQuerier<'a> {
    pub fn new(settings: &'a RenderedComponentSettings, result: &'a ComputationResult) -> Self {
        Self {
            settings,
            result,
            kernel: SmoothingKernel::graph(),
        }
    }

    /// Find the sample drawn at CSS position (`css_x`, `css_y`), where
    /// `time` is the time under `css_x`.
    ///
    /// Returns `None` outside the canvas, or when nothing is drawn at that
    /// position and no CPU usage is known there.
    pub fn lookup(&self, css_x: f64, css_y: f64, time: f64) -> Option<HoveredPixelState> {
        let canvas = &self.settings.canvas;
        let device_x = (css_x * canvas.device_pixel_ratio).round();
        let device_y = (css_y * canvas.device_pixel_ratio).round();
        if device_x < 0.0
            || device_y < 0.0
            || device_x >= canvas.pixel_width as f64
            || device_y >= canvas.pixel_height as f64
        {
            return None;
        }
        let device_x = device_x as usize;

        let category_under_pointer = self.category_at_device_pixel(device_x, device_y);
        let candidates = self.samples_at_time(time, device_x);
        let cpu_ratio_in_time_range = self.cpu_ratio_at_x(device_x, &candidates);

        let Some(CategoryUnderPointer { category, category_lower_edge, y_percentage }) =
            category_under_pointer
        else {
            return cpu_ratio_in_time_range.map(|cpu| HoveredPixelState {
                sample: None,
                cpu_ratio_in_time_range: Some(cpu),
            });
        };

        let mut upper_edge_of_previous_sample = f64::from(category_lower_edge);
        for &SampleContribution { sample, contribution } in &candidates {
            let stack_category = self
                .settings
                .range_filtered_samples
                .stack
                .get(sample)
                .copied()
                .flatten()
                .and_then(|stack| self.settings.full_thread.stack_table.category_of(stack));
            let Some(sample_category) = stack_category else {
                error!("Sample {sample} contributes to the graph but has no stack; skipping.");
                continue;
            };
            if sample_category != category {
                continue;
            }

            let upper_edge_of_this_sample = upper_edge_of_previous_sample + f64::from(contribution);
            if upper_edge_of_this_sample >= y_percentage {
                return Some(HoveredPixelState {
                    sample: Some(sample),
                    cpu_ratio_in_time_range,
                });
            }
            upper_edge_of_previous_sample = upper_edge_of_this_sample;
        }

        None
    }

    /// The fill drawn at a device pixel, walking the fills bottom to top.
    fn category_at_device_pixel(&self, device_x: usize, device_y: f64) -> Option<CategoryUnderPointer> {
        let y_percentage = 1.0 - device_y / self.settings.canvas.pixel_height as f64;

        let mut previous_fill_upper_edge = 0.0f32;
        let mut category_lower_edge = 0.0f32;
        let mut current_category = None;
        for fill in &self.result.fills {
            let fill_upper_edge = fill.accumulated_upper_edge[device_x];
            if fill_upper_edge == previous_fill_upper_edge {
                continue;
            }
            if current_category != Some(fill.category) {
                current_category = Some(fill.category);
                category_lower_edge = previous_fill_upper_edge;
            }
            if f64::from(fill_upper_edge) >= y_percentage {
                return Some(CategoryUnderPointer {
                    category: fill.category,
                    category_lower_edge,
                    y_percentage,
                });
            }
            previous_fill_upper_edge = fill_upper_edge;
        }
        None
    }

    /// Samples whose smoothed contribution reaches `device_x`, in draw order.
    ///
    /// Candidates are bounded by the smoothing radius around `time`, widened
    /// by one sample on each side.
    pub fn samples_at_time(&self, time: f64, device_x: usize) -> Vec<SampleContribution> {
        let settings = self.settings;
        let times = &settings.range_filtered_samples.time;
        if times.is_empty() || settings.x_pixels_per_ms <= 0.0 {
            return Vec::new();
        }

        let time_radius = SMOOTHING_RADIUS as f64 / settings.x_pixels_per_ms;
        let start = times
            .partition_point(|&t| t < time - time_radius)
            .saturating_sub(1);
        let end = (times.partition_point(|&t| t <= time + time_radius) + 1).min(times.len());

        let mut window = vec![0.0; self.kernel.len() + 1];
        let mut candidates: Vec<SampleContribution> = (start..end)
            .filter_map(|sample| {
                let contribution = self.smoothed_contribution(sample, device_x, &mut window);
                (contribution > 0.0).then_some(SampleContribution { sample, contribution })
            })
            .collect();

        if let Some(compare) = &settings.tree_order_sample_comparator {
            candidates.sort_by(|a, b| compare(a.sample, b.sample));
        }
        candidates
    }

    /// Contribution of `sample` to `device_x` once smoothed, computed by
    /// rasterizing the sample alone into a kernel-sized window centred on
    /// the pixel.
    fn smoothed_contribution(&self, sample: usize, device_x: usize, window: &mut [f32]) -> f32 {
        if self.settings.selected_state(sample) == SelectionState::FilteredOutByActiveTab {
            return 0.0;
        }
        let (before_ratio, after_ratio) = self.settings.cpu_ratios_around(sample);
        if before_ratio == 0.0 && after_ratio == 0.0 {
            return 0.0;
        }

        let positions = &self.result.positions;
        let origin = device_x as f64 - self.kernel.radius() as f64;
        let limit = self.kernel.len() as f64;
        let local = |x: f64| (x - origin).clamp(0.0, limit);

        window.fill(0.0);
        let sample_position = local(positions.sample_positions[sample]);
        accumulate_in_buffer(
            window,
            local(positions.halfway_positions[sample]),
            sample_position,
            before_ratio,
        );
        accumulate_in_buffer(
            window,
            sample_position,
            local(positions.halfway_positions[sample + 1]),
            after_ratio,
        );
        self.kernel.dot(window)
    }

    fn cpu_ratio_at_x(
        &self,
        device_x: usize,
        candidates: &[SampleContribution],
    ) -> Option<CpuRatioInTimeRange> {
        if candidates.is_empty() || !self.settings.full_thread.has_cpu_usage() {
            return None;
        }
        let time_range = candidates
            .iter()
            .map(|c| self.settings.sample_duration(c.sample))
            .sum();
        Some(CpuRatioInTimeRange {
            cpu_ratio: self.result.average_cpu_per_pixel[device_x],
            time_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fills::{compute_activity_graph_fills, CategoryFill};
    use crate::positions::PrecomputedPositions;
    use crate::settings::CanvasGeometry;
    use activity_core::{SampleTable, StackTable, Thread};
    use activity_theme::{CategoryDrawStyle, Color};

    fn style(category: CategoryIndex, gravity: f64) -> CategoryDrawStyle {
        CategoryDrawStyle {
            category,
            gravity,
            selected_fill_style: Color::GREY,
            unselected_fill_style: Color::GREY,
            filtered_out_by_transform_fill_style: Color::GREY,
        }
    }

    /// One stack per category, so each sample's stack is its category.
    fn settings(
        times: &[f64],
        categories: &[CategoryIndex],
        cpu: Option<Vec<u8>>,
        width: usize,
        range: (f64, f64),
        interval: f64,
        category_count: usize,
    ) -> RenderedComponentSettings {
        let thread = Thread {
            samples: SampleTable {
                time: times.to_vec(),
                stack: categories.iter().map(|&c| Some(c)).collect(),
            },
            stack_table: StackTable { category: (0..category_count).collect() },
            cpu_percentage: cpu,
        };
        let canvas = CanvasGeometry { pixel_width: width, pixel_height: 100, device_pixel_ratio: 1.0 };
        let styles = (0..category_count).map(|c| style(c, c as f64)).collect();
        RenderedComponentSettings::new(thread, categories.to_vec(), canvas, range, interval, styles)
    }

    fn fill(category: CategoryIndex, edge: f32) -> CategoryFill {
        CategoryFill {
            category,
            selection_state: SelectionState::Selected,
            fill_style: Color::GREY,
            per_pixel_contribution: vec![edge],
            accumulated_upper_edge: vec![edge],
        }
    }

    #[test]
    fn isolated_sample_round_trips() {
        let s = settings(&[50.0], &[0], None, 100, (0.0, 100.0), 10.0, 1);
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);

        let hit = querier.lookup(50.0, 95.0, 50.0).unwrap();
        assert_eq!(hit.sample, Some(0));
        assert_eq!(hit.cpu_ratio_in_time_range, None);
    }

    #[test]
    fn pixel_ratio_scales_css_coordinates() {
        let mut s = settings(&[25.0], &[0], None, 100, (0.0, 50.0), 5.0, 1);
        s.canvas.device_pixel_ratio = 2.0;
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);

        assert_eq!(querier.lookup(25.0, 49.0, 25.0).unwrap().sample, Some(0));
        assert_eq!(querier.lookup(50.0, 10.0, 50.0), None);
    }

    #[test]
    fn outside_the_canvas_is_rejected() {
        let s = settings(&[50.0], &[0], None, 100, (0.0, 100.0), 10.0, 1);
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);
        assert_eq!(querier.lookup(-1.0, 50.0, 0.0), None);
        assert_eq!(querier.lookup(100.0, 50.0, 100.0), None);
        assert_eq!(querier.lookup(50.0, 100.0, 50.0), None);
    }

    #[test]
    fn picks_the_sample_stacked_at_the_pointer() {
        let times: Vec<f64> = (0..20).map(|i| f64::from(i) * 10.0).collect();
        let categories: Vec<_> = (0..20).map(|i| i % 2).collect();
        let s = settings(&times, &categories, Some(vec![100; 20]), 200, (0.0, 200.0), 10.0, 2);
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);

        // Category 1 has the higher gravity and sits at the bottom.
        let bottom = querier.lookup(100.0, 99.0, 100.0).unwrap();
        let sample = bottom.sample.unwrap();
        assert_eq!(categories[sample], 1);

        let cpu = bottom.cpu_ratio_in_time_range.unwrap();
        assert!((cpu.cpu_ratio - 1.0).abs() < 1e-4);
        assert!(cpu.time_range > 0.0);
    }

    #[test]
    fn walks_up_the_band_from_its_lower_edge() {
        let mut s = settings(&[50.0, 52.0], &[0, 0], None, 100, (0.0, 100.0), 2.0, 1);
        s.canvas.pixel_height = 1000;
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);

        let candidates = querier.samples_at_time(51.0, 51);
        let samples: Vec<_> = candidates.iter().map(|c| c.sample).collect();
        assert_eq!(samples, vec![0, 1]);
        let first = candidates[0].contribution;
        let top = result.upper_graph_edge[51];
        assert!(top - first > 0.01);

        // Just above the bottom of the band.
        let hit = querier.lookup(51.0, 999.0, 51.0).unwrap();
        assert_eq!(hit.sample, Some(0));

        // Just below the top of the band, past the first sample.
        let y = ((1.0 - f64::from(top)) * 1000.0).ceil() + 1.0;
        let hit = querier.lookup(51.0, y, 51.0).unwrap();
        assert_eq!(hit.sample, Some(1));

        // Above the band.
        let y = ((1.0 - f64::from(top)) * 1000.0).floor() - 1.0;
        assert_eq!(querier.lookup(51.0, y, 51.0), None);
    }

    #[test]
    fn other_categories_do_not_raise_the_running_edge() {
        let mut s = settings(&[50.0, 51.0, 52.0], &[0, 1, 0], None, 100, (0.0, 100.0), 1.0, 2);
        s.canvas.pixel_height = 1000;
        // Draw order 1, 0, 2: the category 1 sample is walked first.
        let draw_rank = |sample: usize| if sample == 1 { 0 } else { sample + 1 };
        s.tree_order_sample_comparator =
            Some(Box::new(move |a: usize, b: usize| draw_rank(a).cmp(&draw_rank(b))));
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);

        let candidates = querier.samples_at_time(51.0, 51);
        let samples: Vec<_> = candidates.iter().map(|c| c.sample).collect();
        assert_eq!(samples, vec![1, 0, 2]);
        let contribution = |sample: usize| {
            candidates
                .iter()
                .find(|c| c.sample == sample)
                .map(|c| c.contribution)
                .unwrap()
        };

        // Category 1 has the higher gravity, so its band is at the bottom.
        let lower_edge = result
            .fills
            .iter()
            .filter(|f| f.category == 1)
            .last()
            .unwrap()
            .accumulated_upper_edge[51];
        let y_percentage = f64::from(lower_edge)
            + f64::from(contribution(0))
            + f64::from(contribution(1).min(contribution(2))) / 2.0;
        let y = ((1.0 - y_percentage) * 1000.0).round();

        let hit = querier.lookup(51.0, y, 51.0).unwrap();
        assert_eq!(hit.sample, Some(2));
    }

    #[test]
    fn contributions_add_up_to_the_drawn_band() {
        let times: Vec<f64> = (0..40).map(|i| f64::from(i) * 3.0).collect();
        let categories: Vec<_> = (0..40).map(|i| (i * 7) % 3).collect();
        let cpu: Vec<u8> = (0..40).map(|i| 20 + (i * 13 % 80) as u8).collect();
        let s = settings(&times, &categories, Some(cpu), 120, (0.0, 120.0), 3.0, 3);
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);

        let x = 60;
        let time = 60.0;
        let candidates = querier.samples_at_time(time, x);
        let total: f32 = candidates.iter().map(|c| c.contribution).sum();
        assert!((total - result.upper_graph_edge[x]).abs() < 1e-4);
    }

    #[test]
    fn comparator_orders_candidates() {
        let times: Vec<f64> = (0..10).map(f64::from).collect();
        let mut s = settings(&times, &[0; 10], None, 10, (0.0, 10.0), 1.0, 1);
        s.tree_order_sample_comparator = Some(Box::new(|a: usize, b: usize| b.cmp(&a)));
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);

        let candidates = querier.samples_at_time(5.0, 5);
        assert!(candidates.len() > 1);
        assert!(candidates.windows(2).all(|w| w[0].sample > w[1].sample));
    }

    #[test]
    fn boundary_click_resolves_to_the_lower_fill() {
        let s = settings(&[], &[], None, 1, (0.0, 1.0), 1.0, 2);
        let result = ComputationResult {
            fills: vec![fill(0, 0.5), fill(1, 1.0)],
            average_cpu_per_pixel: vec![1.0],
            upper_graph_edge: vec![1.0],
            positions: PrecomputedPositions::default(),
        };
        let querier = result.querier(&s);

        let hit = querier.category_at_device_pixel(0, 50.0).unwrap();
        assert_eq!(hit.category, 0);
        assert_eq!(hit.category_lower_edge, 0.0);

        let hit = querier.category_at_device_pixel(0, 49.0).unwrap();
        assert_eq!(hit.category, 1);
        assert_eq!(hit.category_lower_edge, 0.5);

        // The very top of the stack still belongs to the last fill.
        let top = querier.category_at_device_pixel(0, 0.0).unwrap();
        assert_eq!(top.category, 1);
    }

    #[test]
    fn empty_fills_are_skipped() {
        let s = settings(&[], &[], None, 1, (0.0, 1.0), 1.0, 3);
        let result = ComputationResult {
            fills: vec![fill(0, 0.0), fill(1, 0.25), fill(2, 0.25)],
            average_cpu_per_pixel: vec![0.25],
            upper_graph_edge: vec![0.25],
            positions: PrecomputedPositions::default(),
        };
        let querier = result.querier(&s);

        assert_eq!(querier.category_at_device_pixel(0, 80.0).unwrap().category, 1);
        assert_eq!(querier.category_at_device_pixel(0, 10.0), None);
    }

    #[test]
    fn active_tab_samples_are_never_returned() {
        let mut s = settings(&[40.0, 50.0, 60.0], &[0, 0, 0], Some(vec![100; 3]), 100, (0.0, 100.0), 10.0, 1);
        s.samples_selected_states = vec![SelectionState::FilteredOutByActiveTab; 3];
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);

        for x in (0..100).step_by(5) {
            for y in (0..100).step_by(10) {
                assert_eq!(querier.lookup(f64::from(x), f64::from(y), f64::from(x)), None);
            }
        }
    }

    #[test]
    fn empty_range_never_hits() {
        let s = settings(&[0.0, 1.0], &[0, 0], Some(vec![100, 100]), 50, (10.0, 20.0), 1.0, 1);
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);
        assert_eq!(querier.lookup(25.0, 99.0, 15.0), None);
        assert_eq!(querier.lookup(0.0, 0.0, 10.0), None);
    }

    #[test]
    fn missing_stack_is_skipped() {
        let mut s = settings(&[50.0], &[0], None, 100, (0.0, 100.0), 10.0, 1);
        s.range_filtered_samples.stack[0] = None;
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);
        assert_eq!(querier.lookup(50.0, 95.0, 50.0), None);
    }

    #[test]
    fn cpu_summary_without_a_category_hit() {
        let s = settings(&[40.0, 50.0, 60.0], &[0, 0, 0], Some(vec![50; 3]), 100, (0.0, 100.0), 10.0, 1);
        let result = compute_activity_graph_fills(&s);
        let querier = result.querier(&s);

        // Above the drawn area but over samples.
        let hover = querier.lookup(50.0, 1.0, 50.0).unwrap();
        assert_eq!(hover.sample, None);
        let cpu = hover.cpu_ratio_in_time_range.unwrap();
        assert!((cpu.cpu_ratio - 0.5).abs() < 1e-4);
        assert_eq!(cpu.time_range, 10.0 * querier.samples_at_time(50.0, 50).len() as f64);
    }
}
