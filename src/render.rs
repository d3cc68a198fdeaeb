//! Plain-text rendering of a computed graph.

use std::fmt::Write as _;

use activity_core::SelectionState;
use activity_graph::{ComputationResult, HoveredPixelState, RenderedComponentSettings};
use activity_theme::Palette;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Columns in a printed sparkline.
pub const SPARKLINE_WIDTH: usize = 64;

/// One row per non-empty fill, then the smoothed outline.
pub fn render_text(result: &ComputationResult, palette: &Palette) -> String {
    let mut out = String::new();
    for fill in &result.fills {
        if fill.per_pixel_contribution.iter().all(|&v| v <= 0.0) {
            continue;
        }
        let _ = writeln!(
            out,
            "{:<12} {:<10} {} {}",
            palette.name(fill.category),
            state_label(fill.selection_state),
            fill.fill_style.to_hex(),
            sparkline(&fill.per_pixel_contribution, SPARKLINE_WIDTH),
        );
    }
    let _ = writeln!(
        out,
        "{:<12} {:<10} {:<9} {}",
        "total",
        "",
        "",
        sparkline(&result.upper_graph_edge, SPARKLINE_WIDTH)
    );
    out
}

/// Describe a lookup result.
pub fn describe_hover(
    hover: Option<&HoveredPixelState>,
    settings: &RenderedComponentSettings,
    palette: &Palette,
) -> String {
    let Some(hover) = hover else {
        return "no sample".to_string();
    };

    let mut out = match hover.sample {
        Some(sample) => {
            let time = settings.range_filtered_samples.time[sample];
            let category = settings.sample_category(sample).unwrap_or_default();
            format!(
                "sample {} at {time:.3}ms ({})",
                settings.sample_index_offset + sample,
                palette.name(category)
            )
        }
        None => "no sample".to_string(),
    };
    if let Some(cpu) = hover.cpu_ratio_in_time_range {
        let _ = write!(
            out,
            ", {:.0}% CPU over {:.3}ms",
            cpu.cpu_ratio * 100.0,
            cpu.time_range
        );
    }
    out
}

fn state_label(state: SelectionState) -> &'static str {
    match state {
        SelectionState::Selected => "selected",
        SelectionState::BeforeSelected => "before",
        SelectionState::AfterSelected => "after",
        SelectionState::FilteredOutByTransform => "filtered",
        SelectionState::FilteredOutByActiveTab => "hidden",
    }
}

/// Downsample `values` (expected in `[0, 1]`) to `columns` bar glyphs by
/// taking the maximum of each bucket.
pub fn sparkline(values: &[f32], columns: usize) -> String {
    if values.is_empty() || columns == 0 {
        return String::new();
    }
    let columns = columns.min(values.len());
    (0..columns)
        .map(|c| {
            let start = c * values.len() / columns;
            let end = ((c + 1) * values.len() / columns).max(start + 1);
            let peak = values[start..end].iter().copied().fold(0.0f32, f32::max);
            if peak <= 0.0 {
                ' '
            } else {
                let level = (peak.min(1.0) * (BARS.len() - 1) as f32).round() as usize;
                BARS[level]
            }
        })
        .collect()
}
