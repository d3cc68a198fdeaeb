//! JSON captures of the graph's inputs, used to drive the CLI.

use std::path::Path;

use activity_config::CanvasConfig;
use activity_core::{
    CategoryIndex, GraphError, Result, SampleTable, SelectionState, StackTable, Thread,
};
use activity_graph::{CanvasGeometry, RenderedComponentSettings};
use activity_theme::Palette;
use serde::Deserialize;

/// A recorded thread plus the visible window to render.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Capture {
    /// Nominal sampling interval in milliseconds.
    pub interval: f64,
    pub range: CaptureRange,
    pub samples: Vec<CapturedSample>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct CaptureRange {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CapturedSample {
    pub time: f64,
    pub category: CategoryIndex,
    /// CPU usage of the interval ending at this sample, 0 – 100.
    #[serde(default)]
    pub cpu_percentage: Option<u8>,
    #[serde(default)]
    pub state: SelectionState,
    /// Set to `false` for samples whose stack was dropped.
    #[serde(default = "default_has_stack")]
    pub has_stack: bool,
}

fn default_has_stack() -> bool {
    true
}

impl Capture {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Build render settings for this capture on the given canvas.
    pub fn into_settings(
        self,
        canvas: &CanvasConfig,
        palette: &Palette,
    ) -> Result<RenderedComponentSettings> {
        if self.range.end <= self.range.start {
            return Err(GraphError::Capture(format!(
                "empty range {}..{}",
                self.range.start, self.range.end
            )));
        }
        if self.samples.windows(2).any(|w| w[1].time < w[0].time) {
            return Err(GraphError::Capture("sample times are not sorted".into()));
        }
        if let Some(bad) = self.samples.iter().find(|s| s.category >= palette.len()) {
            return Err(GraphError::Capture(format!(
                "sample at {}ms uses category {} but the palette has {}",
                bad.time,
                bad.category,
                palette.len()
            )));
        }

        let with_cpu = self.samples.iter().filter(|s| s.cpu_percentage.is_some()).count();
        let cpu_percentage = match with_cpu {
            0 => None,
            n if n == self.samples.len() => {
                Some(self.samples.iter().filter_map(|s| s.cpu_percentage).collect())
            }
            _ => {
                return Err(GraphError::Capture(
                    "cpu_percentage must be set on every sample or on none".into(),
                ))
            }
        };

        let thread = Thread {
            samples: SampleTable {
                time: self.samples.iter().map(|s| s.time).collect(),
                stack: self
                    .samples
                    .iter()
                    .map(|s| s.has_stack.then_some(s.category))
                    .collect(),
            },
            // One stack per category.
            stack_table: StackTable {
                category: (0..palette.len()).collect(),
            },
            cpu_percentage,
        };
        let sample_categories = self.samples.iter().map(|s| s.category).collect();
        let geometry = CanvasGeometry {
            pixel_width: canvas.device_width(),
            pixel_height: canvas.device_height(),
            device_pixel_ratio: canvas.device_pixel_ratio,
        };

        let mut settings = RenderedComponentSettings::new(
            thread,
            sample_categories,
            geometry,
            (self.range.start, self.range.end),
            self.interval,
            palette.styles.clone(),
        );
        let offset = settings.sample_index_offset;
        settings.samples_selected_states = self.samples
            [offset..offset + settings.sample_count()]
            .iter()
            .map(|s| s.state)
            .collect();
        Ok(settings)
    }
}
