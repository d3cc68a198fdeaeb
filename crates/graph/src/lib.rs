//! Stacked CPU activity graph: rasterization of samples into per-category
//! pixel columns, and the reverse lookup from a pixel to a sample.
//!
//! ```text
//! RenderedComponentSettings ──► compute_activity_graph_fills ──► ComputationResult
//!                                                                 │
//!                                       ActivityFillGraphQuerier ◄┘ (lookup per pointer move)
//! ```

pub mod fills;
pub mod kernel;
pub mod positions;
pub mod query;
pub mod settings;

pub use fills::{compute_activity_graph_fills, CategoryFill, ComputationResult};
pub use kernel::{SmoothingKernel, BOX_BLUR_RADII, SMOOTHING_RADIUS};
pub use positions::{PixelMapping, PrecomputedPositions};
pub use query::{ActivityFillGraphQuerier, CpuRatioInTimeRange, HoveredPixelState, SampleContribution};
pub use settings::{CanvasGeometry, RenderedComponentSettings, SampleComparator};
