use serde::{Deserialize, Serialize};

/// Root configuration structure parsed from `graph.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
    /// Canvas geometry in CSS pixels.
    pub canvas: CanvasConfig,
    /// Category palette, indexed by position.
    pub categories: Vec<CategoryConfig>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            categories: default_categories(),
        }
    }
}

/// Size of the graph canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
    /// Device pixels per CSS pixel.
    pub device_pixel_ratio: f64,
}

impl CanvasConfig {
    /// Width in device pixels.
    #[must_use]
    pub fn device_width(&self) -> usize {
        (f64::from(self.width) * self.device_pixel_ratio).round() as usize
    }

    /// Height in device pixels.
    #[must_use]
    pub fn device_height(&self) -> usize {
        (f64::from(self.height) * self.device_pixel_ratio).round() as usize
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 50,
            device_pixel_ratio: 1.0,
        }
    }
}

/// Draw settings for a single category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryConfig {
    pub name: String,
    /// Fill colour of selected samples (hex, e.g. `"#ffe34f"`).
    pub color: String,
    /// Draw order; higher gravity sits lower in the stack.
    pub gravity: f64,
    /// Fill colour outside the selection.  Defaults to `color`, dimmed.
    #[serde(default)]
    pub unselected_color: Option<String>,
    /// Fill colour of samples dropped by a transform.  Defaults to grey.
    #[serde(default)]
    pub filtered_color: Option<String>,
}

impl CategoryConfig {
    pub fn new(name: impl Into<String>, color: impl Into<String>, gravity: f64) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            gravity,
            unselected_color: None,
            filtered_color: None,
        }
    }
}

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new("Idle", "#d7d7db", 0.0),
        CategoryConfig::new("Other", "#b1b1b3", 1.0),
        CategoryConfig::new("Layout", "#9059ff", 8.0),
        CategoryConfig::new("JavaScript", "#ffe34f", 11.0),
        CategoryConfig::new("GC / CC", "#ff8a3d", 7.0),
        CategoryConfig::new("Network", "#45a1ff", 3.0),
        CategoryConfig::new("Graphics", "#30e60b", 6.0),
        CategoryConfig::new("DOM", "#00c8d7", 5.0),
    ]
}
