pub mod colors;
pub mod style;

pub use colors::Color;
pub use style::CategoryDrawStyle;

use activity_config::CategoryConfig;

/// Alpha applied to a category's colour for samples outside the selection.
const UNSELECTED_ALPHA: f32 = 0.6;
/// Alpha of the grey used for samples dropped by a transform.
const FILTERED_ALPHA: f32 = 0.35;

/// Compiled category palette derived from the config's `[[categories]]`.
///
/// Category ids are positions in the config list.  Building a palette is
/// infallible: colour strings that fail to parse fall back to grey.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    pub names:  Vec<String>,
    pub styles: Vec<CategoryDrawStyle>,
}

impl Palette {
    pub fn from_config(categories: &[CategoryConfig]) -> Self {
        let styles = categories
            .iter()
            .enumerate()
            .map(|(category, cfg)| {
                let selected = parse_or_grey(&cfg.name, &cfg.color);
                let unselected = cfg
                    .unselected_color
                    .as_deref()
                    .map(|hex| parse_or_grey(&cfg.name, hex))
                    .unwrap_or_else(|| selected.with_alpha(selected.a * UNSELECTED_ALPHA));
                let filtered = cfg
                    .filtered_color
                    .as_deref()
                    .map(|hex| parse_or_grey(&cfg.name, hex))
                    .unwrap_or_else(|| Color::GREY.with_alpha(FILTERED_ALPHA));

                CategoryDrawStyle {
                    category,
                    gravity: cfg.gravity,
                    selected_fill_style: selected,
                    unselected_fill_style: unselected,
                    filtered_out_by_transform_fill_style: filtered,
                }
            })
            .collect();

        Self {
            names: categories.iter().map(|c| c.name.clone()).collect(),
            styles,
        }
    }

    pub fn name(&self, category: usize) -> &str {
        self.names.get(category).map_or("<unknown>", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

fn parse_or_grey(name: &str, hex: &str) -> Color {
    Color::from_hex(hex).unwrap_or_else(|| {
        tracing::warn!("Invalid colour '{hex}' for category '{name}'; using grey.");
        Color::GREY
    })
}
