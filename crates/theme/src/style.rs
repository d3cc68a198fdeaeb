use crate::colors::Color;
use activity_core::CategoryIndex;

/// How one category is painted in the activity graph.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDrawStyle {
    pub category: CategoryIndex,
    /// Draw order; categories with higher gravity are stacked first
    /// (visually lower).
    pub gravity: f64,
    pub selected_fill_style: Color,
    pub unselected_fill_style: Color,
    pub filtered_out_by_transform_fill_style: Color,
}
