/// Fonts, sizes and margins for DOCX handouts. Sizes are in points.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStyles {
    pub body_font: String,
    pub heading_font: String,
    pub body_size: usize,
    pub heading1_size: usize,
    pub heading2_size: usize,
    pub heading3_size: usize,
    /// Applied to all four sides.
    pub margin_inches: f64,
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self {
            body_font: "Calibri".to_string(),
            heading_font: "Calibri".to_string(),
            body_size: 11,
            heading1_size: 16,
            heading2_size: 13,
            heading3_size: 12,
            margin_inches: 0.8,
        }
    }
}
