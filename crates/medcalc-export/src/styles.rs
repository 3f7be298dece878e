use serde::{Deserialize, Serialize};

/// Typography for DOCX reports. Every field has a default, so a partial
/// JSON object is enough to override one setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentStyles {
    pub body_font: String,
    pub heading_font: String,
    /// Points.
    pub body_size: usize,
    /// Points, for `#`, `##` and `###` respectively.
    pub heading_sizes: [usize; 3],
    /// Render the `> ` recommendation line in italics.
    pub italic_callouts: bool,
}

impl DocumentStyles {
    /// Size for a heading level (1-based); deeper levels use the smallest.
    pub fn heading_size(&self, level: usize) -> usize {
        let index = level.clamp(1, self.heading_sizes.len()) - 1;
        self.heading_sizes[index]
    }
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self {
            body_font: "Calibri".to_string(),
            heading_font: "Arial".to_string(),
            body_size: 11,
            heading_sizes: [16, 13, 11],
            italic_callouts: true,
        }
    }
}
