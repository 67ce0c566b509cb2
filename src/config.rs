//! Layout configuration.

use serde::Serialize;

use crate::pitch::Language;

/// Tunables for the layout engine (all distances in pixels).
///
/// `staff_space` is the half-step unit: consecutive staff positions are
/// one `staff_space` apart, so the visible line-to-line gap is
/// `2 * staff_space - staff_line_thickness`.
#[derive(Debug, Clone, Serialize)]
pub struct EngraveConfig {
    pub staff_space: f64,
    pub staff_line_thickness: f64,
    /// Music font size; glyph metrics are keyed against it.
    pub font_size: f64,
    /// Ticks per whole note — the smallest rhythmic subdivision.
    pub cursor_size: u32,
    /// Scales the duration-proportional gap after each note column.
    pub duration_space_increment: f64,
    /// Pitch-name language for textual input.
    pub language: Language,
}

impl Default for EngraveConfig {
    fn default() -> Self {
        Self {
            staff_space: 5.4,
            staff_line_thickness: 0.8,
            font_size: 40.0,
            cursor_size: 16,
            duration_space_increment: 3.0,
            language: Language::default(),
        }
    }
}
