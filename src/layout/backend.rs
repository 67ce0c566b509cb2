//! Rasterization backend interface.
//!
//! The layout engine never touches pixels; it emits [`RenderOp`]s. A
//! [`Surface`] replays those descriptors with primitive operations and
//! may grow itself when content exceeds its current size. An SVG
//! implementation is included for tests and headless rendering; a music
//! font (SMuFL) is expected for the glyph text elements.

use crate::metrics::Glyph;

use super::{LayoutResult, RenderOp};

/// Primitive drawing operations a backend must provide.
pub trait Surface {
    /// Grow the drawing surface to at least the given size.
    fn ensure_size(&mut self, width: f64, height: f64);
    fn line(&mut self, x: f64, y: f64, to_x: f64, to_y: f64, line_width: f64, color: &str);
    fn glyph(&mut self, x: f64, y: f64, glyph: Glyph, font_size: f64);
}

/// Replay a layout result onto a surface, in paint order.
pub fn replay<S: Surface>(result: &LayoutResult, surface: &mut S) {
    surface.ensure_size(result.width, result.height);
    for op in &result.ops {
        match *op {
            RenderOp::Line { x, y, to_x, to_y, line_width, color, .. } => {
                surface.line(x, y, to_x, to_y, line_width, color);
            }
            RenderOp::Glyph { x, y, glyph, font_size, .. } => {
                surface.glyph(x, y, glyph, font_size);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SVG surface
// ═══════════════════════════════════════════════════════════════════════

/// Accumulates SVG elements and produces the final string.
pub struct SvgSurface {
    elements: Vec<String>,
    width: f64,
    height: f64,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self { elements: Vec::new(), width: 0.0, height: 0.0 }
    }

    pub fn build(self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {:.0} {:.0}" width="{:.0}" height="{:.0}">"#,
            self.width, self.height, self.width, self.height
        );
        svg.push('\n');
        for el in &self.elements {
            svg.push_str("  ");
            svg.push_str(el);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for SvgSurface {
    fn ensure_size(&mut self, width: f64, height: f64) {
        self.width = self.width.max(width);
        self.height = self.height.max(height);
    }

    fn line(&mut self, x: f64, y: f64, to_x: f64, to_y: f64, line_width: f64, color: &str) {
        self.elements.push(format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{:.1}" stroke-linecap="round"/>"#,
            x, y, to_x, to_y, color, line_width
        ));
    }

    fn glyph(&mut self, x: f64, y: f64, glyph: Glyph, font_size: f64) {
        self.elements.push(format!(
            r#"<text x="{:.1}" y="{:.1}" font-family="Bravura, music" font-size="{:.0}" class="{}">&#x{:X};</text>"#,
            x,
            y,
            font_size,
            glyph.name(),
            glyph.codepoint() as u32
        ));
    }
}
