//! Glyph identifiers and the glyph-metrics lookup table.
//!
//! The layout engine never measures fonts itself; it asks a
//! [`GlyphMetrics`] table for advance widths keyed by (glyph, size).
//! Missing entries degrade to width 0 with a logged warning so layout
//! can continue.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

/// Identifier of a notation glyph (SMuFL naming).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    NoteheadWhole,
    NoteheadHalf,
    NoteheadBlack,
    RestWhole,
    RestHalf,
    RestQuarter,
    Rest8th,
    Rest16th,
    ClefG,
    ClefF,
    ClefC,
    AccidentalSharp,
    AccidentalFlat,
    AccidentalNatural,
    AccidentalDoubleSharp,
    AccidentalDoubleFlat,
    AugmentationDot,
    Flag8thUp,
    Flag8thDown,
    Flag16thUp,
    Flag16thDown,
    TimeSigDigit(u8),
}

const TIME_SIG_NAMES: [&str; 10] = [
    "timeSig0", "timeSig1", "timeSig2", "timeSig3", "timeSig4", "timeSig5", "timeSig6",
    "timeSig7", "timeSig8", "timeSig9",
];

impl Glyph {
    /// Canonical SMuFL glyph name.
    pub fn name(&self) -> &'static str {
        match self {
            Glyph::NoteheadWhole => "noteheadWhole",
            Glyph::NoteheadHalf => "noteheadHalf",
            Glyph::NoteheadBlack => "noteheadBlack",
            Glyph::RestWhole => "restWhole",
            Glyph::RestHalf => "restHalf",
            Glyph::RestQuarter => "restQuarter",
            Glyph::Rest8th => "rest8th",
            Glyph::Rest16th => "rest16th",
            Glyph::ClefG => "gClef",
            Glyph::ClefF => "fClef",
            Glyph::ClefC => "cClef",
            Glyph::AccidentalSharp => "accidentalSharp",
            Glyph::AccidentalFlat => "accidentalFlat",
            Glyph::AccidentalNatural => "accidentalNatural",
            Glyph::AccidentalDoubleSharp => "accidentalDoubleSharp",
            Glyph::AccidentalDoubleFlat => "accidentalDoubleFlat",
            Glyph::AugmentationDot => "augmentationDot",
            Glyph::Flag8thUp => "flag8thUp",
            Glyph::Flag8thDown => "flag8thDown",
            Glyph::Flag16thUp => "flag16thUp",
            Glyph::Flag16thDown => "flag16thDown",
            Glyph::TimeSigDigit(d) => TIME_SIG_NAMES[(*d as usize).min(9)],
        }
    }

    /// SMuFL codepoint, for backends that draw from a music font.
    pub fn codepoint(&self) -> char {
        let cp = match self {
            Glyph::NoteheadWhole => 0xE0A2,
            Glyph::NoteheadHalf => 0xE0A3,
            Glyph::NoteheadBlack => 0xE0A4,
            Glyph::RestWhole => 0xE4E3,
            Glyph::RestHalf => 0xE4E4,
            Glyph::RestQuarter => 0xE4E5,
            Glyph::Rest8th => 0xE4E6,
            Glyph::Rest16th => 0xE4E7,
            Glyph::ClefG => 0xE050,
            Glyph::ClefF => 0xE062,
            Glyph::ClefC => 0xE05C,
            Glyph::AccidentalSharp => 0xE262,
            Glyph::AccidentalFlat => 0xE260,
            Glyph::AccidentalNatural => 0xE261,
            Glyph::AccidentalDoubleSharp => 0xE263,
            Glyph::AccidentalDoubleFlat => 0xE264,
            Glyph::AugmentationDot => 0xE1E7,
            Glyph::Flag8thUp => 0xE240,
            Glyph::Flag8thDown => 0xE241,
            Glyph::Flag16thUp => 0xE242,
            Glyph::Flag16thDown => 0xE243,
            Glyph::TimeSigDigit(d) => 0xE080 + (*d as u32).min(9),
        };
        char::from_u32(cp).unwrap_or('\u{FFFD}')
    }
}

impl Serialize for Glyph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Metrics table
// ═══════════════════════════════════════════════════════════════════════

/// Advance-width lookup keyed by (glyph, font size).
///
/// Sizes are keyed at a tenth of a pixel so `f64` sizes hash reliably.
#[derive(Debug, Clone, Default)]
pub struct GlyphMetrics {
    widths: HashMap<(Glyph, u32), f64>,
}

fn size_key(font_size: f64) -> u32 {
    (font_size * 10.0).round().max(0.0) as u32
}

/// Reference font size the built-in width table is measured at.
pub const REFERENCE_FONT_SIZE: f64 = 40.0;

/// Advance widths at [`REFERENCE_FONT_SIZE`], in pixels (Bravura-like
/// proportions: one staff-line gap is a quarter of the font size).
const REFERENCE_WIDTHS: &[(Glyph, f64)] = &[
    (Glyph::NoteheadWhole, 16.9),
    (Glyph::NoteheadHalf, 11.8),
    (Glyph::NoteheadBlack, 11.8),
    (Glyph::RestWhole, 11.3),
    (Glyph::RestHalf, 11.3),
    (Glyph::RestQuarter, 10.9),
    (Glyph::Rest8th, 9.9),
    (Glyph::Rest16th, 12.8),
    (Glyph::ClefG, 26.8),
    (Glyph::ClefF, 27.6),
    (Glyph::ClefC, 28.0),
    (Glyph::AccidentalSharp, 10.0),
    (Glyph::AccidentalFlat, 9.0),
    (Glyph::AccidentalNatural, 9.2),
    (Glyph::AccidentalDoubleSharp, 9.9),
    (Glyph::AccidentalDoubleFlat, 16.5),
    (Glyph::AugmentationDot, 4.0),
    (Glyph::Flag8thUp, 10.5),
    (Glyph::Flag8thDown, 10.5),
    (Glyph::Flag16thUp, 10.5),
    (Glyph::Flag16thDown, 10.5),
    (Glyph::TimeSigDigit(0), 17.2),
    (Glyph::TimeSigDigit(1), 12.9),
    (Glyph::TimeSigDigit(2), 16.4),
    (Glyph::TimeSigDigit(3), 15.0),
    (Glyph::TimeSigDigit(4), 16.5),
    (Glyph::TimeSigDigit(5), 14.9),
    (Glyph::TimeSigDigit(6), 15.9),
    (Glyph::TimeSigDigit(7), 15.8),
    (Glyph::TimeSigDigit(8), 16.1),
    (Glyph::TimeSigDigit(9), 15.9),
];

impl GlyphMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table prepopulated with the built-in widths, scaled to `font_size`.
    pub fn with_defaults(font_size: f64) -> Self {
        let mut metrics = Self::new();
        let scale = font_size / REFERENCE_FONT_SIZE;
        for &(glyph, width) in REFERENCE_WIDTHS {
            metrics.insert(glyph, font_size, width * scale);
        }
        metrics
    }

    pub fn insert(&mut self, glyph: Glyph, font_size: f64, width: f64) {
        self.widths.insert((glyph, size_key(font_size)), width);
    }

    /// Exact lookup; `None` when the (glyph, size) pair is unknown.
    pub fn width(&self, glyph: Glyph, font_size: f64) -> Option<f64> {
        self.widths.get(&(glyph, size_key(font_size))).copied()
    }

    /// Lookup with the degraded-mode fallback: a missing entry logs a
    /// warning and yields width 0 so layout can proceed.
    pub fn width_or_zero(&self, glyph: Glyph, font_size: f64) -> f64 {
        match self.width(glyph, font_size) {
            Some(w) => w,
            None => {
                log::warn!("no metrics for glyph '{}' at size {font_size}", glyph.name());
                0.0
            }
        }
    }
}
