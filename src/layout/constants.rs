//! Shared constants for the layout engine.
//!
//! Distances that scale with the staff are expressed in staff-space
//! units (the half-step unit from `EngraveConfig`) and multiplied by
//! `config.staff_space` at use sites; absolute pixel values are margins
//! and stroke widths.

// ── Page & margins ──────────────────────────────────────────────────
pub const PAGE_MARGIN_LEFT: f64 = 50.0;
pub const PAGE_MARGIN_TOP: f64 = 40.0;
pub const PAGE_MARGIN_RIGHT: f64 = 30.0;
pub const PAGE_MARGIN_BOTTOM: f64 = 40.0;

// ── Staff geometry (staff-space units) ──────────────────────────────
/// Default distance between staff middle lines before spacing
/// reconciliation.
pub const STAFF_DISTANCE_SPACES: f64 = 24.0;
/// Minimum headroom between adjacent staves' extents.
pub const STAFF_CLEARANCE_SPACES: f64 = 2.0;

// ── Prefix spacing (staff-space units) ──────────────────────────────
pub const CLEF_PAD_SPACES: f64 = 1.0;
pub const KEY_SIG_PAD: f64 = 1.0;
pub const PREFIX_PAD_SPACES: f64 = 2.0;

// ── Note anatomy ────────────────────────────────────────────────────
/// Stem length in staff-space units (3.5 line gaps).
pub const STEM_LENGTH_SPACES: f64 = 5.6;
pub const STEM_WIDTH: f64 = 1.2;
/// Ledger line overhang past the notehead on each side, in spaces.
pub const HELPER_LINE_EXTEND_SPACES: f64 = 0.8;
pub const DOT_GAP: f64 = 2.0;
pub const ACCIDENTAL_GAP: f64 = 3.0;
/// Gap inserted after an inserted barline, in spaces.
pub const BARLINE_GAP_SPACES: f64 = 2.0;
pub const BARLINE_WIDTH: f64 = 1.0;

// ── Colors ──────────────────────────────────────────────────────────
pub const NOTE_COLOR: &str = "#1a1a1a";
pub const STAFF_COLOR: &str = "#555555";
pub const BARLINE_COLOR: &str = "#333333";
