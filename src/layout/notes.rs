//! Note and rest grob assembly.
//!
//! A note grob is a small subtree: notehead symbol at the origin,
//! helper lines behind it, an optional accidental group to the left,
//! augmentation dots to the right, and a stem with an optional flag.
//! The note's own width comes from its children's extents; stems and
//! helper lines are excluded from width aggregation.

use crate::config::EngraveConfig;
use crate::metrics::{Glyph, GlyphMetrics};
use crate::model::{NoteSpec, RestSpec};
use crate::pitch::distance_between;

use super::constants::*;
use super::grob::{GrobId, GrobKind, GrobTree, LineSpec, NoteMeta, RestMeta, StemDirection, SymbolSpec};
use super::staff::Staff;

pub(super) fn notehead_glyph(length: u32) -> Glyph {
    match length {
        1 => Glyph::NoteheadWhole,
        2 => Glyph::NoteheadHalf,
        _ => Glyph::NoteheadBlack,
    }
}

fn accidental_glyph(alteration: i32) -> Glyph {
    match alteration {
        2 => Glyph::AccidentalDoubleSharp,
        1 => Glyph::AccidentalSharp,
        -1 => Glyph::AccidentalFlat,
        -2 => Glyph::AccidentalDoubleFlat,
        _ => Glyph::AccidentalNatural,
    }
}

fn rest_glyph(length: u32) -> Glyph {
    match length {
        1 => Glyph::RestWhole,
        2 => Glyph::RestHalf,
        4 => Glyph::RestQuarter,
        8 => Glyph::Rest8th,
        _ => Glyph::Rest16th,
    }
}

fn flag_glyph(length: u32, direction: StemDirection) -> Option<Glyph> {
    match (length, direction) {
        (8, StemDirection::Up) => Some(Glyph::Flag8thUp),
        (8, StemDirection::Down) => Some(Glyph::Flag8thDown),
        (16, StemDirection::Up) => Some(Glyph::Flag16thUp),
        (16, StemDirection::Down) => Some(Glyph::Flag16thDown),
        _ => None,
    }
}

/// Build the grob subtree for one pitched note and update the staff's
/// alteration table and vertical extents.
///
/// `table` is the alteration table as it stood when the note's column
/// started: simultaneous octave duplicates each judge against that
/// snapshot, so both display their accidental.
pub(super) fn build_note(
    tree: &mut GrobTree,
    staff: &mut Staff,
    spec: &NoteSpec,
    table: &[i32; 7],
    metrics: &GlyphMetrics,
    config: &EngraveConfig,
) -> GrobId {
    let ss = config.staff_space;
    let clef = staff.spec.clef;
    let position = clef.position() + distance_between(&spec.pitch, &clef.reference_pitch());
    let note_y = staff.vertical_offset_for(position, config);

    let nh_glyph = notehead_glyph(spec.duration.length);
    let nh_width = metrics.width_or_zero(nh_glyph, config.font_size);

    let note = tree.new_node(GrobKind::Note(NoteMeta {
        spec: *spec,
        position_on_staff: position,
        stem: None,
        stem_explicit: false,
        is_shifted: false,
        notehead_width: nh_width,
        accidental: None,
        stem_grob: None,
    }));
    tree.get_mut(note).y = note_y;

    // Helper lines go first so the notehead draws over them.
    if position.abs() > 5 {
        let extend = HELPER_LINE_EXTEND_SPACES * ss;
        let sign = position.signum();
        let mut p = 6;
        while p <= position.abs() {
            let line_y = staff.vertical_offset_for(sign * p, config) - note_y;
            let helper = tree.new_node(GrobKind::Line(LineSpec {
                to_x: nh_width + 2.0 * extend,
                to_y: 0.0,
                line_width: config.staff_line_thickness,
                color: STAFF_COLOR,
            }));
            let g = tree.get_mut(helper);
            g.x = -extend;
            g.y = line_y;
            g.ignore_width = true;
            tree.add_child(note, helper);
            p += 2;
        }
    }

    let notehead = tree.new_node(GrobKind::Symbol(SymbolSpec {
        glyph: nh_glyph,
        font_size: config.font_size,
    }));
    tree.get_mut(notehead).width = nh_width;
    tree.add_child(note, notehead);

    // Accidental display: only when the alteration table disagrees with
    // the note; showing one updates the running table for the rest of
    // the measure.
    let letter_idx = spec.pitch.letter.index() as usize;
    if table[letter_idx] != spec.pitch.alteration {
        staff.alterations[letter_idx] = spec.pitch.alteration;

        let glyph = accidental_glyph(spec.pitch.alteration);
        let acc_width = metrics.width_or_zero(glyph, config.font_size);
        let group = tree.new_node(GrobKind::Container);
        let symbol = tree.new_node(GrobKind::Symbol(SymbolSpec {
            glyph,
            font_size: config.font_size,
        }));
        {
            let g = tree.get_mut(symbol);
            g.x = -(acc_width + ACCIDENTAL_GAP);
            g.width = acc_width;
        }
        tree.add_child(group, symbol);
        tree.add_child(note, group);
        tree.note_meta_mut(note).accidental = Some(group);
    }

    // Augmentation dots sit to the right; a note on a line lifts its
    // dots into the space above.
    if spec.duration.dots > 0 {
        let dot_width = metrics.width_or_zero(Glyph::AugmentationDot, config.font_size);
        let dot_y = if position % 2 == 0 { -ss } else { 0.0 };
        for k in 0..spec.duration.dots {
            let dot = tree.new_node(GrobKind::Symbol(SymbolSpec {
                glyph: Glyph::AugmentationDot,
                font_size: config.font_size,
            }));
            let g = tree.get_mut(dot);
            g.x = nh_width + DOT_GAP + k as f64 * (dot_width + DOT_GAP);
            g.y = dot_y;
            g.width = dot_width;
            tree.add_child(note, dot);
        }
    }

    if spec.duration.length >= 2 {
        let (direction, explicit) = stem_direction(spec, position);
        attach_stem(tree, note, direction, config);
        let meta = tree.note_meta_mut(note);
        meta.stem = Some(direction);
        meta.stem_explicit = explicit;
    }

    let extent = tree.child_extent(note);
    tree.get_mut(note).width = extent;

    let stem_span = if spec.duration.length >= 2 { STEM_LENGTH_SPACES * ss } else { 0.0 };
    match tree.note_meta(note).stem {
        Some(StemDirection::Up) => staff.grow_extents(note_y - stem_span, note_y + ss),
        Some(StemDirection::Down) => staff.grow_extents(note_y - ss, note_y + stem_span),
        None => staff.grow_extents(note_y - ss, note_y + ss),
    }

    note
}

fn stem_direction(spec: &NoteSpec, position: i32) -> (StemDirection, bool) {
    if spec.voice > 0 {
        // Voice 1 takes the upper half of the texture.
        let direction = if spec.voice == 1 { StemDirection::Up } else { StemDirection::Down };
        (direction, true)
    } else if position >= 0 {
        (StemDirection::Up, false)
    } else {
        (StemDirection::Down, false)
    }
}

/// Create (or re-create, after a direction flip) the stem line and flag.
pub(super) fn attach_stem(
    tree: &mut GrobTree,
    note: GrobId,
    direction: StemDirection,
    config: &EngraveConfig,
) {
    if let Some(old) = tree.note_meta(note).stem_grob {
        tree.remove_child(note, old);
    }

    let meta = tree.note_meta(note);
    let nh_width = meta.notehead_width;
    let length = meta.spec.duration.length;
    let stem_len = STEM_LENGTH_SPACES * config.staff_space;

    let (x, to_y) = match direction {
        StemDirection::Up => (nh_width - STEM_WIDTH / 2.0, -stem_len),
        StemDirection::Down => (STEM_WIDTH / 2.0, stem_len),
    };
    let stem = tree.new_node(GrobKind::Line(LineSpec {
        to_x: 0.0,
        to_y,
        line_width: STEM_WIDTH,
        color: NOTE_COLOR,
    }));
    {
        let g = tree.get_mut(stem);
        g.x = x;
        g.ignore_width = true;
    }
    tree.add_child(note, stem);

    if let Some(glyph) = flag_glyph(length, direction) {
        let flag = tree.new_node(GrobKind::Symbol(SymbolSpec {
            glyph,
            font_size: config.font_size,
        }));
        // Relative to the stem, which already sits at the head's edge.
        let g = tree.get_mut(flag);
        g.y = to_y;
        g.ignore_width = true;
        tree.add_child(stem, flag);
    }

    let meta = tree.note_meta_mut(note);
    meta.stem_grob = Some(stem);
    meta.stem = Some(direction);
}

/// Remove a note's stem grob (prime/second merges keep only one drawn
/// stem). The note keeps its stem direction for later pair decisions.
pub(super) fn remove_stem(tree: &mut GrobTree, note: GrobId) {
    if let Some(stem) = tree.note_meta(note).stem_grob {
        tree.remove_child(note, stem);
        tree.note_meta_mut(note).stem_grob = None;
    }
}

/// Build the grob subtree for one rest. The vertical slot depends on
/// the voice: voice 1 sits above the middle line, voice 2 below.
pub(super) fn build_rest(
    tree: &mut GrobTree,
    staff: &mut Staff,
    spec: &RestSpec,
    metrics: &GlyphMetrics,
    config: &EngraveConfig,
) -> GrobId {
    let ss = config.staff_space;
    let glyph = rest_glyph(spec.duration.length);
    let width = metrics.width_or_zero(glyph, config.font_size);

    // Whole rests hang from the line above the middle; everything else
    // anchors on the middle line.
    let base_y = match spec.duration.length {
        1 => staff.vertical_offset_for(-2, config),
        _ => staff.vertical_offset_for(0, config),
    };
    let voice_shift = match spec.voice {
        1 => -2.0 * ss,
        2 => 2.0 * ss,
        _ => 0.0,
    };

    let rest = tree.new_node(GrobKind::Rest(RestMeta { spec: *spec }));
    tree.get_mut(rest).y = base_y + voice_shift;

    let symbol = tree.new_node(GrobKind::Symbol(SymbolSpec {
        glyph,
        font_size: config.font_size,
    }));
    tree.get_mut(symbol).width = width;
    tree.add_child(rest, symbol);

    if spec.duration.dots > 0 {
        let dot_width = metrics.width_or_zero(Glyph::AugmentationDot, config.font_size);
        for k in 0..spec.duration.dots {
            let dot = tree.new_node(GrobKind::Symbol(SymbolSpec {
                glyph: Glyph::AugmentationDot,
                font_size: config.font_size,
            }));
            let g = tree.get_mut(dot);
            g.x = width + DOT_GAP + k as f64 * (dot_width + DOT_GAP);
            g.y = -ss;
            g.width = dot_width;
            tree.add_child(rest, dot);
        }
    }

    let extent = tree.child_extent(rest);
    tree.get_mut(rest).width = extent;

    let rest_y = base_y + voice_shift;
    staff.grow_extents(rest_y - 2.0 * ss, rest_y + 2.0 * ss);

    rest
}
