//! Note column stacking resolver.
//!
//! A column owns every note and rest occupying one rhythmic slot. Two
//! passes run once per column: accidental stacking pushes colliding
//! accidentals into staggered columns left of the notehead stack, and
//! notehead stacking resolves prime/second collisions between adjacent
//! notes. Both passes walk from the extremes inward and only inspect
//! immediate neighbours, so chords denser than triads may keep residual
//! overlaps.

use crate::config::EngraveConfig;
use crate::model::Duration;

use super::grob::{GrobId, GrobKind, GrobTree, StemDirection};
use super::notes::{attach_stem, remove_stem};

/// Run both stacking passes and fill in the column metadata.
pub(super) fn resolve_column(tree: &mut GrobTree, column: GrobId, config: &EngraveConfig) {
    let notes: Vec<GrobId> = tree
        .get(column)
        .children
        .iter()
        .copied()
        .filter(|&c| matches!(tree.get(c).kind, GrobKind::Note(_)))
        .collect();

    stack_accidentals(tree, column, &notes, config);
    stack_noteheads(tree, &notes, config);

    let min_duration = tree
        .get(column)
        .children
        .iter()
        .map(|&c| match &tree.get(c).kind {
            GrobKind::Note(meta) => meta.spec.duration,
            GrobKind::Rest(meta) => meta.spec.duration,
            _ => Duration { length: 4, dots: 0 },
        })
        .map(|d| d.effective())
        .fold(f64::MIN, f64::max);

    let note_start_offset = tree.leftmost_extent(column);
    let width = tree.child_extent(column);

    tree.get_mut(column).width = width;
    let meta = tree.column_meta_mut(column);
    meta.min_duration = if min_duration > f64::MIN { min_duration } else { 4.0 };
    meta.note_start_offset = note_start_offset;
}

// ═══════════════════════════════════════════════════════════════════════
// Accidental stacking
// ═══════════════════════════════════════════════════════════════════════

fn stack_accidentals(tree: &mut GrobTree, column: GrobId, notes: &[GrobId], config: &EngraveConfig) {
    let mut remaining: Vec<GrobId> = notes
        .iter()
        .copied()
        .filter(|&n| tree.note_meta(n).accidental.is_some())
        .collect();
    if remaining.is_empty() {
        return;
    }
    // Highest pitch first (smaller position = higher).
    remaining.sort_by_key(|&n| tree.note_meta(n).position_on_staff);

    // Outside-in visiting order: highest, lowest, next highest, ... —
    // immediately pulling in octave duplicates of the taken root letter
    // so they share one accidental column. The contains-guard protects
    // the middle note of odd-sized sets against double processing.
    let mut order: Vec<GrobId> = Vec::new();
    let mut take_high = true;
    while !remaining.is_empty() {
        let id = if take_high { remaining.remove(0) } else { remaining.pop().unwrap() };
        take_high = !take_high;
        if order.contains(&id) {
            continue;
        }
        order.push(id);
        let letter = tree.note_meta(id).spec.pitch.letter;
        let mut i = 0;
        while i < remaining.len() {
            if tree.note_meta(remaining[i]).spec.pitch.letter == letter {
                let dup = remaining.remove(i);
                if !order.contains(&dup) {
                    order.push(dup);
                }
            } else {
                i += 1;
            }
        }
    }

    // One horizontal column per root-letter group, stepping left by two
    // staff spaces per group boundary.
    let step = 2.0 * config.staff_space;
    let mut offset = 0.0;
    let mut max_offset: f64 = 0.0;
    let mut prev_letter = None;
    for id in order {
        let letter = tree.note_meta(id).spec.pitch.letter;
        if prev_letter.is_some() && prev_letter != Some(letter) {
            offset += step;
        }
        prev_letter = Some(letter);
        max_offset = max_offset.max(offset);

        let group = tree.note_meta(id).accidental.expect("accidental filtered above");
        let members = tree.get(group).children.clone();
        for member in members {
            tree.get_mut(member).x -= offset;
        }
    }

    // Re-center: the whole column moves right by half the furthest
    // offset so the notehead stack stays visually centered.
    tree.get_mut(column).x += max_offset / 2.0;
}

// ═══════════════════════════════════════════════════════════════════════
// Notehead stacking
// ═══════════════════════════════════════════════════════════════════════

fn stack_noteheads(tree: &mut GrobTree, notes: &[GrobId], config: &EngraveConfig) {
    if notes.len() < 2 {
        return;
    }
    // Lowest pitch first (larger position = lower).
    let mut sorted = notes.to_vec();
    sorted.sort_by_key(|&n| std::cmp::Reverse(tree.note_meta(n).position_on_staff));

    for (lower, upper) in pair_order(sorted.len())
        .into_iter()
        .map(|i| (sorted[i], sorted[i + 1]))
    {
        let diff = tree.note_meta(lower).position_on_staff - tree.note_meta(upper).position_on_staff;
        debug_assert!(diff >= 0);
        match diff {
            0 => resolve_prime(tree, lower, upper),
            1 => resolve_second(tree, lower, upper, config),
            _ => {}
        }
    }
}

/// Adjacent-pair visiting order, outer pairs first.
fn pair_order(note_count: usize) -> Vec<usize> {
    let pairs = note_count - 1;
    let mut order = Vec::with_capacity(pairs);
    let mut lo = 0;
    let mut hi = pairs - 1;
    while lo <= hi {
        order.push(lo);
        if hi != lo {
            order.push(hi);
        }
        if hi == 0 {
            break;
        }
        lo += 1;
        hi -= 1;
    }
    order
}

fn shift(tree: &mut GrobTree, note: GrobId, dx: f64) {
    let meta = tree.note_meta_mut(note);
    if meta.is_shifted {
        return;
    }
    meta.is_shifted = true;
    tree.get_mut(note).x += dx;
}

fn resolve_prime(tree: &mut GrobTree, lower: GrobId, upper: GrobId) {
    let lower_width = tree.note_meta(lower).notehead_width;
    let upper_width = tree.note_meta(upper).notehead_width;
    let lower_stem = tree.note_meta(lower).stem;
    let upper_stem = tree.note_meta(upper).stem;

    match (lower_stem, upper_stem) {
        // Two whole notes sit side by side.
        (None, None) => shift(tree, upper, lower_width),
        // Whole against a stemmed note: the shorter note yields, moving
        // away from the whole.
        (None, Some(_)) => shift(tree, upper, lower_width),
        (Some(_), None) => shift(tree, lower, -upper_width),
        (Some(a), Some(b)) if a == b => {
            // Same direction: the two merge onto one stem.
            shift(tree, upper, lower_width);
            remove_stem(tree, upper);
        }
        // Opposite stems already separate the heads.
        _ => {}
    }
}

fn resolve_second(tree: &mut GrobTree, lower: GrobId, upper: GrobId, config: &EngraveConfig) {
    let lower_width = tree.note_meta(lower).notehead_width;
    let upper_width = tree.note_meta(upper).notehead_width;
    let lower_stem = tree.note_meta(lower).stem;
    let upper_stem = tree.note_meta(upper).stem;

    match (lower_stem, upper_stem) {
        (Some(a), Some(b)) if a == b => {
            // An auto-assigned up-stem on the upper note may flip down
            // to restore the standard opposite-stem shape; flipping a
            // down-stem up is not allowed.
            if a == StemDirection::Up && !tree.note_meta(upper).stem_explicit {
                attach_stem(tree, upper, StemDirection::Down, config);
                shift(tree, lower, upper_width);
            } else {
                shift(tree, upper, lower_width);
                remove_stem(tree, upper);
            }
        }
        // Standard second: lower head tucks right of the upper one.
        _ => shift(tree, lower, upper_width),
    }
}
