//! Score layout — turns a validated [`Score`](crate::model::Score) into
//! an ordered list of positioned draw commands.
//!
//! The coordinator creates one staff engine per input staff and
//! drives them through their rhythmic engines in lockstep: every staff
//! advances once per step even when it produces nothing. After each
//! step the just-produced columns are nudged so simultaneous notes
//! align on their note-start, and every staff's write cursor jumps to
//! the shared maximum. A final pass reconciles vertical staff spacing.

pub mod backend;
mod column;
pub mod constants;
pub mod grob;
mod notes;
mod staff;

use serde::Serialize;

use crate::config::EngraveConfig;
use crate::error::Error;
use crate::metrics::GlyphMetrics;
use crate::model::Score;

use constants::*;
use grob::{GrobKind, GrobTree, RenderOp};
use staff::Staff;

/// Pixel offset of an integer staff position (0 = middle line,
/// positive = lower). Consecutive positions alternate between lines and
/// gaps; only the line crossings accumulate line thickness, hence the
/// floored half term.
pub fn vertical_offset(position: i32, config: &EngraveConfig) -> f64 {
    position as f64 * config.staff_space
        - position.div_euclid(2) as f64 * config.staff_line_thickness
}

/// The outcome of a layout run.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutResult {
    /// Draw descriptors in paint order.
    pub ops: Vec<RenderOp>,
    /// Required surface width in pixels.
    pub width: f64,
    /// Required surface height in pixels.
    pub height: f64,
}

/// Lay out a whole score.
///
/// Layout is a pure function of the input, the glyph metrics, and the
/// configuration; it keeps no global state and is re-run from scratch
/// on any change.
pub fn layout_score(
    score: &Score,
    metrics: &GlyphMetrics,
    config: &EngraveConfig,
) -> Result<LayoutResult, Error> {
    let mut tree = GrobTree::new();
    let root = tree.new_node(GrobKind::Container);
    {
        let g = tree.get_mut(root);
        g.x = PAGE_MARGIN_LEFT;
        g.y = PAGE_MARGIN_TOP;
    }

    let mut staves = Vec::with_capacity(score.staves.len());
    for spec in &score.staves {
        staves.push(Staff::new(&mut tree, root, spec.clone(), metrics, config)?);
    }

    // Staves start aligned on the widest prefix.
    let prefix_x = staves.iter().map(|s| s.current_x).fold(0.0, f64::max);
    for staff in &mut staves {
        staff.sync_current_x(&mut tree, prefix_x);
    }

    // Lockstep cursor advancement.
    while !staves.iter().all(Staff::is_done) {
        let mut produced = Vec::new();
        for (idx, staff) in staves.iter_mut().enumerate() {
            if let Some(column) = staff.advance_cursor(&mut tree, metrics, config) {
                produced.push((idx, column));
            }
        }

        if !produced.is_empty() {
            // The widest accidental stack decides how far every column
            // of this tick moves right, keeping note-starts aligned.
            let min_offset = produced
                .iter()
                .map(|&(_, column)| match &tree.get(column).kind {
                    GrobKind::Column(meta) => meta.note_start_offset,
                    _ => 0.0,
                })
                .fold(0.0, f64::min);
            if min_offset < 0.0 {
                for &(idx, column) in &produced {
                    tree.get_mut(column).x -= min_offset;
                    let target = staves[idx].current_x - min_offset;
                    staves[idx].sync_current_x(&mut tree, target);
                }
            }
        }

        let shared_x = staves.iter().map(|s| s.current_x).fold(0.0, f64::max);
        for staff in &mut staves {
            staff.sync_current_x(&mut tree, shared_x);
        }
    }

    adjust_staff_spacing(&mut tree, &staves, config);

    let content_width = staves.iter().map(|s| s.current_x).fold(0.0, f64::max);
    let width = PAGE_MARGIN_LEFT + content_width + PAGE_MARGIN_RIGHT;
    let height = match staves.last() {
        Some(last) => PAGE_MARGIN_TOP + tree.get(last.root).y + last.bottom_extent + PAGE_MARGIN_BOTTOM,
        None => PAGE_MARGIN_TOP + PAGE_MARGIN_BOTTOM,
    };

    let ops = tree.render(root, 0.0, 0.0)?;
    Ok(LayoutResult { ops, width, height })
}

/// Push staves downward until each one's top extent clears the previous
/// staff's bottom extent with two staff spaces of headroom.
fn adjust_staff_spacing(tree: &mut GrobTree, staves: &[Staff], config: &EngraveConfig) {
    let ss = config.staff_space;
    let mut prev_y = 0.0;
    for (i, staff) in staves.iter().enumerate() {
        let y = if i == 0 {
            -staff.top_extent
        } else {
            let prev = &staves[i - 1];
            let clearance = prev_y + prev.bottom_extent + STAFF_CLEARANCE_SPACES * ss - staff.top_extent;
            (prev_y + STAFF_DISTANCE_SPACES * ss).max(clearance)
        };
        tree.get_mut(staff.root).y = y;
        prev_y = y;
    }
}
