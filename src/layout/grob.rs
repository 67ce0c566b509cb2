//! Graphical object (grob) tree.
//!
//! Grobs live in an arena owned by [`GrobTree`]; ids are plain indices.
//! Every grob carries an offset relative to its parent. Absolute
//! positions exist only during the render traversal, which threads the
//! accumulated ancestor offset top-down and emits one draw descriptor
//! per non-container node. Parent links are non-owning back-references
//! for attribute propagation and are never followed while rendering.

use serde::Serialize;

use crate::error::Error;
use crate::metrics::Glyph;
use crate::model::{NoteSpec, RestSpec};

/// Index of a grob in its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrobId(pub(crate) usize);

/// Stem direction of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StemDirection {
    Up,
    Down,
}

/// Line payload: end point relative to the grob's own position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineSpec {
    pub to_x: f64,
    pub to_y: f64,
    pub line_width: f64,
    pub color: &'static str,
}

/// Glyph payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SymbolSpec {
    pub glyph: Glyph,
    pub font_size: f64,
}

/// Layout metadata of a pitched note.
#[derive(Debug, Clone)]
pub struct NoteMeta {
    pub spec: NoteSpec,
    /// Integer half-steps from the middle line; negative = higher.
    pub position_on_staff: i32,
    /// `None` for whole notes (no stem).
    pub stem: Option<StemDirection>,
    /// Whether the direction came from a voice assignment rather than
    /// the position heuristic.
    pub stem_explicit: bool,
    /// Set by the stacking resolver so a note is never shifted twice.
    pub is_shifted: bool,
    pub notehead_width: f64,
    pub accidental: Option<GrobId>,
    pub stem_grob: Option<GrobId>,
}

/// Layout metadata of a rest.
#[derive(Debug, Clone)]
pub struct RestMeta {
    pub spec: RestSpec,
}

/// Metadata of a resolved note column.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMeta {
    /// Numeric value of the shortest effective duration among members
    /// (16 = sixteenth); drives the spacing increment.
    pub min_duration: f64,
    /// Leftmost x-extent relative to the column after accidental
    /// stacking; zero or negative.
    pub note_start_offset: f64,
}

/// Closed set of grob kinds.
#[derive(Debug, Clone)]
pub enum GrobKind {
    /// Draws nothing; only propagates to children.
    Container,
    Line(LineSpec),
    Symbol(SymbolSpec),
    Note(NoteMeta),
    Rest(RestMeta),
    Column(ColumnMeta),
    Barline(LineSpec),
}

/// A positioned node.
#[derive(Debug, Clone)]
pub struct Grob {
    /// Offset relative to the parent.
    pub x: f64,
    pub y: f64,
    /// Width contributed to the parent's width aggregation.
    pub width: f64,
    /// Excluded from parent width aggregation (stems, helper lines).
    pub ignore_width: bool,
    pub kind: GrobKind,
    pub children: Vec<GrobId>,
    pub parent: Option<GrobId>,
}

impl Grob {
    fn new(kind: GrobKind) -> Self {
        Self { x: 0.0, y: 0.0, width: 0.0, ignore_width: false, kind, children: Vec::new(), parent: None }
    }

    /// Whether this node draws nothing itself.
    pub fn is_container(&self) -> bool {
        matches!(
            self.kind,
            GrobKind::Container | GrobKind::Note(_) | GrobKind::Rest(_) | GrobKind::Column(_)
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Render descriptors
// ═══════════════════════════════════════════════════════════════════════

/// A draw-ready descriptor with resolved absolute coordinates.
///
/// `x`/`y` are absolute; `rel_x`/`rel_y` are the grob's own offset
/// within its parent, letting a backend recompute deltas without
/// re-walking ancestors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderOp {
    #[serde(rename_all = "camelCase")]
    Line {
        x: f64,
        y: f64,
        rel_x: f64,
        rel_y: f64,
        to_x: f64,
        to_y: f64,
        line_width: f64,
        color: &'static str,
    },
    #[serde(rename_all = "camelCase")]
    Glyph {
        x: f64,
        y: f64,
        rel_x: f64,
        rel_y: f64,
        #[serde(rename = "name")]
        glyph: Glyph,
        font_size: f64,
    },
}

// ═══════════════════════════════════════════════════════════════════════
// Tree
// ═══════════════════════════════════════════════════════════════════════

/// Arena of grobs.
#[derive(Debug, Default)]
pub struct GrobTree {
    nodes: Vec<Grob>,
}

impl GrobTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_node(&mut self, kind: GrobKind) -> GrobId {
        self.nodes.push(Grob::new(kind));
        GrobId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: GrobId) -> &Grob {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: GrobId) -> &mut Grob {
        &mut self.nodes[id.0]
    }

    /// Append `child` to `parent`, recording the back-reference.
    pub fn add_child(&mut self, parent: GrobId, child: GrobId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Detach `child` from `parent`. The node stays in the arena but is
    /// no longer reached by the render traversal.
    pub fn remove_child(&mut self, parent: GrobId, child: GrobId) {
        self.nodes[parent.0].children.retain(|&c| c != child);
        self.nodes[child.0].parent = None;
    }

    pub fn note_meta(&self, id: GrobId) -> &NoteMeta {
        match &self.nodes[id.0].kind {
            GrobKind::Note(meta) => meta,
            _ => panic!("grob is not a note"),
        }
    }

    pub fn note_meta_mut(&mut self, id: GrobId) -> &mut NoteMeta {
        match &mut self.nodes[id.0].kind {
            GrobKind::Note(meta) => meta,
            _ => panic!("grob is not a note"),
        }
    }

    pub fn column_meta_mut(&mut self, id: GrobId) -> &mut ColumnMeta {
        match &mut self.nodes[id.0].kind {
            GrobKind::Column(meta) => meta,
            _ => panic!("grob is not a column"),
        }
    }

    /// Default width aggregation: sum of non-`ignore_width` children.
    pub fn summed_child_width(&self, id: GrobId) -> f64 {
        self.nodes[id.0]
            .children
            .iter()
            .map(|&c| &self.nodes[c.0])
            .filter(|g| !g.ignore_width)
            .map(|g| g.width)
            .sum()
    }

    /// Rightmost extent of non-`ignore_width` children relative to the
    /// node's own origin. Used by Note and Column, whose children carry
    /// meaningful offsets.
    pub fn child_extent(&self, id: GrobId) -> f64 {
        self.nodes[id.0]
            .children
            .iter()
            .map(|&c| &self.nodes[c.0])
            .filter(|g| !g.ignore_width)
            .map(|g| g.x + g.width)
            .fold(0.0, f64::max)
    }

    /// Leftmost accumulated x offset anywhere in the subtree, relative
    /// to the node's origin. Zero or negative.
    pub fn leftmost_extent(&self, id: GrobId) -> f64 {
        fn walk(tree: &GrobTree, id: GrobId, base: f64, min: &mut f64) {
            let g = &tree.nodes[id.0];
            let at = base + g.x;
            if at < *min {
                *min = at;
            }
            for &c in &g.children {
                walk(tree, c, at, min);
            }
        }
        let mut min = 0.0;
        let g = &self.nodes[id.0];
        for &c in &g.children {
            walk(self, c, 0.0, &mut min);
        }
        min
    }

    /// Flatten the subtree under `root` into draw descriptors.
    ///
    /// `ref_x`/`ref_y` are the absolute position of `root`'s parent
    /// frame; passing a non-finite value is a configuration error.
    pub fn render(&self, root: GrobId, ref_x: f64, ref_y: f64) -> Result<Vec<RenderOp>, Error> {
        if !ref_x.is_finite() || !ref_y.is_finite() {
            return Err(Error::MissingRenderOrigin);
        }
        let mut ops = Vec::new();
        self.render_node(root, ref_x, ref_y, &mut ops);
        Ok(ops)
    }

    fn render_node(&self, id: GrobId, ref_x: f64, ref_y: f64, ops: &mut Vec<RenderOp>) {
        let g = &self.nodes[id.0];
        let abs_x = ref_x + g.x;
        let abs_y = ref_y + g.y;

        match &g.kind {
            GrobKind::Container | GrobKind::Note(_) | GrobKind::Rest(_) | GrobKind::Column(_) => {}
            GrobKind::Line(line) | GrobKind::Barline(line) => ops.push(RenderOp::Line {
                x: abs_x,
                y: abs_y,
                rel_x: g.x,
                rel_y: g.y,
                to_x: abs_x + line.to_x,
                to_y: abs_y + line.to_y,
                line_width: line.line_width,
                color: line.color,
            }),
            GrobKind::Symbol(sym) => ops.push(RenderOp::Glyph {
                x: abs_x,
                y: abs_y,
                rel_x: g.x,
                rel_y: g.y,
                glyph: sym.glyph,
                font_size: sym.font_size,
            }),
        }

        for &child in &g.children {
            self.render_node(child, abs_x, abs_y, ops);
        }
    }
}
