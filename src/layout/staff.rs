//! Per-staff layout state and the rhythmic engine.
//!
//! A staff expands its note/voice lists into a sparse tick-indexed
//! cache, then a cursor walks the cache emitting one note column per
//! occupied slot and inserting barlines at measure boundaries. The
//! horizontal write position only ever moves right; the score
//! coordinator re-synchronizes it across staves after every step.

use std::collections::HashMap;

use crate::config::EngraveConfig;
use crate::error::Error;
use crate::metrics::{Glyph, GlyphMetrics};
use crate::model::{Event, StaffSpec};
use crate::pitch::Letter;

use super::column::resolve_column;
use super::constants::*;
use super::grob::{ColumnMeta, GrobId, GrobKind, GrobTree, LineSpec, SymbolSpec};
use super::notes::{build_note, build_rest};

/// One tick of the notation cache.
#[derive(Debug, Clone)]
pub(super) enum Slot {
    Empty,
    Occupied(Vec<Event>),
}

/// Layout state for a single staff.
pub(crate) struct Staff {
    pub(super) spec: StaffSpec,
    /// Container grob at the staff's middle-line origin.
    pub(super) root: GrobId,
    line_grobs: [GrobId; 5],
    /// Running per-letter alteration table, reset each measure.
    pub(super) alterations: [i32; 7],
    offset_cache: HashMap<i32, f64>,
    cache: Vec<Slot>,
    cursor: usize,
    last_barline_tick: usize,
    ticks_per_bar: usize,
    pub(super) current_x: f64,
    /// Highest (most negative) pixel reached, relative to the middle line.
    pub(super) top_extent: f64,
    /// Lowest pixel reached, relative to the middle line.
    pub(super) bottom_extent: f64,
    done: bool,
}

impl Staff {
    /// Create the staff grobs (lines, clef, key and time signature) and
    /// build the notation cache.
    pub(super) fn new(
        tree: &mut GrobTree,
        score_root: GrobId,
        spec: StaffSpec,
        metrics: &GlyphMetrics,
        config: &EngraveConfig,
    ) -> Result<Self, Error> {
        if config.cursor_size % spec.time.beat_type != 0 {
            return Err(Error::UnsupportedBeatType(spec.time.beat_type));
        }
        let ticks_per_beat = (config.cursor_size / spec.time.beat_type) as usize;
        let ticks_per_bar = spec.time.beats as usize * ticks_per_beat;

        let root = tree.new_node(GrobKind::Container);
        tree.add_child(score_root, root);

        let mut staff = Self {
            alterations: spec.key.alteration_table(),
            cache: build_cache(&spec, config.cursor_size),
            spec,
            root,
            line_grobs: [root; 5],
            offset_cache: HashMap::new(),
            cursor: 0,
            last_barline_tick: 0,
            ticks_per_bar,
            current_x: 0.0,
            top_extent: 0.0,
            bottom_extent: 0.0,
            done: false,
        };

        // The five staff lines; their length follows current_x as
        // content is written.
        for (i, pos) in [-4i32, -2, 0, 2, 4].iter().enumerate() {
            let y = staff.vertical_offset_for(*pos, config);
            let line = tree.new_node(GrobKind::Line(LineSpec {
                to_x: 0.0,
                to_y: 0.0,
                line_width: config.staff_line_thickness,
                color: STAFF_COLOR,
            }));
            tree.get_mut(line).y = y;
            tree.get_mut(line).ignore_width = true;
            tree.add_child(root, line);
            staff.line_grobs[i] = line;
        }
        staff.top_extent = staff.vertical_offset_for(-4, config) - config.staff_space;
        staff.bottom_extent = staff.vertical_offset_for(4, config) + config.staff_space;

        staff.layout_prefix(tree, metrics, config);
        staff.extend_lines(tree);
        Ok(staff)
    }

    /// Clef, key signature, and time signature at the staff start.
    fn layout_prefix(&mut self, tree: &mut GrobTree, metrics: &GlyphMetrics, config: &EngraveConfig) {
        let ss = config.staff_space;
        let mut x = CLEF_PAD_SPACES * ss;

        let (clef_glyph, clef_pos) = match self.spec.clef {
            crate::model::Clef::Treble => (Glyph::ClefG, 2),
            crate::model::Clef::Bass => (Glyph::ClefF, -2),
            crate::model::Clef::Alto => (Glyph::ClefC, 0),
        };
        let clef_y = self.vertical_offset_for(clef_pos, config);
        let clef = tree.new_node(GrobKind::Symbol(SymbolSpec {
            glyph: clef_glyph,
            font_size: config.font_size,
        }));
        {
            let g = tree.get_mut(clef);
            g.x = x;
            g.y = clef_y;
            g.width = metrics.width_or_zero(clef_glyph, config.font_size);
        }
        x += tree.get(clef).width + CLEF_PAD_SPACES * ss;
        tree.add_child(self.root, clef);

        // Key signature accidentals at clef-dependent positions.
        let clef_shift = match self.spec.clef {
            crate::model::Clef::Treble => 0,
            crate::model::Clef::Alto => 1,
            crate::model::Clef::Bass => 2,
        };
        for (letter, alteration) in self.spec.key.signature_letters() {
            let position = key_signature_position(letter, alteration) + clef_shift;
            let glyph = if alteration > 0 { Glyph::AccidentalSharp } else { Glyph::AccidentalFlat };
            let width = metrics.width_or_zero(glyph, config.font_size);
            let y = self.vertical_offset_for(position, config);
            let sym = tree.new_node(GrobKind::Symbol(SymbolSpec {
                glyph,
                font_size: config.font_size,
            }));
            {
                let g = tree.get_mut(sym);
                g.x = x;
                g.y = y;
                g.width = width;
            }
            tree.add_child(self.root, sym);
            x += width + KEY_SIG_PAD;
        }

        // Time signature: numerator over denominator, centered on the
        // wider of the two digit rows.
        let num_digits = digits(self.spec.time.beats);
        let den_digits = digits(self.spec.time.beat_type);
        let row_width = |ds: &[u8]| {
            ds.iter()
                .map(|&d| metrics.width_or_zero(Glyph::TimeSigDigit(d), config.font_size))
                .sum::<f64>()
        };
        let num_width = row_width(&num_digits);
        let den_width = row_width(&den_digits);
        let sig_width = num_width.max(den_width);
        let sig_x = x + ss;
        self.layout_timesig_row(tree, metrics, config, &num_digits, sig_x + (sig_width - num_width) / 2.0, -2);
        self.layout_timesig_row(tree, metrics, config, &den_digits, sig_x + (sig_width - den_width) / 2.0, 2);
        x = sig_x + sig_width;

        self.current_x = x + PREFIX_PAD_SPACES * ss;
    }

    fn layout_timesig_row(
        &mut self,
        tree: &mut GrobTree,
        metrics: &GlyphMetrics,
        config: &EngraveConfig,
        row: &[u8],
        mut x: f64,
        position: i32,
    ) {
        let y = self.vertical_offset_for(position, config);
        for &d in row {
            let glyph = Glyph::TimeSigDigit(d);
            let width = metrics.width_or_zero(glyph, config.font_size);
            let sym = tree.new_node(GrobKind::Symbol(SymbolSpec {
                glyph,
                font_size: config.font_size,
            }));
            let g = tree.get_mut(sym);
            g.x = x;
            g.y = y;
            g.width = width;
            tree.add_child(self.root, sym);
            x += width;
        }
    }

    /// Pixel offset of a staff position, cached per staff.
    pub(crate) fn vertical_offset_for(&mut self, position: i32, config: &EngraveConfig) -> f64 {
        if let Some(&cached) = self.offset_cache.get(&position) {
            return cached;
        }
        let offset = super::vertical_offset(position, config);
        self.offset_cache.insert(position, offset);
        offset
    }

    pub(super) fn grow_extents(&mut self, top: f64, bottom: f64) {
        self.top_extent = self.top_extent.min(top);
        self.bottom_extent = self.bottom_extent.max(bottom);
    }

    pub(super) fn is_done(&self) -> bool {
        self.done
    }

    /// Advance one tick: possibly insert a barline, then emit the note
    /// column for the current slot, if any. Returns the produced column.
    pub(super) fn advance_cursor(
        &mut self,
        tree: &mut GrobTree,
        metrics: &GlyphMetrics,
        config: &EngraveConfig,
    ) -> Option<GrobId> {
        if self.done {
            return None;
        }

        if self.cursor - self.last_barline_tick == self.ticks_per_bar {
            self.insert_barline(tree, config);
        }

        if self.cursor >= self.cache.len() {
            self.done = true;
            return None;
        }

        let slot = std::mem::replace(&mut self.cache[self.cursor], Slot::Empty);
        self.cursor += 1;

        let events = match slot {
            Slot::Empty => return None,
            Slot::Occupied(events) => events,
        };

        let column = tree.new_node(GrobKind::Column(ColumnMeta::default()));
        tree.get_mut(column).x = self.current_x;
        tree.add_child(self.root, column);

        // Accidental decisions for simultaneous notes all judge against
        // the table as it stood when the column started.
        let table = self.alterations;
        for event in &events {
            match event {
                Event::Note(spec) => {
                    let note = build_note(tree, self, spec, &table, metrics, config);
                    tree.add_child(column, note);
                }
                Event::Chord(specs) => {
                    for spec in specs {
                        let note = build_note(tree, self, spec, &table, metrics, config);
                        tree.add_child(column, note);
                    }
                }
                Event::Rest(spec) => {
                    let rest = build_rest(tree, self, spec, metrics, config);
                    tree.add_child(column, rest);
                }
            }
        }

        resolve_column(tree, column, config);

        let meta = match &tree.get(column).kind {
            GrobKind::Column(meta) => *meta,
            _ => unreachable!(),
        };
        let spacing = (config.cursor_size as f64 / meta.min_duration)
            * config.duration_space_increment
            * config.staff_space
            / 2.0;
        self.current_x = tree.get(column).x + tree.get(column).width + spacing;
        self.extend_lines(tree);

        Some(column)
    }

    fn insert_barline(&mut self, tree: &mut GrobTree, config: &EngraveConfig) {
        let top = self.vertical_offset_for(-4, config);
        let bottom = self.vertical_offset_for(4, config);
        let barline = tree.new_node(GrobKind::Barline(LineSpec {
            to_x: 0.0,
            to_y: bottom - top,
            line_width: BARLINE_WIDTH,
            color: BARLINE_COLOR,
        }));
        {
            let g = tree.get_mut(barline);
            g.x = self.current_x;
            g.y = top;
            g.ignore_width = true;
        }
        tree.add_child(self.root, barline);

        self.current_x += BARLINE_GAP_SPACES * config.staff_space;
        self.last_barline_tick = self.cursor;

        // A new measure forgets every displayed accidental.
        self.alterations = self.spec.key.alteration_table();
        self.extend_lines(tree);
    }

    /// Stretch any staff line that has fallen behind the write cursor.
    pub(super) fn extend_lines(&mut self, tree: &mut GrobTree) {
        for &line in &self.line_grobs {
            if let GrobKind::Line(spec) = &mut tree.get_mut(line).kind {
                if spec.to_x < self.current_x {
                    spec.to_x = self.current_x;
                }
            }
        }
    }

    /// Re-align the write cursor after the coordinator synchronizes
    /// staves; the cursor never moves left.
    pub(super) fn sync_current_x(&mut self, tree: &mut GrobTree, x: f64) {
        if x > self.current_x {
            self.current_x = x;
            self.extend_lines(tree);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Notation cache construction
// ═══════════════════════════════════════════════════════════════════════

/// Expand every voice into its own sparse tick array, then zip the
/// per-tick slots of all voices into combined simultaneous events.
fn build_cache(spec: &StaffSpec, cursor_size: u32) -> Vec<Slot> {
    let per_voice: Vec<Vec<Slot>> = spec
        .voices
        .iter()
        .map(|(_, events)| expand_voice(events, cursor_size))
        .collect();

    if per_voice.len() == 1 {
        return per_voice.into_iter().next().unwrap();
    }

    let length = per_voice.iter().map(Vec::len).max().unwrap_or(0);
    let mut combined = Vec::with_capacity(length);
    for tick in 0..length {
        let mut merged: Vec<Event> = Vec::new();
        for voice in &per_voice {
            if let Some(Slot::Occupied(events)) = voice.get(tick) {
                merged.extend(events.iter().cloned());
            }
        }
        combined.push(if merged.is_empty() { Slot::Empty } else { Slot::Occupied(merged) });
    }
    combined
}

/// Append each event at the running tick index, then skip `ticks - 1`
/// empty slots so the next event lands at the correct offset.
fn expand_voice(events: &[Event], cursor_size: u32) -> Vec<Slot> {
    let mut slots = Vec::new();
    for event in events {
        let ticks = event.duration().ticks(cursor_size);
        slots.push(Slot::Occupied(vec![event.clone()]));
        for _ in 1..ticks {
            slots.push(Slot::Empty);
        }
    }
    slots
}

fn digits(n: u32) -> Vec<u8> {
    if n == 0 {
        return vec![0];
    }
    let mut out = Vec::new();
    let mut v = n;
    while v > 0 {
        out.push((v % 10) as u8);
        v /= 10;
    }
    out.reverse();
    out
}

/// Staff position of a key-signature accidental for the treble clef;
/// other clefs shift the whole signature.
fn key_signature_position(letter: Letter, alteration: i32) -> i32 {
    if alteration > 0 {
        match letter {
            Letter::F => -4,
            Letter::C => -1,
            Letter::G => -5,
            Letter::D => -2,
            Letter::A => 1,
            Letter::E => -3,
            Letter::B => 0,
        }
    } else {
        match letter {
            Letter::B => 0,
            Letter::E => -3,
            Letter::A => 1,
            Letter::D => -2,
            Letter::G => 2,
            Letter::C => -1,
            Letter::F => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Clef, Duration, Event, NoteSpec, RestSpec, StaffSpec, TimeSignature};
    use crate::pitch::{KeySignature, Pitch};

    fn note(letter: Letter, length: u32, dots: u32, voice: u32) -> Event {
        Event::Note(NoteSpec {
            pitch: Pitch::new(letter, 1, 0),
            duration: Duration { length, dots },
            voice,
        })
    }

    fn staff_spec(time: &str, voices: Vec<(u32, Vec<Event>)>) -> StaffSpec {
        StaffSpec {
            clef: Clef::Treble,
            time: TimeSignature::parse(time).unwrap(),
            key: KeySignature::c_major(),
            voices,
        }
    }

    fn occupied(slot: &Slot) -> usize {
        match slot {
            Slot::Empty => 0,
            Slot::Occupied(events) => events.len(),
        }
    }

    #[test]
    fn quarters_occupy_every_fourth_tick() {
        let events = vec![note(Letter::C, 4, 0, 0); 3];
        let cache = build_cache(&staff_spec("4/4", vec![(0, events)]), 16);

        assert_eq!(cache.len(), 12);
        for (tick, slot) in cache.iter().enumerate() {
            let expected = usize::from(tick % 4 == 0);
            assert_eq!(occupied(slot), expected, "tick {tick}");
        }
    }

    #[test]
    fn dotted_quarter_spans_six_ticks() {
        let events = vec![note(Letter::C, 4, 1, 0), note(Letter::D, 8, 0, 0)];
        let cache = build_cache(&staff_spec("4/4", vec![(0, events)]), 16);

        assert_eq!(cache.len(), 8);
        assert_eq!(occupied(&cache[0]), 1);
        assert_eq!(occupied(&cache[6]), 1);
        assert!(matches!(cache[3], Slot::Empty));
    }

    #[test]
    fn voices_zip_into_combined_slots() {
        let upper = vec![note(Letter::E, 4, 0, 1), note(Letter::F, 4, 0, 1)];
        let lower = vec![note(Letter::C, 2, 0, 2)];
        let cache = build_cache(&staff_spec("4/4", vec![(1, upper), (2, lower)]), 16);

        assert_eq!(cache.len(), 8);
        assert_eq!(occupied(&cache[0]), 2);
        assert_eq!(occupied(&cache[4]), 1);
        assert!(matches!(cache[1], Slot::Empty));
    }

    #[test]
    fn rests_expand_like_notes() {
        let events = vec![
            Event::Rest(RestSpec { duration: Duration { length: 2, dots: 0 }, voice: 0 }),
            note(Letter::G, 4, 0, 0),
        ];
        let cache = build_cache(&staff_spec("4/4", vec![(0, events)]), 16);

        assert_eq!(cache.len(), 12);
        assert_eq!(occupied(&cache[0]), 1);
        assert_eq!(occupied(&cache[8]), 1);
    }
}
