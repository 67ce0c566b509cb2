//! Data model for the notation input.
//!
//! Two layers: the raw serde structures matching the plain-data input
//! format (`ScoreInput`), and the validated typed model the layout
//! engine consumes (`Score`). `crate::parser` translates between them.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::pitch::{KeySignature, Letter, Pitch};

// ═══════════════════════════════════════════════════════════════════════
// Raw input structures
// ═══════════════════════════════════════════════════════════════════════

/// Top-level notation input: `{ "staffs": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreInput {
    pub staffs: Vec<StaffInput>,
}

/// One staff of input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffInput {
    /// Clef name: "treble", "bass", or "alto". Defaults to treble.
    pub clef: Option<String>,
    /// Time signature string, e.g. "4/4". Defaults to 4/4.
    pub time: Option<String>,
    /// Key string, e.g. "d major". Defaults to C major.
    pub key: Option<String>,
    #[serde(default)]
    pub notes: Vec<NoteEntry>,
}

/// One entry in a staff's note list: a single event, a chord (array of
/// simultaneous events), or a voice wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteEntry {
    Simultaneous(Vec<NoteEntry>),
    Event(EventSpec),
}

/// A single note, rest, or voice hash.
///
/// `name` is a pitch name, `"rest"`, or `"voice"`; the other fields
/// apply depending on which.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSpec {
    pub name: String,
    pub octave: Option<i32>,
    pub length: Option<u32>,
    #[serde(default)]
    pub dots: Option<u32>,
    #[serde(rename = "voiceNumber")]
    pub voice_number: Option<u32>,
    pub notes: Option<Vec<NoteEntry>>,
}

// ═══════════════════════════════════════════════════════════════════════
// Typed model
// ═══════════════════════════════════════════════════════════════════════

/// Clef of a staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Clef {
    Treble,
    Bass,
    Alto,
}

impl Clef {
    pub fn parse(name: &str) -> Result<Self, Error> {
        match name.trim().to_ascii_lowercase().as_str() {
            "treble" | "violin" | "g" => Ok(Clef::Treble),
            "bass" | "f" => Ok(Clef::Bass),
            "alto" | "c" => Ok(Clef::Alto),
            _ => Err(Error::UnknownClef(name.to_string())),
        }
    }

    /// The tone the clef marks. Octave 1 is the octave of middle C.
    pub fn reference_pitch(self) -> Pitch {
        match self {
            Clef::Treble => Pitch::new(Letter::G, 1, 0),
            Clef::Bass => Pitch::new(Letter::F, 0, 0),
            Clef::Alto => Pitch::new(Letter::C, 1, 0),
        }
    }

    /// Staff position of the reference tone (0 = middle line, positive
    /// = below).
    pub fn position(self) -> i32 {
        match self {
            Clef::Treble => 2,
            Clef::Bass => -2,
            Clef::Alto => 0,
        }
    }
}

/// Time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSignature {
    pub beats: u32,
    pub beat_type: u32,
}

impl TimeSignature {
    pub fn parse(text: &str) -> Result<Self, Error> {
        let (beats, beat_type) = text
            .trim()
            .split_once('/')
            .ok_or_else(|| Error::InvalidTimeSignature(text.to_string()))?;
        let beats: u32 = beats
            .trim()
            .parse()
            .map_err(|_| Error::InvalidTimeSignature(text.to_string()))?;
        let beat_type: u32 = beat_type
            .trim()
            .parse()
            .map_err(|_| Error::InvalidTimeSignature(text.to_string()))?;
        if beats == 0 {
            return Err(Error::InvalidTimeSignature(text.to_string()));
        }
        if !matches!(beat_type, 1 | 2 | 4 | 8 | 16) {
            return Err(Error::UnsupportedBeatType(beat_type));
        }
        Ok(Self { beats, beat_type })
    }
}

/// Duration: base length (1 = whole .. 16 = sixteenth) plus dots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Duration {
    pub length: u32,
    pub dots: u32,
}

impl Duration {
    pub fn new(length: u32, dots: u32) -> Result<Self, Error> {
        if !matches!(length, 1 | 2 | 4 | 8 | 16) {
            return Err(Error::UnsupportedLength(length));
        }
        Ok(Self { length, dots })
    }

    /// Dot multiplier: `1 + sum(2^-k for k in 1..=dots)`.
    fn dot_factor(&self) -> f64 {
        let mut factor = 1.0;
        for k in 1..=self.dots {
            factor += 0.5f64.powi(k as i32);
        }
        factor
    }

    /// Effective numeric length: the base length divided by the dot
    /// factor. A dotted quarter is 4 / 1.5 ≈ 2.67.
    pub fn effective(&self) -> f64 {
        self.length as f64 / self.dot_factor()
    }

    /// Tick count relative to the smallest subdivision.
    pub fn ticks(&self, cursor_size: u32) -> usize {
        let ticks = cursor_size as f64 / self.effective();
        (ticks.round() as usize).max(1)
    }
}

/// A pitched note event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteSpec {
    pub pitch: Pitch,
    pub duration: Duration,
    /// Voice number; 0 = not in a voice context.
    pub voice: u32,
}

/// A rest event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RestSpec {
    pub duration: Duration,
    /// Voice number; 0 = not in a voice context.
    pub voice: u32,
}

/// One rhythmic event in a staff's sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Event {
    Note(NoteSpec),
    Chord(Vec<NoteSpec>),
    Rest(RestSpec),
}

impl Event {
    /// The duration that drives cache expansion: for a chord, its first
    /// member (chord members share one rhythmic slot).
    pub fn duration(&self) -> Duration {
        match self {
            Event::Note(n) => n.duration,
            Event::Rest(r) => r.duration,
            Event::Chord(notes) => {
                notes.first().map(|n| n.duration).unwrap_or(Duration { length: 4, dots: 0 })
            }
        }
    }
}

/// A validated staff: configuration plus the per-voice event lists.
#[derive(Debug, Clone, Serialize)]
pub struct StaffSpec {
    pub clef: Clef,
    pub time: TimeSignature,
    pub key: KeySignature,
    /// (voice number, events). A single entry with voice 0 means no
    /// voice wrappers were used.
    pub voices: Vec<(u32, Vec<Event>)>,
}

/// A validated score, ready for layout.
#[derive(Debug, Clone, Serialize)]
pub struct Score {
    pub staves: Vec<StaffSpec>,
}

impl Score {
    pub fn staff_count(&self) -> usize {
        self.staves.len()
    }
}
