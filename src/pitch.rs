//! Pitch names, diatonic distance, interval classification, and key
//! signature alteration tables.
//!
//! Octave numbering follows the input convention: octave 1 is the octave
//! of middle C, so `c` at octave 1 is middle C and `g` at octave 1 is the
//! treble clef reference tone.

use serde::Serialize;

use crate::error::Error;

// ═══════════════════════════════════════════════════════════════════════
// Letters and pitches
// ═══════════════════════════════════════════════════════════════════════

/// Root tone letter, indexed C=0 .. B=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Zero-based diatonic index (C=0 .. B=6).
    pub fn index(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 1,
            Letter::E => 2,
            Letter::F => 3,
            Letter::G => 4,
            Letter::A => 5,
            Letter::B => 6,
        }
    }

    /// Semitone offset of the natural tone within one octave.
    pub fn semitones(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_lowercase() {
            'c' => Some(Letter::C),
            'd' => Some(Letter::D),
            'e' => Some(Letter::E),
            'f' => Some(Letter::F),
            'g' => Some(Letter::G),
            'a' => Some(Letter::A),
            'b' => Some(Letter::B),
            _ => None,
        }
    }
}

/// A concrete pitch: root letter, octave, semitone alteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pitch {
    pub letter: Letter,
    pub octave: i32,
    /// Semitone offset from the natural tone (-2 .. 2).
    pub alteration: i32,
}

impl Pitch {
    pub fn new(letter: Letter, octave: i32, alteration: i32) -> Self {
        Self { letter, octave, alteration }
    }

    /// Absolute semitone index, used for interval quality computation.
    pub fn semitone_index(&self) -> i32 {
        self.octave * 12 + self.letter.semitones() + self.alteration
    }

    /// Absolute diatonic step index.
    pub fn step_index(&self) -> i32 {
        self.octave * 7 + self.letter.index()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Pitch name languages
// ═══════════════════════════════════════════════════════════════════════

/// Pitch-name language for textual input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Language {
    /// Lilypond-style Dutch names: `cis`, `des`, `as`, `eses`, ...
    #[default]
    Nederlands,
    /// English names: `cs`/`csharp`, `df`/`dflat`, `cx`, ...
    English,
}

impl Language {
    pub fn name(self) -> &'static str {
        match self {
            Language::Nederlands => "nederlands",
            Language::English => "english",
        }
    }
}

/// Resolve a pitch name to (letter, alteration) in the given language.
///
/// Unknown combinations are a fatal input error.
pub fn lookup_pitch_name(name: &str, language: Language) -> Result<(Letter, i32), Error> {
    let lower = name.trim().to_ascii_lowercase();
    let mut chars = lower.chars();
    let letter = chars
        .next()
        .and_then(Letter::from_char)
        .ok_or_else(|| unknown_name(name, language))?;
    let suffix: String = chars.collect();

    let alteration = match language {
        Language::Nederlands => match suffix.as_str() {
            "" => Some(0),
            "is" => Some(1),
            "isis" => Some(2),
            "es" | "s" => Some(-1),
            "eses" | "ses" => Some(-2),
            _ => None,
        },
        Language::English => match suffix.as_str() {
            "" => Some(0),
            "s" | "sharp" | "-sharp" => Some(1),
            "ss" | "x" | "sharpsharp" => Some(2),
            "f" | "flat" | "-flat" => Some(-1),
            "ff" | "flatflat" => Some(-2),
            _ => None,
        },
    };

    // Dutch contracts "aes"->"as" and "ees"->"es"; the bare "s"/"ses"
    // suffixes above only exist for those two letters.
    if language == Language::Nederlands
        && matches!(suffix.as_str(), "s" | "ses")
        && !matches!(letter, Letter::A | Letter::E)
    {
        return Err(unknown_name(name, language));
    }

    alteration
        .map(|a| (letter, a))
        .ok_or_else(|| unknown_name(name, language))
}

fn unknown_name(name: &str, language: Language) -> Error {
    Error::UnknownPitchName { name: name.to_string(), language: language.name() }
}

// ═══════════════════════════════════════════════════════════════════════
// Distance and intervals
// ═══════════════════════════════════════════════════════════════════════

/// Zero-based diatonic step distance between two pitches.
///
/// Positive when `b` lies above `a`; antisymmetric:
/// `distance_between(a, b) == -distance_between(b, a)`.
pub fn distance_between(a: &Pitch, b: &Pitch) -> i32 {
    -((a.letter.index() - b.letter.index()) + 7 * (a.octave - b.octave))
}

/// Signed, 1-based interval number (prime = 1, octave = 8).
///
/// For a unison-class pair the more-raised pitch counts as the upper
/// note: `interval_between` is `1` when `b` is raised above `a`,
/// otherwise `-1`.
pub fn interval_between(a: &Pitch, b: &Pitch) -> i32 {
    let d = distance_between(a, b);
    if d > 0 {
        d + 1
    } else if d < 0 {
        d - 1
    } else if b.alteration > a.alteration {
        1
    } else {
        -1
    }
}

/// Interval quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IntervalQuality {
    DoublyDiminished,
    Diminished,
    Minor,
    Pure,
    Major,
    Augmented,
    DoublyAugmented,
}

/// Classify the quality of the interval between two pitches.
///
/// Direction does not affect the quality: a descending major second is
/// still MAJOR. The name-step span decides the scheme (0/3/4 name-steps
/// are the pure intervals, 1/2/5/6 the major/minor ones); the semitone
/// width of the span relative to its reference width gives the quality.
pub fn interval_type_between(a: &Pitch, b: &Pitch) -> IntervalQuality {
    let d = distance_between(a, b);
    let (low, high) = if d > 0 {
        (a, b)
    } else if d < 0 {
        (b, a)
    } else if b.alteration > a.alteration {
        (a, b)
    } else {
        (b, a)
    };

    let steps = high.step_index() - low.step_index();
    debug_assert!(steps >= 0);
    let span = steps % 7;
    let octaves = steps / 7;
    let width = high.semitone_index() - low.semitone_index() - 12 * octaves;

    // Reference width of the natural span: pure unison 0, second 2,
    // third 4, fourth 5, fifth 7, sixth 9, seventh 11.
    let reference = [0, 2, 4, 5, 7, 9, 11][span as usize];
    let diff = width - reference;

    let pure_span = matches!(span, 0 | 3 | 4);
    if pure_span {
        match diff {
            0 => IntervalQuality::Pure,
            1 => IntervalQuality::Augmented,
            -1 => IntervalQuality::Diminished,
            d if d > 1 => IntervalQuality::DoublyAugmented,
            _ => IntervalQuality::DoublyDiminished,
        }
    } else {
        match diff {
            0 => IntervalQuality::Major,
            -1 => IntervalQuality::Minor,
            1 => IntervalQuality::Augmented,
            -2 => IntervalQuality::Diminished,
            d if d > 1 => IntervalQuality::DoublyAugmented,
            _ => IntervalQuality::DoublyDiminished,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Key signatures
// ═══════════════════════════════════════════════════════════════════════

/// Key mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Major,
    Minor,
}

/// A key signature: root tone plus mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeySignature {
    pub root: Letter,
    pub root_alteration: i32,
    pub mode: Mode,
}

/// Order in which sharps appear in a signature.
const SHARP_ORDER: [Letter; 7] = [
    Letter::F,
    Letter::C,
    Letter::G,
    Letter::D,
    Letter::A,
    Letter::E,
    Letter::B,
];

/// Order in which flats appear in a signature.
const FLAT_ORDER: [Letter; 7] = [
    Letter::B,
    Letter::E,
    Letter::A,
    Letter::D,
    Letter::G,
    Letter::C,
    Letter::F,
];

impl KeySignature {
    pub fn c_major() -> Self {
        Self { root: Letter::C, root_alteration: 0, mode: Mode::Major }
    }

    /// Parse a `"<root> <mode>"` string, e.g. `"d major"` or `"fis minor"`.
    pub fn parse(text: &str, language: Language) -> Result<Self, Error> {
        let mut parts = text.split_whitespace();
        let root_name = parts.next().ok_or_else(|| Error::InvalidKey(text.to_string()))?;
        let mode = match parts.next() {
            None | Some("major") => Mode::Major,
            Some("minor") => Mode::Minor,
            Some(_) => return Err(Error::InvalidKey(text.to_string())),
        };
        if parts.next().is_some() {
            return Err(Error::InvalidKey(text.to_string()));
        }
        let (root, root_alteration) = lookup_pitch_name(root_name, language)?;
        Ok(Self { root, root_alteration, mode })
    }

    /// Position of the key on the circle of fifths: positive = sharps,
    /// negative = flats.
    pub fn fifths(&self) -> i32 {
        // Natural major roots sit at F=-1, C=0, G=1, D=2, A=3, E=4, B=5;
        // each semitone of root alteration moves seven steps.
        let natural = match self.root {
            Letter::F => -1,
            Letter::C => 0,
            Letter::G => 1,
            Letter::D => 2,
            Letter::A => 3,
            Letter::E => 4,
            Letter::B => 5,
        };
        let base = natural + 7 * self.root_alteration;
        match self.mode {
            Mode::Major => base,
            Mode::Minor => base - 3,
        }
    }

    /// Per-letter semitone alteration implied by the key, indexed by
    /// `Letter::index()`. This seeds the running alteration table that
    /// decides accidental display.
    pub fn alteration_table(&self) -> [i32; 7] {
        let fifths = self.fifths();
        let mut table = [0i32; 7];
        if fifths > 0 {
            for letter in SHARP_ORDER.iter().take(fifths.min(7) as usize) {
                table[letter.index() as usize] = 1;
            }
        } else if fifths < 0 {
            for letter in FLAT_ORDER.iter().take((-fifths).min(7) as usize) {
                table[letter.index() as usize] = -1;
            }
        }
        table
    }

    /// Letters carrying a signature accidental, in drawing order.
    pub fn signature_letters(&self) -> Vec<(Letter, i32)> {
        let fifths = self.fifths();
        if fifths > 0 {
            SHARP_ORDER.iter().take(fifths.min(7) as usize).map(|&l| (l, 1)).collect()
        } else if fifths < 0 {
            FLAT_ORDER.iter().take((-fifths).min(7) as usize).map(|&l| (l, -1)).collect()
        } else {
            Vec::new()
        }
    }
}
