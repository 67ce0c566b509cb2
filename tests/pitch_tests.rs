//! Pitch geometry tests — distance, intervals, key signatures, and the
//! staff-position offset formula.

use pretty_assertions::assert_eq;

use engraver::layout::vertical_offset;
use engraver::pitch::{
    distance_between, interval_between, interval_type_between, lookup_pitch_name, IntervalQuality,
    KeySignature, Language, Letter, Pitch,
};
use engraver::EngraveConfig;

fn p(letter: Letter, octave: i32) -> Pitch {
    Pitch::new(letter, octave, 0)
}

// ─── Distance ────────────────────────────────────────────────────────

#[test]
fn distance_is_antisymmetric() {
    let mut pitches = Vec::new();
    for &letter in &Letter::ALL {
        for octave in -1..=2 {
            for alteration in -1..=1 {
                pitches.push(Pitch::new(letter, octave, alteration));
            }
        }
    }
    for a in &pitches {
        for b in &pitches {
            assert_eq!(distance_between(a, b), -distance_between(b, a), "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn distance_counts_diatonic_steps_upward() {
    assert_eq!(distance_between(&p(Letter::C, 1), &p(Letter::D, 1)), 1);
    assert_eq!(distance_between(&p(Letter::C, 1), &p(Letter::E, 1)), 2);
    assert_eq!(distance_between(&p(Letter::C, 1), &p(Letter::C, 2)), 7);
    assert_eq!(distance_between(&p(Letter::B, 0), &p(Letter::F, 1)), 4);
    assert_eq!(distance_between(&p(Letter::E, 1), &p(Letter::C, 1)), -2);
}

// ─── Interval numbers ────────────────────────────────────────────────

#[test]
fn interval_numbers_are_one_based_and_signed() {
    assert_eq!(interval_between(&p(Letter::C, 1), &p(Letter::D, 1)), 2);
    assert_eq!(interval_between(&p(Letter::D, 1), &p(Letter::C, 1)), -2);
    assert_eq!(interval_between(&p(Letter::C, 1), &p(Letter::C, 2)), 8);
    assert_eq!(interval_between(&p(Letter::C, 2), &p(Letter::C, 1)), -8);
    assert_eq!(interval_between(&p(Letter::B, 0), &p(Letter::F, 1)), 5);
}

#[test]
fn unison_tie_breaks_on_alteration() {
    let c = p(Letter::C, 1);
    let cis = Pitch::new(Letter::C, 1, 1);
    // The more-raised pitch counts as the upper note.
    assert_eq!(interval_between(&c, &cis), 1);
    assert_eq!(interval_between(&cis, &c), -1);
    assert_eq!(interval_between(&c, &c), -1);
}

// ─── Interval qualities ──────────────────────────────────────────────

#[test]
fn canonical_interval_qualities() {
    use IntervalQuality::*;
    let cases = [
        (p(Letter::C, 1), p(Letter::C, 1), Pure),
        (p(Letter::C, 1), p(Letter::D, 1), Major),
        (p(Letter::E, 1), p(Letter::F, 1), Minor),
        (p(Letter::C, 1), p(Letter::E, 1), Major),
        (p(Letter::D, 1), p(Letter::F, 1), Minor),
        (p(Letter::F, 1), p(Letter::B, 1), Augmented),
        (p(Letter::B, 0), p(Letter::F, 1), Diminished),
        (p(Letter::C, 1), p(Letter::G, 1), Pure),
        (p(Letter::C, 1), p(Letter::F, 1), Pure),
    ];
    for (a, b, expected) in cases {
        assert_eq!(interval_type_between(&a, &b), expected, "{a:?} -> {b:?}");
    }
}

#[test]
fn quality_is_direction_independent() {
    let cases = [
        (p(Letter::C, 1), p(Letter::D, 1)),
        (p(Letter::E, 1), p(Letter::F, 1)),
        (p(Letter::C, 1), p(Letter::E, 1)),
        (p(Letter::F, 1), p(Letter::B, 1)),
        (p(Letter::B, 0), p(Letter::F, 1)),
    ];
    for (a, b) in cases {
        assert_eq!(
            interval_type_between(&a, &b),
            interval_type_between(&b, &a),
            "{a:?} vs {b:?}"
        );
        // Mirror image flips the interval number's sign only.
        assert_eq!(interval_between(&a, &b), -interval_between(&b, &a));
    }
}

#[test]
fn altered_interval_qualities() {
    let c = p(Letter::C, 1);
    let cis = Pitch::new(Letter::C, 1, 1);
    let es = Pitch::new(Letter::E, 1, -1);
    let fis = Pitch::new(Letter::F, 1, 1);

    assert_eq!(interval_type_between(&c, &cis), IntervalQuality::Augmented);
    assert_eq!(interval_type_between(&c, &es), IntervalQuality::Minor);
    assert_eq!(interval_type_between(&c, &fis), IntervalQuality::Augmented);
    assert_eq!(interval_type_between(&cis, &es), IntervalQuality::Diminished);
}

// ─── Pitch name lookup ───────────────────────────────────────────────

#[test]
fn dutch_pitch_names() {
    assert_eq!(lookup_pitch_name("c", Language::Nederlands).unwrap(), (Letter::C, 0));
    assert_eq!(lookup_pitch_name("cis", Language::Nederlands).unwrap(), (Letter::C, 1));
    assert_eq!(lookup_pitch_name("des", Language::Nederlands).unwrap(), (Letter::D, -1));
    assert_eq!(lookup_pitch_name("bes", Language::Nederlands).unwrap(), (Letter::B, -1));
    assert_eq!(lookup_pitch_name("as", Language::Nederlands).unwrap(), (Letter::A, -1));
    assert_eq!(lookup_pitch_name("es", Language::Nederlands).unwrap(), (Letter::E, -1));
    assert_eq!(lookup_pitch_name("fisis", Language::Nederlands).unwrap(), (Letter::F, 2));
    assert_eq!(lookup_pitch_name("eses", Language::Nederlands).unwrap(), (Letter::E, -2));
}

#[test]
fn english_pitch_names() {
    assert_eq!(lookup_pitch_name("cs", Language::English).unwrap(), (Letter::C, 1));
    assert_eq!(lookup_pitch_name("csharp", Language::English).unwrap(), (Letter::C, 1));
    assert_eq!(lookup_pitch_name("bflat", Language::English).unwrap(), (Letter::B, -1));
    assert_eq!(lookup_pitch_name("gx", Language::English).unwrap(), (Letter::G, 2));
}

#[test]
fn unknown_pitch_names_are_fatal() {
    assert!(lookup_pitch_name("h", Language::Nederlands).is_err());
    assert!(lookup_pitch_name("cs", Language::Nederlands).is_err());
    assert!(lookup_pitch_name("cis", Language::English).is_err());
    assert!(lookup_pitch_name("", Language::English).is_err());
}

// ─── Key signatures ──────────────────────────────────────────────────

#[test]
fn key_signature_fifths() {
    let cases = [
        ("c major", 0),
        ("g major", 1),
        ("d major", 2),
        ("f major", -1),
        ("es major", -3),
        ("a minor", 0),
        ("e minor", 1),
        ("fis minor", 3),
    ];
    for (text, fifths) in cases {
        let key = KeySignature::parse(text, Language::Nederlands).unwrap();
        assert_eq!(key.fifths(), fifths, "{text}");
    }
}

#[test]
fn alteration_table_for_d_major() {
    let key = KeySignature::parse("d major", Language::Nederlands).unwrap();
    let table = key.alteration_table();
    assert_eq!(table[Letter::F.index() as usize], 1);
    assert_eq!(table[Letter::C.index() as usize], 1);
    assert_eq!(table[Letter::G.index() as usize], 0);
    assert_eq!(table[Letter::B.index() as usize], 0);
}

#[test]
fn alteration_table_for_f_major() {
    let key = KeySignature::parse("f major", Language::Nederlands).unwrap();
    let table = key.alteration_table();
    assert_eq!(table[Letter::B.index() as usize], -1);
    assert_eq!(table[Letter::E.index() as usize], 0);
}

#[test]
fn signature_letters_follow_circle_order() {
    let key = KeySignature::parse("a major", Language::Nederlands).unwrap();
    let letters: Vec<Letter> = key.signature_letters().iter().map(|&(l, _)| l).collect();
    assert_eq!(letters, vec![Letter::F, Letter::C, Letter::G]);
}

// ─── Vertical offset formula ─────────────────────────────────────────

#[test]
fn line_gap_alternation_correction() {
    let config = EngraveConfig::default();
    let expected = 2.0 * config.staff_space - config.staff_line_thickness;
    for position in (-8..=8).step_by(2) {
        let delta = vertical_offset(position + 2, &config) - vertical_offset(position, &config);
        assert!((delta - expected).abs() < 1e-9, "position {position}: {delta}");
    }
}

#[test]
fn middle_line_is_origin() {
    let config = EngraveConfig::default();
    assert_eq!(vertical_offset(0, &config), 0.0);
    assert!(vertical_offset(-2, &config) < 0.0);
    assert!(vertical_offset(2, &config) > 0.0);
}
