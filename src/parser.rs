//! Input parser — converts the plain-data notation input into the typed
//! Score model.
//!
//! The input is a tree of hashes (usually JSON): staffs, each with a
//! clef/time/key configuration and a note list whose entries are single
//! notes, rests, chords (arrays), or voice wrappers.

use crate::error::Error;
use crate::model::*;
use crate::pitch::{lookup_pitch_name, KeySignature, Language, Pitch};

/// Parse a JSON notation string into a validated [`Score`].
pub fn parse_notation(json: &str, language: Language) -> Result<Score, Error> {
    let input: ScoreInput =
        serde_json::from_str(json).map_err(|e| Error::BadInput(e.to_string()))?;
    convert_input(&input, language)
}

/// Validate an already-deserialized [`ScoreInput`].
pub fn convert_input(input: &ScoreInput, language: Language) -> Result<Score, Error> {
    let mut staves = Vec::with_capacity(input.staffs.len());
    for staff in &input.staffs {
        staves.push(convert_staff(staff, language)?);
    }
    Ok(Score { staves })
}

fn convert_staff(staff: &StaffInput, language: Language) -> Result<StaffSpec, Error> {
    let clef = match &staff.clef {
        Some(name) => Clef::parse(name)?,
        None => Clef::Treble,
    };
    let time = match &staff.time {
        Some(text) => TimeSignature::parse(text)?,
        None => TimeSignature { beats: 4, beat_type: 4 },
    };
    let key = match &staff.key {
        Some(text) => KeySignature::parse(text, language)?,
        None => KeySignature::c_major(),
    };

    // Partition entries into voices. Entries outside a voice wrapper
    // collect under voice 0, preserving order.
    let mut voices: Vec<(u32, Vec<Event>)> = Vec::new();
    for entry in &staff.notes {
        match entry {
            NoteEntry::Event(spec) if spec.name.eq_ignore_ascii_case("voice") => {
                let number = spec.voice_number.unwrap_or(voices.len() as u32 + 1);
                let inner = spec.notes.as_deref().unwrap_or(&[]);
                let mut events = Vec::with_capacity(inner.len());
                for inner_entry in inner {
                    events.push(convert_entry(inner_entry, number, language)?);
                }
                voice_list(&mut voices, number).extend(events);
            }
            other => {
                let event = convert_entry(other, 0, language)?;
                voice_list(&mut voices, 0).push(event);
            }
        }
    }

    Ok(StaffSpec { clef, time, key, voices })
}

fn voice_list(voices: &mut Vec<(u32, Vec<Event>)>, number: u32) -> &mut Vec<Event> {
    if let Some(idx) = voices.iter().position(|(n, _)| *n == number) {
        &mut voices[idx].1
    } else {
        voices.push((number, Vec::new()));
        &mut voices.last_mut().unwrap().1
    }
}

fn convert_entry(entry: &NoteEntry, voice: u32, language: Language) -> Result<Event, Error> {
    match entry {
        NoteEntry::Simultaneous(members) => {
            let mut notes = Vec::with_capacity(members.len());
            for member in members {
                match convert_entry(member, voice, language)? {
                    Event::Note(spec) => notes.push(spec),
                    Event::Chord(inner) => notes.extend(inner),
                    Event::Rest(_) => {
                        return Err(Error::BadInput("rest inside a chord".to_string()));
                    }
                }
            }
            Ok(Event::Chord(notes))
        }
        NoteEntry::Event(spec) => convert_event(spec, voice, language),
    }
}

fn convert_event(spec: &EventSpec, voice: u32, language: Language) -> Result<Event, Error> {
    let duration = Duration::new(spec.length.unwrap_or(4), spec.dots.unwrap_or(0))?;

    if spec.name.eq_ignore_ascii_case("rest") {
        return Ok(Event::Rest(RestSpec { duration, voice }));
    }
    if spec.name.eq_ignore_ascii_case("voice") {
        return Err(Error::BadInput("nested voice wrapper".to_string()));
    }

    let (letter, alteration) = lookup_pitch_name(&spec.name, language)?;
    let pitch = Pitch::new(letter, spec.octave.unwrap_or(1), alteration);
    Ok(Event::Note(NoteSpec { pitch, duration, voice }))
}
