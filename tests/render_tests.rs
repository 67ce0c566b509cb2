//! End-to-end tests — input validation, the readiness gate, and the
//! serialized/SVG output forms.

use pretty_assertions::assert_eq;

use engraver::layout::grob::{GrobKind, GrobTree};
use engraver::{
    layout_notation, layout_notation_to_json, parse_notation, render_notation_to_svg,
    EngraveConfig, Error, GlyphMetrics, RenderOp, Session,
};

const SINGLE_NOTE: &str = r#"{"staffs":[{"clef":"treble","time":"4/4","key":"c major",
    "notes":[{"name":"c","octave":1,"length":4}]}]}"#;

const TWO_NOTES: &str = r#"{"staffs":[{"clef":"treble","time":"4/4","key":"c major",
    "notes":[{"name":"c","octave":1,"length":4},{"name":"d","octave":1,"length":4}]}]}"#;

fn glyph_count(ops: &[RenderOp]) -> usize {
    ops.iter().filter(|op| matches!(op, RenderOp::Glyph { .. })).count()
}

// ─── Input validation ────────────────────────────────────────────────

#[test]
fn malformed_time_signature_is_fatal() {
    let source = r#"{"staffs":[{"clef":"treble","time":"waltz","key":"c major","notes":[]}]}"#;
    let err = parse_notation(source, Default::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidTimeSignature(_)), "{err}");
}

#[test]
fn unsupported_beat_type_is_fatal() {
    let source = r#"{"staffs":[{"clef":"treble","time":"4/3","key":"c major","notes":[]}]}"#;
    let err = parse_notation(source, Default::default()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedBeatType(3)), "{err}");
}

#[test]
fn unknown_pitch_name_is_fatal() {
    let source = r#"{"staffs":[{"clef":"treble","time":"4/4","key":"c major",
        "notes":[{"name":"csharp","octave":1,"length":4}]}]}"#;
    let err = parse_notation(source, Default::default()).unwrap_err();
    assert!(matches!(err, Error::UnknownPitchName { .. }), "{err}");
}

#[test]
fn unknown_clef_and_bad_length_are_fatal() {
    let source = r#"{"staffs":[{"clef":"tenor","time":"4/4","key":"c major","notes":[]}]}"#;
    assert!(matches!(
        parse_notation(source, Default::default()).unwrap_err(),
        Error::UnknownClef(_)
    ));

    let source = r#"{"staffs":[{"clef":"treble","time":"4/4","key":"c major",
        "notes":[{"name":"c","octave":1,"length":3}]}]}"#;
    assert!(matches!(
        parse_notation(source, Default::default()).unwrap_err(),
        Error::UnsupportedLength(3)
    ));
}

#[test]
fn rest_inside_a_chord_is_rejected() {
    let source = r#"{"staffs":[{"clef":"treble","time":"4/4","key":"c major",
        "notes":[[{"name":"c","octave":1,"length":4},{"name":"rest","length":4}]]}]}"#;
    assert!(matches!(parse_notation(source, Default::default()).unwrap_err(), Error::BadInput(_)));
}

#[test]
fn defaults_fill_in_missing_staff_configuration() {
    let source = r#"{"staffs":[{"notes":[{"name":"c","octave":1,"length":4}]}]}"#;
    let score = parse_notation(source, Default::default()).unwrap();
    assert_eq!(score.staves.len(), 1);
    assert_eq!(score.staves[0].time.beats, 4);
}

// ─── Render origin ───────────────────────────────────────────────────

#[test]
fn non_finite_render_origin_fails_fast() {
    let mut tree = GrobTree::new();
    let root = tree.new_node(GrobKind::Container);
    assert!(matches!(tree.render(root, f64::NAN, 0.0), Err(Error::MissingRenderOrigin)));
    assert!(matches!(tree.render(root, 0.0, f64::INFINITY), Err(Error::MissingRenderOrigin)));
    assert!(tree.render(root, 0.0, 0.0).is_ok());
}

// ─── Grob width contract ─────────────────────────────────────────────

#[test]
fn container_width_sums_non_ignored_children() {
    let mut tree = GrobTree::new();
    let root = tree.new_node(GrobKind::Container);
    assert!(tree.get(root).is_container());

    for (width, ignored) in [(5.0, false), (7.0, false), (100.0, true)] {
        let child = tree.new_node(GrobKind::Container);
        tree.get_mut(child).width = width;
        tree.get_mut(child).ignore_width = ignored;
        tree.add_child(root, child);
    }

    assert_eq!(tree.summed_child_width(root), 12.0);
}

// ─── Readiness gate ──────────────────────────────────────────────────

#[test]
fn requests_queue_until_metrics_arrive() {
    let config = EngraveConfig::default();
    let metrics = GlyphMetrics::with_defaults(config.font_size);
    let mut session = Session::new(config);

    assert!(!session.is_ready());
    assert_eq!(session.load(SINGLE_NOTE).unwrap(), false);
    assert!(session.render().unwrap().is_none());

    let replayed = session.metrics_ready(metrics).unwrap();
    let result = replayed.expect("queued render must replay");
    assert!(!result.ops.is_empty());
}

#[test]
fn a_second_pending_parse_overwrites_the_first() {
    let config = EngraveConfig::default();
    let metrics = GlyphMetrics::with_defaults(config.font_size);
    let mut session = Session::new(config);

    session.load(SINGLE_NOTE).unwrap();
    session.load(TWO_NOTES).unwrap();
    session.render().unwrap();

    let result = session.metrics_ready(metrics).unwrap().expect("queued render must replay");

    let reference = {
        let config = EngraveConfig::default();
        let metrics = GlyphMetrics::with_defaults(config.font_size);
        layout_notation(TWO_NOTES, &metrics, &config).unwrap()
    };
    assert_eq!(glyph_count(&result.ops), glyph_count(&reference.ops));
}

#[test]
fn ready_sessions_run_synchronously() {
    let config = EngraveConfig::default();
    let metrics = GlyphMetrics::with_defaults(config.font_size);
    let mut session = Session::with_metrics(config, metrics);

    assert!(session.is_ready());
    assert_eq!(session.load(SINGLE_NOTE).unwrap(), true);
    let result = session.render().unwrap().expect("ready session renders immediately");
    assert!(!result.ops.is_empty());
}

#[test]
fn rendering_without_notation_is_an_error() {
    let config = EngraveConfig::default();
    let metrics = GlyphMetrics::with_defaults(config.font_size);
    let mut session = Session::with_metrics(config, metrics);
    assert!(matches!(session.render().unwrap_err(), Error::BadInput(_)));
}

// ─── Serialized output ───────────────────────────────────────────────

#[test]
fn ops_serialize_with_camel_case_descriptors() {
    let json = layout_notation_to_json(SINGLE_NOTE).unwrap();
    assert!(json.contains(r#""kind":"line""#), "line descriptors present");
    assert!(json.contains(r#""kind":"glyph""#), "glyph descriptors present");
    assert!(json.contains(r#""relX""#));
    assert!(json.contains(r#""lineWidth""#));
    assert!(json.contains(r#""fontSize""#));
    assert!(json.contains(r#""name":"noteheadBlack""#));
}

#[test]
fn svg_surface_replays_the_full_op_list() {
    let config = EngraveConfig::default();
    let metrics = GlyphMetrics::with_defaults(config.font_size);
    let svg = render_notation_to_svg(SINGLE_NOTE, &metrics, &config).unwrap();

    assert!(svg.starts_with("<svg"), "output should be SVG");
    assert!(svg.contains("</svg>"), "SVG should be closed");
    assert!(svg.contains("<line"), "staff lines present");
    assert!(svg.contains("<text"), "glyphs present");
    assert!(svg.contains("gClef"), "clef glyph present");
}

#[test]
fn layout_reports_surface_extents() {
    let config = EngraveConfig::default();
    let metrics = GlyphMetrics::with_defaults(config.font_size);
    let result = layout_notation(SINGLE_NOTE, &metrics, &config).unwrap();

    assert!(result.width > 100.0);
    assert!(result.height > 50.0);
    for op in &result.ops {
        let (x, y) = match op {
            RenderOp::Line { x, y, .. } => (*x, *y),
            RenderOp::Glyph { x, y, .. } => (*x, *y),
        };
        assert!(x >= 0.0 && x <= result.width, "op inside surface: {x}");
        assert!(y >= 0.0 && y <= result.height, "op inside surface: {y}");
    }
}
