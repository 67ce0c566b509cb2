//! engraver — music notation layout engine.
//!
//! Converts a plain-data musical description (staves with clef, key and
//! time configuration; notes, rests, chords, and voices) into an
//! ordered list of positioned draw commands. The engine owns the hard
//! part of notation typesetting: horizontal position driven by rhythm,
//! vertical position driven by pitch and clef, reconciled across an
//! arbitrary number of simultaneous staves without collisions.
//!
//! Rasterization stays outside: callers replay the emitted
//! [`RenderOp`] list onto any [`Surface`] (an SVG surface is included).
//!
//! # Example
//! ```no_run
//! use engraver::{layout_notation, EngraveConfig, GlyphMetrics};
//!
//! let source = r#"{"staffs":[{"clef":"treble","time":"4/4","key":"c major",
//!     "notes":[{"name":"c","octave":1,"length":4}]}]}"#;
//! let config = EngraveConfig::default();
//! let metrics = GlyphMetrics::with_defaults(config.font_size);
//! let result = layout_notation(source, &metrics, &config).unwrap();
//! println!("{} draw ops on a {}x{} surface", result.ops.len(), result.width, result.height);
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod parser;
pub mod pitch;
pub mod session;

#[cfg(target_os = "android")]
pub mod android;

pub use config::EngraveConfig;
pub use error::Error;
pub use layout::backend::{replay, Surface, SvgSurface};
pub use layout::grob::RenderOp;
pub use layout::{layout_score, LayoutResult};
pub use metrics::{Glyph, GlyphMetrics};
pub use model::{Score, ScoreInput};
pub use parser::parse_notation;
pub use session::Session;

/// Parse JSON notation and lay it out in one call.
pub fn layout_notation(
    source: &str,
    metrics: &GlyphMetrics,
    config: &EngraveConfig,
) -> Result<LayoutResult, Error> {
    let score = parse_notation(source, config.language)?;
    layout_score(&score, metrics, config)
}

/// Parse, lay out, and serialize the draw commands as JSON.
/// Uses the default configuration and built-in metrics; useful for
/// passing data across FFI boundaries.
pub fn layout_notation_to_json(source: &str) -> Result<String, Error> {
    let config = EngraveConfig::default();
    let metrics = GlyphMetrics::with_defaults(config.font_size);
    let result = layout_notation(source, &metrics, &config)?;
    serde_json::to_string(&result).map_err(|e| Error::BadInput(e.to_string()))
}

/// Parse, lay out, and replay onto an SVG surface.
pub fn render_notation_to_svg(
    source: &str,
    metrics: &GlyphMetrics,
    config: &EngraveConfig,
) -> Result<String, Error> {
    let result = layout_notation(source, metrics, config)?;
    let mut surface = SvgSurface::new();
    replay(&result, &mut surface);
    Ok(surface.build())
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Lay out JSON notation and return the draw commands as a JSON C
/// string. The caller must free the returned string with
/// `engraver_free_string`.
///
/// # Safety
/// `source` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn engraver_layout_json(source: *const c_char) -> *mut c_char {
    if source.is_null() {
        return std::ptr::null_mut();
    }
    let c_str = unsafe { CStr::from_ptr(source) };
    let json = match c_str.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };

    match layout_notation_to_json(json) {
        Ok(out) => CString::new(out).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Lay out JSON notation and return an SVG document as a C string.
/// The caller must free the returned string with `engraver_free_string`.
///
/// # Safety
/// `source` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn engraver_render_svg(source: *const c_char) -> *mut c_char {
    if source.is_null() {
        return std::ptr::null_mut();
    }
    let c_str = unsafe { CStr::from_ptr(source) };
    let json = match c_str.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };

    let config = EngraveConfig::default();
    let metrics = GlyphMetrics::with_defaults(config.font_size);
    match render_notation_to_svg(json, &metrics, &config) {
        Ok(svg) => CString::new(svg).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Free a string previously returned by engraver functions.
///
/// # Safety
/// `ptr` must be a string previously returned by an engraver function,
/// or null.
#[no_mangle]
pub unsafe extern "C" fn engraver_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
