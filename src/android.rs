//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge.

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

use crate::{layout_notation_to_json, render_notation_to_svg, EngraveConfig, GlyphMetrics};

/// Lay out JSON notation and return the draw commands as JSON.
///
/// Called from Kotlin as:
///   external fun layoutJson(source: String): String?
#[no_mangle]
pub extern "system" fn Java_com_engraver_app_EngraverLib_layoutJson(
    mut env: JNIEnv,
    _class: JClass,
    source: JString,
) -> jstring {
    let source_str: String = match env.get_string(&source) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    match layout_notation_to_json(&source_str) {
        Ok(json) => match env.new_string(&json) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(_) => std::ptr::null_mut(),
    }
}

/// Lay out JSON notation and return a rendered SVG document.
///
/// Called from Kotlin as:
///   external fun renderSvg(source: String): String?
#[no_mangle]
pub extern "system" fn Java_com_engraver_app_EngraverLib_renderSvg(
    mut env: JNIEnv,
    _class: JClass,
    source: JString,
) -> jstring {
    let source_str: String = match env.get_string(&source) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    let config = EngraveConfig::default();
    let metrics = GlyphMetrics::with_defaults(config.font_size);
    match render_notation_to_svg(&source_str, &metrics, &config) {
        Ok(svg) => match env.new_string(&svg) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(_) => std::ptr::null_mut(),
    }
}
