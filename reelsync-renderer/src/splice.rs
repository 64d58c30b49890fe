//! Replace the generated section of a host document between two markers.
//!
//! ```text
//! # My project
//! <!-- reelsync:start -->
//! ...generated...
//! <!-- reelsync:end -->
//! ```
//!
//! Text outside the markers is never touched.

use reelsync_core::DocsConfig;

use crate::error::RenderError;

/// Start/end markers delimiting the generated section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub start: String,
    pub end: String,
}

impl From<&DocsConfig> for Markers {
    fn from(docs: &DocsConfig) -> Self {
        Markers {
            start: docs.start_marker.clone(),
            end: docs.end_marker.clone(),
        }
    }
}

/// Return `document` with the marked section replaced by `section`.
///
/// - Both markers present: everything between them is replaced.
/// - Neither present: the marked section is appended (an empty document
///   becomes just the section).
/// - Only one present, or the end marker before the start: error.
pub fn splice_section(
    document: &str,
    section: &str,
    markers: &Markers,
) -> Result<String, RenderError> {
    let body = if section.is_empty() || section.ends_with('\n') {
        section.to_string()
    } else {
        format!("{section}\n")
    };

    let Some(start_at) = document.find(&markers.start) else {
        if document.contains(&markers.end) {
            return Err(RenderError::UnmatchedEndMarker {
                end: markers.end.clone(),
            });
        }
        return Ok(append_section(document, &body, markers));
    };

    let after_start = start_at + markers.start.len();
    let Some(end_rel) = document[after_start..].find(&markers.end) else {
        return Err(RenderError::UnterminatedSection {
            start: markers.start.clone(),
            end: markers.end.clone(),
        });
    };
    let end_at = after_start + end_rel;

    let mut out = String::with_capacity(document.len() + body.len());
    out.push_str(&document[..after_start]);
    out.push('\n');
    out.push_str(&body);
    out.push_str(&document[end_at..]);
    Ok(out)
}

fn append_section(document: &str, body: &str, markers: &Markers) -> String {
    let mut out = document.to_string();
    if !out.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(&markers.start);
    out.push('\n');
    out.push_str(body);
    out.push_str(&markers.end);
    out.push('\n');
    out
}
