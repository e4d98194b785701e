use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::models::{PDF_EXTENSION, PDF_MEDIA_TYPE};

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid file name pattern"));

/// Longest sanitized name kept in a storage name. Leaves room for the token
/// within the usual 255 byte file name limit.
const MAX_SANITIZED_LEN: usize = 200;

/// Strip MIME parameters, e.g. "application/pdf; name=x" -> "application/pdf".
fn normalize_media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

/// A part counts as PDF if either its declared media type or its name says so.
/// Browsers do not report media types reliably, so the extension is a fallback.
pub fn is_pdf(content_type: Option<&str>, file_name: &str) -> bool {
    let typed_pdf = content_type
        .map(|ct| normalize_media_type(ct) == PDF_MEDIA_TYPE)
        .unwrap_or(false);

    typed_pdf || file_name.to_lowercase().ends_with(PDF_EXTENSION)
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// The result never contains a path separator, so it is always a single path
/// component. Overlong names are cut down while keeping their extension.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized = UNSAFE_CHARS.replace_all(name, "_").into_owned();
    if sanitized.is_empty() {
        return "file".to_string();
    }
    if sanitized.len() <= MAX_SANITIZED_LEN {
        return sanitized;
    }

    // ASCII only at this point, so byte slicing is safe
    match sanitized.rfind('.') {
        Some(dot) if sanitized.len() - dot < MAX_SANITIZED_LEN / 2 => {
            let ext = &sanitized[dot..];
            format!("{}{}", &sanitized[..MAX_SANITIZED_LEN - ext.len()], ext)
        }
        _ => sanitized[..MAX_SANITIZED_LEN].to_string(),
    }
}

/// Fresh `<millis>-<random hex>` prefix for a storage name.
pub fn unique_token() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &random[..12])
}

/// Storage name for a declared file name: `<token>-<sanitized name>`.
pub fn storage_name(declared_name: &str) -> String {
    format!("{}-{}", unique_token(), sanitize_file_name(declared_name))
}
