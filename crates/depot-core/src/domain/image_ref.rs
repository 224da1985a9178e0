//! Image reference validation
//!
//! Product and location images are stored as plain strings. Only three
//! shapes are accepted: absolute `http(s)://` URLs, base64 `data:image/...`
//! URIs, and paths under the uploads directory.

use depot_shared::constants::UPLOADS_PREFIX;

/// Returns the trimmed reference when it has an accepted shape.
pub fn sanitize_image_ref(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let accepted = is_data_uri(trimmed)
        || has_content_after(trimmed, "https://")
        || has_content_after(trimmed, "http://")
        || has_content_after(trimmed, UPLOADS_PREFIX);
    accepted.then(|| trimmed.to_string())
}

/// Missing, blank or rejected input falls back to the current value.
pub fn sanitize_or_keep(incoming: Option<&str>, current: Option<&str>) -> Option<String> {
    incoming
        .and_then(sanitize_image_ref)
        .or_else(|| current.map(str::to_string))
}

fn has_content_after(value: &str, prefix: &str) -> bool {
    value.len() > prefix.len()
        && value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn is_data_uri(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("data:image/") else {
        return false;
    };
    match rest.split_once(";base64,") {
        Some((subtype, payload)) => {
            !subtype.is_empty()
                && subtype.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
                && !payload.is_empty()
        }
        None => false,
    }
}
