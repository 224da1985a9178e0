//! Utility functions

/// Masks the local part of an email for log output.
pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let keep = if local.chars().count() <= 2 { 1 } else { 2 };
        let visible: String = local.chars().take(keep).collect();
        format!("{}***{}", visible, domain)
    } else {
        "***".to_string()
    }
}

/// Trims the value and turns blank input into `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Keep-previous merge: a missing or blank incoming value falls back to the
/// current one, so an empty string never erases a stored field.
pub fn merge_text(incoming: Option<&str>, current: Option<&str>) -> Option<String> {
    non_blank(incoming).or_else(|| current.map(str::to_string))
}
