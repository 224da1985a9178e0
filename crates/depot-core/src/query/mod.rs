//! # Depot Core - Query Module
//!
//! Listing queries for products and users. Caller input is parsed into typed
//! filters and allow-listed sort fields here; adapters only translate the
//! resulting values into SQL or in-memory predicates.

pub mod fold;
pub mod product;
pub mod user;

pub use fold::{fold_diacritics, COMBINING_DOT_ABOVE, FOLD_FROM, FOLD_TO};
pub use product::{ProductFilter, ProductQuery, ProductSortField, SearchPredicate, TextField, TextMatch};
pub use user::{UserFilter, UserQuery, UserSortField};

/// Escapes `%`, `_` and `\` so user text is matched literally by `LIKE`.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `%needle%` pattern for a substring match.
pub fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}
