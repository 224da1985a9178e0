//! Product listing query
//!
//! A search term expands into a broad OR of substring matches. Each match is
//! a [`TextMatch`]: one field, one lower-cased needle, and whether the needle
//! is compared against the diacritic-folded field value. The Postgres adapter
//! renders every match as one `LIKE` clause; the in-memory adapter evaluates
//! [`ProductFilter::matches`] directly, so both agree on what matches.

use std::cmp::Ordering;

use depot_shared::types::{PageRequest, Sort, SortOrder};
use depot_shared::utils::non_blank;

use crate::domain::{Product, ProductStatus};
use crate::error::DomainError;
use crate::query::fold::fold_diacritics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Barcode,
    Description,
    Features,
    Location,
    BorrowedBy,
}

impl TextField {
    /// Fields searched with the whole term.
    pub const TERM_FIELDS: [TextField; 6] = [
        TextField::Name,
        TextField::Barcode,
        TextField::Description,
        TextField::Features,
        TextField::Location,
        TextField::BorrowedBy,
    ];

    /// Fields searched with folded needles and individual words.
    pub const WORD_FIELDS: [TextField; 4] = [
        TextField::Name,
        TextField::Description,
        TextField::Features,
        TextField::Location,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            TextField::Name => "name",
            TextField::Barcode => "barcode",
            TextField::Description => "description",
            TextField::Features => "features",
            TextField::Location => "location",
            TextField::BorrowedBy => "borrowed_by",
        }
    }

    pub fn value<'a>(&self, product: &'a Product) -> Option<&'a str> {
        match self {
            TextField::Name => Some(product.name.as_str()),
            TextField::Barcode => product.barcode.as_deref(),
            TextField::Description => product.description.as_deref(),
            TextField::Features => product.features.as_deref(),
            TextField::Location => product.location.as_deref(),
            TextField::BorrowedBy => product.borrowed_by.as_deref(),
        }
    }
}

/// One `field contains needle` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub field: TextField,
    pub needle: String,
    pub folded: bool,
}

impl TextMatch {
    pub fn matches(&self, product: &Product) -> bool {
        let Some(value) = self.field.value(product) else {
            return false;
        };
        let haystack = value.to_lowercase();
        if self.folded {
            fold_diacritics(&haystack).contains(&self.needle)
        } else {
            haystack.contains(&self.needle)
        }
    }
}

/// Disjunction built from a free-text search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPredicate {
    pub term: String,
    pub matches: Vec<TextMatch>,
}

impl SearchPredicate {
    /// Returns `None` for a blank term.
    pub fn build(raw: &str) -> Option<Self> {
        let term = raw.trim().to_lowercase();
        if term.is_empty() {
            return None;
        }

        let mut predicate = Self {
            term: term.clone(),
            matches: Vec::new(),
        };

        for field in TextField::TERM_FIELDS {
            predicate.push(field, &term, false);
        }
        let folded_term = fold_diacritics(&term);
        for field in TextField::WORD_FIELDS {
            predicate.push(field, &folded_term, true);
        }

        for word in term.split_whitespace() {
            let folded_word = fold_diacritics(word);
            for field in TextField::WORD_FIELDS {
                predicate.push(field, word, false);
                predicate.push(field, &folded_word, true);
            }
        }

        Some(predicate)
    }

    fn push(&mut self, field: TextField, needle: &str, folded: bool) {
        let candidate = TextMatch {
            field,
            needle: needle.to_string(),
            folded,
        };
        if !self.matches.contains(&candidate) {
            self.matches.push(candidate);
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.matches.iter().any(|m| m.matches(product))
    }
}

/// Full product predicate. Inactive products never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub status: Option<ProductStatus>,
    pub location: Option<String>,
    pub search: Option<SearchPredicate>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if !product.is_active {
            return false;
        }
        if self.status.is_some_and(|status| status != product.status) {
            return false;
        }
        if let Some(location) = &self.location {
            if product.location.as_deref() != Some(location.as_str()) {
                return false;
            }
        }
        self.search.as_ref().is_none_or(|search| search.matches(product))
    }
}

/// Allow-listed product sort columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSortField {
    #[default]
    Name,
    Barcode,
    Status,
    Location,
    BorrowedBy,
    BorrowedDate,
    ReturnDate,
    CreatedAt,
    UpdatedAt,
}

impl ProductSortField {
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim() {
            "name" => Some(Self::Name),
            "barcode" => Some(Self::Barcode),
            "status" => Some(Self::Status),
            "location" => Some(Self::Location),
            "borrowedBy" => Some(Self::BorrowedBy),
            "borrowedDate" => Some(Self::BorrowedDate),
            "returnDate" => Some(Self::ReturnDate),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Barcode => "barcode",
            Self::Status => "status",
            Self::Location => "location",
            Self::BorrowedBy => "borrowed_by",
            Self::BorrowedDate => "borrowed_date",
            Self::ReturnDate => "return_date",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    /// Ascending comparison with missing values last, as Postgres orders NULLs.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::Barcode => nulls_last(&a.barcode, &b.barcode),
            Self::Status => a.status.as_str().cmp(b.status.as_str()),
            Self::Location => nulls_last(&a.location, &b.location),
            Self::BorrowedBy => nulls_last(&a.borrowed_by, &b.borrowed_by),
            Self::BorrowedDate => nulls_last(&a.borrowed_date, &b.borrowed_date),
            Self::ReturnDate => nulls_last(&a.return_date, &b.return_date),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

pub(crate) fn nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub(crate) fn parse_order(value: Option<&str>, default: SortOrder) -> Result<SortOrder, DomainError> {
    match non_blank(value) {
        None => Ok(default),
        Some(raw) => SortOrder::parse(&raw)
            .ok_or_else(|| DomainError::ValidationError(format!("Invalid sort order: {}", raw))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    pub sort: Sort<ProductSortField>,
    pub page: PageRequest,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            filter: ProductFilter::default(),
            sort: Sort {
                field: ProductSortField::Name,
                order: SortOrder::Asc,
            },
            page: PageRequest::default(),
        }
    }
}

impl ProductQuery {
    /// Parses raw listing parameters. Unknown status, sort field or order
    /// values are validation errors.
    #[allow(clippy::too_many_arguments)]
    pub fn from_params(
        search: Option<&str>,
        status: Option<&str>,
        location: Option<&str>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Self, DomainError> {
        let status = match non_blank(status) {
            None => None,
            Some(raw) => Some(ProductStatus::from_str(&raw).ok_or_else(|| {
                DomainError::ValidationError(format!("Invalid status: {}", raw))
            })?),
        };

        let field = match non_blank(sort_by) {
            None => ProductSortField::default(),
            Some(raw) => ProductSortField::from_param(&raw).ok_or_else(|| {
                DomainError::ValidationError(format!("Invalid sort field: {}", raw))
            })?,
        };

        Ok(Self {
            filter: ProductFilter {
                status,
                location: non_blank(location),
                search: search.and_then(SearchPredicate::build),
            },
            sort: Sort {
                field,
                order: parse_order(sort_order, SortOrder::Asc)?,
            },
            page: PageRequest::new(page, limit),
        })
    }

    /// Total order used by in-process listing: requested column, then id.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let primary = match self.sort.order {
            SortOrder::Asc => self.sort.field.compare(a, b),
            SortOrder::Desc => self.sort.field.compare(b, a),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BorrowEntry, NewProduct};
    use chrono::Utc;

    fn product(name: &str, description: Option<&str>, location: Option<&str>) -> Product {
        Product::new(&NewProduct {
            name: Some(name.into()),
            description: description.map(str::to_string),
            location: location.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_blank_search_builds_nothing() {
        assert!(SearchPredicate::build("   ").is_none());
    }

    #[test]
    fn test_term_clauses() {
        let predicate = SearchPredicate::build("  Dell ").unwrap();
        assert_eq!(predicate.term, "dell");
        // 6 verbatim term fields + 4 folded term fields; word clauses dedupe away
        assert_eq!(predicate.matches.len(), 10);
        assert!(predicate.matches.iter().any(|m| m.field == TextField::BorrowedBy && !m.folded));
        assert!(!predicate.matches.iter().any(|m| m.field == TextField::BorrowedBy && m.folded));
    }

    #[test]
    fn test_word_clauses() {
        let predicate = SearchPredicate::build("kırmızı çanta").unwrap();
        for needle in ["kırmızı", "kirmizi", "çanta", "canta"] {
            assert!(
                predicate.matches.iter().any(|m| m.needle == needle),
                "missing needle {}",
                needle
            );
        }
        assert!(predicate.matches.iter().any(|m| m.needle == "kirmizi canta" && m.folded));
    }

    #[test]
    fn test_verbatim_match() {
        let predicate = SearchPredicate::build("latitude").unwrap();
        assert!(predicate.matches(&product("Dell Latitude", None, None)));
        assert!(!predicate.matches(&product("ThinkPad", None, None)));
    }

    #[test]
    fn test_folded_search_finds_accented_text() {
        let bag = product("Çanta", None, None);
        assert!(SearchPredicate::build("canta").unwrap().matches(&bag));
        assert!(SearchPredicate::build("ÇANTA").unwrap().matches(&bag));

        let shelf = product("Box", Some("Üst raf"), Some("Depo Şube"));
        assert!(SearchPredicate::build("ust").unwrap().matches(&shelf));
        assert!(SearchPredicate::build("sube").unwrap().matches(&shelf));
    }

    #[test]
    fn test_any_word_matches() {
        let predicate = SearchPredicate::build("monitor dell").unwrap();
        assert!(predicate.matches(&product("Dell Latitude", None, None)));
    }

    #[test]
    fn test_borrower_matched_by_full_term() {
        let mut item = product("Projector", None, None);
        item.borrow(&BorrowEntry::new(Some("Alice Smith"), None, Utc::now()).unwrap())
            .unwrap();
        assert!(SearchPredicate::build("alice smith").unwrap().matches(&item));
    }

    #[test]
    fn test_filter_excludes_inactive() {
        let mut item = product("Dell Latitude", None, None);
        let filter = ProductFilter::default();
        assert!(filter.matches(&item));
        item.soft_delete();
        assert!(!filter.matches(&item));
    }

    #[test]
    fn test_filter_status_and_location() {
        let item = product("Dell Latitude", None, Some("Shelf A"));
        let filter = ProductFilter {
            status: Some(ProductStatus::Borrowed),
            ..Default::default()
        };
        assert!(!filter.matches(&item));

        let filter = ProductFilter {
            location: Some("Shelf A".into()),
            ..Default::default()
        };
        assert!(filter.matches(&item));

        let filter = ProductFilter {
            location: Some("Shelf B".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&item));
    }

    #[test]
    fn test_from_params_defaults() {
        let query = ProductQuery::from_params(None, Some(""), None, None, None, None, None).unwrap();
        assert_eq!(query, ProductQuery::default());
    }

    #[test]
    fn test_from_params_rejects_unknown_values() {
        assert!(ProductQuery::from_params(None, None, None, Some("password"), None, None, None).is_err());
        assert!(ProductQuery::from_params(None, None, None, None, Some("sideways"), None, None).is_err());
        assert!(ProductQuery::from_params(None, Some("lost"), None, None, None, None, None).is_err());
    }

    #[test]
    fn test_from_params_parses_sort() {
        let query = ProductQuery::from_params(
            None,
            Some("borrowed"),
            None,
            Some("borrowedDate"),
            Some("desc"),
            Some(2),
            Some(20),
        )
        .unwrap();
        assert_eq!(query.filter.status, Some(ProductStatus::Borrowed));
        assert_eq!(query.sort.field, ProductSortField::BorrowedDate);
        assert_eq!(query.sort.order, SortOrder::Desc);
        assert_eq!(query.page.offset(), 20);
    }

    #[test]
    fn test_compare_puts_missing_values_last() {
        let query = ProductQuery::from_params(None, None, None, Some("location"), None, None, None).unwrap();
        let placed = product("A", None, Some("Shelf A"));
        let unplaced = product("B", None, None);
        assert_eq!(query.compare(&placed, &unplaced), Ordering::Less);
    }
}
