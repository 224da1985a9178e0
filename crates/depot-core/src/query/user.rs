//! Admin user listing query

use std::cmp::Ordering;

use depot_shared::types::{PageRequest, Sort, SortOrder};
use depot_shared::utils::non_blank;

use crate::domain::{Role, User};
use crate::error::DomainError;
use crate::query::product::{nulls_last, parse_order};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Lower-cased substring matched against name or email.
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if self.role.is_some_and(|role| role != user.role) {
            return false;
        }
        if self.is_active.is_some_and(|active| active != user.is_active) {
            return false;
        }
        self.search.as_ref().is_none_or(|needle| {
            user.name.to_lowercase().contains(needle) || user.email.to_lowercase().contains(needle)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSortField {
    Name,
    Email,
    Role,
    #[default]
    CreatedAt,
    LastLogin,
}

impl UserSortField {
    pub fn from_param(value: &str) -> Option<Self> {
        match value.trim() {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "role" => Some(Self::Role),
            "createdAt" => Some(Self::CreatedAt),
            "lastLogin" => Some(Self::LastLogin),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Role => "role",
            Self::CreatedAt => "created_at",
            Self::LastLogin => "last_login",
        }
    }

    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::Email => a.email.cmp(&b.email),
            Self::Role => a.role.as_str().cmp(b.role.as_str()),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::LastLogin => nulls_last(&a.last_login, &b.last_login),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub filter: UserFilter,
    pub sort: Sort<UserSortField>,
    pub page: PageRequest,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            filter: UserFilter::default(),
            sort: Sort {
                field: UserSortField::CreatedAt,
                order: SortOrder::Desc,
            },
            page: PageRequest::default(),
        }
    }
}

impl UserQuery {
    #[allow(clippy::too_many_arguments)]
    pub fn from_params(
        search: Option<&str>,
        role: Option<&str>,
        is_active: Option<bool>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Self, DomainError> {
        let role = match non_blank(role) {
            None => None,
            Some(raw) => Some(
                Role::from_str(&raw)
                    .ok_or_else(|| DomainError::ValidationError(format!("Invalid role: {}", raw)))?,
            ),
        };

        let field = match non_blank(sort_by) {
            None => UserSortField::default(),
            Some(raw) => UserSortField::from_param(&raw).ok_or_else(|| {
                DomainError::ValidationError(format!("Invalid sort field: {}", raw))
            })?,
        };

        Ok(Self {
            filter: UserFilter {
                search: non_blank(search).map(|s| s.to_lowercase()),
                role,
                is_active,
            },
            sort: Sort {
                field,
                order: parse_order(sort_order, SortOrder::Desc)?,
            },
            page: PageRequest::new(page, limit),
        })
    }

    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        let primary = match self.sort.order {
            SortOrder::Asc => self.sort.field.compare(a, b),
            SortOrder::Desc => self.sort.field.compare(b, a),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}
