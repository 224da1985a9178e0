// ============================================================================
// Depot Core - Location Entity
// File: crates/depot-core/src/domain/location.rs
// Description: Named storage slot. Products copy the name as free text.
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use depot_shared::utils::{merge_text, non_blank};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Location name must be between 1 and 100 characters"))]
    pub name: String,

    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Edit payload. Missing or blank text keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct LocationChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl Location {
    pub fn new(name: &str, description: Option<&str>) -> Result<Self, validator::ValidationErrors> {
        let now = Utc::now();
        let location = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            description: non_blank(description),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        location.validate()?;
        Ok(location)
    }

    pub fn apply_changes(&mut self, changes: &LocationChanges) -> Result<(), validator::ValidationErrors> {
        if let Some(name) = non_blank(changes.name.as_deref()) {
            self.name = name;
        }
        self.description = merge_text(changes.description.as_deref(), self.description.as_deref());
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
        self.validate()
    }

    pub fn toggle(&mut self) {
        self.is_active = !self.is_active;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_location() {
        let location = Location::new(" A-1 Shelf ", Some("  ")).unwrap();
        assert_eq!(location.name, "A-1 Shelf");
        assert!(location.description.is_none());
        assert!(location.is_active);
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(Location::new("   ", None).is_err());
        assert!(Location::new(&"x".repeat(101), None).is_err());
    }

    #[test]
    fn test_apply_changes_keeps_previous_on_blank() {
        let mut location = Location::new("A-1", Some("Right side")).unwrap();
        location
            .apply_changes(&LocationChanges {
                name: Some("".into()),
                description: Some(" ".into()),
                is_active: Some(false),
            })
            .unwrap();
        assert_eq!(location.name, "A-1");
        assert_eq!(location.description.as_deref(), Some("Right side"));
        assert!(!location.is_active);
    }

    #[test]
    fn test_toggle() {
        let mut location = Location::new("A-1", None).unwrap();
        location.toggle();
        assert!(!location.is_active);
        location.toggle();
        assert!(location.is_active);
    }
}
