//! Application-wide constants

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_TOKEN_EXPIRY_HOURS: i64 = 24;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 255;
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_LOCATION_NAME_LENGTH: usize = 100;
pub const RECENT_ITEMS_LIMIT: u32 = 5;
pub const UPLOADS_PREFIX: &str = "/uploads/";
pub const DATABASE_UNAVAILABLE_CODE: &str = "DATABASE_CONNECTION_FAILED";
