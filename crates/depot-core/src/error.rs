//! Domain errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Product not found")]
    ProductNotFound,

    #[error("No product found for this barcode")]
    BarcodeNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Location not found")]
    LocationNotFound,

    #[error("Product is already borrowed")]
    AlreadyBorrowed,

    #[error("Product is already in stock")]
    AlreadyInStock,

    #[error("Borrowing user not found or inactive")]
    BorrowerNotFound,

    #[error("A product with barcode {0} already exists")]
    BarcodeAlreadyExists(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Location name already exists: {0}")]
    LocationNameAlreadyExists(String),

    #[error("{0}")]
    SelfModificationForbidden(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Admin privileges required")]
    Forbidden,

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Datastore unavailable")]
    DatastoreUnavailable,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect::<Vec<_>>()
            .join(", ");
        DomainError::ValidationError(message)
    }
}
