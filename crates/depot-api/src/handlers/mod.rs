pub mod admin;
pub mod auth;
pub mod health;
pub mod home;
pub mod locations;
pub mod products;
