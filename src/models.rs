pub mod auth;
pub mod messaging;
pub mod portal;
pub mod tenancy;
