pub mod auth;
pub mod tenancy;
pub mod webhook;
