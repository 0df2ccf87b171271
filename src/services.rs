pub mod auth;
pub mod portal;
pub mod session;
pub mod tenancy_service;
pub mod whatsapp;
