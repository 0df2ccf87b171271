pub mod auth;
pub mod messaging;
pub mod portal;
pub mod settings;
pub mod webhooks;
