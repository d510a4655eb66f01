// Presentation layer - HTTP routes and request handling
pub mod app_state;
pub mod error;
pub mod handlers;
pub mod session;
