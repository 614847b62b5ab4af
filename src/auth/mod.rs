pub mod handlers;
mod jwt;
pub mod models;
mod password;
mod service;

// Re-export handlers for use in routes.rs
pub use handlers::{login, me, signup};

// Re-export for use in extractors
pub use jwt::{create_access_token, decode_token, extract_token};
