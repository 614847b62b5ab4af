pub mod amount;
pub mod auth;
pub mod budget;
pub mod config;
pub mod errors;
pub mod expense;
pub mod extractors;
pub mod fund;
pub mod openapi;
pub mod routes;
